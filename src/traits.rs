//! Declaration of traits reused across the code.

/// Implementation of the LayoutDisplay trait.
/// It is used to render the on-disk layout of a structure, such as a volume, as a table.
pub trait LayoutDisplay {
    fn display_layout(&self, indent: u8) -> Result<String, std::fmt::Error>;
}
