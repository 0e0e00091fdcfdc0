//! FAT directory entry structure and parsing.
//!
//! Each short directory entry is 32 bytes and holds the 8.3 name, the attributes, the
//! first cluster and the size of a file or directory. A [`DirEntry`] also remembers
//! where it lives in the image so that a recovery can patch it in place.

use binread::{BinRead, BinReaderExt};
use std::fmt;
use std::io;

use super::fat_error::FATError;

/// First name byte of an entry that has been deleted.
pub const DELETED_MARKER: u8 = 0xE5;

/// First name byte of the slot ending a directory.
pub const END_MARKER: u8 = 0x00;

const ATTR_VOLUME_ID: u8 = 0x08;
const ATTR_DIRECTORY: u8 = 0x10;
const ATTR_LONG_NAME: u8 = 0x0F;

/// On-disk layout of a short directory entry.
///
/// Timestamp fields are prefixed with underscore as they're not used.
#[derive(BinRead, Debug, Clone)]
#[br(little)]
struct RawDirEntry {
    /// Filename in 8.3 format (8 characters name + 3 characters extension)
    name: [u8; 11],
    attr: u8,
    _n_t_res: u8,
    _crt_time_tenth: u8,
    _crt_time: u16,
    _crt_date: u16,
    _lst_acc_date: u16,
    /// High 16 bits of first cluster number
    fst_clus_hi: u16,
    _wrt_time: u16,
    _wrt_date: u16,
    /// Low 16 bits of first cluster number
    fst_clus_lo: u16,
    /// File size in bytes (0 for directories)
    file_size: u32,
}

/// A short directory entry located at a known byte offset of the image.
#[derive(Debug, Clone)]
pub struct DirEntry {
    offset: u64,
    raw: RawDirEntry,
}

impl DirEntry {
    /// Creates a directory entry from a byte slice.
    ///
    /// # Parameters
    /// - `buf`: At least 32 bytes of directory entry data
    /// - `offset`: Absolute byte offset of `buf` in the image
    ///
    /// # Errors
    /// - `FATError::BinReadError` if the slice is shorter than an entry
    pub fn from_slice(buf: &[u8], offset: u64) -> Result<Self, FATError> {
        let mut reader = io::Cursor::new(buf);
        let raw: RawDirEntry = reader.read_le()?;
        Ok(Self { offset, raw })
    }

    /// Absolute byte offset of the entry in the image.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Raw 11-byte short name, space-padded.
    pub fn name(&self) -> &[u8; 11] {
        &self.raw.name
    }

    pub fn attr(&self) -> u8 {
        self.raw.attr
    }

    pub fn file_size(&self) -> u32 {
        self.raw.file_size
    }

    /// Returns the complete first cluster number for this entry.
    ///
    /// Combines `fst_clus_hi` and `fst_clus_lo`: `(fst_clus_hi << 16) | fst_clus_lo`
    pub fn cluster_number(&self) -> u32 {
        (u32::from(self.raw.fst_clus_hi) << 16) | u32::from(self.raw.fst_clus_lo)
    }

    pub fn is_dir(&self) -> bool {
        self.raw.attr & ATTR_DIRECTORY != 0
    }

    pub fn is_deleted(&self) -> bool {
        self.raw.name[0] == DELETED_MARKER
    }

    /// Checks whether the entry is a fragment of a long filename.
    pub fn is_long_name(&self) -> bool {
        self.raw.attr & ATTR_LONG_NAME == ATTR_LONG_NAME
    }

    /// Checks whether the entry holds the volume label.
    pub fn is_volume_label(&self) -> bool {
        !self.is_long_name() && self.raw.attr & (ATTR_VOLUME_ID | ATTR_DIRECTORY) == ATTR_VOLUME_ID
    }

    /// Renders the 8.3 name the way a user would type it.
    ///
    /// The base name stops at its first space; the extension is appended after a `.`
    /// unless its first byte is a space. Directories get a trailing `/`.
    pub fn display_name(&self) -> String {
        let name = &self.raw.name;
        let base_len = name[..8].iter().position(|&b| b == b' ').unwrap_or(8);
        let mut out = String::from_utf8_lossy(&name[..base_len]).into_owned();

        if self.is_dir() {
            out.push('/');
        } else if name[8] != b' ' {
            let ext_len = name[8..].iter().position(|&b| b == b' ').unwrap_or(3);
            out.push('.');
            out.push_str(&String::from_utf8_lossy(&name[8..8 + ext_len]));
        }

        out
    }
}

impl fmt::Display for DirEntry {
    /// Formats the directory entry as a root listing line.
    ///
    /// - `DIR/ (starting cluster = 5)` for directories
    /// - `FILE.TXT (size = 12, starting cluster = 6)` for non-empty files
    /// - `EMPTY.TXT (size = 0)` for empty files
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dir() {
            write!(
                f,
                "{} (starting cluster = {})",
                self.display_name(),
                self.cluster_number()
            )
        } else if self.file_size() == 0 {
            write!(f, "{} (size = 0)", self.display_name())
        } else {
            write!(
                f,
                "{} (size = {}, starting cluster = {})",
                self.display_name(),
                self.file_size(),
                self.cluster_number()
            )
        }
    }
}
