//! FAT32 volume parsing, directory scanning and deleted-file recovery.

pub mod bpb;
pub mod dir_entry;
pub mod dir_iter;
pub mod fat;
pub mod fat_error;
pub mod fat_type;
pub mod geometry;
pub mod recovery;
pub mod short_name;

#[cfg(test)]
pub(crate) mod testing;

pub use dir_entry::DirEntry;
pub use dir_iter::ScanMode;
pub use fat::FATVol;
pub use fat_error::FATError;
pub use geometry::Geometry;
pub use recovery::{Recovered, RecoveryMode, Sha1Digest};
