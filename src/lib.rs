//!
//! fat_undelete: A library and CLI for recovering deleted files from FAT32 disk images.
//!
//! This crate provides tools for:
//! - Mapping a disk image and accessing it through bounded reads and writes
//! - Decoding the FAT32 boot sector and the volume geometry
//! - Listing the root directory
//! - Recovering deleted files by name, optionally disambiguated by SHA-1
//! - Parsing the command line of the `main` binary
//!
//! # Re-exports
//! - [`FATVol`]: FAT volume abstraction
//! - [`DiskImage`]: Disk image handle
//! - [`FATError`]: Errors raised by volume operations

pub mod commands;
pub mod filesystem;
pub mod image;
pub mod traits;
pub mod utils;

/// FAT volume abstraction (see [`filesystem::fat::FATVol`]).
pub use crate::filesystem::fat::FATVol;
/// Errors raised by volume operations (see [`filesystem::fat_error::FATError`]).
pub use crate::filesystem::fat_error::FATError;
/// Disk image handle (see [`image::disk_image::DiskImage`]).
pub use crate::image::DiskImage;
