//! Disk image handle.
//!
//! The whole image is held by a single [`DiskImage`] which every component borrows.
//! All reads and writes go through bounded accessors that check the target range
//! against the image size before touching the bytes.

use log::debug;
use memmap2::{MmapMut, MmapOptions};
use std::fs::File;
use std::ops::Range;
use std::path::Path;

use super::image_error::ImageError;
use crate::utils;

/// Owned, mutable view over the bytes of a disk image.
///
/// `S` is the backing storage: a memory map for images opened from disk, or any
/// owned buffer (e.g. `Vec<u8>`) for images built in memory.
#[derive(Debug)]
pub struct DiskImage<S> {
    data: S,
}

impl DiskImage<MmapMut> {
    /// Opens and memory-maps a disk image file.
    ///
    /// # Parameters
    /// - `path`: Path to the image file
    /// - `writable`: Map the file shared and writable. When `false`, the file is opened
    ///   read-only and mapped copy-on-write, so nothing ever reaches the file.
    ///
    /// # Errors
    /// - Returns `ImageError::Io` if the file cannot be opened or mapped
    pub fn open(path: &Path, writable: bool) -> Result<Self, ImageError> {
        let data = if writable {
            let file = File::options().read(true).write(true).open(path)?;
            // SAFETY: the process holds the only handle on the image for its lifetime.
            unsafe { MmapMut::map_mut(&file)? }
        } else {
            let file = File::open(path)?;
            // SAFETY: private mapping, writes never reach the underlying file.
            unsafe { MmapOptions::new().map_copy(&file)? }
        };

        debug!(
            "Mapped {} ({} bytes, writable: {writable})",
            path.display(),
            data.len()
        );

        Ok(Self { data })
    }

    /// Flushes outstanding modifications of the mapping back to the image file.
    pub fn flush(&self) -> Result<(), ImageError> {
        self.data.flush()?;
        Ok(())
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> DiskImage<S> {
    /// Wraps an in-memory buffer holding a whole disk image.
    pub fn from_bytes(data: S) -> Self {
        Self { data }
    }

    /// Releases the backing storage.
    pub fn into_inner(self) -> S {
        self.data
    }

    /// Size of the image in bytes.
    pub fn len(&self) -> u64 {
        self.data.as_ref().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.as_ref().is_empty()
    }

    fn range(&self, offset: u64, len: u64) -> Result<Range<usize>, ImageError> {
        utils::checked_range(offset, len, self.len()).ok_or(ImageError::OutOfBounds {
            offset,
            len,
            size: self.len(),
        })
    }

    /// Borrows `len` bytes starting at `offset`.
    ///
    /// # Errors
    /// - `ImageError::OutOfBounds` if the range reaches past the end of the image
    pub fn slice(&self, offset: u64, len: u64) -> Result<&[u8], ImageError> {
        let range = self.range(offset, len)?;
        Ok(&self.data.as_ref()[range])
    }

    pub fn u8_at(&self, offset: u64) -> Result<u8, ImageError> {
        let bytes = self.slice(offset, 1)?;
        utils::u8_at(bytes, 0).ok_or(ImageError::OutOfBounds {
            offset,
            len: 1,
            size: self.len(),
        })
    }

    pub fn u16_at(&self, offset: u64) -> Result<u16, ImageError> {
        let bytes = self.slice(offset, 2)?;
        utils::u16_at(bytes, 0).ok_or(ImageError::OutOfBounds {
            offset,
            len: 2,
            size: self.len(),
        })
    }

    pub fn u32_at(&self, offset: u64) -> Result<u32, ImageError> {
        let bytes = self.slice(offset, 4)?;
        utils::u32_at(bytes, 0).ok_or(ImageError::OutOfBounds {
            offset,
            len: 4,
            size: self.len(),
        })
    }

    /// Writes a single byte at `offset`.
    ///
    /// # Errors
    /// - `ImageError::OutOfBounds` if `offset` is past the end of the image; nothing is written
    pub fn write_u8(&mut self, offset: u64, value: u8) -> Result<(), ImageError> {
        let range = self.range(offset, 1)?;
        self.data.as_mut()[range.start] = value;
        Ok(())
    }

    /// Writes a 32-bit value in little-endian byte order at `offset`.
    ///
    /// # Errors
    /// - `ImageError::OutOfBounds` if the 4 bytes do not fit in the image; nothing is written
    pub fn write_u32(&mut self, offset: u64, value: u32) -> Result<(), ImageError> {
        let range = self.range(offset, 4)?;
        self.data.as_mut()[range].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}
