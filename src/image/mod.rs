//! Ownership handle over the raw bytes of a disk image.

pub mod disk_image;
pub mod image_error;

pub use disk_image::DiskImage;
pub use image_error::ImageError;
