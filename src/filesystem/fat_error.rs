//! Error types for FAT32 volume parsing and file recovery.
//!
//! This module defines errors that can occur while decoding the BIOS Parameter Block,
//! walking directories and cluster chains, and recovering deleted files.

use thiserror::Error;

use crate::image::ImageError;

/// Errors that can occur while inspecting or recovering files on a FAT volume.
#[derive(Error, Debug)]
pub enum FATError {
    /// The first three bytes of a FAT volume must contain a valid x86 jump instruction.
    #[error("Invalid jump instruction `{0}`")]
    InvalidJmp(String),

    /// Bytes per sector must be 512, 1024, 2048 or 4096.
    #[error("Invalid count of bytes per sector: `{0}`. Legal values: 512, 1024, 2048 or 4096")]
    InvalidBytesPerSec(u16),

    /// Sectors per cluster must be a power of 2: 1, 2, 4, 8, 16, 32, 64, or 128.
    #[error(
        "Invalid number of sector per cluster: `{0}`. Legal values: 1, 2, 4, 8, 16, 32, 64, 128"
    )]
    InvalidSecPerClus(u8),

    /// Total cluster size (bytes per sector × sectors per cluster) must not exceed 32 KiB.
    #[error("Invalid cluster size: `{0}`. Any value greater than 32K is invalid.")]
    InvalidClusSz(u32),

    #[error("Invalid count of reserved sectors: `{0}`. Any value greater than 0 is valid.")]
    InvalidRsvdSecCnt(u16),

    #[error("Invalid number of FATs on this volume: `{0}`.")]
    InvalidNumFat(u8),

    /// For FAT32 volumes the root directory is a regular cluster chain.
    #[error(
        "Invalid count of directory entries in the root directory: `{0}`. It should be 0 for a FAT32 volume."
    )]
    InvalidRootEntCnt(u16),

    #[error("Invalid total count of sectors on the volume: `{0}`")]
    InvalidTotSec(String),

    #[error("Invalid FAT size: `{0}`")]
    InvalidFatSz(String),

    /// Clusters 0 and 1 are reserved, and the data area starts at cluster 2.
    #[error(
        "Invalid cluster number of the first cluster of the root directory: `{0}`. This value should be at least 2."
    )]
    InvalidRootClus(u32),

    /// The boot sector signature must be 0x55AA.
    #[error("Invalid BPB signature: `{0}`. Expected signature: 0x55AA")]
    InvalidSignature(String),

    /// The detected FAT type is not supported (only FAT32 is supported).
    #[error("Unsupported FAT type: `{0}`")]
    UnsupportedFATType(String),

    /// The geometry read from the boot sector cannot address any cluster.
    #[error("Invalid volume geometry: {0}")]
    InvalidGeometry(String),

    /// The cluster number can't be translated or has no entry in the FAT.
    #[error("Invalid cluster number: `{0}`")]
    InvalidCluster(u32),

    /// A cluster chain is longer than the FAT can describe.
    #[error("Cluster chain loops back on itself (reached cluster `{0}` again)")]
    ClusterChainLoop(u32),

    /// The file was not found
    #[error("file not found")]
    FileNotFound,

    /// Several deleted entries match and nothing tells them apart.
    #[error("multiple candidates found")]
    MultipleCandidates(usize),

    /// A possibly fragmented file can only be recovered by its content digest.
    #[error("a SHA-1 digest is required to recover a possibly non-contiguous file")]
    HashRequired,

    /// More deleted entries match than a candidate set may hold.
    #[error("more than {0} deleted entries match this name")]
    TooManyCandidates(usize),

    /// Parsing error occured during structure initialization
    #[error("BinRead Error: `{0}`")]
    BinReadError(binread::Error),

    /// Underlying image access error.
    #[error("{0}")]
    ImageError(ImageError),
}

/// Converts BinRead errors into FATError.
impl From<binread::Error> for FATError {
    fn from(err: binread::Error) -> Self {
        FATError::BinReadError(err)
    }
}

/// Converts image access errors into FATError.
impl From<ImageError> for FATError {
    fn from(err: ImageError) -> Self {
        FATError::ImageError(err)
    }
}
