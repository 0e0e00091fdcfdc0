//! FAT Bpb structure.
//!
//! This module implements:
//! - BIOS Parameter Block (Bpb) decoding from the first sector of the image
//! - Optional validation against Microsoft's FAT32 rules
//! - Derivation of the [`Geometry`] used by every other component

use binread::{BinRead, BinReaderExt};
use log::debug;
use std::io;

use super::fat_error::FATError;
use super::fat_type::FATType;
use super::geometry::Geometry;
use crate::image::DiskImage;

/// Size in bytes of the boot sector holding the Bpb.
pub const BOOT_SECTOR_SIZE: u64 = 512;

/// BIOS Parameter Block structure for FAT32 filesystems.
///
/// Fields are decoded one by one, in on-disk order and little-endian, from the boot
/// sector. Fields irrelevant to recovery are still decoded to keep the offsets right.
#[derive(BinRead, Debug)]
#[br(little)]
pub struct Bpb {
    /// Jump instruction to boot code (must be 0xEB ?? 0x90 or 0xE9 ?? ??)
    jmp: [u8; 3],
    _oem_name: [u8; 8],
    /// Number of bytes per sector (512, 1024, 2048, or 4096)
    bytes_per_sec: u16,
    /// Number of sectors per cluster (power of 2: 1, 2, 4, 8, 16, 32, 64, or 128)
    sec_per_clus: u8,
    /// Number of reserved sectors from start of volume
    rsvd_sec_cnt: u16,
    /// Number of FAT copies (typically 2 for redundancy)
    num_fat: u8,
    /// Maximum number of root directory entries (0 for FAT32)
    root_ent_cnt: u16,
    tot_sec_16: u16,
    _media: u8,
    fat_sz_16: u16,
    _sec_per_trk: u16,
    _num_heads: u16,
    _hidd_sec: u32,
    tot_sec_32: u32,

    // FAT32-specific fields
    /// Sectors per FAT
    fat_sz_32: u32,
    _ext_flags: u16,
    _fs_ver: u16,
    /// First cluster of root directory (typically 2)
    root_clus: u32,
    _fs_info: u16,
    _bk_boot_sec: u16,
    _reserved: [u8; 12],
    _drv_num: u8,
    _reserved_1: u8,
    _boot_sig: u8,
    _vol_id: u32,
    _vol_lab: [u8; 11],
    _fil_sys_type: [u8; 8],
    #[br(count = 420)]
    _boot_code: Vec<u8>,
    /// Boot sector signature (0x55 0xAA)
    sig: [u8; 2],
}

impl Bpb {
    /// Decodes and optionally validates the Bpb found at the start of the image.
    ///
    /// # Parameters
    /// - `image`: The disk image holding a FAT32 volume at offset 0
    /// - `validate`: Whether to perform the FAT32 validation checks on the Bpb
    ///
    /// # Errors
    /// - `FATError::ImageError` if the image is shorter than one boot sector
    /// - `FATError::BinReadError` if decoding fails
    /// - Various validation variants if `validate` is true and a check fails
    pub fn from_image<S: AsRef<[u8]> + AsMut<[u8]>>(
        image: &DiskImage<S>,
        validate: bool,
    ) -> Result<Bpb, FATError> {
        let buf = image.slice(0, BOOT_SECTOR_SIZE)?;

        let mut reader = io::Cursor::new(buf);
        let bpb: Bpb = reader.read_le()?;
        debug!("Decoded boot sector ({} data clusters)", bpb.cluster_count());

        if validate { bpb.validate() } else { Ok(bpb) }
    }

    /// Derives the volume geometry from the decoded fields.
    ///
    /// # Errors
    /// - `FATError::InvalidGeometry` if bytes per sector or sectors per cluster is zero
    pub fn geometry(&self) -> Result<Geometry, FATError> {
        if self.bytes_per_sec == 0 {
            return Err(FATError::InvalidGeometry(String::from(
                "the boot sector declares 0 bytes per sector",
            )));
        }
        if self.sec_per_clus == 0 {
            return Err(FATError::InvalidGeometry(String::from(
                "the boot sector declares 0 sectors per cluster",
            )));
        }

        Ok(Geometry::new(
            self.bytes_per_sec,
            self.sec_per_clus,
            self.rsvd_sec_cnt,
            self.num_fat,
            self.fat_sz(),
            self.root_clus,
            self.tot_sec(),
        ))
    }

    /// Determines the number of clusters in the data section.
    pub fn cluster_count(&self) -> u32 {
        if self.bytes_per_sec == 0 || self.sec_per_clus == 0 {
            return 0;
        }

        let root_dir_sectors =
            (u32::from(self.root_ent_cnt) * 32).div_ceil(u32::from(self.bytes_per_sec));
        let meta_sec = u32::from(self.rsvd_sec_cnt)
            .saturating_add(u32::from(self.num_fat).saturating_mul(self.fat_sz()))
            .saturating_add(root_dir_sectors);

        self.tot_sec().saturating_sub(meta_sec) / u32::from(self.sec_per_clus)
    }

    fn fat_sz(&self) -> u32 {
        if self.fat_sz_16 > 0 {
            self.fat_sz_16.into()
        } else {
            self.fat_sz_32
        }
    }

    fn tot_sec(&self) -> u32 {
        if self.tot_sec_16 != 0 {
            self.tot_sec_16.into()
        } else {
            self.tot_sec_32
        }
    }

    /// Determines the FAT type based on the number of clusters in the filesystem.
    pub fn fat_type(&self) -> FATType {
        FATType::from_cluster_count(self.cluster_count())
    }

    /// Validates the Bpb structure against the FAT32 requirements.
    ///
    /// # Errors
    /// - `FATError::InvalidJmp`: If the jump instruction is invalid
    /// - `FATError::InvalidBytesPerSec`: If bytes per sector is not a valid value
    /// - `FATError::InvalidSecPerClus`: If sectors per cluster is not a valid value
    /// - `FATError::InvalidClusSz`: If cluster size exceeds 32 KiB
    /// - `FATError::InvalidSignature`: If boot sector signature is not 0x55AA
    /// - `FATError::UnsupportedFATType`: If filesystem is not FAT32
    fn validate(self) -> Result<Self, FATError> {
        if !((self.jmp[0] == 0xEB && self.jmp[2] == 0x90) || self.jmp[0] == 0xE9) {
            return Err(FATError::InvalidJmp(format!(
                "0x{:02X}{:02X}{:02X}",
                self.jmp[0], self.jmp[1], self.jmp[2],
            )));
        }

        const VALID_BYTES_PER_SEC: [u16; 4] = [512, 1024, 2048, 4096];
        if !VALID_BYTES_PER_SEC.contains(&self.bytes_per_sec) {
            return Err(FATError::InvalidBytesPerSec(self.bytes_per_sec));
        }

        const VALID_SEC_PER_CLUS: [u8; 8] = [1, 2, 4, 8, 16, 32, 64, 128];
        if !VALID_SEC_PER_CLUS.contains(&self.sec_per_clus) {
            return Err(FATError::InvalidSecPerClus(self.sec_per_clus));
        }

        let clus_sz = u32::from(self.bytes_per_sec) * u32::from(self.sec_per_clus);
        if clus_sz > 32 * 1024 {
            return Err(FATError::InvalidClusSz(clus_sz));
        }

        const SIG: [u8; 2] = [0x55, 0xAA];
        if self.sig != SIG {
            return Err(FATError::InvalidSignature(format!(
                "0x{:02X}{:02X}",
                self.sig[0], self.sig[1]
            )));
        }

        match self.fat_type() {
            FATType::FAT32 => self.validate_fat32(),
            fat_type => Err(FATError::UnsupportedFATType(fat_type.to_string())),
        }
    }

    /// Performs FAT32-specific validation checks.
    fn validate_fat32(self) -> Result<Self, FATError> {
        if self.rsvd_sec_cnt == 0 {
            return Err(FATError::InvalidRsvdSecCnt(self.rsvd_sec_cnt));
        }

        if self.num_fat == 0 {
            return Err(FATError::InvalidNumFat(self.num_fat));
        }

        if self.root_ent_cnt != 0 {
            return Err(FATError::InvalidRootEntCnt(self.root_ent_cnt));
        }

        // Check for the count of sectors
        if self.tot_sec_16 != 0 {
            return Err(FATError::InvalidTotSec(String::from(
                "BPB_TotSec16 should be 0 for a FAT32 volume.",
            )));
        }
        if self.tot_sec_32 == 0 {
            return Err(FATError::InvalidTotSec(String::from(
                "BPB_TotSec32 should be greater than 0 for a FAT32 volume.",
            )));
        }

        // Check the FAT size
        if self.fat_sz_16 != 0 {
            return Err(FATError::InvalidFatSz(String::from(
                "BPB_FATSz16 should be 0 for a FAT32 volume.",
            )));
        }
        if self.fat_sz_32 == 0 {
            return Err(FATError::InvalidFatSz(String::from(
                "BPB_FATSz32 should be greater than 0 for a FAT32 volume.",
            )));
        }

        if self.root_clus < 2 {
            return Err(FATError::InvalidRootClus(self.root_clus));
        }

        Ok(self)
    }
}
