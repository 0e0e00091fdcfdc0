//! Disk images written to temporary files for the integration tests.
//!
//! Geometry: 512-byte sectors, 1 sector per cluster, 32 reserved sectors, two
//! one-sector FATs, 64 data clusters and the root directory at cluster 2.
#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

pub const NUM_FAT: usize = 2;
pub const EOC: u32 = 0x0FFF_FFFF;

const SECTOR: usize = 512;
const RSVD_SEC_CNT: usize = 32;
const DATA_START: usize = (RSVD_SEC_CNT + NUM_FAT) * SECTOR;

pub struct TestImage {
    pub bytes: Vec<u8>,
    next_slot: usize,
}

impl TestImage {
    pub fn new() -> Self {
        let tot_sec = RSVD_SEC_CNT + NUM_FAT + 64;
        let mut bytes = vec![0u8; tot_sec * SECTOR];
        bytes[0..3].copy_from_slice(&[0xEB, 0x58, 0x90]);
        bytes[11..13].copy_from_slice(&(SECTOR as u16).to_le_bytes());
        bytes[13] = 1;
        bytes[14..16].copy_from_slice(&(RSVD_SEC_CNT as u16).to_le_bytes());
        bytes[16] = NUM_FAT as u8;
        bytes[32..36].copy_from_slice(&(tot_sec as u32).to_le_bytes());
        bytes[36..40].copy_from_slice(&1u32.to_le_bytes());
        bytes[44..48].copy_from_slice(&2u32.to_le_bytes());
        bytes[510..512].copy_from_slice(&[0x55, 0xAA]);

        for fat_idx in 0..NUM_FAT {
            for (cluster, value) in [(0, 0x0FFF_FFF8), (1, EOC), (2, EOC)] {
                let off = fat_offset(fat_idx, cluster);
                bytes[off..off + 4].copy_from_slice(&u32::to_le_bytes(value));
            }
        }

        Self {
            bytes,
            next_slot: 0,
        }
    }

    /// Appends a short entry to the root directory.
    pub fn entry(&mut self, name: &[u8; 11], attr: u8, cluster: u32, size: u32) -> &mut Self {
        let off = root_slot_offset(self.next_slot);
        self.next_slot += 1;

        let slot = &mut self.bytes[off..off + 32];
        slot[..11].copy_from_slice(name);
        slot[11] = attr;
        slot[20..22].copy_from_slice(&((cluster >> 16) as u16).to_le_bytes());
        slot[26..28].copy_from_slice(&(cluster as u16).to_le_bytes());
        slot[28..32].copy_from_slice(&size.to_le_bytes());
        self
    }

    pub fn data(&mut self, cluster: u32, content: &[u8]) -> &mut Self {
        let off = DATA_START + (cluster as usize - 2) * SECTOR;
        self.bytes[off..off + content.len()].copy_from_slice(content);
        self
    }

    pub fn write_temp(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&self.bytes).unwrap();
        file.flush().unwrap();
        file
    }
}

fn fat_offset(fat_idx: usize, cluster: u32) -> usize {
    (RSVD_SEC_CNT + fat_idx) * SECTOR + cluster as usize * 4
}

/// Reads the entry of `cluster` in FAT copy `fat_idx` of a raw image.
pub fn fat_entry(bytes: &[u8], fat_idx: usize, cluster: u32) -> u32 {
    let off = fat_offset(fat_idx, cluster);
    u32::from_le_bytes([bytes[off], bytes[off + 1], bytes[off + 2], bytes[off + 3]])
}

pub fn root_slot_offset(slot: usize) -> usize {
    DATA_START + slot * 32
}

pub fn root_name_byte(bytes: &[u8], slot: usize) -> u8 {
    bytes[root_slot_offset(slot)]
}

/// Two deleted `TEST.TXT` entries with different content.
pub fn ambiguous_image() -> TestImage {
    let mut image = TestImage::new();
    image
        .entry(b"\xE5EST    TXT", 0x20, 5, 5)
        .entry(b"\xE5EST    TXT", 0x20, 6, 5)
        .data(5, b"first")
        .data(6, b"other");
    image
}
