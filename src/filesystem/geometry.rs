//! Volume geometry and cluster address translation.
//!
//! A [`Geometry`] is derived once from the boot sector and never changes afterwards.
//! It turns cluster numbers into byte offsets in the image, and locates the entry of a
//! cluster inside every FAT copy.

use getset::CopyGetters;

use super::fat_error::FATError;

/// Size in bytes of one FAT32 entry.
pub const FAT_ENTRY_SIZE: u64 = 4;

/// Size in bytes of one short directory entry.
pub const DIR_ENTRY_SIZE: u64 = 32;

/// First cluster number of the data region.
pub const FIRST_DATA_CLUSTER: u32 = 2;

/// Sector and cluster geometry of a FAT32 volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Geometry {
    bytes_per_sec: u16,
    sec_per_clus: u8,
    rsvd_sec_cnt: u16,
    num_fat: u8,
    /// Sectors per FAT copy
    fat_sz: u32,
    root_clus: u32,
    tot_sec: u32,
}

impl Geometry {
    pub(super) fn new(
        bytes_per_sec: u16,
        sec_per_clus: u8,
        rsvd_sec_cnt: u16,
        num_fat: u8,
        fat_sz: u32,
        root_clus: u32,
        tot_sec: u32,
    ) -> Self {
        Self {
            bytes_per_sec,
            sec_per_clus,
            rsvd_sec_cnt,
            num_fat,
            fat_sz,
            root_clus,
            tot_sec,
        }
    }

    /// Size of a cluster in bytes.
    pub fn cluster_size(&self) -> u32 {
        u32::from(self.bytes_per_sec) * u32::from(self.sec_per_clus)
    }

    /// Number of directory entry slots in one cluster.
    pub fn entries_per_cluster(&self) -> u32 {
        self.cluster_size() / DIR_ENTRY_SIZE as u32
    }

    /// Number of clusters needed to hold `size` bytes.
    pub fn clusters_for(&self, size: u32) -> u32 {
        size.div_ceil(self.cluster_size())
    }

    /// Returns the starting sector of the FAT copy `fat_idx`.
    pub fn fat_start_sector(&self, fat_idx: u8) -> u64 {
        u64::from(self.rsvd_sec_cnt) + u64::from(fat_idx) * u64::from(self.fat_sz)
    }

    /// Returns the starting sector of the data region.
    pub fn data_start_sector(&self) -> u64 {
        self.fat_start_sector(self.num_fat)
    }

    /// Byte offset of the data region in the image.
    pub fn data_start(&self) -> u64 {
        self.data_start_sector() * u64::from(self.bytes_per_sec)
    }

    /// Number of entries a single FAT copy holds.
    pub fn fat_entry_count(&self) -> u64 {
        u64::from(self.fat_sz) * u64::from(self.bytes_per_sec) / FAT_ENTRY_SIZE
    }

    /// Converts a cluster number to the byte offset of its first byte in the image.
    ///
    /// The offset is `((n - 2) * sec_per_clus + rsvd_sec_cnt + num_fat * fat_sz) * bytes_per_sec`.
    ///
    /// # Errors
    /// - `FATError::InvalidCluster` for the reserved clusters 0 and 1
    pub fn cluster_to_offset(&self, cluster: u32) -> Result<u64, FATError> {
        if cluster < FIRST_DATA_CLUSTER {
            return Err(FATError::InvalidCluster(cluster));
        }

        let sector = u64::from(cluster - FIRST_DATA_CLUSTER) * u64::from(self.sec_per_clus)
            + self.data_start_sector();
        Ok(sector * u64::from(self.bytes_per_sec))
    }

    /// Converts a byte offset of the data region back to the cluster containing it.
    ///
    /// Returns `None` for offsets located before the data region.
    pub fn offset_to_cluster(&self, offset: u64) -> Option<u32> {
        let rel = offset.checked_sub(self.data_start())?;
        let index = u32::try_from(rel / u64::from(self.cluster_size())).ok()?;
        index.checked_add(FIRST_DATA_CLUSTER)
    }

    /// Byte offset of the entry describing `cluster` in the FAT copy `fat_idx`.
    ///
    /// # Errors
    /// - `FATError::InvalidCluster` if a FAT copy is too small to describe `cluster`
    pub fn fat_entry_offset(&self, fat_idx: u8, cluster: u32) -> Result<u64, FATError> {
        if u64::from(cluster) >= self.fat_entry_count() {
            return Err(FATError::InvalidCluster(cluster));
        }

        Ok(self.fat_start_sector(fat_idx) * u64::from(self.bytes_per_sec)
            + u64::from(cluster) * FAT_ENTRY_SIZE)
    }
}
