//! FAT volume structure and operations.
//!
//! This module implements the core functions to interact with a FAT32 volume held in a
//! [`DiskImage`], including:
//! - Reading the BPB and deriving the geometry
//! - Reading clusters and following cluster chains through the first FAT
//! - Updating an entry identically in every FAT copy
//! - Displaying the volume layout

use log::{debug, trace};
use std::fmt::Write as FmtWrite;

use super::bpb::Bpb;
use super::dir_entry::DirEntry;
use super::dir_iter::{DirIter, ScanMode};
use super::fat_error::FATError;
use super::geometry::{FIRST_DATA_CLUSTER, Geometry};
use crate::image::DiskImage;
use crate::traits::LayoutDisplay;

/// Only the low 28 bits of a FAT32 entry hold a cluster number.
pub const FAT32_CLUSTER_MASK: u32 = 0x0FFF_FFFF;

/// Smallest FAT32 value marking the last cluster of a chain.
pub const END_OF_CHAIN_MIN: u32 = 0x0FFF_FFF8;

/// End-of-chain value written when rebuilding a chain.
pub const END_OF_CHAIN: u32 = 0x0FFF_FFFF;

/// FAT value of a free cluster.
pub const FREE_CLUSTER: u32 = 0;

/// Checks whether a FAT value ends a cluster chain.
pub fn is_end_of_chain(value: u32) -> bool {
    value & FAT32_CLUSTER_MASK >= END_OF_CHAIN_MIN
}

/// Structure for a FAT32 volume.
///
/// It owns the disk image for the whole run; read paths borrow it, and only chain
/// reconstruction borrows it mutably.
pub struct FATVol<S> {
    image: DiskImage<S>,
    geometry: Geometry,
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> FATVol<S> {
    /// Reads the Bpb at the start of the image and optionally validates the volume.
    ///
    /// # Parameters
    /// - `image`: The disk image holding the volume at offset 0
    /// - `validate`: Whether to perform validation checks on the Bpb
    ///
    /// # Errors
    /// - Returns `FATError::ImageError` if the boot sector can't be read
    /// - Returns `FATError::InvalidGeometry` if no cluster can be addressed
    /// - Returns various `FATError` variants if validation fails and `validate` is true
    pub fn from_image(image: DiskImage<S>, validate: bool) -> Result<Self, FATError> {
        let bpb = Bpb::from_image(&image, validate)?;
        let geometry = bpb.geometry()?;
        debug!("Volume geometry: {geometry:?}");

        Ok(Self { image, geometry })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn image(&self) -> &DiskImage<S> {
        &self.image
    }

    /// Releases the disk image.
    pub fn into_image(self) -> DiskImage<S> {
        self.image
    }

    pub fn cluster_size(&self) -> u32 {
        self.geometry.cluster_size()
    }

    /// Byte offset of a data cluster in the image.
    pub fn cluster_to_offset(&self, cluster: u32) -> Result<u64, FATError> {
        self.geometry.cluster_to_offset(cluster)
    }

    /// Borrows `len` bytes starting at the first byte of `cluster`.
    ///
    /// A zero-length read never translates the cluster, so empty files whose first
    /// cluster is 0 can still be read.
    pub fn read_from_cluster(&self, cluster: u32, len: u32) -> Result<&[u8], FATError> {
        if len == 0 {
            return Ok(&[]);
        }

        let offset = self.cluster_to_offset(cluster)?;
        Ok(self.image.slice(offset, len.into())?)
    }

    /// Reads the raw entry of `cluster` in the FAT copy `fat_idx`.
    pub fn fat_entry_in(&self, fat_idx: u8, cluster: u32) -> Result<u32, FATError> {
        let off = self.geometry.fat_entry_offset(fat_idx, cluster)?;
        Ok(self.image.u32_at(off)?)
    }

    /// Returns the value following `cluster` in the first FAT, masked to 28 bits.
    pub fn next_cluster(&self, cluster: u32) -> Result<u32, FATError> {
        Ok(self.fat_entry_in(0, cluster)? & FAT32_CLUSTER_MASK)
    }

    /// Writes `value` as the entry of `cluster` in every FAT copy.
    ///
    /// The reserved upper 4 bits of each existing entry are kept.
    ///
    /// # Errors
    /// - `FATError::InvalidCluster` if the FAT has no entry for `cluster`
    pub fn set_fat_entry(&mut self, cluster: u32, value: u32) -> Result<(), FATError> {
        for fat_idx in 0..self.geometry.num_fat() {
            let off = self.geometry.fat_entry_offset(fat_idx, cluster)?;
            let reserved = self.image.u32_at(off)? & !FAT32_CLUSTER_MASK;
            self.image
                .write_u32(off, reserved | (value & FAT32_CLUSTER_MASK))?;
            trace!("FAT #{fat_idx}[{cluster}] <- 0x{value:08X}");
        }

        Ok(())
    }

    /// Overwrites one byte of the image.
    pub(super) fn write_byte(&mut self, offset: u64, value: u8) -> Result<(), FATError> {
        Ok(self.image.write_u8(offset, value)?)
    }

    /// Lists the clusters of the chain starting at `cluster`, following the first FAT.
    ///
    /// The chain stops at an end-of-chain marker or a free entry.
    ///
    /// # Errors
    /// - `FATError::InvalidCluster` if `cluster` is 0 or 1
    /// - `FATError::ClusterChainLoop` if the chain is longer than the FAT
    pub fn list_clusters(&self, cluster: u32) -> Result<Vec<u32>, FATError> {
        if cluster < FIRST_DATA_CLUSTER {
            return Err(FATError::InvalidCluster(cluster));
        }

        let max_len = self.geometry.fat_entry_count();
        let mut all_clusters = vec![];
        let mut cluster = cluster;

        while cluster != FREE_CLUSTER && !is_end_of_chain(cluster) {
            if all_clusters.len() as u64 >= max_len {
                return Err(FATError::ClusterChainLoop(cluster));
            }
            all_clusters.push(cluster);
            cluster = self.next_cluster(cluster)?;
        }

        Ok(all_clusters)
    }

    /// Iterates over the entries of the directory starting at `first_cluster`.
    pub fn dir_entries(&self, first_cluster: u32, mode: ScanMode) -> DirIter<'_, S> {
        DirIter::new(self, first_cluster, mode)
    }

    /// Iterates over the entries of the root directory.
    pub fn root_entries(&self, mode: ScanMode) -> DirIter<'_, S> {
        self.dir_entries(self.geometry.root_clus(), mode)
    }

    /// Collects the live files and directories of the root directory, in on-disk order.
    pub fn list_root(&self) -> Result<Vec<DirEntry>, FATError> {
        self.root_entries(ScanMode::Listing).collect()
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> LayoutDisplay for FATVol<S> {
    fn display_layout(&self, indent: u8) -> Result<String, std::fmt::Error> {
        let g = &self.geometry;
        let mut out = String::new();
        let indent = " ".repeat(indent.into());

        let data_start = g.data_start_sector();
        let data_end = u64::from(g.tot_sec()).max(data_start);
        let image_end = self.image.len() / u64::from(g.bytes_per_sec());

        writeln!(out, "{}┌{:─^55}┐", indent, " FAT32 Volume Layout ")?;
        writeln!(
            out,
            "{}├{:^12}┬{:^12}┬{:^12}┬{:^16}┤",
            indent, "Region", "Start", "End", "Description"
        )?;
        writeln!(
            out,
            "{}├{:─<12}┼{:─<12}┼{:─<12}┼{:─<16}┤",
            indent, "", "", "", ""
        )?;

        writeln!(
            out,
            "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
            indent,
            "Reserved",
            0,
            g.fat_start_sector(0),
            "Boot + Reserved"
        )?;
        for i in 0..g.num_fat() {
            writeln!(
                out,
                "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
                indent,
                format!("FAT #{i}"),
                g.fat_start_sector(i),
                g.fat_start_sector(i) + u64::from(g.fat_sz()),
                "FAT Tables"
            )?;
        }
        writeln!(
            out,
            "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
            indent, "Data", data_start, data_end, "Cluster Data"
        )?;
        if data_end < image_end {
            writeln!(
                out,
                "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
                indent, "", data_end, image_end, "Volume Slack"
            )?;
        }

        writeln!(
            out,
            "{}└{:─<12}┴{:─<12}┴{:─<12}┴{:─<16}┘",
            indent, "", "", "", ""
        )?;

        Ok(out)
    }
}
