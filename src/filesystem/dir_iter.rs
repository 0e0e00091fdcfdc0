//! Lazy traversal of a directory's cluster chain.
//!
//! A directory is a chain of clusters, each holding a fixed number of 32-byte entry
//! slots. [`DirIter`] walks the chain through the first FAT and yields the entries in
//! on-disk order. It never reads more than one cluster's worth of slots per cluster,
//! and never follows a chain longer than the FAT itself.

use log::trace;

use super::dir_entry::{DirEntry, END_MARKER};
use super::fat::{FATVol, FREE_CLUSTER, is_end_of_chain};
use super::fat_error::FATError;
use super::geometry::DIR_ENTRY_SIZE;

/// Selects which entries a directory scan yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Live files and directories only: deleted entries, long-filename fragments and
    /// the volume label are skipped.
    Listing,
    /// Every slot up to the end marker of each cluster, deleted ones included.
    Matching,
}

/// Iterator over the entries of one directory.
///
/// Yields `Err` at most once, after which the iteration is over.
pub struct DirIter<'a, S> {
    vol: &'a FATVol<S>,
    mode: ScanMode,
    /// Cluster being scanned
    cluster: u32,
    /// Next slot to read in `cluster`
    slot: u32,
    /// Clusters visited so far
    hops: u64,
    done: bool,
}

impl<'a, S: AsRef<[u8]> + AsMut<[u8]>> DirIter<'a, S> {
    pub(super) fn new(vol: &'a FATVol<S>, first_cluster: u32, mode: ScanMode) -> Self {
        Self {
            vol,
            mode,
            cluster: first_cluster,
            slot: 0,
            hops: 0,
            done: false,
        }
    }

    /// Moves to the next cluster of the chain.
    fn advance_cluster(&mut self) -> Result<(), FATError> {
        let next = self.vol.next_cluster(self.cluster)?;
        trace!("Directory cluster {} -> {next}", self.cluster);

        self.hops += 1;
        if self.hops > self.vol.geometry().fat_entry_count() {
            return Err(FATError::ClusterChainLoop(next));
        }

        self.cluster = next;
        self.slot = 0;
        Ok(())
    }

    /// Reads the next occupied slot of the chain, whatever the mode.
    fn next_slot(&mut self) -> Result<Option<DirEntry>, FATError> {
        let per_cluster = self.vol.geometry().entries_per_cluster();

        loop {
            if self.cluster == FREE_CLUSTER || is_end_of_chain(self.cluster) {
                return Ok(None);
            }
            if self.slot >= per_cluster {
                self.advance_cluster()?;
                continue;
            }

            let offset = self.vol.cluster_to_offset(self.cluster)?
                + u64::from(self.slot) * DIR_ENTRY_SIZE;
            let buf = self.vol.image().slice(offset, DIR_ENTRY_SIZE)?;

            if buf[0] == END_MARKER {
                // Nothing else lives in this cluster.
                self.slot = per_cluster;
                continue;
            }

            self.slot += 1;
            return DirEntry::from_slice(buf, offset).map(Some);
        }
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> Iterator for DirIter<'_, S> {
    type Item = Result<DirEntry, FATError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.next_slot() {
                Ok(Some(entry)) => {
                    let skip = self.mode == ScanMode::Listing
                        && (entry.is_deleted() || entry.is_long_name() || entry.is_volume_label());
                    if !skip {
                        return Some(Ok(entry));
                    }
                }
                Ok(None) => self.done = true,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }

        None
    }
}
