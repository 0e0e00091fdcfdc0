//! Recovery of deleted files.
//!
//! A recovery runs in three steps on the root directory:
//! 1. every deleted entry whose short name matches the filename becomes a candidate,
//! 2. the candidates are narrowed down to exactly one, by SHA-1 of the content when a
//!    digest is supplied,
//! 3. the first name byte of the chosen entry is restored and a contiguous cluster
//!    chain is written into every FAT copy.

use getset::{CopyGetters, Getters};
use log::{debug, info};
use sha1::{Digest, Sha1};

use super::dir_entry::DirEntry;
use super::dir_iter::ScanMode;
use super::fat::{END_OF_CHAIN, FATVol};
use super::fat_error::FATError;
use super::geometry::FIRST_DATA_CLUSTER;
use super::short_name;

/// Maximum number of deleted entries that may share a name.
pub const MAX_CANDIDATES: usize = 100;

/// Raw SHA-1 digest of a file's content.
pub type Sha1Digest = [u8; 20];

/// How the clusters of the deleted file are assumed to be laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryMode {
    /// The file occupies consecutive clusters from its first cluster.
    Contiguous,
    /// The file may be fragmented. A digest is mandatory; the chain is still rebuilt
    /// contiguously.
    PossiblyNonContiguous,
}

/// Deleted entries matching a filename, in scan order.
#[derive(Debug, Default)]
pub struct Candidates {
    entries: Vec<DirEntry>,
}

impl Candidates {
    /// Appends a candidate.
    ///
    /// # Errors
    /// - `FATError::TooManyCandidates` once [`MAX_CANDIDATES`] entries are held
    fn push(&mut self, entry: DirEntry) -> Result<(), FATError> {
        if self.entries.len() == MAX_CANDIDATES {
            return Err(FATError::TooManyCandidates(MAX_CANDIDATES));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of a successful recovery.
#[derive(Debug, Getters, CopyGetters)]
pub struct Recovered {
    /// The directory entry as it was before the recovery
    #[getset(get = "pub")]
    entry: DirEntry,
    /// Number of clusters linked in the FAT
    #[getset(get_copy = "pub")]
    cluster_cnt: u32,
    /// Whether the entry was selected by its SHA-1
    #[getset(get_copy = "pub")]
    hash_verified: bool,
}

/// Computes the SHA-1 digest of `data`.
pub fn sha1_digest(data: &[u8]) -> Sha1Digest {
    let mut digest = Sha1Digest::default();
    digest.copy_from_slice(&Sha1::digest(data));
    digest
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> FATVol<S> {
    /// Collects the deleted files of the root directory whose short name matches `filename`.
    ///
    /// Directories and long-filename fragments are never candidates.
    ///
    /// # Errors
    /// - `FATError::TooManyCandidates` if more than [`MAX_CANDIDATES`] entries match
    /// - Any error raised while walking the root directory
    pub fn find_deleted(&self, filename: &str) -> Result<Candidates, FATError> {
        let mut candidates = Candidates::default();

        for entry in self.root_entries(ScanMode::Matching) {
            let entry = entry?;
            if entry.is_dir() || entry.is_long_name() {
                continue;
            }
            if short_name::matches_deleted(entry.name(), filename) {
                debug!(
                    "Candidate for {filename} at offset {} (cluster {}, {} bytes)",
                    entry.offset(),
                    entry.cluster_number(),
                    entry.file_size()
                );
                candidates.push(entry)?;
            }
        }

        Ok(candidates)
    }

    /// Computes the SHA-1 of the `file_size` bytes starting at the first cluster of `entry`.
    pub fn content_sha1(&self, entry: &DirEntry) -> Result<Sha1Digest, FATError> {
        let data = self.read_from_cluster(entry.cluster_number(), entry.file_size())?;
        Ok(sha1_digest(data))
    }

    /// Narrows the candidates down to the single entry to recover.
    ///
    /// # Parameters
    /// - `candidates`: Output of [`FATVol::find_deleted`]
    /// - `sha1`: Optional digest of the expected content
    ///
    /// # Errors
    /// - `FATError::FileNotFound` if there is no candidate, or none has the expected digest
    /// - `FATError::MultipleCandidates` if several candidates match and no digest is given
    pub fn resolve_candidate(
        &self,
        candidates: Candidates,
        sha1: Option<&Sha1Digest>,
    ) -> Result<DirEntry, FATError> {
        let Some(expected) = sha1 else {
            let mut entries = candidates.entries;
            return match entries.len() {
                0 => Err(FATError::FileNotFound),
                1 => Ok(entries.remove(0)),
                n => Err(FATError::MultipleCandidates(n)),
            };
        };

        for entry in candidates.entries {
            match self.content_sha1(&entry) {
                Ok(digest) if digest == *expected => return Ok(entry),
                Ok(digest) => debug!(
                    "Candidate at offset {} has SHA-1 {}",
                    entry.offset(),
                    hex::encode(digest)
                ),
                Err(err) => info!(
                    "Skipping candidate at offset {}: {err}",
                    entry.offset()
                ),
            }
        }

        Err(FATError::FileNotFound)
    }

    /// Restores a deleted entry and links its clusters.
    ///
    /// The first name byte of `entry` is set to `first_char`, then
    /// `ceil(file_size / cluster_size)` consecutive clusters starting at the entry's first
    /// cluster are chained in every FAT copy, the last one marked end-of-chain.
    ///
    /// The whole chain is checked against the FAT bounds before anything is written.
    ///
    /// # Returns
    /// - The number of clusters linked
    ///
    /// # Errors
    /// - `FATError::InvalidCluster` if the chain starts before the data region or does
    ///   not fit in the FAT
    pub fn rebuild_chain(&mut self, entry: &DirEntry, first_char: u8) -> Result<u32, FATError> {
        let start = entry.cluster_number();
        let cluster_cnt = self.geometry().clusters_for(entry.file_size());

        if cluster_cnt > 0 {
            if start < FIRST_DATA_CLUSTER {
                return Err(FATError::InvalidCluster(start));
            }
            let last = start
                .checked_add(cluster_cnt - 1)
                .ok_or(FATError::InvalidCluster(start))?;
            for fat_idx in 0..self.geometry().num_fat() {
                self.fat_entry_in(fat_idx, last)?;
            }
        }

        self.write_byte(entry.offset(), first_char)?;

        for k in 0..cluster_cnt {
            let cluster = start + k;
            let value = if k + 1 == cluster_cnt {
                END_OF_CHAIN
            } else {
                cluster + 1
            };
            self.set_fat_entry(cluster, value)?;
        }

        debug!("Linked {cluster_cnt} clusters from cluster {start}");
        Ok(cluster_cnt)
    }

    /// Recovers the deleted file `filename` from the root directory.
    ///
    /// # Parameters
    /// - `filename`: The 8.3 name of the file, e.g. `HELLO.TXT`; its first character
    ///   replaces the deleted marker
    /// - `sha1`: Optional digest of the file's content, mandatory for
    ///   [`RecoveryMode::PossiblyNonContiguous`]
    /// - `mode`: The assumed cluster layout
    ///
    /// # Errors
    /// - `FATError::HashRequired` if a possibly non-contiguous recovery has no digest
    /// - `FATError::FileNotFound`, `FATError::MultipleCandidates` or
    ///   `FATError::TooManyCandidates` if no single entry can be chosen; the image is
    ///   left untouched
    pub fn recover(
        &mut self,
        filename: &str,
        sha1: Option<&Sha1Digest>,
        mode: RecoveryMode,
    ) -> Result<Recovered, FATError> {
        if mode == RecoveryMode::PossiblyNonContiguous {
            if sha1.is_none() {
                return Err(FATError::HashRequired);
            }
            info!("Fragmented recovery is not supported, assuming {filename} is contiguous");
        }

        let Some(&first_char) = filename.as_bytes().first() else {
            return Err(FATError::FileNotFound);
        };

        let candidates = self.find_deleted(filename)?;
        info!("{} deleted entries match {filename}", candidates.len());

        let entry = self.resolve_candidate(candidates, sha1)?;
        let cluster_cnt = self.rebuild_chain(&entry, first_char)?;

        Ok(Recovered {
            entry,
            cluster_cnt,
            hash_verified: sha1.is_some(),
        })
    }
}
