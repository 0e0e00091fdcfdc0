//! In-memory FAT32 images for unit tests.

pub(crate) const BYTES_PER_SEC: usize = 512;
pub(crate) const RSVD_SEC_CNT: usize = 32;
pub(crate) const NUM_FAT: usize = 2;
pub(crate) const FAT_SZ: usize = 1;
pub(crate) const DATA_CLUSTERS: usize = 64;

const ROOT_CLUS: u32 = 2;
const EOC: u32 = 0x0FFF_FFFF;

/// Encodes a 32-byte short directory entry.
pub(crate) fn raw_entry(name: &[u8; 11], attr: u8, cluster: u32, size: u32) -> [u8; 32] {
    let mut buf = [0u8; 32];
    buf[..11].copy_from_slice(name);
    buf[11] = attr;
    buf[20..22].copy_from_slice(&((cluster >> 16) as u16).to_le_bytes());
    buf[26..28].copy_from_slice(&(cluster as u16).to_le_bytes());
    buf[28..32].copy_from_slice(&size.to_le_bytes());
    buf
}

/// Builds a small FAT32-shaped image: 512-byte sectors, 32 reserved sectors, two
/// one-sector FATs and 64 data clusters, root directory at cluster 2.
pub(crate) struct ImageBuilder {
    buf: Vec<u8>,
    sec_per_clus: usize,
    root_chain: Vec<u32>,
    next_slot: usize,
}

impl ImageBuilder {
    pub(crate) fn new() -> Self {
        Self::with_sec_per_clus(1)
    }

    pub(crate) fn with_sec_per_clus(sec_per_clus: u8) -> Self {
        let spc = usize::from(sec_per_clus);
        let tot_sec = RSVD_SEC_CNT + NUM_FAT * FAT_SZ + DATA_CLUSTERS * spc;
        let mut builder = Self {
            buf: vec![0; tot_sec * BYTES_PER_SEC],
            sec_per_clus: spc,
            root_chain: vec![],
            next_slot: 0,
        };

        let b = &mut builder.buf;
        b[0..3].copy_from_slice(&[0xEB, 0x58, 0x90]);
        b[3..11].copy_from_slice(b"MSWIN4.1");
        b[11..13].copy_from_slice(&(BYTES_PER_SEC as u16).to_le_bytes());
        b[13] = sec_per_clus;
        b[14..16].copy_from_slice(&(RSVD_SEC_CNT as u16).to_le_bytes());
        b[16] = NUM_FAT as u8;
        b[21] = 0xF8;
        b[32..36].copy_from_slice(&(tot_sec as u32).to_le_bytes());
        b[36..40].copy_from_slice(&(FAT_SZ as u32).to_le_bytes());
        b[44..48].copy_from_slice(&ROOT_CLUS.to_le_bytes());
        b[66] = 0x29;
        b[71..82].copy_from_slice(b"NO NAME    ");
        b[82..90].copy_from_slice(b"FAT32   ");
        b[510] = 0x55;
        b[511] = 0xAA;

        builder.set_fat(0, 0x0FFF_FFF8).set_fat(1, EOC);
        builder.root_chain(&[ROOT_CLUS]);
        builder
    }

    pub(crate) fn boot_u8(&mut self, offset: usize, value: u8) -> &mut Self {
        self.buf[offset] = value;
        self
    }

    pub(crate) fn boot_u16(&mut self, offset: usize, value: u16) -> &mut Self {
        self.buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        self
    }

    pub(crate) fn cluster_offset(&self, cluster: u32) -> usize {
        let data_start = (RSVD_SEC_CNT + NUM_FAT * FAT_SZ) * BYTES_PER_SEC;
        data_start + (cluster as usize - 2) * self.sec_per_clus * BYTES_PER_SEC
    }

    /// Sets the entry of `cluster` in every FAT copy.
    pub(crate) fn set_fat(&mut self, cluster: u32, value: u32) -> &mut Self {
        for i in 0..NUM_FAT {
            let off = (RSVD_SEC_CNT + i * FAT_SZ) * BYTES_PER_SEC + cluster as usize * 4;
            self.buf[off..off + 4].copy_from_slice(&value.to_le_bytes());
        }
        self
    }

    /// Links the root directory over `chain`.
    pub(crate) fn root_chain(&mut self, chain: &[u32]) -> &mut Self {
        for pair in chain.windows(2) {
            self.set_fat(pair[0], pair[1]);
        }
        if let Some(&last) = chain.last() {
            self.set_fat(last, EOC);
        }
        self.root_chain = chain.to_vec();
        self
    }

    /// Writes an entry in the next free slot of the root directory chain.
    pub(crate) fn entry(&mut self, name: &[u8; 11], attr: u8, cluster: u32, size: u32) -> &mut Self {
        let per_cluster = self.sec_per_clus * BYTES_PER_SEC / 32;
        let dir_cluster = self.root_chain[self.next_slot / per_cluster];
        let slot = self.next_slot % per_cluster;
        self.next_slot += 1;
        self.entry_at(dir_cluster, slot, name, attr, cluster, size)
    }

    /// Writes an entry in a given slot of a given cluster.
    pub(crate) fn entry_at(
        &mut self,
        dir_cluster: u32,
        slot: usize,
        name: &[u8; 11],
        attr: u8,
        cluster: u32,
        size: u32,
    ) -> &mut Self {
        let off = self.cluster_offset(dir_cluster) + slot * 32;
        self.buf[off..off + 32].copy_from_slice(&raw_entry(name, attr, cluster, size));
        self
    }

    /// Writes file content at the start of `cluster`.
    pub(crate) fn data(&mut self, cluster: u32, bytes: &[u8]) -> &mut Self {
        let off = self.cluster_offset(cluster);
        self.buf[off..off + bytes.len()].copy_from_slice(bytes);
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        self.buf.clone()
    }
}
