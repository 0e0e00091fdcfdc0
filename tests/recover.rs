mod common;

use common::{
    EOC, NUM_FAT, TestImage, ambiguous_image, fat_entry, root_name_byte, root_slot_offset,
};
use fat_undelete::filesystem::recovery::sha1_digest;
use fat_undelete::filesystem::{RecoveryMode, ScanMode};
use fat_undelete::{DiskImage, FATError, FATVol};
use std::fs;

#[test]
fn recovery_reaches_the_image_file() {
    let mut image = TestImage::new();
    image
        .entry(b"\xE5ELLO   TXT", 0x20, 5, 100)
        .data(5, &[b'h'; 100]);
    let file = image.write_temp();

    let mut vol = FATVol::from_image(DiskImage::open(file.path(), true).unwrap(), false).unwrap();
    assert!(matches!(
        vol.recover("hello.txt", None, RecoveryMode::Contiguous),
        Err(FATError::FileNotFound)
    ));
    vol.recover("HELLO.TXT", None, RecoveryMode::Contiguous)
        .unwrap();
    vol.image().flush().unwrap();
    drop(vol);

    let bytes = fs::read(file.path()).unwrap();
    assert_eq!(root_name_byte(&bytes, 0), b'H');
    for fat_idx in 0..NUM_FAT {
        assert_eq!(fat_entry(&bytes, fat_idx, 5), EOC);
    }
}

#[test]
fn read_only_mapping_never_writes_back() {
    let mut image = TestImage::new();
    image.entry(b"\xE5ELLO   TXT", 0x20, 5, 10);
    let file = image.write_temp();

    let mut vol = FATVol::from_image(DiskImage::open(file.path(), false).unwrap(), false).unwrap();
    vol.recover("HELLO.TXT", None, RecoveryMode::Contiguous)
        .unwrap();
    assert_eq!(vol.list_root().unwrap().len(), 1);
    drop(vol);

    assert_eq!(fs::read(file.path()).unwrap(), image.bytes);
}

#[test]
fn ambiguous_recovery_by_digest() {
    let image = ambiguous_image();
    let file = image.write_temp();
    let mut vol = FATVol::from_image(DiskImage::open(file.path(), true).unwrap(), false).unwrap();

    assert!(matches!(
        vol.recover("TEST.TXT", None, RecoveryMode::Contiguous),
        Err(FATError::MultipleCandidates(2))
    ));

    let digest = sha1_digest(b"first");
    let recovered = vol
        .recover("TEST.TXT", Some(&digest), RecoveryMode::Contiguous)
        .unwrap();
    assert_eq!(recovered.entry().cluster_number(), 5);
    vol.image().flush().unwrap();
    drop(vol);

    let bytes = fs::read(file.path()).unwrap();
    assert_eq!(root_name_byte(&bytes, 0), b'T');
    assert_eq!(root_name_byte(&bytes, 1), 0xE5);
    assert_eq!(fat_entry(&bytes, 0, 5), EOC);
    assert_eq!(fat_entry(&bytes, 1, 5), EOC);
    assert_eq!(fat_entry(&bytes, 0, 6), 0);
}

#[test]
fn empty_file_recovery_leaves_the_fats_alone() {
    let mut image = TestImage::new();
    image.entry(b"\xE5MPTY   TXT", 0x20, 0, 0);
    let mut vol = FATVol::from_image(DiskImage::from_bytes(image.bytes.clone()), false).unwrap();

    let recovered = vol
        .recover("EMPTY.TXT", None, RecoveryMode::Contiguous)
        .unwrap();
    assert_eq!(recovered.cluster_cnt(), 0);

    let bytes = vol.into_image().into_inner();
    let mut expected = image.bytes.clone();
    expected[root_slot_offset(0)] = b'E';
    assert_eq!(bytes, expected);
}

#[test]
fn unknown_and_oversized_names_are_not_found() {
    let mut image = TestImage::new();
    image.entry(b"\xE5ELLO   TXT", 0x20, 5, 10);
    let mut vol = FATVol::from_image(DiskImage::from_bytes(image.bytes.clone()), false).unwrap();

    for name in ["VERYLONGNAME.TXT", "OTHER.TXT", "HELLO", ""] {
        assert!(matches!(
            vol.recover(name, None, RecoveryMode::Contiguous),
            Err(FATError::FileNotFound)
        ));
    }
    assert_eq!(vol.into_image().into_inner(), image.bytes);
}

#[test]
fn listing_after_recovery_shows_the_file() {
    let mut image = TestImage::new();
    image
        .entry(b"KEEP    TXT", 0x20, 3, 4)
        .entry(b"\xE5ONE    BIN", 0x20, 10, 1500);
    let mut vol = FATVol::from_image(DiskImage::from_bytes(image.bytes.clone()), false).unwrap();

    assert_eq!(vol.list_root().unwrap().len(), 1);
    vol.recover("GONE.BIN", None, RecoveryMode::Contiguous)
        .unwrap();

    let listed: Vec<String> = vol
        .list_root()
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        listed,
        vec![
            "KEEP.TXT (size = 4, starting cluster = 3)",
            "GONE.BIN (size = 1500, starting cluster = 10)",
        ]
    );
    assert_eq!(vol.list_clusters(10).unwrap(), vec![10, 11, 12]);
    assert_eq!(vol.root_entries(ScanMode::Matching).count(), 2);
}
