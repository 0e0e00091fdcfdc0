//! Matching of user filenames against the 8.3 names of deleted entries.
//!
//! Deleting a file overwrites the first byte of its short name with
//! [`DELETED_MARKER`], so that byte is gone for good. A deleted entry therefore matches
//! a filename when everything but the first character agrees.

use super::dir_entry::DELETED_MARKER;

const BASE_LEN: usize = 8;
const EXT_LEN: usize = 3;

/// Longest filename that fits an 8.3 name: 8 + `.` + 3.
pub const MAX_NAME_LEN: usize = BASE_LEN + 1 + EXT_LEN;

/// Checks whether the raw short name of a deleted entry matches `filename`.
///
/// # Parameters
/// - `raw`: The 11-byte name field of the entry
/// - `filename`: The name typed by the user, e.g. `HELLO.TXT`
///
/// # Returns
/// - `true` if `raw` carries the deleted marker and every byte of `filename` past the
///   first equals the corresponding short-name byte, the rest being space padding.
/// - `false` otherwise. Comparison is case-sensitive; a base longer than 8 bytes or an
///   extension longer than 3 bytes never matches.
///
/// The first byte of `raw` is only compared to the deleted marker, never to `filename`.
pub fn matches_deleted(raw: &[u8; 11], filename: &str) -> bool {
    if raw[0] != DELETED_MARKER {
        return false;
    }

    let Some((base, ext)) = split_name(filename) else {
        return false;
    };

    padded_eq(&raw[1..BASE_LEN], &base[1..]) && padded_eq(&raw[BASE_LEN..], ext)
}

/// Splits a filename at its first `.` into base and extension.
///
/// Returns `None` when the parts can't fit an 8.3 name.
fn split_name(filename: &str) -> Option<(&[u8], &[u8])> {
    let bytes = filename.as_bytes();
    if bytes.len() > MAX_NAME_LEN {
        return None;
    }

    let (base, ext) = match bytes.iter().position(|&b| b == b'.') {
        Some(dot) => (&bytes[..dot], &bytes[dot + 1..]),
        None => (bytes, &bytes[bytes.len()..]),
    };

    if base.is_empty() || base.len() > BASE_LEN || ext.len() > EXT_LEN {
        return None;
    }

    Some((base, ext))
}

/// `field` starts with `wanted` and is space-padded after it.
fn padded_eq(field: &[u8], wanted: &[u8]) -> bool {
    field.len() >= wanted.len()
        && field.starts_with(wanted)
        && field[wanted.len()..].iter().all(|&b| b == b' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deleted(name: &[u8; 11]) -> [u8; 11] {
        let mut raw = *name;
        raw[0] = DELETED_MARKER;
        raw
    }

    #[test]
    fn base_and_extension_match() {
        let raw = deleted(b"HELLO   TXT");
        assert!(matches_deleted(&raw, "HELLO.TXT"));
        // The first character is lost, anything goes.
        assert!(matches_deleted(&raw, "JELLO.TXT"));
    }

    #[test]
    fn only_deleted_entries_match() {
        assert!(!matches_deleted(b"HELLO   TXT", "HELLO.TXT"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let raw = deleted(b"HELLO   TXT");
        assert!(!matches_deleted(&raw, "hello.txt"));
        assert!(!matches_deleted(&raw, "HELLO.txt"));
    }

    #[test]
    fn matching_is_length_exact() {
        let raw = deleted(b"HELLO   TXT");
        assert!(!matches_deleted(&raw, "HELL.TXT"));
        assert!(!matches_deleted(&raw, "HELLOO.TXT"));
        assert!(!matches_deleted(&raw, "HELLO.TX"));
        assert!(!matches_deleted(&raw, "HELLO"));
        assert!(!matches_deleted(&raw, "HELLO.TXTX"));
    }

    #[test]
    fn full_width_base() {
        let raw = deleted(b"ABCDEFGHTXT");
        assert!(matches_deleted(&raw, "ABCDEFGH.TXT"));
        assert!(!matches_deleted(&raw, "ABCDEFGHTXT"));
        assert!(!matches_deleted(&raw, "ABCDEFGHI.TXT"));
    }

    #[test]
    fn oversized_names_never_match() {
        let raw = deleted(b"ABCDEFGHIJK");
        assert!(!matches_deleted(&raw, "ABCDEFGHIJK"));
        assert!(!matches_deleted(&raw, "ABCDEFGH.IJKL"));
        assert!(!matches_deleted(&raw, "ABCDEFGHIJKLMNOP.TXT"));
    }

    #[test]
    fn names_without_extension() {
        let raw = deleted(b"README     ");
        assert!(matches_deleted(&raw, "README"));
        assert!(matches_deleted(&raw, "README."));
        assert!(!matches_deleted(&raw, "README.MD"));
        assert!(!matches_deleted(&deleted(b"README  MD "), "README"));
    }

    #[test]
    fn single_character_name() {
        assert!(matches_deleted(&deleted(b"A          "), "A"));
        assert!(matches_deleted(&deleted(b"Z          "), "A"));
        assert!(!matches_deleted(&deleted(b"A       TXT"), "A"));
        assert!(!matches_deleted(&deleted(b"AB         "), "A"));
        assert!(matches_deleted(&deleted(b"A       TXT"), "A.TXT"));
    }

    #[test]
    fn empty_base_never_matches() {
        let raw = deleted(b"           ");
        assert!(!matches_deleted(&raw, ""));
        assert!(!matches_deleted(&raw, ".TXT"));
    }

    #[test]
    fn erased_byte_is_never_compared() {
        // Whatever the user puts first, only positions 1.. decide.
        for first in b'!'..=b'~' {
            if first == b'.' {
                continue;
            }
            let name = format!("{}ELLO.TXT", first as char);
            assert!(matches_deleted(&deleted(b"HELLO   TXT"), &name));
        }
    }
}
