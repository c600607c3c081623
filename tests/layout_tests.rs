//! Tests for the layout codec
//!
//! These tests verify:
//! - Header and entry records are exactly 64 bytes
//! - Field offsets and little-endian encoding
//! - Reserved bytes are zeroed
//! - Name truncation and length limits
//! - Header validation

use zvfs::layout::{
    FileEntry, Header, DATA_START_OFFSET, ENTRY_DELETED, ENTRY_SIZE, FILE_TABLE_OFFSET,
    FLAG_TABLE_FULL, HEADER_SIZE, MAGIC,
};
use zvfs::ZvfsError;

// =============================================================================
// Helper Functions
// =============================================================================

fn populated_header() -> Header {
    let mut header = Header::new();
    header.flags = FLAG_TABLE_FULL;
    header.file_count = 7;
    header.next_free_offset = 9_000_064;
    header.free_entry_offset = 0;
    header.deleted_files = 3;
    header
}

// =============================================================================
// Header Tests
// =============================================================================

#[test]
fn test_header_defaults() {
    let header = Header::new();

    assert_eq!(&header.magic, MAGIC);
    assert_eq!(header.version, 1);
    assert_eq!(header.flags, 0);
    assert_eq!(header.file_count, 0);
    assert_eq!(header.file_capacity, 32);
    assert_eq!(header.file_entry_size, 64);
    assert_eq!(header.file_table_offset, 64);
    assert_eq!(header.data_start_offset, 2112);
    assert_eq!(header.next_free_offset, DATA_START_OFFSET);
    assert_eq!(header.free_entry_offset, FILE_TABLE_OFFSET);
    assert_eq!(header.deleted_files, 0);
}

#[test]
fn test_header_geometry_invariant() {
    let header = Header::new();
    let table_end =
        header.file_table_offset + header.file_capacity as u32 * header.file_entry_size as u32;
    assert_eq!(table_end, header.data_start_offset);
}

#[test]
fn test_header_encode_field_offsets() {
    let bytes = populated_header().encode();

    assert_eq!(bytes.len(), HEADER_SIZE);
    assert_eq!(&bytes[0..8], b"ZVFSDSK1");
    assert_eq!(bytes[8], 1); // version
    assert_eq!(bytes[9], FLAG_TABLE_FULL);
    assert_eq!(&bytes[10..12], &[0, 0]); // reserved0
    assert_eq!(&bytes[12..14], &7u16.to_le_bytes());
    assert_eq!(&bytes[14..16], &32u16.to_le_bytes());
    assert_eq!(&bytes[16..18], &64u16.to_le_bytes());
    assert_eq!(&bytes[18..20], &[0, 0]); // reserved1
    assert_eq!(&bytes[20..24], &64u32.to_le_bytes());
    assert_eq!(&bytes[24..28], &2112u32.to_le_bytes());
    assert_eq!(&bytes[28..32], &9_000_064u32.to_le_bytes());
    assert_eq!(&bytes[32..36], &0u32.to_le_bytes());
    assert_eq!(&bytes[36..38], &3u16.to_le_bytes());
    assert!(bytes[38..].iter().all(|&b| b == 0));
}

#[test]
fn test_header_round_trip() {
    for header in [Header::new(), populated_header()] {
        let decoded = Header::decode(&header.encode()).unwrap();
        assert_eq!(decoded, header);
    }
}

#[test]
fn test_header_decode_ignores_reserved_bytes() {
    let mut bytes = Header::new().encode();
    bytes[10] = 0xFF;
    bytes[63] = 0xFF;

    let decoded = Header::decode(&bytes).unwrap();
    assert_eq!(decoded, Header::new());
    assert_eq!(decoded.encode(), Header::new().encode());
}

#[test]
fn test_header_decode_too_short() {
    let result = Header::decode(&[0u8; 63]);
    assert!(matches!(result, Err(ZvfsError::InvalidFormat(_))));
}

#[test]
fn test_header_validate_accepts_default_and_full() {
    Header::new().validate().unwrap();
    populated_header().validate().unwrap();
}

#[test]
fn test_header_validate_rejects_bad_magic() {
    let mut header = Header::new();
    header.magic = *b"NOTZVFS!";
    assert!(matches!(header.validate(), Err(ZvfsError::InvalidFormat(_))));
}

#[test]
fn test_header_validate_rejects_bad_version() {
    let mut header = Header::new();
    header.version = 2;
    assert!(matches!(header.validate(), Err(ZvfsError::InvalidFormat(_))));
}

#[test]
fn test_header_validate_rejects_misaligned_entry_cursor() {
    let mut header = Header::new();
    header.free_entry_offset = 100;
    assert!(matches!(header.validate(), Err(ZvfsError::InvalidFormat(_))));
}

#[test]
fn test_header_table_full_helpers() {
    let mut header = Header::new();
    assert!(!header.is_table_full());
    assert_eq!(header.claimed_slots(), 0);

    header.free_entry_offset = FILE_TABLE_OFFSET + 5 * 64;
    assert_eq!(header.claimed_slots(), 5);

    header.mark_table_full();
    assert!(header.is_table_full());
    assert_eq!(header.free_entry_offset, 0);
    assert_eq!(header.claimed_slots(), 32);
}

// =============================================================================
// FileEntry Tests
// =============================================================================

#[test]
fn test_entry_encode_field_offsets() {
    let mut entry = FileEntry::new("notes.txt", 2176, 1000, 1_700_000_000);
    entry.flag = ENTRY_DELETED;
    let bytes = entry.encode().unwrap();

    assert_eq!(bytes.len(), ENTRY_SIZE);
    assert_eq!(&bytes[0..9], b"notes.txt");
    assert!(bytes[9..32].iter().all(|&b| b == 0));
    assert_eq!(&bytes[32..36], &2176u32.to_le_bytes());
    assert_eq!(&bytes[36..40], &1000u32.to_le_bytes());
    assert_eq!(bytes[40], 0); // type
    assert_eq!(bytes[41], ENTRY_DELETED);
    assert_eq!(&bytes[42..44], &[0, 0]);
    assert_eq!(&bytes[44..52], &1_700_000_000u64.to_le_bytes());
    assert!(bytes[52..].iter().all(|&b| b == 0));
}

#[test]
fn test_entry_round_trip() {
    let entries = [
        FileEntry::default(),
        FileEntry::new("a", 2112, 1, 0),
        FileEntry::new(vec![0xFFu8, 0xFE, b'x'], 4096, u32::MAX, u64::MAX),
        FileEntry::new(vec![b'z'; 32], 2112, 64, 42),
    ];

    for entry in entries {
        let decoded = FileEntry::decode(&entry.encode().unwrap()).unwrap();
        assert_eq!(decoded, entry);
    }
}

#[test]
fn test_entry_name_too_long() {
    let entry = FileEntry::new(vec![b'n'; 33], 2112, 1, 0);
    let result = entry.encode();
    assert!(matches!(result, Err(ZvfsError::NameTooLong(33))));
}

#[test]
fn test_entry_decode_trims_at_first_nul() {
    let mut bytes = FileEntry::new("abc", 2112, 5, 0).encode().unwrap();
    bytes[4..7].copy_from_slice(b"xyz"); // garbage after the terminator

    let entry = FileEntry::decode(&bytes).unwrap();
    assert_eq!(entry.name, b"abc");
}

#[test]
fn test_entry_decode_too_short() {
    let result = FileEntry::decode(&[0u8; 10]);
    assert!(matches!(result, Err(ZvfsError::InvalidFormat(_))));
}

#[test]
fn test_entry_predicates() {
    let unused = FileEntry::default();
    assert!(unused.is_unused());
    assert!(!unused.is_live());

    let live = FileEntry::new("x", 2112, 3, 0);
    assert!(live.is_live());
    assert!(live.name_matches(b"x"));
    assert!(!live.name_matches(b"X"));

    let mut dead = live.clone();
    dead.flag = ENTRY_DELETED;
    assert!(dead.is_tombstoned());
    assert!(!dead.is_live());
    assert!(!dead.is_unused());

    let mut nameless = FileEntry::default();
    nameless.flag = ENTRY_DELETED;
    assert!(!nameless.is_tombstoned());
}
