//! Tests for compaction
//!
//! These tests verify:
//! - Tombstones are discarded and slots reassigned from scratch
//! - Surviving bytes, names and creation times are preserved
//! - Offsets are recomputed densely and stay aligned
//! - No-op when nothing is tombstoned
//! - The rebuild target never lingers
//! - Orphaned slots are neither counted nor carried over
//! - A failed compaction leaves the original untouched

use std::fs;

use tempfile::TempDir;
use zvfs::config::{Config, SyncStrategy};
use zvfs::engine::Engine;
use zvfs::layout::{FileEntry, DATA_START_OFFSET, ENTRY_SIZE, FILE_CAPACITY};
use zvfs::storage::Container;
use zvfs::ZvfsError;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .container_path(temp_dir.path().join("compact.zvfs"))
        .sync_strategy(SyncStrategy::Never)
        .build();
    let engine = Engine::new(config);
    engine.initialize().unwrap();
    (temp_dir, engine)
}

/// Write a claimed, zero-length entry into the next free slot
fn plant_orphan(engine: &Engine, name: &str) {
    let mut container = Container::open(engine.path(), SyncStrategy::Never).unwrap();
    let header = *container.header();
    let index = (header.free_entry_offset - header.file_table_offset) as usize / ENTRY_SIZE;

    let entry = FileEntry::new(name, header.next_free_offset, 0, 0);
    container.table().write_slot(index, &entry).unwrap();

    let header = container.header_mut();
    header.free_entry_offset += ENTRY_SIZE as u32;
    header.file_count += 1;
    container.persist_header().unwrap();
}

fn payload(i: usize) -> Vec<u8> {
    format!("file number {} ", i).repeat(i + 1).into_bytes()
}

// =============================================================================
// Compaction Tests
// =============================================================================

#[test]
fn test_compact_without_tombstones_is_noop() {
    let (_temp, engine) = setup_temp_engine();
    engine.insert("a", b"alpha").unwrap();
    engine.insert("b", b"beta").unwrap();
    let before = fs::read(engine.path()).unwrap();

    let report = engine.compact().unwrap();

    assert_eq!(report.tombstones_removed, 0);
    assert_eq!(report.bytes_freed, 0);
    assert_eq!(report.files_kept, 2);
    assert!(!report.rebuilt());
    assert_eq!(fs::read(engine.path()).unwrap(), before);
}

#[test]
fn test_compact_empty_container_is_noop() {
    let (_temp, engine) = setup_temp_engine();
    let report = engine.compact().unwrap();

    assert_eq!(report.files_kept, 0);
    assert_eq!(report.next_free_offset, DATA_START_OFFSET);
}

#[test]
fn test_compact_n_minus_m_survivors() {
    let (_temp, engine) = setup_temp_engine();
    let n = 10;
    for i in 0..n {
        engine.insert(&format!("f{}", i), &payload(i)).unwrap();
    }
    let removed = [1usize, 4, 5, 9];
    for i in removed {
        engine.remove(&format!("f{}", i)).unwrap();
    }

    let report = engine.compact().unwrap();

    assert_eq!(report.tombstones_removed, removed.len());
    assert_eq!(report.files_kept, n - removed.len());

    let stats = engine.stat().unwrap();
    assert_eq!(stats.deleted_files, 0);
    assert_eq!(stats.active_files, n - removed.len());
    assert_eq!(stats.file_count as usize, n - removed.len());
    assert_eq!(stats.free_entries, FILE_CAPACITY - (n - removed.len()));

    for i in 0..n {
        let name = format!("f{}", i);
        if removed.contains(&i) {
            assert!(matches!(engine.extract(&name), Err(ZvfsError::NotFound(_))));
        } else {
            assert_eq!(engine.extract(&name).unwrap(), payload(i));
        }
    }
}

#[test]
fn test_compact_reports_bytes_freed() {
    let (_temp, engine) = setup_temp_engine();
    engine.insert("keep", &[1u8; 10]).unwrap();
    engine.insert("drop1", &[2u8; 100]).unwrap();
    engine.insert("drop2", &[3u8; 7]).unwrap();
    engine.remove("drop1").unwrap();
    engine.remove("drop2").unwrap();

    let report = engine.compact().unwrap();

    assert_eq!(report.bytes_freed, 107);
    assert_eq!(report.next_free_offset, DATA_START_OFFSET + 64);
    assert_eq!(
        fs::metadata(engine.path()).unwrap().len(),
        DATA_START_OFFSET as u64 + 64
    );
}

#[test]
fn test_compact_reassigns_slots_and_offsets_in_order() {
    let (_temp, engine) = setup_temp_engine();
    engine.insert("a", &[b'a'; 10]).unwrap();
    engine.insert("b", &[b'b'; 100]).unwrap();
    engine.insert("c", &[b'c'; 5]).unwrap();
    engine.remove("b").unwrap();

    engine.compact().unwrap();

    let listing = engine.list().unwrap();
    let layout: Vec<(usize, &str, u32)> = listing
        .files
        .iter()
        .map(|f| (f.slot, f.name.as_str(), f.start))
        .collect();
    assert_eq!(
        layout,
        vec![(0, "a", DATA_START_OFFSET), (1, "c", DATA_START_OFFSET + 64)]
    );
    assert_eq!(listing.free_slots, FILE_CAPACITY - 2);
}

#[test]
fn test_compact_preserves_created_timestamps() {
    let (_temp, engine) = setup_temp_engine();
    engine.insert("old", b"x").unwrap();
    engine.insert("tmp", b"y").unwrap();
    engine.remove("tmp").unwrap();

    // Stamp a recognisable creation time directly into slot 0
    {
        let mut container = Container::open(engine.path(), SyncStrategy::Never).unwrap();
        let mut table = container.table();
        let mut slot = table.read_slot(0).unwrap();
        slot.entry.created = 1_234_567;
        table.write_slot(0, &slot.entry).unwrap();
    }

    engine.compact().unwrap();

    let listing = engine.list().unwrap();
    assert_eq!(listing.files.len(), 1);
    assert_eq!(listing.files[0].created, 1_234_567);
}

#[test]
fn test_compact_frees_slots_after_table_full() {
    let (_temp, engine) = setup_temp_engine();
    for i in 0..FILE_CAPACITY {
        engine.insert(&format!("f{:02}", i), b"data").unwrap();
    }
    engine.remove("f03").unwrap();
    engine.remove("f30").unwrap();
    assert!(matches!(engine.insert("new", b"x"), Err(ZvfsError::TableFull)));

    engine.compact().unwrap();

    engine.insert("new", b"x").unwrap();
    engine.insert("newer", b"y").unwrap();
    assert!(matches!(engine.insert("newest", b"z"), Err(ZvfsError::TableFull)));
    assert_eq!(engine.extract("f31").unwrap(), b"data");
}

#[test]
fn test_compact_all_removed() {
    let (_temp, engine) = setup_temp_engine();
    engine.insert("one", b"1").unwrap();
    engine.insert("two", b"2").unwrap();
    engine.remove("one").unwrap();
    engine.remove("two").unwrap();

    let report = engine.compact().unwrap();

    assert_eq!(report.files_kept, 0);
    assert_eq!(report.next_free_offset, DATA_START_OFFSET);
    assert_eq!(
        fs::read(engine.path()).unwrap().len(),
        DATA_START_OFFSET as usize
    );
    assert_eq!(engine.stat().unwrap().file_count, 0);
}

#[test]
fn test_compact_leaves_no_temporary() {
    let (_temp, engine) = setup_temp_engine();
    engine.insert("a", b"1").unwrap();
    engine.remove("a").unwrap();

    engine.compact().unwrap();

    assert!(engine.path().exists());
    assert!(!engine.compaction_path().exists());
}

#[test]
fn test_compact_replaces_stale_temporary() {
    let (_temp, engine) = setup_temp_engine();
    engine.insert("a", b"1").unwrap();
    engine.insert("b", b"2").unwrap();
    engine.remove("a").unwrap();
    fs::write(engine.compaction_path(), b"leftover from a crash").unwrap();

    let report = engine.compact().unwrap();

    assert_eq!(report.files_kept, 1);
    assert!(!engine.compaction_path().exists());
    assert_eq!(engine.extract("b").unwrap(), b"2");
}

#[test]
fn test_compaction_path_uses_configured_suffix() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .container_path(temp_dir.path().join("disk.zvfs"))
        .compaction_suffix(".rebuild")
        .build();

    assert_eq!(
        config.compaction_path(),
        temp_dir.path().join("disk.zvfs.rebuild")
    );
}

// =============================================================================
// Orphaned Slot Tests
// =============================================================================

#[test]
fn test_compact_ignores_orphan_without_tombstones() {
    let (_temp, engine) = setup_temp_engine();
    engine.insert("live", b"still here").unwrap();
    plant_orphan(&engine, "empty.txt");
    let before = fs::read(engine.path()).unwrap();

    let report = engine.compact().unwrap();

    assert_eq!(report.tombstones_removed, 0);
    assert_eq!(report.bytes_freed, 0);
    assert_eq!(report.files_kept, 1);
    assert!(!report.rebuilt());
    assert_eq!(fs::read(engine.path()).unwrap(), before);
}

#[test]
fn test_compact_drops_orphan_alongside_tombstones() {
    let (_temp, engine) = setup_temp_engine();
    engine.insert("keep", b"kept").unwrap();
    plant_orphan(&engine, "empty.txt");
    engine.insert("drop", b"dropped").unwrap();
    engine.remove("drop").unwrap();

    let report = engine.compact().unwrap();

    assert_eq!(report.tombstones_removed, 1);
    assert_eq!(report.bytes_freed, 7);
    assert_eq!(report.files_kept, 1);

    let listing = engine.list().unwrap();
    assert_eq!(listing.files.len(), 1);
    assert_eq!(listing.files[0].name, "keep");
    assert_eq!(listing.free_slots, FILE_CAPACITY - 1);
}

// =============================================================================
// Failure Safety Tests
// =============================================================================

#[test]
fn test_compact_failure_leaves_original_intact() {
    let (_temp, engine) = setup_temp_engine();
    engine.insert("a", b"alpha").unwrap();
    engine.insert("b", b"beta").unwrap();
    engine.remove("a").unwrap();
    let before = fs::read(engine.path()).unwrap();

    // A directory at the rebuild target cannot be cleared or written over
    fs::create_dir(engine.compaction_path()).unwrap();

    assert!(engine.compact().is_err());

    assert_eq!(fs::read(engine.path()).unwrap(), before);
    assert!(engine.compaction_path().is_dir());
    assert_eq!(engine.extract("b").unwrap(), b"beta");
    assert_eq!(engine.stat().unwrap().deleted_files, 1);
}

#[test]
fn test_compact_rejects_empty_suffix() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .container_path(temp_dir.path().join("disk.zvfs"))
        .sync_strategy(SyncStrategy::Never)
        .compaction_suffix("")
        .build();
    let engine = Engine::new(config);
    engine.initialize().unwrap();
    engine.insert("a", b"1").unwrap();
    engine.insert("b", b"2").unwrap();
    engine.remove("a").unwrap();
    let before = fs::read(engine.path()).unwrap();

    let result = engine.compact();

    assert!(matches!(result, Err(ZvfsError::Config(_))));
    assert_eq!(fs::read(engine.path()).unwrap(), before);
    assert_eq!(engine.extract("b").unwrap(), b"2");
}

#[test]
fn test_config_validate_rejects_aliased_target() {
    let temp_dir = TempDir::new().unwrap();
    let aliased = Config::builder()
        .container_path(temp_dir.path().join("disk.zvfs"))
        .compaction_suffix("")
        .build();
    assert!(matches!(aliased.validate(), Err(ZvfsError::Config(_))));

    let config = Config::builder()
        .container_path(temp_dir.path().join("disk.zvfs"))
        .build();
    assert!(config.validate().is_ok());
}
