//! Response definitions
//!
//! Structured results handed back to callers. Rendering is up to them.

use serde::Serialize;

use crate::storage::InsertReceipt;

/// One active entry as reported by `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedFile {
    /// Table index (listing order)
    pub slot: usize,
    /// Name, with invalid UTF-8 replaced
    pub name: String,
    /// Bytes stored
    pub length: u32,
    /// Unix seconds at insertion
    pub created: u64,
    /// Data offset
    pub start: u32,
}

/// Result of `list`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    /// Active entries in ascending slot order
    pub files: Vec<ListedFile>,
    /// Slots never claimed (tombstones are not free)
    pub free_slots: usize,
    /// Total slots in the table
    pub capacity: usize,
}

/// Result of `stat`
///
/// `file_count` and `deleted_files` are the header counters; the rest come
/// from a fresh table scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    pub file_count: u16,
    pub deleted_files: u16,
    pub active_files: usize,
    pub free_entries: usize,
    pub total_active_bytes: u64,
    pub next_free_offset: u32,
}

/// Result of `compact`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompactionReport {
    /// Tombstoned entries discarded (0 means nothing was rebuilt)
    pub tombstones_removed: usize,
    /// Unpadded bytes of the discarded entries
    pub bytes_freed: u64,
    /// Active entries carried into the rebuilt container
    pub files_kept: usize,
    /// Data cursor of the resulting container
    pub next_free_offset: u32,
}

impl CompactionReport {
    /// True when the container was rebuilt
    pub fn rebuilt(&self) -> bool {
        self.tombstones_removed > 0
    }
}

/// A response to a `Command`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum Response {
    Initialized,
    Inserted(InsertReceipt),
    Data(Vec<u8>),
    Removed,
    Listing(Listing),
    Stats(ContainerStats),
    Compacted(CompactionReport),
}
