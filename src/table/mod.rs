//! Entry Table Module
//!
//! The 32 fixed 64-byte slots following the header.
//!
//! ## Responsibilities
//! - Classify each slot as Unused, Active, Tombstoned or Orphaned
//! - Lazy ascending scans read straight from the container
//! - Name lookups over active slots
//! - Slot writes and tombstoning
//!
//! ## Slot Lifecycle
//! ```text
//! Unused ──insert──▶ Active ──remove──▶ Tombstoned
//!    ▲                  │                    │
//!    └─────────────── compact ◀──────────────┘
//! ```
//! Slots are claimed in ascending order, so scan order is insertion order.
//! A claimed slot that fits none of the three lifecycle states (a zero-length
//! entry, an unknown flag) is `Orphaned`: never listed, never counted as a
//! tombstone, and dropped when compaction rebuilds the table.

mod scan;

pub use scan::{EntryTable, TableScan};

use crate::layout::FileEntry;

/// Liveness of one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Never claimed (name empty, flag clear)
    Unused,

    /// Holds a retrievable file
    Active,

    /// Deleted; name and data offset retained until compaction
    Tombstoned,

    /// Claimed but neither retrievable nor deleted
    Orphaned,
}

impl SlotState {
    /// Classify a decoded entry
    pub fn of(entry: &FileEntry) -> Self {
        if entry.is_unused() {
            SlotState::Unused
        } else if entry.is_live() {
            SlotState::Active
        } else if entry.is_tombstoned() {
            SlotState::Tombstoned
        } else {
            SlotState::Orphaned
        }
    }
}

/// A decoded slot with its table position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Position in the table (0..32)
    pub index: usize,
    pub entry: FileEntry,
}

impl Slot {
    pub fn state(&self) -> SlotState {
        SlotState::of(&self.entry)
    }

    /// Byte offset of this slot in the container
    pub fn offset(&self) -> u64 {
        crate::layout::slot_offset(self.index)
    }
}
