//! Layout Module
//!
//! Fixed-width on-disk records of a ZVFS container.
//!
//! ## Responsibilities
//! - Encode/decode the 64-byte header
//! - Encode/decode the 64-byte file entries
//! - Own the format constants every other module derives offsets from
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (64 bytes, offset 0)                             │
//! │   Magic "ZVFSDSK1" | Version | Flags | Counts | Cursors │
//! ├─────────────────────────────────────────────────────────┤
//! │ Entry Table (32 × 64 bytes, offset 64)                  │
//! │   [Name (32)][Start][Length][Type][Flag][Created]       │
//! │   ... one slot per stored file ...                      │
//! ├─────────────────────────────────────────────────────────┤
//! │ Data Region (offset 2112, grows by bump allocation)     │
//! │   file bytes, zero-padded to a 64-byte boundary         │
//! │   ... repeated for each stored file ...                 │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian.

mod entry;
mod header;

pub use entry::FileEntry;
pub use header::Header;

// =============================================================================
// Shared Constants (used by codec, table, allocator, engine)
// =============================================================================

/// Magic bytes identifying a ZVFS container
pub const MAGIC: &[u8; 8] = b"ZVFSDSK1";

/// Current container format version
pub const VERSION: u8 = 1;

/// Header size in bytes
pub const HEADER_SIZE: usize = 64;

/// File entry size in bytes
pub const ENTRY_SIZE: usize = 64;

/// Number of slots in the entry table
pub const FILE_CAPACITY: usize = 32;

/// Byte offset of the first entry slot
pub const FILE_TABLE_OFFSET: u32 = HEADER_SIZE as u32;

/// Byte offset where the data region begins: 64 + 32 × 64 = 2112
pub const DATA_START_OFFSET: u32 = FILE_TABLE_OFFSET + (FILE_CAPACITY * ENTRY_SIZE) as u32;

/// Data offsets are multiples of this
pub const ALIGNMENT: u64 = 64;

/// Upper bound of the 32-bit offset space (exclusive)
pub const MAX_OFFSET: u64 = 1 << 32;

/// Width of the NUL-padded name field
pub const NAME_FIELD_SIZE: usize = 32;

/// Longest name accepted on insert (one byte short of the field)
pub const MAX_NAME_LEN: usize = NAME_FIELD_SIZE - 1;

/// Header flag bit 0: no free entry slot left
pub const FLAG_TABLE_FULL: u8 = 0x01;

/// Entry flag value for a live file
pub const ENTRY_ACTIVE: u8 = 0;

/// Entry flag value for a tombstone
pub const ENTRY_DELETED: u8 = 1;

/// Entry type field, reserved and always 0
pub const ENTRY_TYPE_FILE: u8 = 0;

/// Byte offset of entry slot `index`
pub fn slot_offset(index: usize) -> u64 {
    FILE_TABLE_OFFSET as u64 + (index * ENTRY_SIZE) as u64
}
