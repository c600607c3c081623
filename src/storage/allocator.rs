//! Allocator
//!
//! Two monotonic cursors kept in the header:
//! - `free_entry_offset`: next unclaimed entry slot
//! - `next_free_offset`: bump pointer into the data region
//!
//! Claims only compute positions. The header is advanced by `commit()` once
//! the caller has written the data and the entry, so a failed write never
//! moves a persisted cursor past bytes that were never registered.

use crate::error::{Result, ZvfsError};
use crate::layout::{Header, ENTRY_SIZE, MAX_OFFSET};

use super::align_up;

/// A claimed entry slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotClaim {
    /// Table index of the slot
    pub index: usize,
    /// Byte offset of the slot in the container
    pub offset: u32,
}

/// A claimed range of the data region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataClaim {
    /// Aligned start offset
    pub start: u32,
    /// Exact payload length
    pub length: u32,
    /// Length rounded up to the alignment boundary
    pub padded_len: u32,
}

impl DataClaim {
    /// Zero bytes to write after the payload
    pub fn padding(&self) -> usize {
        (self.padded_len - self.length) as usize
    }

    /// Offset just past the padded range
    pub fn end(&self) -> u64 {
        self.start as u64 + self.padded_len as u64
    }
}

/// Claim the next entry slot
///
/// Fails with `TableFull` once the table-full flag (or the 0 sentinel) is set.
pub fn claim_slot(header: &Header) -> Result<SlotClaim> {
    if header.is_table_full() || header.free_entry_offset == 0 {
        return Err(ZvfsError::TableFull);
    }

    let offset = header.free_entry_offset;
    if offset < header.file_table_offset || offset >= header.data_start_offset {
        return Err(ZvfsError::InvalidFormat(format!(
            "Entry cursor {} outside the entry table",
            offset
        )));
    }

    let index = (offset - header.file_table_offset) as usize / ENTRY_SIZE;
    Ok(SlotClaim { index, offset })
}

/// Claim an aligned range for `length` payload bytes
///
/// Fails with `DataRegionFull` if the padded range would not fit the 32-bit
/// offset space.
pub fn claim_data(header: &Header, length: usize) -> Result<DataClaim> {
    let start = align_up(header.next_free_offset as u64);
    let padded_len = align_up(length as u64);

    // The cursor advances to start + padded_len, which must stay a valid u32.
    if start + padded_len >= MAX_OFFSET {
        return Err(ZvfsError::DataRegionFull {
            start,
            length: length as u64,
        });
    }

    Ok(DataClaim {
        start: start as u32,
        length: length as u32,
        padded_len: padded_len as u32,
    })
}

/// Advance both cursors past a completed insert
pub fn commit(header: &mut Header, slot: SlotClaim, data: DataClaim) {
    let next_entry = slot.offset + ENTRY_SIZE as u32;
    if next_entry >= header.data_start_offset {
        header.mark_table_full();
    } else {
        header.free_entry_offset = next_entry;
    }

    header.next_free_offset = data.end() as u32;
}
