//! Container Header
//!
//! The 64-byte record at offset 0. Field order (little-endian):
//!
//! ```text
//! 0  magic (8)          20 file_table_offset (4)
//! 8  version (1)        24 data_start_offset (4)
//! 9  flags (1)          28 next_free_offset (4)
//! 10 reserved0 (2)      32 free_entry_offset (4)
//! 12 file_count (2)     36 deleted_files (2)
//! 14 file_capacity (2)  38 reserved2 (26)
//! 16 file_entry_size (2)
//! 18 reserved1 (2)
//! ```

use bytes::{Buf, BufMut};

use crate::error::{Result, ZvfsError};

use super::{
    DATA_START_OFFSET, ENTRY_SIZE, FILE_CAPACITY, FILE_TABLE_OFFSET, FLAG_TABLE_FULL, HEADER_SIZE,
    MAGIC, VERSION,
};

/// Reserved tail after `deleted_files`
const RESERVED_TAIL: usize = 26;

/// Decoded container header
///
/// Reserved fields are not kept: they are written as zeros and ignored on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 8],
    pub version: u8,
    /// Bit 0 set when the entry table has no free slot
    pub flags: u8,
    /// Entries ever inserted (not decremented on remove)
    pub file_count: u16,
    pub file_capacity: u16,
    pub file_entry_size: u16,
    pub file_table_offset: u32,
    pub data_start_offset: u32,
    /// Bump pointer: next unused byte of the data region
    pub next_free_offset: u32,
    /// Offset of the next unclaimed slot, 0 once the table is full
    pub free_entry_offset: u32,
    /// Tombstoned entries
    pub deleted_files: u16,
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

impl Header {
    /// Header of an empty container
    pub fn new() -> Self {
        Self {
            magic: *MAGIC,
            version: VERSION,
            flags: 0,
            file_count: 0,
            file_capacity: FILE_CAPACITY as u16,
            file_entry_size: ENTRY_SIZE as u16,
            file_table_offset: FILE_TABLE_OFFSET,
            data_start_offset: DATA_START_OFFSET,
            next_free_offset: DATA_START_OFFSET,
            free_entry_offset: FILE_TABLE_OFFSET,
            deleted_files: 0,
        }
    }

    /// Encode to exactly 64 bytes, zeroing every reserved byte
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        let mut buf = &mut out[..];

        buf.put_slice(&self.magic);
        buf.put_u8(self.version);
        buf.put_u8(self.flags);
        buf.put_u16_le(0); // reserved0
        buf.put_u16_le(self.file_count);
        buf.put_u16_le(self.file_capacity);
        buf.put_u16_le(self.file_entry_size);
        buf.put_u16_le(0); // reserved1
        buf.put_u32_le(self.file_table_offset);
        buf.put_u32_le(self.data_start_offset);
        buf.put_u32_le(self.next_free_offset);
        buf.put_u32_le(self.free_entry_offset);
        buf.put_u16_le(self.deleted_files);
        buf.put_bytes(0, RESERVED_TAIL);

        out
    }

    /// Decode from the first 64 bytes of `bytes`
    ///
    /// Only the length is checked here; call `validate()` to check the
    /// magic and geometry.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(ZvfsError::InvalidFormat(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut buf = &bytes[..HEADER_SIZE];

        let mut magic = [0u8; 8];
        buf.copy_to_slice(&mut magic);
        let version = buf.get_u8();
        let flags = buf.get_u8();
        buf.advance(2); // reserved0
        let file_count = buf.get_u16_le();
        let file_capacity = buf.get_u16_le();
        let file_entry_size = buf.get_u16_le();
        buf.advance(2); // reserved1
        let file_table_offset = buf.get_u32_le();
        let data_start_offset = buf.get_u32_le();
        let next_free_offset = buf.get_u32_le();
        let free_entry_offset = buf.get_u32_le();
        let deleted_files = buf.get_u16_le();

        Ok(Self {
            magic,
            version,
            flags,
            file_count,
            file_capacity,
            file_entry_size,
            file_table_offset,
            data_start_offset,
            next_free_offset,
            free_entry_offset,
            deleted_files,
        })
    }

    /// Check that this header describes a container this crate can operate on
    pub fn validate(&self) -> Result<()> {
        if &self.magic != MAGIC {
            return Err(ZvfsError::InvalidFormat(format!(
                "Invalid magic: expected ZVFSDSK1, got {:?}",
                self.magic
            )));
        }

        if self.version != VERSION {
            return Err(ZvfsError::InvalidFormat(format!(
                "Unsupported version: {}",
                self.version
            )));
        }

        if self.file_capacity as usize != FILE_CAPACITY
            || self.file_entry_size as usize != ENTRY_SIZE
            || self.file_table_offset != FILE_TABLE_OFFSET
            || self.data_start_offset != DATA_START_OFFSET
        {
            return Err(ZvfsError::InvalidFormat(format!(
                "Unexpected geometry: {} slots of {} bytes at {}, data at {}",
                self.file_capacity,
                self.file_entry_size,
                self.file_table_offset,
                self.data_start_offset
            )));
        }

        if self.next_free_offset < self.data_start_offset {
            return Err(ZvfsError::InvalidFormat(format!(
                "Data cursor {} precedes data region start {}",
                self.next_free_offset, self.data_start_offset
            )));
        }

        let table_full = self.is_table_full() || self.free_entry_offset == 0;
        if !table_full {
            let relative = self
                .free_entry_offset
                .checked_sub(self.file_table_offset)
                .filter(|_| self.free_entry_offset < self.data_start_offset);
            match relative {
                Some(rel) if rel as usize % ENTRY_SIZE == 0 => {}
                _ => {
                    return Err(ZvfsError::InvalidFormat(format!(
                        "Entry cursor {} is not a slot boundary",
                        self.free_entry_offset
                    )))
                }
            }
        }

        Ok(())
    }

    /// True when flags bit 0 is set
    pub fn is_table_full(&self) -> bool {
        self.flags & FLAG_TABLE_FULL != 0
    }

    /// Mark the entry table as exhausted (sets the flag and the 0 sentinel)
    pub fn mark_table_full(&mut self) {
        self.flags |= FLAG_TABLE_FULL;
        self.free_entry_offset = 0;
    }

    /// Slots claimed so far, derived from the entry cursor
    pub fn claimed_slots(&self) -> usize {
        if self.is_table_full() || self.free_entry_offset == 0 {
            return self.file_capacity as usize;
        }
        (self.free_entry_offset.saturating_sub(self.file_table_offset) as usize) / ENTRY_SIZE
    }
}
