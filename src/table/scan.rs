//! Entry Table access
//!
//! Slot reads, writes and lazy sequential scans over an open container file.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::error::Result;
use crate::layout::{slot_offset, FileEntry, ENTRY_DELETED, ENTRY_SIZE, FILE_CAPACITY};
use crate::ZvfsError;

use super::{Slot, SlotState};

/// View over the entry table of an open container
///
/// Borrows the container's file handle for the duration of the view.
pub struct EntryTable<'a> {
    file: &'a mut File,
}

impl<'a> EntryTable<'a> {
    pub(crate) fn new(file: &'a mut File) -> Self {
        Self { file }
    }

    /// Read and decode the slot at `index`
    pub fn read_slot(&mut self, index: usize) -> Result<Slot> {
        check_index(index)?;
        let entry = read_entry(self.file, index)?;
        Ok(Slot { index, entry })
    }

    /// Encode and write `entry` into the slot at `index`
    pub fn write_slot(&mut self, index: usize, entry: &FileEntry) -> Result<()> {
        check_index(index)?;
        let bytes = entry.encode()?;
        self.file.seek(SeekFrom::Start(slot_offset(index)))?;
        self.file.write_all(&bytes)?;
        debug!(slot = index, name = %entry.name_lossy(), "wrote entry slot");
        Ok(())
    }

    /// Set the tombstone flag on `slot` and write it back
    pub fn tombstone(&mut self, slot: &mut Slot) -> Result<()> {
        slot.entry.flag = ENTRY_DELETED;
        self.write_slot(slot.index, &slot.entry)
    }

    /// Lazy scan over all slots in ascending index order
    ///
    /// Each call starts a fresh pass from slot 0.
    pub fn scan(&mut self) -> TableScan<'_> {
        TableScan {
            file: &mut *self.file,
            next_index: 0,
        }
    }

    /// First active slot whose name matches exactly
    pub fn find_active_by_name(&mut self, name: &[u8]) -> Result<Option<Slot>> {
        for slot in self.scan() {
            let slot = slot?;
            if slot.state() == SlotState::Active && slot.entry.name_matches(name) {
                return Ok(Some(slot));
            }
        }
        Ok(None)
    }

    /// True if an active slot holds `name`; tombstones never block a name
    pub fn is_name_taken(&mut self, name: &[u8]) -> Result<bool> {
        Ok(self.find_active_by_name(name)?.is_some())
    }

    /// Read every slot into memory
    pub fn slots(&mut self) -> Result<Vec<Slot>> {
        self.scan().collect()
    }
}

/// Iterator over entry table slots
pub struct TableScan<'a> {
    file: &'a mut File,
    next_index: usize,
}

impl<'a> Iterator for TableScan<'a> {
    type Item = Result<Slot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= FILE_CAPACITY {
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;

        Some(read_entry(self.file, index).map(|entry| Slot { index, entry }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = FILE_CAPACITY - self.next_index;
        (remaining, Some(remaining))
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

fn read_entry(file: &mut File, index: usize) -> Result<FileEntry> {
    let mut buf = [0u8; ENTRY_SIZE];
    file.seek(SeekFrom::Start(slot_offset(index)))?;
    file.read_exact(&mut buf)?;
    FileEntry::decode(&buf)
}

fn check_index(index: usize) -> Result<()> {
    if index >= FILE_CAPACITY {
        return Err(ZvfsError::InvalidFormat(format!(
            "Slot index {} out of range (capacity {})",
            index, FILE_CAPACITY
        )));
    }
    Ok(())
}
