//! Container handle
//!
//! An open container file plus the header read when it was opened.
//! The handle lives for one engine operation; dropping it closes the file
//! on every exit path.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::config::SyncStrategy;
use crate::error::Result;
use crate::layout::{FileEntry, Header, ENTRY_SIZE, FILE_CAPACITY, HEADER_SIZE};
use crate::table::EntryTable;
use crate::ZvfsError;

use super::allocator::{self, DataClaim};

/// Where an insert landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsertReceipt {
    /// Table index of the claimed slot
    pub slot: usize,
    /// Byte offset of the claimed slot
    pub entry_offset: u32,
    /// Aligned data offset
    pub start: u32,
    /// Bytes stored (unpadded)
    pub length: u32,
}

/// Open container file with its header
pub struct Container {
    path: PathBuf,
    file: File,
    header: Header,
    sync_strategy: SyncStrategy,
}

impl Container {
    /// Create a new empty container at `path`
    ///
    /// Fails with `AlreadyExists` if anything exists at `path`.
    pub fn create(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => {
                    ZvfsError::AlreadyExists(format!("container {}", path.display()))
                }
                _ => ZvfsError::Io(e),
            })?;

        let mut container = Self {
            path: path.to_path_buf(),
            file,
            header: Header::new(),
            sync_strategy,
        };

        if let Err(e) = container.write_empty_layout() {
            drop(container);
            let _ = std::fs::remove_file(path);
            return Err(e);
        }

        debug!(path = %path.display(), "created container");
        Ok(container)
    }

    /// Open an existing container for reading and writing
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        Self::open_with(path, sync_strategy, true)
    }

    /// Open an existing container for reading only
    pub fn open_read(path: &Path) -> Result<Self> {
        Self::open_with(path, SyncStrategy::Never, false)
    }

    fn open_with(path: &Path, sync_strategy: SyncStrategy, write: bool) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(write)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    ZvfsError::NotFound(format!("container {}", path.display()))
                }
                _ => ZvfsError::Io(e),
            })?;

        let mut buf = [0u8; HEADER_SIZE];
        file.read_exact(&mut buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => ZvfsError::InvalidFormat(format!(
                "{} is too short to hold a header",
                path.display()
            )),
            _ => ZvfsError::Io(e),
        })?;

        let header = Header::decode(&buf)?;
        header.validate()?;

        debug!(
            path = %path.display(),
            next_free_offset = header.next_free_offset,
            free_entry_offset = header.free_entry_offset,
            "opened container"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            header,
            sync_strategy,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Header as read at open, plus any in-memory updates not yet persisted
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Entry table view over this container's file
    pub fn table(&mut self) -> EntryTable<'_> {
        EntryTable::new(&mut self.file)
    }

    // =========================================================================
    // Data Region I/O
    // =========================================================================

    /// Read exactly `entry.length` bytes from `entry.start`
    pub fn read_data(&mut self, entry: &FileEntry) -> Result<Vec<u8>> {
        let mut data = vec![0u8; entry.length as usize];
        self.file.seek(SeekFrom::Start(entry.start as u64))?;
        self.file.read_exact(&mut data)?;
        Ok(data)
    }

    /// Write `data` at the claimed start, then zero padding to the boundary
    pub fn write_data(&mut self, claim: &DataClaim, data: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(claim.start as u64))?;
        self.file.write_all(data)?;
        if claim.padding() > 0 {
            self.file.write_all(&vec![0u8; claim.padding()])?;
        }
        debug!(start = claim.start, length = claim.length, "wrote data");
        Ok(())
    }

    // =========================================================================
    // Header I/O
    // =========================================================================

    /// Write the in-memory header to offset 0 and sync per strategy
    pub fn persist_header(&mut self) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&self.header.encode())?;
        if self.sync_strategy == SyncStrategy::EveryWrite {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Flush everything to disk regardless of strategy
    pub fn sync_all(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Store `data` under `name` with the given creation time
    ///
    /// Claims a slot and an aligned data range, writes data then entry, and
    /// only then advances and persists the header. Name validation and
    /// duplicate checks are the caller's job.
    pub fn append(&mut self, name: &[u8], data: &[u8], created: u64) -> Result<InsertReceipt> {
        let slot = allocator::claim_slot(&self.header)?;
        let claim = allocator::claim_data(&self.header, data.len())?;

        self.write_data(&claim, data)?;

        let entry = FileEntry::new(name, claim.start, claim.length, created);
        self.table().write_slot(slot.index, &entry)?;

        allocator::commit(&mut self.header, slot, claim);
        self.header.file_count = self.header.file_count.saturating_add(1);
        self.persist_header()?;

        Ok(InsertReceipt {
            slot: slot.index,
            entry_offset: slot.offset,
            start: claim.start,
            length: claim.length,
        })
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn write_empty_layout(&mut self) -> Result<()> {
        self.file.write_all(&self.header.encode())?;
        self.file.write_all(&[0u8; FILE_CAPACITY * ENTRY_SIZE])?;
        if self.sync_strategy == SyncStrategy::EveryWrite {
            self.file.sync_all()?;
        }
        Ok(())
    }
}
