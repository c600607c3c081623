//! Engine Module
//!
//! The storage engine that runs every container operation.
//!
//! ## Responsibilities
//! - Validate names and payloads before touching the container
//! - Coordinate entry table, allocator and container I/O
//! - Build and swap in a compacted container
//!
//! ## Operation Lifecycle
//! Each call opens the container, reads the header fresh, does its scans and
//! writes, persists the header last, and drops the handle. Nothing is cached
//! between calls: the header on disk is the only source of truth.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info, warn};

use crate::config::{Config, SyncStrategy};
use crate::error::Result;
use crate::layout::{FileEntry, FILE_CAPACITY, MAX_NAME_LEN};
use crate::protocol::{
    Command, CompactionReport, ContainerStats, ListedFile, Listing, Response,
};
use crate::storage::{Container, InsertReceipt};
use crate::table::SlotState;
use crate::ZvfsError;

/// The main storage engine
///
/// ## Concurrency Model
/// Single writer, no internal locking. Two processes mutating the same
/// container can lose cursor updates; serialize access externally.
pub struct Engine {
    /// Engine configuration
    config: Config,
}

/// An active entry carried through compaction
struct Survivor {
    entry: FileEntry,
    data: Vec<u8>,
}

impl Engine {
    /// Create an engine for the container named in `config`
    ///
    /// Does not touch the filesystem; call `initialize()` to create a new
    /// container.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified container path
    pub fn open_path(path: &Path) -> Self {
        let config = Config::builder().container_path(path).build();
        Self::new(config)
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Response> {
        debug!(
            command = command.command_type().as_str(),
            mutation = command.is_mutation(),
            "executing"
        );

        match command {
            Command::Initialize => {
                self.initialize()?;
                Ok(Response::Initialized)
            }
            Command::Insert { name, data } => self.insert(&name, &data).map(Response::Inserted),
            Command::Extract { name } => self.extract(&name).map(Response::Data),
            Command::Remove { name } => {
                self.remove(&name)?;
                Ok(Response::Removed)
            }
            Command::List => self.list().map(Response::Listing),
            Command::Stat => self.stat().map(Response::Stats),
            Command::ReadContents { name } => self.read_contents(&name).map(Response::Data),
            Command::Compact => self.compact().map(Response::Compacted),
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create an empty container
    ///
    /// Fails with `AlreadyExists` if the path exists.
    pub fn initialize(&self) -> Result<()> {
        let _container = Container::create(self.path(), self.config.sync_strategy)?;
        info!(path = %self.path().display(), "initialized container");
        Ok(())
    }

    /// Store `data` under `name`
    ///
    /// Steps:
    /// 1. Validate name and payload
    /// 2. Reject names held by an active entry
    /// 3. Claim slot and data range, write data then entry
    /// 4. Advance cursors and persist the header
    pub fn insert(&self, name: &str, data: &[u8]) -> Result<InsertReceipt> {
        validate_name(name)?;
        if data.is_empty() {
            return Err(ZvfsError::EmptyFile(name.to_string()));
        }

        let mut container = Container::open(self.path(), self.config.sync_strategy)?;

        if container.table().is_name_taken(name.as_bytes())? {
            return Err(ZvfsError::AlreadyExists(format!("file '{}'", name)));
        }

        let receipt = container.append(name.as_bytes(), data, unix_now())?;

        info!(
            name,
            slot = receipt.slot,
            start = receipt.start,
            length = receipt.length,
            "inserted file"
        );
        Ok(receipt)
    }

    /// Store a host file under its base name
    pub fn insert_file(&self, host_path: &Path) -> Result<InsertReceipt> {
        let name = host_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ZvfsError::InvalidName(format!(
                    "{} has no UTF-8 file name",
                    host_path.display()
                ))
            })?;

        let data = fs::read(host_path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                ZvfsError::NotFound(format!("host file {}", host_path.display()))
            }
            _ => ZvfsError::Io(e),
        })?;

        self.insert(name, &data)
    }

    /// Tombstone the active entry named `name`
    ///
    /// The slot and its data stay in place until `compact()`.
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut container = Container::open(self.path(), self.config.sync_strategy)?;

        let mut slot = container
            .table()
            .find_active_by_name(name.as_bytes())?
            .ok_or_else(|| ZvfsError::NotFound(format!("file '{}'", name)))?;

        container.table().tombstone(&mut slot)?;

        let header = container.header_mut();
        header.deleted_files = header.deleted_files.saturating_add(1);
        container.persist_header()?;

        info!(name, slot = slot.index, "removed file");
        Ok(())
    }

    /// Rebuild the container from its active entries
    ///
    /// Steps:
    /// 1. Reject a rebuild target that aliases the container
    /// 2. Scan once; load active data, count tombstones
    /// 3. No tombstones: return without writing anything
    /// 4. Build a fresh container at the compaction path
    /// 5. Re-insert survivors in slot order (creation times preserved)
    /// 6. Sync, then rename over the original
    pub fn compact(&self) -> Result<CompactionReport> {
        self.config.validate()?;
        let path = self.path();

        let mut survivors = Vec::new();
        let mut tombstones = 0usize;
        let mut bytes_freed = 0u64;
        let current_offset;
        {
            let mut container = Container::open_read(path)?;
            current_offset = container.header().next_free_offset;

            let slots = container.table().slots()?;
            for slot in slots {
                match slot.state() {
                    SlotState::Active => {
                        let data = container.read_data(&slot.entry)?;
                        survivors.push(Survivor {
                            entry: slot.entry,
                            data,
                        });
                    }
                    SlotState::Tombstoned => {
                        tombstones += 1;
                        bytes_freed += slot.entry.length as u64;
                    }
                    SlotState::Unused | SlotState::Orphaned => {}
                }
            }
        }

        if tombstones == 0 {
            info!(path = %path.display(), "no tombstones, compaction skipped");
            return Ok(CompactionReport {
                tombstones_removed: 0,
                bytes_freed: 0,
                files_kept: survivors.len(),
                next_free_offset: current_offset,
            });
        }

        let temp_path = self.config.compaction_path();
        if temp_path.exists() {
            warn!(path = %temp_path.display(), "removing stale compaction target");
            fs::remove_file(&temp_path)?;
        }

        let next_free_offset = match rebuild(&temp_path, &survivors) {
            Ok(offset) => offset,
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(e);
            }
        };

        // rename replaces the destination in one step; the original is never
        // removed or rewritten before the rebuilt file is complete.
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(ZvfsError::Io(e));
        }
        if self.config.sync_strategy == SyncStrategy::EveryWrite {
            sync_parent_dir(path);
        }

        let report = CompactionReport {
            tombstones_removed: tombstones,
            bytes_freed,
            files_kept: survivors.len(),
            next_free_offset,
        };

        info!(
            tombstones_removed = report.tombstones_removed,
            bytes_freed = report.bytes_freed,
            files_kept = report.files_kept,
            "compacted container"
        );
        Ok(report)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Bytes of the active entry named `name`, exactly `length` long
    pub fn extract(&self, name: &str) -> Result<Vec<u8>> {
        let data = self.read_active(name)?;
        debug!(name, length = data.len(), "extracted file");
        Ok(data)
    }

    /// Extract `name` and write it to `dest` on the host
    ///
    /// Returns the number of bytes written.
    pub fn extract_to(&self, name: &str, dest: &Path) -> Result<usize> {
        let data = self.extract(name)?;
        fs::write(dest, &data)?;
        info!(name, dest = %dest.display(), length = data.len(), "extracted file to host");
        Ok(data.len())
    }

    /// Bytes of the active entry named `name`, for display
    ///
    /// Same lookup as `extract`; text-or-binary rendering is the caller's call.
    pub fn read_contents(&self, name: &str) -> Result<Vec<u8>> {
        self.read_active(name)
    }

    /// Active entries in slot order plus the count of never-claimed slots
    pub fn list(&self) -> Result<Listing> {
        let mut container = Container::open_read(self.path())?;

        let mut files = Vec::new();
        let mut free_slots = 0;
        for slot in container.table().scan() {
            let slot = slot?;
            match slot.state() {
                SlotState::Active => files.push(ListedFile {
                    slot: slot.index,
                    name: slot.entry.name_lossy(),
                    length: slot.entry.length,
                    created: slot.entry.created,
                    start: slot.entry.start,
                }),
                SlotState::Unused => free_slots += 1,
                SlotState::Tombstoned | SlotState::Orphaned => {}
            }
        }

        Ok(Listing {
            files,
            free_slots,
            capacity: FILE_CAPACITY,
        })
    }

    /// Header counters plus figures recomputed from the table
    pub fn stat(&self) -> Result<ContainerStats> {
        let mut container = Container::open_read(self.path())?;
        let header = *container.header();

        let mut active_files = 0;
        let mut free_entries = 0;
        let mut total_active_bytes = 0u64;
        for slot in container.table().scan() {
            let slot = slot?;
            match slot.state() {
                SlotState::Active => {
                    active_files += 1;
                    total_active_bytes += slot.entry.length as u64;
                }
                SlotState::Unused => free_entries += 1,
                SlotState::Tombstoned | SlotState::Orphaned => {}
            }
        }

        Ok(ContainerStats {
            file_count: header.file_count,
            deleted_files: header.deleted_files,
            active_files,
            free_entries,
            total_active_bytes,
            next_free_offset: header.next_free_offset,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the container path
    pub fn path(&self) -> &Path {
        &self.config.container_path
    }

    /// Get the path used as the compaction rebuild target
    pub fn compaction_path(&self) -> PathBuf {
        self.config.compaction_path()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn read_active(&self, name: &str) -> Result<Vec<u8>> {
        let mut container = Container::open_read(self.path())?;

        let slot = container
            .table()
            .find_active_by_name(name.as_bytes())?
            .ok_or_else(|| ZvfsError::NotFound(format!("file '{}'", name)))?;

        container.read_data(&slot.entry)
    }
}

/// Names are 1..=31 bytes with no NUL (a NUL would end the name on decode)
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ZvfsError::InvalidName("name is empty".to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ZvfsError::InvalidName(format!(
            "'{}' is {} bytes (max {})",
            name,
            name.len(),
            MAX_NAME_LEN
        )));
    }
    if name.as_bytes().contains(&0) {
        return Err(ZvfsError::InvalidName(format!("{:?} contains NUL", name)));
    }
    Ok(())
}

/// Write survivors into a new container at `temp_path`
///
/// Returns the rebuilt data cursor.
fn rebuild(temp_path: &Path, survivors: &[Survivor]) -> Result<u32> {
    let mut temp = Container::create(temp_path, SyncStrategy::Never)?;
    for survivor in survivors {
        temp.append(&survivor.entry.name, &survivor.data, survivor.entry.created)?;
    }
    temp.sync_all()?;
    Ok(temp.header().next_free_offset)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    if let Some(parent) = path.parent() {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}
