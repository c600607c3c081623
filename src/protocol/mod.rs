//! Protocol Module
//!
//! Command and response values exchanged between the engine and its callers
//! (the `zvfs` binary, tests, embedding applications).
//!
//! ## Commands
//! - Initialize   - create an empty container
//! - Insert       - store a named blob
//! - Extract      - fetch a blob's bytes
//! - Remove       - tombstone a blob
//! - List         - active entries in slot order
//! - Stat         - container counters
//! - ReadContents - fetch a blob for display
//! - Compact      - rebuild without tombstones
//!
//! Every command maps to exactly one `Response` variant on success.

mod command;
mod response;

pub use command::{Command, CommandType};
pub use response::{CompactionReport, ContainerStats, ListedFile, Listing, Response};
