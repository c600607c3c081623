//! # ZVFS
//!
//! A tiny filesystem inside a single host file:
//! - Fixed 64-byte header with bump-allocation cursors
//! - Fixed table of 32 entry slots, claimed in order and never reused
//! - Append-only data region with 64-byte aligned offsets
//! - Tombstone deletion, reclaimed only by full compaction
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Command / Response                         │
//! │              (zvfs binary, embedding apps)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Storage Engine                           │
//! │   initialize · insert · extract · remove · list · compact    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Entry Table │          │  Allocator  │
//!   │ (32 slots)  │          │(bump cursor)│
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          └───────────┬────────────┘
//!                      ▼
//!              ┌──────────────┐
//!              │ Layout Codec │
//!              │ (64B records)│
//!              └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod layout;
pub mod table;
pub mod storage;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, ZvfsError};
pub use config::{Config, SyncStrategy};
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ZVFS
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
