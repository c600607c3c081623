//! Storage Module
//!
//! Allocation and file I/O for a single container.
//!
//! ## Responsibilities
//! - Open/create the container file for the span of one operation
//! - Bump-allocate aligned data ranges (space is never reused)
//! - Claim entry slots monotonically (slots are never reused)
//! - Persist the header only after the writes it describes
//!
//! ## Data Region
//! ```text
//! 2112                                   next_free_offset
//!  ├──────────┬──────────┬──────────┬─────────┤
//!  │ file A   │ file B   │ file C   │  (free) │
//!  │ + pad    │ (deleted)│ + pad    │         │
//!  └──────────┴──────────┴──────────┴─────────┘
//!  every start is a multiple of 64; deleted bytes stay until compaction
//! ```

pub mod allocator;
mod container;

pub use allocator::{DataClaim, SlotClaim};
pub use container::{Container, InsertReceipt};

use crate::layout::ALIGNMENT;

/// Round `value` up to the next multiple of the data alignment
pub fn align_up(value: u64) -> u64 {
    value.div_ceil(ALIGNMENT) * ALIGNMENT
}
