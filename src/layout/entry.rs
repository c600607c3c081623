//! File Entry
//!
//! One 64-byte slot of the entry table:
//! `[name (32)][start (4)][length (4)][type (1)][flag (1)][reserved (2)][created (8)][reserved (12)]`

use bytes::{Buf, BufMut};

use crate::error::{Result, ZvfsError};

use super::{ENTRY_ACTIVE, ENTRY_DELETED, ENTRY_SIZE, ENTRY_TYPE_FILE, NAME_FIELD_SIZE};

/// Reserved tail after `created`
const RESERVED_TAIL: usize = 12;

/// Decoded entry table slot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileEntry {
    /// Raw name bytes, without NUL padding
    pub name: Vec<u8>,
    /// Data offset in the container (multiple of 64)
    pub start: u32,
    /// Exact data length, unpadded
    pub length: u32,
    /// Reserved, always 0
    pub kind: u8,
    /// 0 = active, 1 = tombstoned
    pub flag: u8,
    /// Unix seconds at insertion
    pub created: u64,
}

impl FileEntry {
    /// Create an active entry
    pub fn new(name: impl Into<Vec<u8>>, start: u32, length: u32, created: u64) -> Self {
        Self {
            name: name.into(),
            start,
            length,
            kind: ENTRY_TYPE_FILE,
            flag: ENTRY_ACTIVE,
            created,
        }
    }

    /// Encode to exactly 64 bytes
    ///
    /// Fails with `NameTooLong` if the name does not fit the 32-byte field.
    pub fn encode(&self) -> Result<[u8; ENTRY_SIZE]> {
        if self.name.len() > NAME_FIELD_SIZE {
            return Err(ZvfsError::NameTooLong(self.name.len()));
        }

        let mut out = [0u8; ENTRY_SIZE];
        let mut buf = &mut out[..];

        buf.put_slice(&self.name);
        buf.put_bytes(0, NAME_FIELD_SIZE - self.name.len());
        buf.put_u32_le(self.start);
        buf.put_u32_le(self.length);
        buf.put_u8(self.kind);
        buf.put_u8(self.flag);
        buf.put_u16_le(0); // reserved0
        buf.put_u64_le(self.created);
        buf.put_bytes(0, RESERVED_TAIL);

        Ok(out)
    }

    /// Decode from the first 64 bytes of `bytes`
    ///
    /// The name ends at its first NUL; anything after it is ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < ENTRY_SIZE {
            return Err(ZvfsError::InvalidFormat(format!(
                "Incomplete entry: expected {} bytes, got {}",
                ENTRY_SIZE,
                bytes.len()
            )));
        }

        let mut buf = &bytes[..ENTRY_SIZE];

        let raw_name = &bytes[..NAME_FIELD_SIZE];
        let name_len = raw_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_FIELD_SIZE);
        let name = raw_name[..name_len].to_vec();
        buf.advance(NAME_FIELD_SIZE);

        let start = buf.get_u32_le();
        let length = buf.get_u32_le();
        let kind = buf.get_u8();
        let flag = buf.get_u8();
        buf.advance(2); // reserved0
        let created = buf.get_u64_le();

        Ok(Self {
            name,
            start,
            length,
            kind,
            flag,
            created,
        })
    }

    /// Flag is set to the tombstone value on a named entry
    pub fn is_tombstoned(&self) -> bool {
        self.flag == ENTRY_DELETED && !self.name.is_empty()
    }

    /// Flag is clear, name non-empty and data present
    pub fn is_live(&self) -> bool {
        self.flag == ENTRY_ACTIVE && !self.name.is_empty() && self.length > 0
    }

    /// Flag is clear and no name was ever written
    pub fn is_unused(&self) -> bool {
        self.flag == ENTRY_ACTIVE && self.name.is_empty()
    }

    /// Exact byte-for-byte name comparison
    pub fn name_matches(&self, name: &[u8]) -> bool {
        self.name == name
    }

    /// Name as text, replacing invalid UTF-8
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }
}
