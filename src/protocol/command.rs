//! Command definitions
//!
//! Represents operations requested of the engine.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Initialize,
    Insert,
    Extract,
    Remove,
    List,
    Stat,
    ReadContents,
    Compact,
}

impl CommandType {
    /// Short name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Initialize => "initialize",
            CommandType::Insert => "insert",
            CommandType::Extract => "extract",
            CommandType::Remove => "remove",
            CommandType::List => "list",
            CommandType::Stat => "stat",
            CommandType::ReadContents => "read_contents",
            CommandType::Compact => "compact",
        }
    }
}

/// A parsed command
#[derive(Debug, Clone)]
pub enum Command {
    /// Create an empty container
    Initialize,

    /// Store `data` under `name`
    Insert { name: String, data: Vec<u8> },

    /// Fetch the bytes stored under `name`
    Extract { name: String },

    /// Tombstone the entry stored under `name`
    Remove { name: String },

    /// List active entries
    List,

    /// Report container counters
    Stat,

    /// Fetch the bytes stored under `name` for display
    ReadContents { name: String },

    /// Rebuild the container without tombstones
    Compact,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Initialize => CommandType::Initialize,
            Command::Insert { .. } => CommandType::Insert,
            Command::Extract { .. } => CommandType::Extract,
            Command::Remove { .. } => CommandType::Remove,
            Command::List => CommandType::List,
            Command::Stat => CommandType::Stat,
            Command::ReadContents { .. } => CommandType::ReadContents,
            Command::Compact => CommandType::Compact,
        }
    }

    /// True for commands that modify the container
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::Initialize | Command::Insert { .. } | Command::Remove { .. } | Command::Compact
        )
    }
}
