//! # treecopy - Selective File-Tree Copy
//!
//! Pick part of a directory tree, narrow it by file type and modification
//! date, copy what is left into a target directory and optionally zip it.
//!
//! The engine runs as a filter → copy → archive pipeline on a background
//! worker. Progress and status lines flow back over channels, and a shared
//! flag cancels the walk at the next directory or file boundary.

// Module declarations
pub mod archive;
pub mod commands;
pub mod config;
pub mod executor;
pub mod filter;
pub mod hash;
pub mod pipeline;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::Config;
pub use types::{
    CancelFlag, CopyResult, CopyStatus, DateOption, EntryKind, FilterSpec, FilteredSet, Progress,
    SelectionSet, TreeCopyError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
