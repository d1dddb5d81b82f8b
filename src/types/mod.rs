//! Core type definitions for treecopy

mod error;
mod filter_spec;
mod filtered;
mod run;
mod selection;

pub use error::TreeCopyError;
pub use filter_spec::{DateOption, FilterSpec, ALL_TYPES, KNOWN_FILE_TYPES};
pub use filtered::{EntryKind, FilteredSet};
pub use run::{CancelFlag, CopyResult, CopyStatus, Progress};
pub use selection::SelectionSet;
