//! Configuration management

use crate::types::{DateOption, FilterSpec, TreeCopyError};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

/// Command-line arguments
#[derive(Parser, Debug, Clone)]
#[command(
    name = "treecopy",
    version,
    about = "Copy a filtered selection of a directory tree, optionally as a zip"
)]
pub struct Cli {
    /// Source directory
    pub source: PathBuf,

    /// Target directory (must exist and lie outside the source)
    pub target: PathBuf,

    /// Files or directories to copy, relative to the source (default: everything)
    #[arg(short, long = "select", value_name = "PATH")]
    pub select: Vec<PathBuf>,

    /// Extensions to keep, comma separated; "All" keeps every type, "" files without one
    #[arg(short, long, value_delimiter = ',', value_name = "EXT")]
    pub types: Vec<String>,

    /// Modification date window
    #[arg(short, long, value_name = "WINDOW")]
    pub date: Option<DateOption>,

    /// Ignore type and date filters
    #[arg(long)]
    pub all_files: bool,

    /// Load filters from a TOML file; command-line filters take precedence
    #[arg(long, value_name = "FILE")]
    pub filters: Option<PathBuf>,

    /// Create <target>.zip next to the target after copying
    #[arg(short, long)]
    pub zip: bool,

    /// Verify every copied file by checksum
    #[arg(long)]
    pub verify: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated configuration for one copy run
#[derive(Debug, Clone)]
pub struct Config {
    /// Source directory (canonical once validated)
    pub source: PathBuf,

    /// Target directory (canonical once validated)
    pub target: PathBuf,

    /// Picked paths; empty selects the whole source tree
    pub picks: Vec<PathBuf>,

    /// Type and date filters
    pub filter: FilterSpec,

    /// Zip the target after copying
    pub archive: bool,

    /// Checksum-verify copied files
    pub verify: bool,

    /// Emit a JSON report instead of the human summary
    pub json: bool,

    /// Debug logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            target: PathBuf::new(),
            picks: Vec::new(),
            filter: FilterSpec::default(),
            archive: false,
            verify: false,
            json: false,
            verbose: false,
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = TreeCopyError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let mut filter = match &cli.filters {
            Some(path) => load_filter_file(path)?,
            None => FilterSpec::default(),
        };
        if !cli.types.is_empty() {
            filter.file_types = cli.types.iter().map(|t| t.trim().to_string()).collect();
        }
        if let Some(date) = cli.date {
            filter.date_option = date;
        }
        if cli.all_files {
            filter.all_files = true;
        }

        let config = Config {
            source: cli.source,
            target: cli.target,
            picks: cli.select,
            filter: filter.normalized(),
            archive: cli.zip,
            verify: cli.verify,
            json: cli.json,
            verbose: cli.verbose,
        };

        config.validate()?;
        config.canonicalized()
    }
}

impl Config {
    /// Validate source and target before anything runs.
    ///
    /// The target must exist, and must be neither the source nor inside it.
    pub fn validate(&self) -> Result<(), TreeCopyError> {
        if !self.source.is_dir() {
            return Err(TreeCopyError::Validation(format!(
                "Source directory does not exist: {}",
                self.source.display()
            )));
        }

        if !self.target.is_dir() {
            return Err(TreeCopyError::Validation(format!(
                "Target directory does not exist: {}",
                self.target.display()
            )));
        }

        let source = fs::canonicalize(&self.source)?;
        let target = fs::canonicalize(&self.target)?;
        if target == source || target.starts_with(&source) {
            return Err(TreeCopyError::Validation(
                "Source and target directories are same, or the target is within the source."
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve source and target to canonical absolute paths.
    ///
    /// Picks stay as given; [`SelectionSet::from_picks`](crate::types::SelectionSet::from_picks)
    /// resolves them against the canonical source.
    pub fn canonicalized(mut self) -> Result<Self, TreeCopyError> {
        self.source = fs::canonicalize(&self.source)?;
        self.target = fs::canonicalize(&self.target)?;
        Ok(self)
    }

    /// True when the target already holds entries; copying then merges.
    pub fn target_is_non_empty(&self) -> Result<bool, TreeCopyError> {
        Ok(fs::read_dir(&self.target)?.next().is_some())
    }
}

/// Read a filter spec from a TOML file.
pub fn load_filter_file(path: &Path) -> Result<FilterSpec, TreeCopyError> {
    let content = fs::read_to_string(path).map_err(|e| {
        TreeCopyError::Config(format!(
            "Cannot read filter file {}: {}",
            path.display(),
            e
        ))
    })?;
    FilterSpec::from_toml_str(&content)
}
