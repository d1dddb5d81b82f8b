//! FilterSpec - type and date criteria narrowing a selection

use super::TreeCopyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Wildcard file type token: matches every file.
pub const ALL_TYPES: &str = "All";

/// File type tokens offered for selection.
///
/// `""` selects files without an extension.
pub const KNOWN_FILE_TYPES: &[&str] = &[
    ALL_TYPES, "java", "class", "txt", "doc", "docx", "xls", "xlsx", "ppt", "png", "jpg", "pdf",
    "jar", "exe", "html", "xhtml", "htm", "mp3", "wmv", "",
];

/// Modification date window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DateOption {
    #[default]
    #[serde(rename = "all-days")]
    AllDays,
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "last-7-days")]
    Last7Days,
    #[serde(rename = "last-30-days")]
    Last30Days,
}

const DATE_OPTION_LABELS: [(&str, DateOption); 4] = [
    ("All days", DateOption::AllDays),
    ("Today", DateOption::Today),
    ("Last 7 days", DateOption::Last7Days),
    ("Last 30 days", DateOption::Last30Days),
];

impl DateOption {
    /// All options in display order.
    pub const ALL: [DateOption; 4] = [
        DateOption::AllDays,
        DateOption::Today,
        DateOption::Last7Days,
        DateOption::Last30Days,
    ];

    /// Display label, e.g. "Last 7 days".
    pub fn label(self) -> &'static str {
        match self {
            DateOption::AllDays => "All days",
            DateOption::Today => "Today",
            DateOption::Last7Days => "Last 7 days",
            DateOption::Last30Days => "Last 30 days",
        }
    }

    /// Reverse lookup of [`DateOption::label`].
    pub fn from_label(label: &str) -> Option<Self> {
        DATE_OPTION_LABELS
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, option)| *option)
    }

    /// Stable identifier used on the command line and in filter files.
    pub fn id(self) -> &'static str {
        match self {
            DateOption::AllDays => "all-days",
            DateOption::Today => "today",
            DateOption::Last7Days => "last-7-days",
            DateOption::Last30Days => "last-30-days",
        }
    }

    /// Number of days subtracted from today to get the exclusive lower bound.
    ///
    /// `None` means no date restriction. `Today` yields zero, so only files
    /// dated strictly after today pass.
    pub fn window_days(self) -> Option<i64> {
        match self {
            DateOption::AllDays => None,
            DateOption::Today => Some(0),
            DateOption::Last7Days => Some(7),
            DateOption::Last30Days => Some(30),
        }
    }
}

impl fmt::Display for DateOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DateOption {
    type Err = TreeCopyError;

    /// Accepts either the identifier (`last-7-days`) or the label (`Last 7 days`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateOption::ALL
            .into_iter()
            .find(|option| option.id() == s)
            .or_else(|| DateOption::from_label(s))
            .ok_or_else(|| {
                TreeCopyError::Config(format!(
                    "Unknown date option '{}'. Expected one of: all-days, today, last-7-days, last-30-days",
                    s
                ))
            })
    }
}

/// File filter criteria
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// "Select all files" switch; see [`FilterSpec::normalized`]
    pub all_files: bool,

    /// Modification date window
    pub date_option: DateOption,

    /// Extension tokens; may contain [`ALL_TYPES`] and `""`
    pub file_types: BTreeSet<String>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            all_files: false,
            date_option: DateOption::AllDays,
            file_types: BTreeSet::from([ALL_TYPES.to_string()]),
        }
    }
}

impl FilterSpec {
    /// Build a spec from a date window and extension tokens.
    pub fn new<I, S>(date_option: DateOption, file_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            all_files: false,
            date_option,
            file_types: file_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Apply the selection rules of the filter form.
    ///
    /// An empty type set means "All"; `all_files` forces all types and all days.
    pub fn normalized(mut self) -> Self {
        if self.all_files {
            self.date_option = DateOption::AllDays;
            self.file_types = BTreeSet::from([ALL_TYPES.to_string()]);
        } else if self.file_types.is_empty() {
            self.file_types.insert(ALL_TYPES.to_string());
        }
        self
    }

    /// Check whether an extension token passes the type filter.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.file_types.contains(ALL_TYPES) || self.file_types.contains(extension)
    }

    /// Load a spec from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, TreeCopyError> {
        toml::from_str(content)
            .map_err(|e| TreeCopyError::Config(format!("Invalid filter file: {}", e)))
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types = self
            .file_types
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}, [{}]", self.date_option, types)
    }
}
