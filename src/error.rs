//! # Error Handling
//!
//! This module defines the centralized error type for the `hecate` library.
//! It uses `thiserror` to derive a single `Error` enum covering every failure
//! the catalog, resolver, reconciler, backup store and substitution pass can
//! report.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Each variant carries enough context (the
//!   offending token, path, or count) to produce a useful message on its own.
//!
//! - **`ErrorKind`**: A coarse classification of `Error` into the categories
//!   callers actually branch on:
//!   - `Validation`: bad user input (e.g. an unknown selection token). The
//!     caller may re-prompt.
//!   - `NotFound`: a missing template, snapshot or destination. The operation
//!     was aborted before anything was written.
//!   - `Io`: permission or disk failures, surfaced verbatim.
//!   - `PartialBulkFailure`: some files of a tree-wide pass failed while the
//!     others were processed.
//!   - `Config`: the project configuration or catalog is malformed.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for hecate operations
#[derive(Error, Debug)]
pub enum Error {
    /// A selection token did not name any application in the catalog.
    #[error("Invalid selection: '{token}' is not a known application")]
    InvalidSelection { token: String },

    /// Both the raw input and the saved default were empty.
    #[error("Invalid selection: no applications were selected")]
    EmptySelection,

    /// Two catalog entries share the same key.
    #[error("Duplicate application key in catalog: {key}")]
    DuplicateAppKey { key: String },

    /// A required file or directory does not exist.
    #[error("{what} not found: {}", path.display())]
    NotFound { what: String, path: PathBuf },

    /// No snapshot matches the requested prefix.
    #[error("No snapshot matching '{prefix}*.bak' found in {}", dir.display())]
    SnapshotNotFound { prefix: String, dir: PathBuf },

    /// A snapshot timestamp is not in `YYYYMMDD-HHMMSS` form.
    #[error("Invalid snapshot timestamp '{value}' (expected YYYYMMDD-HHMMSS)")]
    InvalidTimestamp { value: String },

    /// A preference value cannot be stored as a `KEY="value"` line.
    #[error("Invalid value for {key}: quotes and line breaks cannot be saved")]
    InvalidPreferenceValue { key: String },

    /// A selected application's block starts but never finishes.
    #[error("Block for application '{app}' starting at line {line} is never finished")]
    UnterminatedBlock { app: String, line: usize },

    /// Some files of a bulk operation failed; the rest were processed.
    #[error("{operation}: {failed} of {total} files failed")]
    PartialBulkFailure {
        operation: String,
        failed: usize,
        total: usize,
    },

    /// The project configuration could not be parsed.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A host filesystem operation failed, with the path in the message.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A directory walk error, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Io,
    PartialBulkFailure,
    Config,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidSelection { .. }
            | Error::EmptySelection
            | Error::InvalidTimestamp { .. }
            | Error::InvalidPreferenceValue { .. }
            | Error::UnterminatedBlock { .. } => ErrorKind::Validation,
            Error::NotFound { .. } | Error::SnapshotNotFound { .. } => ErrorKind::NotFound,
            Error::PartialBulkFailure { .. } => ErrorKind::PartialBulkFailure,
            Error::DuplicateAppKey { .. }
            | Error::ConfigParse { .. }
            | Error::Yaml(_)
            | Error::Regex(_)
            | Error::Glob(_) => ErrorKind::Config,
            Error::Filesystem { .. } | Error::Io(_) | Error::Walk(_) => ErrorKind::Io,
        }
    }

    /// Shorthand for a `NotFound` error.
    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Error::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_selection() {
        let error = Error::InvalidSelection {
            token: "42".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Invalid selection"));
        assert!(display.contains("'42'"));
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_error_display_not_found() {
        let error = Error::not_found("Compose file", "/srv/docker-compose.yml");
        let display = format!("{}", error);
        assert_eq!(display, "Compose file not found: /srv/docker-compose.yml");
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_error_display_snapshot_not_found() {
        let error = Error::SnapshotNotFound {
            prefix: "conf.d.".to_string(),
            dir: PathBuf::from("/srv"),
        };
        let display = format!("{}", error);
        assert!(display.contains("conf.d.*.bak"));
        assert!(display.contains("/srv"));
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "unknown field `compose`".to_string(),
            hint: Some("Did you mean `compose_file`?".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("hint:"));
        assert_eq!(error.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_error_display_partial_bulk_failure() {
        let error = Error::PartialBulkFailure {
            operation: "Substitution".to_string(),
            failed: 2,
            total: 7,
        };
        assert_eq!(format!("{}", error), "Substitution: 2 of 7 files failed");
        assert_eq!(error.kind(), ErrorKind::PartialBulkFailure);
    }

    #[test]
    fn test_error_display_unterminated_block() {
        let error = Error::UnterminatedBlock {
            app: "Jenkins".to_string(),
            line: 12,
        };
        let display = format!("{}", error);
        assert!(display.contains("Jenkins"));
        assert!(display.contains("line 12"));
    }

    #[test]
    fn test_error_display_invalid_preference_value() {
        let error = Error::InvalidPreferenceValue {
            key: "BASE_DOMAIN".to_string(),
        };
        assert!(format!("{}", error).contains("BASE_DOMAIN"));
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("denied"));
        assert_eq!(error.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(format!("{}", error).contains("YAML parsing error"));
        assert_eq!(error.kind(), ErrorKind::Config);
    }
}
