//! Error taxonomy shared by every layer of the crate.
//!
//! Decode and validation failures are never recovered internally: they are
//! returned to the caller, who decides whether to skip a metric or abort the
//! whole run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::format::MetricKind;

pub type Result<T> = std::result::Result<T, InteropError>;

#[derive(Error, Debug)]
pub enum InteropError {
    /// The file header declares a version older than the layout supports.
    #[error("File version {version} is less than minimum version {min_version} for {kind}")]
    FormatVersion { kind: MetricKind, version: u8, min_version: u8 },

    /// A fixed-width file declares a record length that does not match its layout.
    #[error("{kind} header declares records of {declared} bytes, layout requires {expected}")]
    RecordLengthMismatch { kind: MetricKind, declared: u8, expected: usize },

    #[error("Truncated {kind} header: expected {expected} bytes, found {actual}")]
    TruncatedHeader { kind: MetricKind, expected: usize, actual: usize },

    /// The stream ended part-way through a record.
    #[error("Partial {kind} record at byte {offset}: expected {expected} bytes, found {actual}")]
    TruncatedRecord { kind: MetricKind, offset: u64, expected: usize, actual: usize },

    /// A decoded or caller-supplied field violates a record invariant.
    #[error("Invalid field '{field}': {constraint}")]
    FieldValidation { field: String, constraint: String },

    /// None of the candidate file names for a metric exist.
    #[error("{} could not be found in {}", candidates.join("/"), dir.display())]
    MetricFileNotFound { kind: MetricKind, dir: PathBuf, candidates: Vec<String> },

    #[error("Invalid read lengths '{0}': must be 3 or 4 comma-separated cycle counts")]
    InvalidReadLengths(String),

    #[error("{}: {reason}", path.display())]
    InvalidRunDirectory { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl InteropError {
    pub(crate) fn field(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        InteropError::FieldValidation {
            field:      field.into(),
            constraint: constraint.into(),
        }
    }

    /// True for errors a caller can skip past to continue with other metrics.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, InteropError::MetricFileNotFound { .. })
    }
}
