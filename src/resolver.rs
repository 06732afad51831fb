//! Locate metric files on disk.
//!
//! Instruments write either `<Name>.bin` or `<Name>Out.bin`.  The canonical
//! name is tried first; the first candidate that exists wins.

use std::path::{Path, PathBuf};

use crate::error::{InteropError, Result};
use crate::format::MetricKind;

/// Candidate paths for `kind` under `dir`, in lookup order.
pub fn candidates(kind: MetricKind, dir: &Path) -> [PathBuf; 2] {
    kind.file_names().map(|name| dir.join(name))
}

/// Path of the first existing candidate, or `MetricFileNotFound` listing
/// every name that was tried.
pub fn resolve(kind: MetricKind, dir: &Path) -> Result<PathBuf> {
    candidates(kind, dir)
        .into_iter()
        .find(|path| path.exists())
        .ok_or_else(|| InteropError::MetricFileNotFound {
            kind,
            dir: dir.to_path_buf(),
            candidates: kind.file_names().iter().map(|name| name.to_string()).collect(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn canonical_name_preferred() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("TileMetrics.bin"), [2, 10]).unwrap();
        fs::write(dir.path().join("TileMetricsOut.bin"), [2, 10]).unwrap();
        let path = resolve(MetricKind::Tile, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("TileMetrics.bin"));
    }

    #[test]
    fn out_variant_used_when_alone() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("QMetricsOut.bin"), [4, 206]).unwrap();
        let path = resolve(MetricKind::Quality, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("QMetricsOut.bin"));
    }

    #[test]
    fn missing_file_names_both_candidates() {
        let dir = TempDir::new().unwrap();
        let err = resolve(MetricKind::Error, dir.path()).unwrap_err();
        assert!(err.is_missing_file());
        let message = err.to_string();
        assert!(message.contains("ErrorMetrics.bin/ErrorMetricsOut.bin"), "{message}");
    }

    #[test]
    fn collapsed_q_does_not_match_quality() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("QMetrics.bin"), [4, 206]).unwrap();
        assert!(resolve(MetricKind::CollapsedQ, dir.path()).is_err());
    }
}
