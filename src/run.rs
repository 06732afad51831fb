//! MiSeq run directories.
//!
//! A run directory holds a `SampleSheet.csv` and an `InterOp/` directory of
//! metric files.  Two empty marker files describe its pipeline state:
//! `needsprocessing` and `qc_uploaded`.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{InteropError, Result};
use crate::format::MetricKind;
use crate::io_stream::{decode, read_records};
use crate::record::{ErrorRecord, MetricRecord, QualityRecord, Record, TileMetricCodes, TileMetricRecord};
use crate::resolver::resolve;
use crate::summary::{ErrorSummary, QualitySummary, ReadLengths, TileMetricSummary};

pub const SAMPLE_SHEET: &str = "SampleSheet.csv";
pub const INTEROP_DIR: &str = "InterOp";
pub const NEEDS_PROCESSING_MARKER: &str = "needsprocessing";
pub const QC_UPLOADED_MARKER: &str = "qc_uploaded";

#[derive(Debug, Clone)]
pub struct RunDirectory {
    path:                 PathBuf,
    interop_dir:          PathBuf,
    pub needs_processing: bool,
    pub qc_uploaded:      bool,
}

impl RunDirectory {
    /// Validate `path` as a run directory and read its markers.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let invalid = |reason: &str| InteropError::InvalidRunDirectory {
            path:   path.clone(),
            reason: reason.to_string(),
        };

        if !path.exists() {
            return Err(invalid("path does not exist"));
        }
        if !path.is_dir() {
            return Err(invalid("not a directory"));
        }
        if !path.join(SAMPLE_SHEET).is_file() {
            return Err(invalid("SampleSheet.csv does not exist"));
        }
        let interop_dir = path.join(INTEROP_DIR);
        if !interop_dir.is_dir() {
            return Err(invalid("InterOp directory does not exist"));
        }

        Ok(Self {
            needs_processing: path.join(NEEDS_PROCESSING_MARKER).exists(),
            qc_uploaded:      path.join(QC_UPLOADED_MARKER).exists(),
            interop_dir,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn interop_dir(&self) -> &Path {
        &self.interop_dir
    }

    /// Final path component, e.g. `250101_M01234_0001_000000000-ABCDE`.
    pub fn run_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// `needs-processing, qc-uploaded`, one of the two, or `no markers`.
    pub fn marker_status(&self) -> String {
        let mut parts = Vec::new();
        if self.needs_processing {
            parts.push("needs-processing");
        }
        if self.qc_uploaded {
            parts.push("qc-uploaded");
        }
        if parts.is_empty() {
            "no markers".to_string()
        } else {
            parts.join(", ")
        }
    }

    pub fn locate(&self, kind: MetricKind) -> Result<PathBuf> {
        resolve(kind, &self.interop_dir)
    }

    /// Kinds with a metric file present, in registry order.
    pub fn available_metrics(&self) -> Vec<MetricKind> {
        MetricKind::ALL
            .into_iter()
            .filter(|&kind| self.locate(kind).is_ok())
            .collect()
    }

    /// Fails on the first kind with no file.
    pub fn check_files_present(&self, kinds: &[MetricKind]) -> Result<()> {
        for &kind in kinds {
            self.locate(kind)?;
        }
        Ok(())
    }

    pub fn read_records<T: MetricRecord>(&self) -> Result<Vec<T>> {
        let path = self.locate(T::KIND)?;
        debug!(kind = %T::KIND, path = %path.display(), "reading metric file");
        let reader = BufReader::new(File::open(&path)?);
        read_records::<T, _>(reader)?.collect()
    }

    pub fn read_file(&self, kind: MetricKind) -> Result<Vec<Record>> {
        let path = self.locate(kind)?;
        debug!(%kind, path = %path.display(), "reading metric file");
        let reader = BufReader::new(File::open(&path)?);
        decode(reader, kind)?.collect()
    }

    pub fn summarize_quality(&self, read_lengths: Option<&ReadLengths>) -> Result<QualitySummary> {
        let records = self.read_records::<QualityRecord>()?;
        Ok(QualitySummary::from_records(&records, read_lengths))
    }

    pub fn summarize_tiles(&self, codes: &TileMetricCodes) -> Result<TileMetricSummary> {
        let records = self.read_records::<TileMetricRecord>()?;
        Ok(TileMetricSummary::from_records(&records, codes))
    }

    pub fn summarize_errors(&self, read_lengths: Option<&ReadLengths>) -> Result<ErrorSummary> {
        let records = self.read_records::<ErrorRecord>()?;
        Ok(ErrorSummary::from_records(&records, read_lengths))
    }
}

/// Valid run directories directly beneath `dir`, sorted by path.
///
/// Entries that are not run directories are skipped.
pub fn list_runs(dir: impl AsRef<Path>) -> Result<Vec<RunDirectory>> {
    let mut runs = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        match RunDirectory::open(&path) {
            Ok(run) => runs.push(run),
            Err(e)  => debug!(path = %path.display(), error = %e, "skipping directory"),
        }
    }
    runs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(runs)
}
