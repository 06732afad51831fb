pub mod error;
pub mod format;
pub mod header;
pub mod value;
pub mod record;
pub mod io_stream;
pub mod resolver;
pub mod summary;
pub mod testgen;
pub mod run;
pub mod export;

pub use error::{InteropError, Result};
pub use format::{FieldType, Layout, MetricKind};
pub use header::FileHeader;
pub use value::{FieldValue, FlatRecord, FlatValue};
pub use record::{
    CollapsedQRecord, CorrectedIntensityRecord, ErrorRecord, ExtractionRecord, ImageRecord,
    IndexRecord, MetricRecord, PhasingRecord, QualityRecord, Record, TileMetricCodes,
    TileMetricRecord,
};
pub use io_stream::{decode, encode, read_records, InterOpReader, InterOpWriter};
pub use resolver::resolve;
pub use summary::{ErrorSummary, QualitySummary, ReadLengths, TileMetricSummary};
pub use run::{list_runs, RunDirectory};
