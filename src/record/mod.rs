//! Typed record model: one immutable value type per metric kind.
//!
//! Every record type implements [`MetricRecord`], which ties it to its
//! [`MetricKind`] and converts it to and from a row of [`FieldValue`]s in
//! layout order.  [`Record`] is the closed tagged variant over all kinds,
//! used wherever the kind is only known at run time.
//!
//! Equality is value based.  Floating-point fields compare with relative
//! tolerance [`FLOAT_REL_TOLERANCE`](crate::value::FLOAT_REL_TOLERANCE);
//! everything else compares exactly.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::Result;
use crate::format::MetricKind;
use crate::value::{FieldValue, FlatRecord};

mod cycle;
mod index;
mod tile;

pub use cycle::{
    CollapsedQRecord, CorrectedIntensityRecord, ErrorRecord, ExtractionRecord, ImageRecord,
    PhasingRecord, QualityRecord, DATESTAMP_MASK, QUALITY_BIN_COUNT,
};
pub use index::IndexRecord;
pub(crate) use index::check_text_len;
pub use tile::{TileMetricCodes, TileMetricRecord};

/// Behaviour shared by every record type.
pub trait MetricRecord: Sized + Clone + fmt::Debug + PartialEq {
    const KIND: MetricKind;

    /// Validating constructor from a decoded row.
    fn from_values(values: Vec<FieldValue>) -> Result<Self>;

    /// Inverse of [`from_values`](MetricRecord::from_values).
    fn to_values(&self) -> Vec<FieldValue>;

    /// Ordered key/value pairs for tabular exporters.
    fn to_flat_mapping(&self) -> FlatRecord;

    fn lane(&self) -> u16;
    fn tile(&self) -> u16;

    fn into_record(self) -> Record;
    fn from_record(record: Record) -> Option<Self>;
}

/// Value equality through the row representation, so float fields pick up
/// the tolerant comparison of [`FieldValue`].
macro_rules! impl_row_eq {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl PartialEq for $ty {
                fn eq(&self, other: &Self) -> bool {
                    self.to_values() == other.to_values()
                }
            }
        )+
    };
}
pub(crate) use impl_row_eq;

// ── Record ──────────────────────────────────────────────────────────────────

/// A decoded record of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    CorrectedIntensity(CorrectedIntensityRecord),
    Error(ErrorRecord),
    Extraction(ExtractionRecord),
    Image(ImageRecord),
    Index(IndexRecord),
    Phasing(PhasingRecord),
    Quality(QualityRecord),
    CollapsedQ(CollapsedQRecord),
    Tile(TileMetricRecord),
}

macro_rules! dispatch {
    ($record:expr, $r:ident => $body:expr) => {
        match $record {
            Record::CorrectedIntensity($r) => $body,
            Record::Error($r)              => $body,
            Record::Extraction($r)         => $body,
            Record::Image($r)              => $body,
            Record::Index($r)              => $body,
            Record::Phasing($r)            => $body,
            Record::Quality($r)            => $body,
            Record::CollapsedQ($r)         => $body,
            Record::Tile($r)               => $body,
        }
    };
}

impl Record {
    /// Build the record type registered for `kind` from a decoded row.
    pub fn from_values(kind: MetricKind, values: Vec<FieldValue>) -> Result<Self> {
        Ok(match kind {
            MetricKind::CorrectedIntensity => Record::CorrectedIntensity(CorrectedIntensityRecord::from_values(values)?),
            MetricKind::Error              => Record::Error(ErrorRecord::from_values(values)?),
            MetricKind::Extraction         => Record::Extraction(ExtractionRecord::from_values(values)?),
            MetricKind::Image              => Record::Image(ImageRecord::from_values(values)?),
            MetricKind::Index              => Record::Index(IndexRecord::from_values(values)?),
            MetricKind::Phasing            => Record::Phasing(PhasingRecord::from_values(values)?),
            MetricKind::Quality            => Record::Quality(QualityRecord::from_values(values)?),
            MetricKind::CollapsedQ         => Record::CollapsedQ(CollapsedQRecord::from_values(values)?),
            MetricKind::Tile               => Record::Tile(TileMetricRecord::from_values(values)?),
        })
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Record::CorrectedIntensity(_) => MetricKind::CorrectedIntensity,
            Record::Error(_)              => MetricKind::Error,
            Record::Extraction(_)         => MetricKind::Extraction,
            Record::Image(_)              => MetricKind::Image,
            Record::Index(_)              => MetricKind::Index,
            Record::Phasing(_)            => MetricKind::Phasing,
            Record::Quality(_)            => MetricKind::Quality,
            Record::CollapsedQ(_)         => MetricKind::CollapsedQ,
            Record::Tile(_)               => MetricKind::Tile,
        }
    }

    pub fn to_values(&self) -> Vec<FieldValue> {
        dispatch!(self, r => r.to_values())
    }

    pub fn to_flat_mapping(&self) -> FlatRecord {
        dispatch!(self, r => r.to_flat_mapping())
    }

    pub fn lane(&self) -> u16 {
        dispatch!(self, r => r.lane())
    }

    pub fn tile(&self) -> u16 {
        dispatch!(self, r => r.tile())
    }

    /// Narrow to a concrete record type, `None` if the kind differs.
    pub fn downcast<T: MetricRecord>(self) -> Option<T> {
        T::from_record(self)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_flat_mapping().serialize(serializer)
    }
}

/// Shared plumbing for the `into_record`/`from_record` pair.
macro_rules! record_variant {
    ($variant:ident) => {
        fn into_record(self) -> $crate::record::Record {
            $crate::record::Record::$variant(self)
        }

        fn from_record(record: $crate::record::Record) -> Option<Self> {
            match record {
                $crate::record::Record::$variant(r) => Some(r),
                _ => None,
            }
        }
    };
}
pub(crate) use record_variant;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MetricKind;

    fn tile(value: f32) -> TileMetricRecord {
        TileMetricRecord { lane: 1, tile: 1101, metric_code: 100, metric_value: value }
    }

    #[test]
    fn dispatch_by_kind() {
        let values = tile(12.5).to_values();
        let record = Record::from_values(MetricKind::Tile, values).unwrap();
        assert_eq!(record.kind(), MetricKind::Tile);
        assert_eq!(record.lane(), 1);
        assert_eq!(record.tile(), 1101);
        assert_eq!(record.clone().downcast::<TileMetricRecord>(), Some(tile(12.5)));
        assert_eq!(record.downcast::<ErrorRecord>(), None);
    }

    #[test]
    fn wrong_kind_rejects_row() {
        let values = tile(12.5).to_values();
        assert!(Record::from_values(MetricKind::Image, values).is_err());
    }

    #[test]
    fn float_fields_compare_with_tolerance() {
        let base = 1234.5f32;
        let close = f32::from_bits(base.to_bits() + 1);
        assert!(((close - base) as f64 / base as f64) < 1e-7);
        assert_eq!(tile(base), tile(close));
        assert_ne!(tile(base), tile(base * 1.001));
    }

    #[test]
    fn different_kinds_never_equal() {
        let a = Record::Tile(tile(1.0));
        let b = Record::Image(ImageRecord {
            lane: 1, tile: 1101, cycle: 100, channel_number: 0, min_contrast: 0, max_contrast: 0,
        });
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_as_flat_mapping() {
        let json = serde_json::to_value(Record::Tile(tile(0.5))).unwrap();
        assert_eq!(json["metric_code"], 100);
        assert_eq!(json["metric_value"], 0.5);
    }
}
