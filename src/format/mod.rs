//! Format registry: one frozen [`Layout`] per InterOp metric kind.
//!
//! # Layout rules
//! Every metric file starts with a tiny header of raw unsigned bytes
//! (`version`, then `record_length` for fixed-width formats), followed by a
//! body of records.  All multi-byte record fields are little-endian.
//!
//! Layouts are pure data.  Decoding and encoding walk the field table in
//! order, so adding a metric kind means adding a table entry here and a
//! record type in `record`; the stream code does not change.
//!
//! The index format is the only variable-length layout: its three name
//! fields are `Text` (u16 length prefix followed by that many raw bytes) and
//! its header carries no record length.

use std::fmt;

// ── Field types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    U16,
    U32,
    U64,
    F32,
    /// u16 little-endian length prefix followed by that many raw bytes.
    Text,
}

impl FieldType {
    /// Encoded width in bytes, or `None` for variable-width fields.
    #[inline]
    pub fn width(self) -> Option<usize> {
        match self {
            FieldType::U16  => Some(2),
            FieldType::U32  => Some(4),
            FieldType::U64  => Some(8),
            FieldType::F32  => Some(4),
            FieldType::Text => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FieldType::U16  => "u16",
            FieldType::U32  => "u32",
            FieldType::U64  => "u64",
            FieldType::F32  => "f32",
            FieldType::Text => "text",
        }
    }
}

/// A named field, optionally repeated `count` times back to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name:  &'static str,
    pub ty:    FieldType,
    pub count: usize,
}

impl Field {
    pub const fn one(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty, count: 1 }
    }

    pub const fn repeated(name: &'static str, ty: FieldType, count: usize) -> Self {
        Self { name, ty, count }
    }
}

/// Shape of the bytes that precede the first record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    /// `(version: u8, record_length: u8)`.
    VersionAndLength,
    /// `(version: u8)` only; used by the self-describing index format.
    VersionOnly,
}

impl HeaderLayout {
    pub fn byte_len(self) -> usize {
        match self {
            HeaderLayout::VersionAndLength => 2,
            HeaderLayout::VersionOnly      => 1,
        }
    }
}

/// Immutable description of one binary metric format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub kind:          MetricKind,
    pub fields:        &'static [Field],
    /// Fixed record length in bytes; `None` for variable-length layouts.
    pub record_length: Option<usize>,
    pub min_version:   u8,
    pub header:        HeaderLayout,
}

impl Layout {
    /// Total number of scalar values in one record (repeats expanded).
    pub fn value_count(&self) -> usize {
        self.fields.iter().map(|f| f.count).sum()
    }

    /// Iterate the field type of every scalar value, in record order.
    pub fn value_types(&self) -> impl Iterator<Item = FieldType> + '_ {
        self.fields
            .iter()
            .flat_map(|f| std::iter::repeat(f.ty).take(f.count))
    }

    /// Name of the field group holding the scalar at position `index`.
    pub fn field_name(&self, index: usize) -> &'static str {
        let mut seen = 0;
        for field in self.fields {
            seen += field.count;
            if index < seen {
                return field.name;
            }
        }
        "<extra>"
    }

    /// Sum of the fixed field widths, or `None` if any field is variable.
    pub fn computed_length(&self) -> Option<usize> {
        self.value_types().map(FieldType::width).sum()
    }
}

// ── Metric kinds ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKind {
    CorrectedIntensity,
    Error,
    Extraction,
    Image,
    Index,
    Phasing,
    Quality,
    CollapsedQ,
    Tile,
}

impl MetricKind {
    pub const ALL: [MetricKind; 9] = [
        MetricKind::CorrectedIntensity,
        MetricKind::Error,
        MetricKind::Extraction,
        MetricKind::Image,
        MetricKind::Index,
        MetricKind::Phasing,
        MetricKind::Quality,
        MetricKind::CollapsedQ,
        MetricKind::Tile,
    ];

    /// The frozen layout for this kind.
    pub fn layout(self) -> &'static Layout {
        match self {
            MetricKind::CorrectedIntensity => &CORRECTED_INTENSITY,
            MetricKind::Error              => &ERROR,
            MetricKind::Extraction         => &EXTRACTION,
            MetricKind::Image              => &IMAGE,
            MetricKind::Index              => &INDEX,
            MetricKind::Phasing            => &PHASING,
            MetricKind::Quality            => &QUALITY,
            MetricKind::CollapsedQ         => &COLLAPSED_Q,
            MetricKind::Tile               => &TILE,
        }
    }

    /// Candidate file names in resolution order: canonical, then "Out".
    pub fn file_names(self) -> [&'static str; 2] {
        match self {
            MetricKind::CorrectedIntensity => ["CorrectedIntMetrics.bin", "CorrectedIntMetricsOut.bin"],
            MetricKind::Error              => ["ErrorMetrics.bin", "ErrorMetricsOut.bin"],
            MetricKind::Extraction         => ["ExtractionMetrics.bin", "ExtractionMetricsOut.bin"],
            MetricKind::Image              => ["ImageMetrics.bin", "ImageMetricsOut.bin"],
            MetricKind::Index              => ["IndexMetrics.bin", "IndexMetricsOut.bin"],
            MetricKind::Phasing            => ["EmpiricalPhasingMetrics.bin", "EmpiricalPhasingMetricsOut.bin"],
            MetricKind::Quality            => ["QMetrics.bin", "QMetricsOut.bin"],
            MetricKind::CollapsedQ         => ["QMetrics2030.bin", "QMetrics2030Out.bin"],
            MetricKind::Tile               => ["TileMetrics.bin", "TileMetricsOut.bin"],
        }
    }

    /// Stable lower-case name, used on the command line and in exports.
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::CorrectedIntensity => "corrected_intensity",
            MetricKind::Error              => "error",
            MetricKind::Extraction         => "extraction",
            MetricKind::Image              => "image",
            MetricKind::Index              => "index",
            MetricKind::Phasing            => "phasing",
            MetricKind::Quality            => "quality",
            MetricKind::CollapsedQ         => "collapsed_q",
            MetricKind::Tile               => "tile",
        }
    }

    /// Parse from a CLI string.  Accepts `-` in place of `_`.
    pub fn from_name(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        MetricKind::ALL.into_iter().find(|k| k.name() == normalized)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Frozen layouts ──────────────────────────────────────────────────────────

use FieldType::{F32, Text, U16, U32, U64};

pub static ERROR: Layout = Layout {
    kind:          MetricKind::Error,
    fields:        &[
        Field::one("lane", U16),
        Field::one("tile", U16),
        Field::one("cycle", U16),
        Field::one("error_rate", F32),
        Field::one("num_0_errors", U32),
        Field::one("num_1_errors", U32),
        Field::one("num_2_errors", U32),
        Field::one("num_3_errors", U32),
        Field::one("num_4_errors", U32),
    ],
    record_length: Some(30),
    min_version:   3,
    header:        HeaderLayout::VersionAndLength,
};

pub static TILE: Layout = Layout {
    kind:          MetricKind::Tile,
    fields:        &[
        Field::one("lane", U16),
        Field::one("tile", U16),
        Field::one("metric_code", U16),
        Field::one("metric_value", F32),
    ],
    record_length: Some(10),
    min_version:   2,
    header:        HeaderLayout::VersionAndLength,
};

pub static QUALITY: Layout = Layout {
    kind:          MetricKind::Quality,
    fields:        &[
        Field::one("lane", U16),
        Field::one("tile", U16),
        Field::one("cycle", U16),
        Field::repeated("quality_bins", U32, 50),
    ],
    record_length: Some(206),
    min_version:   4,
    header:        HeaderLayout::VersionAndLength,
};

pub static CORRECTED_INTENSITY: Layout = Layout {
    kind:          MetricKind::CorrectedIntensity,
    fields:        &[
        Field::one("lane", U16),
        Field::one("tile", U16),
        Field::one("cycle", U16),
        Field::one("avg_cycle_intensity", U16),
        Field::repeated("avg_corrected_intensity", U16, 4),
        Field::repeated("avg_corrected_cluster_intensity", U16, 4),
        Field::repeated("num_base_calls", U32, 5),
        Field::one("snr", F32),
    ],
    record_length: Some(48),
    min_version:   2,
    header:        HeaderLayout::VersionAndLength,
};

pub static EXTRACTION: Layout = Layout {
    kind:          MetricKind::Extraction,
    fields:        &[
        Field::one("lane", U16),
        Field::one("tile", U16),
        Field::one("cycle", U16),
        Field::repeated("focus", F32, 4),
        Field::repeated("max_intensity", U16, 4),
        Field::one("datestamp", U64),
    ],
    record_length: Some(38),
    min_version:   2,
    header:        HeaderLayout::VersionAndLength,
};

pub static IMAGE: Layout = Layout {
    kind:          MetricKind::Image,
    fields:        &[
        Field::one("lane", U16),
        Field::one("tile", U16),
        Field::one("cycle", U16),
        Field::one("channel_number", U16),
        Field::one("min_contrast", U16),
        Field::one("max_contrast", U16),
    ],
    record_length: Some(12),
    min_version:   1,
    header:        HeaderLayout::VersionAndLength,
};

pub static PHASING: Layout = Layout {
    kind:          MetricKind::Phasing,
    fields:        &[
        Field::one("lane", U16),
        Field::one("tile", U16),
        Field::one("cycle", U16),
        Field::one("phasing_weight", F32),
        Field::one("prephasing_weight", F32),
    ],
    record_length: Some(14),
    min_version:   1,
    header:        HeaderLayout::VersionAndLength,
};

pub static COLLAPSED_Q: Layout = Layout {
    kind:          MetricKind::CollapsedQ,
    fields:        &[
        Field::one("lane", U16),
        Field::one("tile", U16),
        Field::one("cycle", U16),
        Field::one("q20", U32),
        Field::one("q30", U32),
        Field::one("total_count", U32),
        Field::one("median_score", U32),
    ],
    record_length: Some(22),
    min_version:   2,
    header:        HeaderLayout::VersionAndLength,
};

pub static INDEX: Layout = Layout {
    kind:          MetricKind::Index,
    fields:        &[
        Field::one("lane", U16),
        Field::one("tile", U16),
        Field::one("read_number", U16),
        Field::one("index_name", Text),
        Field::one("cluster_count", U32),
        Field::one("sample_name", Text),
        Field::one("project_name", Text),
    ],
    record_length: None,
    min_version:   1,
    header:        HeaderLayout::VersionOnly,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_lengths_match_field_widths() {
        for kind in MetricKind::ALL {
            let layout = kind.layout();
            assert_eq!(layout.kind, kind);
            assert_eq!(layout.computed_length(), layout.record_length, "{kind}");
        }
    }

    #[test]
    fn record_lengths_fit_in_header_byte() {
        for kind in MetricKind::ALL {
            if let Some(len) = kind.layout().record_length {
                assert!(len <= u8::MAX as usize, "{kind}");
            }
        }
    }

    #[test]
    fn min_versions_are_format_specific() {
        assert_eq!(MetricKind::Error.layout().min_version, 3);
        assert_eq!(MetricKind::Tile.layout().min_version, 2);
        assert_eq!(MetricKind::Quality.layout().min_version, 4);
        assert_eq!(MetricKind::Image.layout().min_version, 1);
        assert_eq!(MetricKind::Phasing.layout().min_version, 1);
    }

    #[test]
    fn quality_layout_expands_bins() {
        let layout = MetricKind::Quality.layout();
        assert_eq!(layout.value_count(), 53);
        assert_eq!(layout.field_name(2), "cycle");
        assert_eq!(layout.field_name(3), "quality_bins");
        assert_eq!(layout.field_name(52), "quality_bins");
        assert_eq!(layout.field_name(53), "<extra>");
    }

    #[test]
    fn names_round_trip() {
        for kind in MetricKind::ALL {
            assert_eq!(MetricKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(MetricKind::from_name("Corrected-Intensity"), Some(MetricKind::CorrectedIntensity));
        assert_eq!(MetricKind::from_name("summary_run"), None);
    }

    #[test]
    fn out_variant_follows_canonical_name() {
        for kind in MetricKind::ALL {
            let [canonical, renamed] = kind.file_names();
            assert_eq!(renamed, canonical.replace(".bin", "Out.bin"));
        }
    }
}
