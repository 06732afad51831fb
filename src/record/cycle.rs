//! Per-cycle records: one row per (lane, tile, cycle).

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::{impl_row_eq, record_variant, MetricRecord};
use crate::error::{InteropError, Result};
use crate::format::MetricKind;
use crate::value::{FieldValue, Fields, FlatRecord};

/// Quality scores 1..=50, one bin each.
pub const QUALITY_BIN_COUNT: usize = 50;

/// Low 62 bits of an extraction datestamp: 100 ns ticks since 0001-01-01.
pub const DATESTAMP_MASK: u64 = (1 << 62) - 1;

const TICKS_PER_SECOND: u64 = 10_000_000;

// ── Error ───────────────────────────────────────────────────────────────────

/// PhiX error rate for one cycle, with a histogram of reads by error count.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub lane:         u16,
    pub tile:         u16,
    pub cycle:        u16,
    pub error_rate:   f32,
    pub num_0_errors: u32,
    pub num_1_errors: u32,
    pub num_2_errors: u32,
    pub num_3_errors: u32,
    pub num_4_errors: u32,
}

impl MetricRecord for ErrorRecord {
    const KIND: MetricKind = MetricKind::Error;

    fn from_values(values: Vec<FieldValue>) -> Result<Self> {
        let mut f = Fields::new(values);
        let record = Self {
            lane:         f.u16("lane")?,
            tile:         f.u16("tile")?,
            cycle:        f.u16("cycle")?,
            error_rate:   f.f32("error_rate")?,
            num_0_errors: f.u32("num_0_errors")?,
            num_1_errors: f.u32("num_1_errors")?,
            num_2_errors: f.u32("num_2_errors")?,
            num_3_errors: f.u32("num_3_errors")?,
            num_4_errors: f.u32("num_4_errors")?,
        };
        f.finish()?;
        Ok(record)
    }

    fn to_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::U16(self.lane),
            FieldValue::U16(self.tile),
            FieldValue::U16(self.cycle),
            FieldValue::F32(self.error_rate),
            FieldValue::U32(self.num_0_errors),
            FieldValue::U32(self.num_1_errors),
            FieldValue::U32(self.num_2_errors),
            FieldValue::U32(self.num_3_errors),
            FieldValue::U32(self.num_4_errors),
        ]
    }

    fn to_flat_mapping(&self) -> FlatRecord {
        let mut out = FlatRecord::default();
        out.push("lane", self.lane);
        out.push("tile", self.tile);
        out.push("cycle", self.cycle);
        out.push("error_rate", self.error_rate);
        out.push("num_0_errors", self.num_0_errors);
        out.push("num_1_errors", self.num_1_errors);
        out.push("num_2_errors", self.num_2_errors);
        out.push("num_3_errors", self.num_3_errors);
        out.push("num_4_errors", self.num_4_errors);
        out
    }

    fn lane(&self) -> u16 { self.lane }
    fn tile(&self) -> u16 { self.tile }

    record_variant!(Error);
}

// ── Quality ─────────────────────────────────────────────────────────────────

/// Cluster counts per quality score for one cycle.
///
/// `quality_bins[i]` counts clusters with quality score `i + 1`.
#[derive(Debug, Clone)]
pub struct QualityRecord {
    pub lane:         u16,
    pub tile:         u16,
    pub cycle:        u16,
    pub quality_bins: [u32; QUALITY_BIN_COUNT],
}

impl QualityRecord {
    /// Fails with `FieldValidation` unless exactly 50 bins are supplied.
    pub fn new(lane: u16, tile: u16, cycle: u16, quality_bins: &[u32]) -> Result<Self> {
        let quality_bins: [u32; QUALITY_BIN_COUNT] = quality_bins.try_into().map_err(|_| {
            InteropError::field(
                "quality_bins",
                format!("expected {QUALITY_BIN_COUNT} bins, got {}", quality_bins.len()),
            )
        })?;
        Ok(Self { lane, tile, cycle, quality_bins })
    }

    /// Sum of every bin.
    pub fn total_clusters(&self) -> u64 {
        self.quality_bins.iter().map(|&n| n as u64).sum()
    }

    /// Sum of the bins for quality scores `>= min_quality`.
    pub fn clusters_at_or_above(&self, min_quality: usize) -> u64 {
        let start = min_quality.saturating_sub(1).min(QUALITY_BIN_COUNT);
        self.quality_bins[start..].iter().map(|&n| n as u64).sum()
    }
}

impl MetricRecord for QualityRecord {
    const KIND: MetricKind = MetricKind::Quality;

    fn from_values(values: Vec<FieldValue>) -> Result<Self> {
        let mut f = Fields::new(values);
        let record = Self {
            lane:         f.u16("lane")?,
            tile:         f.u16("tile")?,
            cycle:        f.u16("cycle")?,
            quality_bins: f.u32_array("quality_bins")?,
        };
        f.finish()?;
        Ok(record)
    }

    fn to_values(&self) -> Vec<FieldValue> {
        let mut values = Vec::with_capacity(3 + QUALITY_BIN_COUNT);
        values.push(FieldValue::U16(self.lane));
        values.push(FieldValue::U16(self.tile));
        values.push(FieldValue::U16(self.cycle));
        values.extend(self.quality_bins.iter().map(|&n| FieldValue::U32(n)));
        values
    }

    /// Bins are flattened into `q01`..`q50` rather than nested.
    fn to_flat_mapping(&self) -> FlatRecord {
        let mut out = FlatRecord::default();
        out.push("lane", self.lane);
        out.push("tile", self.tile);
        out.push("cycle", self.cycle);
        for (i, &count) in self.quality_bins.iter().enumerate() {
            out.push(format!("q{:02}", i + 1), count);
        }
        out
    }

    fn lane(&self) -> u16 { self.lane }
    fn tile(&self) -> u16 { self.tile }

    record_variant!(Quality);
}

// ── Corrected intensity ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CorrectedIntensityRecord {
    pub lane:                              u16,
    pub tile:                              u16,
    pub cycle:                             u16,
    pub avg_cycle_intensity:               u16,
    pub avg_corrected_intensity_a:         u16,
    pub avg_corrected_intensity_c:         u16,
    pub avg_corrected_intensity_g:         u16,
    pub avg_corrected_intensity_t:         u16,
    pub avg_corrected_cluster_intensity_a: u16,
    pub avg_corrected_cluster_intensity_c: u16,
    pub avg_corrected_cluster_intensity_g: u16,
    pub avg_corrected_cluster_intensity_t: u16,
    pub num_base_calls_none:               u32,
    pub num_base_calls_a:                  u32,
    pub num_base_calls_c:                  u32,
    pub num_base_calls_g:                  u32,
    pub num_base_calls_t:                  u32,
    /// Signal to noise ratio.
    pub snr:                               f32,
}

impl MetricRecord for CorrectedIntensityRecord {
    const KIND: MetricKind = MetricKind::CorrectedIntensity;

    fn from_values(values: Vec<FieldValue>) -> Result<Self> {
        let mut f = Fields::new(values);
        let record = Self {
            lane:                              f.u16("lane")?,
            tile:                              f.u16("tile")?,
            cycle:                             f.u16("cycle")?,
            avg_cycle_intensity:               f.u16("avg_cycle_intensity")?,
            avg_corrected_intensity_a:         f.u16("avg_corrected_intensity_a")?,
            avg_corrected_intensity_c:         f.u16("avg_corrected_intensity_c")?,
            avg_corrected_intensity_g:         f.u16("avg_corrected_intensity_g")?,
            avg_corrected_intensity_t:         f.u16("avg_corrected_intensity_t")?,
            avg_corrected_cluster_intensity_a: f.u16("avg_corrected_cluster_intensity_a")?,
            avg_corrected_cluster_intensity_c: f.u16("avg_corrected_cluster_intensity_c")?,
            avg_corrected_cluster_intensity_g: f.u16("avg_corrected_cluster_intensity_g")?,
            avg_corrected_cluster_intensity_t: f.u16("avg_corrected_cluster_intensity_t")?,
            num_base_calls_none:               f.u32("num_base_calls_none")?,
            num_base_calls_a:                  f.u32("num_base_calls_a")?,
            num_base_calls_c:                  f.u32("num_base_calls_c")?,
            num_base_calls_g:                  f.u32("num_base_calls_g")?,
            num_base_calls_t:                  f.u32("num_base_calls_t")?,
            snr:                               f.f32("snr")?,
        };
        f.finish()?;
        Ok(record)
    }

    fn to_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::U16(self.lane),
            FieldValue::U16(self.tile),
            FieldValue::U16(self.cycle),
            FieldValue::U16(self.avg_cycle_intensity),
            FieldValue::U16(self.avg_corrected_intensity_a),
            FieldValue::U16(self.avg_corrected_intensity_c),
            FieldValue::U16(self.avg_corrected_intensity_g),
            FieldValue::U16(self.avg_corrected_intensity_t),
            FieldValue::U16(self.avg_corrected_cluster_intensity_a),
            FieldValue::U16(self.avg_corrected_cluster_intensity_c),
            FieldValue::U16(self.avg_corrected_cluster_intensity_g),
            FieldValue::U16(self.avg_corrected_cluster_intensity_t),
            FieldValue::U32(self.num_base_calls_none),
            FieldValue::U32(self.num_base_calls_a),
            FieldValue::U32(self.num_base_calls_c),
            FieldValue::U32(self.num_base_calls_g),
            FieldValue::U32(self.num_base_calls_t),
            FieldValue::F32(self.snr),
        ]
    }

    fn to_flat_mapping(&self) -> FlatRecord {
        let mut out = FlatRecord::default();
        out.push("lane", self.lane);
        out.push("tile", self.tile);
        out.push("cycle", self.cycle);
        out.push("avg_cycle_intensity", self.avg_cycle_intensity);
        out.push("avg_corrected_intensity_a", self.avg_corrected_intensity_a);
        out.push("avg_corrected_intensity_c", self.avg_corrected_intensity_c);
        out.push("avg_corrected_intensity_g", self.avg_corrected_intensity_g);
        out.push("avg_corrected_intensity_t", self.avg_corrected_intensity_t);
        out.push("avg_corrected_cluster_intensity_a", self.avg_corrected_cluster_intensity_a);
        out.push("avg_corrected_cluster_intensity_c", self.avg_corrected_cluster_intensity_c);
        out.push("avg_corrected_cluster_intensity_g", self.avg_corrected_cluster_intensity_g);
        out.push("avg_corrected_cluster_intensity_t", self.avg_corrected_cluster_intensity_t);
        out.push("num_base_calls_none", self.num_base_calls_none);
        out.push("num_base_calls_a", self.num_base_calls_a);
        out.push("num_base_calls_c", self.num_base_calls_c);
        out.push("num_base_calls_g", self.num_base_calls_g);
        out.push("num_base_calls_t", self.num_base_calls_t);
        out.push("snr", self.snr);
        out
    }

    fn lane(&self) -> u16 { self.lane }
    fn tile(&self) -> u16 { self.tile }

    record_variant!(CorrectedIntensity);
}

// ── Extraction ──────────────────────────────────────────────────────────────

/// Focus and peak intensity per channel, stamped with the acquisition time.
#[derive(Debug, Clone)]
pub struct ExtractionRecord {
    pub lane:            u16,
    pub tile:            u16,
    pub cycle:           u16,
    pub focus_a:         f32,
    pub focus_c:         f32,
    pub focus_g:         f32,
    pub focus_t:         f32,
    pub max_intensity_a: u16,
    pub max_intensity_c: u16,
    pub max_intensity_g: u16,
    pub max_intensity_t: u16,
    /// Raw 64-bit stamp: 2-bit kind in the top bits, 62-bit tick count below.
    pub datestamp:       u64,
}

impl ExtractionRecord {
    /// The top two bits of the datestamp; ignored by [`timestamp`](Self::timestamp).
    pub fn datestamp_kind(&self) -> u8 {
        (self.datestamp >> 62) as u8
    }

    /// Acquisition time: the low 62 bits counted as 100 ns ticks from
    /// `0001-01-01T00:00:00`.
    ///
    /// `None` only if the result falls outside chrono's representable range.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let ticks = self.datestamp & DATESTAMP_MASK;
        let epoch = NaiveDate::from_ymd_opt(1, 1, 1)?.and_hms_opt(0, 0, 0)?;
        let seconds = Duration::try_seconds((ticks / TICKS_PER_SECOND) as i64)?;
        let nanos = Duration::nanoseconds(((ticks % TICKS_PER_SECOND) * 100) as i64);
        epoch.checked_add_signed(seconds)?.checked_add_signed(nanos)
    }
}

impl MetricRecord for ExtractionRecord {
    const KIND: MetricKind = MetricKind::Extraction;

    fn from_values(values: Vec<FieldValue>) -> Result<Self> {
        let mut f = Fields::new(values);
        let record = Self {
            lane:            f.u16("lane")?,
            tile:            f.u16("tile")?,
            cycle:           f.u16("cycle")?,
            focus_a:         f.f32("focus_a")?,
            focus_c:         f.f32("focus_c")?,
            focus_g:         f.f32("focus_g")?,
            focus_t:         f.f32("focus_t")?,
            max_intensity_a: f.u16("max_intensity_a")?,
            max_intensity_c: f.u16("max_intensity_c")?,
            max_intensity_g: f.u16("max_intensity_g")?,
            max_intensity_t: f.u16("max_intensity_t")?,
            datestamp:       f.u64("datestamp")?,
        };
        f.finish()?;
        Ok(record)
    }

    fn to_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::U16(self.lane),
            FieldValue::U16(self.tile),
            FieldValue::U16(self.cycle),
            FieldValue::F32(self.focus_a),
            FieldValue::F32(self.focus_c),
            FieldValue::F32(self.focus_g),
            FieldValue::F32(self.focus_t),
            FieldValue::U16(self.max_intensity_a),
            FieldValue::U16(self.max_intensity_c),
            FieldValue::U16(self.max_intensity_g),
            FieldValue::U16(self.max_intensity_t),
            FieldValue::U64(self.datestamp),
        ]
    }

    fn to_flat_mapping(&self) -> FlatRecord {
        let mut out = FlatRecord::default();
        out.push("lane", self.lane);
        out.push("tile", self.tile);
        out.push("cycle", self.cycle);
        out.push("focus_a", self.focus_a);
        out.push("focus_c", self.focus_c);
        out.push("focus_g", self.focus_g);
        out.push("focus_t", self.focus_t);
        out.push("max_intensity_a", self.max_intensity_a);
        out.push("max_intensity_c", self.max_intensity_c);
        out.push("max_intensity_g", self.max_intensity_g);
        out.push("max_intensity_t", self.max_intensity_t);
        out.push("datestamp", self.datestamp);
        let datetime = self
            .timestamp()
            .map(|t| t.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
            .unwrap_or_default();
        out.push("datetime", datetime);
        out
    }

    fn lane(&self) -> u16 { self.lane }
    fn tile(&self) -> u16 { self.tile }

    record_variant!(Extraction);
}

// ── Image ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub lane:           u16,
    pub tile:           u16,
    pub cycle:          u16,
    pub channel_number: u16,
    pub min_contrast:   u16,
    pub max_contrast:   u16,
}

impl MetricRecord for ImageRecord {
    const KIND: MetricKind = MetricKind::Image;

    fn from_values(values: Vec<FieldValue>) -> Result<Self> {
        let mut f = Fields::new(values);
        let record = Self {
            lane:           f.u16("lane")?,
            tile:           f.u16("tile")?,
            cycle:          f.u16("cycle")?,
            channel_number: f.u16("channel_number")?,
            min_contrast:   f.u16("min_contrast")?,
            max_contrast:   f.u16("max_contrast")?,
        };
        f.finish()?;
        Ok(record)
    }

    fn to_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::U16(self.lane),
            FieldValue::U16(self.tile),
            FieldValue::U16(self.cycle),
            FieldValue::U16(self.channel_number),
            FieldValue::U16(self.min_contrast),
            FieldValue::U16(self.max_contrast),
        ]
    }

    fn to_flat_mapping(&self) -> FlatRecord {
        let mut out = FlatRecord::default();
        out.push("lane", self.lane);
        out.push("tile", self.tile);
        out.push("cycle", self.cycle);
        out.push("channel_number", self.channel_number);
        out.push("min_contrast", self.min_contrast);
        out.push("max_contrast", self.max_contrast);
        out
    }

    fn lane(&self) -> u16 { self.lane }
    fn tile(&self) -> u16 { self.tile }

    record_variant!(Image);
}

// ── Phasing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PhasingRecord {
    pub lane:              u16,
    pub tile:              u16,
    pub cycle:             u16,
    pub phasing_weight:    f32,
    pub prephasing_weight: f32,
}

impl MetricRecord for PhasingRecord {
    const KIND: MetricKind = MetricKind::Phasing;

    fn from_values(values: Vec<FieldValue>) -> Result<Self> {
        let mut f = Fields::new(values);
        let record = Self {
            lane:              f.u16("lane")?,
            tile:              f.u16("tile")?,
            cycle:             f.u16("cycle")?,
            phasing_weight:    f.f32("phasing_weight")?,
            prephasing_weight: f.f32("prephasing_weight")?,
        };
        f.finish()?;
        Ok(record)
    }

    fn to_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::U16(self.lane),
            FieldValue::U16(self.tile),
            FieldValue::U16(self.cycle),
            FieldValue::F32(self.phasing_weight),
            FieldValue::F32(self.prephasing_weight),
        ]
    }

    fn to_flat_mapping(&self) -> FlatRecord {
        let mut out = FlatRecord::default();
        out.push("lane", self.lane);
        out.push("tile", self.tile);
        out.push("cycle", self.cycle);
        out.push("phasing_weight", self.phasing_weight);
        out.push("prephasing_weight", self.prephasing_weight);
        out
    }

    fn lane(&self) -> u16 { self.lane }
    fn tile(&self) -> u16 { self.tile }

    record_variant!(Phasing);
}

// ── Collapsed Q ─────────────────────────────────────────────────────────────

/// Quality histogram collapsed to Q20/Q30 counts (`QMetrics2030.bin`).
#[derive(Debug, Clone)]
pub struct CollapsedQRecord {
    pub lane:         u16,
    pub tile:         u16,
    pub cycle:        u16,
    pub q20:          u32,
    pub q30:          u32,
    pub total_count:  u32,
    pub median_score: u32,
}

impl MetricRecord for CollapsedQRecord {
    const KIND: MetricKind = MetricKind::CollapsedQ;

    fn from_values(values: Vec<FieldValue>) -> Result<Self> {
        let mut f = Fields::new(values);
        let record = Self {
            lane:         f.u16("lane")?,
            tile:         f.u16("tile")?,
            cycle:        f.u16("cycle")?,
            q20:          f.u32("q20")?,
            q30:          f.u32("q30")?,
            total_count:  f.u32("total_count")?,
            median_score: f.u32("median_score")?,
        };
        f.finish()?;
        Ok(record)
    }

    fn to_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::U16(self.lane),
            FieldValue::U16(self.tile),
            FieldValue::U16(self.cycle),
            FieldValue::U32(self.q20),
            FieldValue::U32(self.q30),
            FieldValue::U32(self.total_count),
            FieldValue::U32(self.median_score),
        ]
    }

    fn to_flat_mapping(&self) -> FlatRecord {
        let mut out = FlatRecord::default();
        out.push("lane", self.lane);
        out.push("tile", self.tile);
        out.push("cycle", self.cycle);
        out.push("q20", self.q20);
        out.push("q30", self.q30);
        out.push("total_count", self.total_count);
        out.push("median_score", self.median_score);
        out
    }

    fn lane(&self) -> u16 { self.lane }
    fn tile(&self) -> u16 { self.tile }

    record_variant!(CollapsedQ);
}

impl_row_eq!(
    ErrorRecord,
    QualityRecord,
    CorrectedIntensityRecord,
    ExtractionRecord,
    ImageRecord,
    PhasingRecord,
    CollapsedQRecord,
);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn extraction(datestamp: u64) -> ExtractionRecord {
        ExtractionRecord {
            lane: 1, tile: 1101, cycle: 1,
            focus_a: 2.5, focus_c: 2.5, focus_g: 2.5, focus_t: 2.5,
            max_intensity_a: 100, max_intensity_c: 200, max_intensity_g: 300, max_intensity_t: 400,
            datestamp,
        }
    }

    #[test]
    fn quality_bins_must_be_fifty() {
        for (len, ok) in [(49usize, false), (50, true), (51, false)] {
            let bins: Vec<u32> = (0..len as u32).collect();
            let result = QualityRecord::new(0, 1, 2, &bins);
            assert_eq!(result.is_ok(), ok, "len {len}");
            if let Err(e) = result {
                assert!(matches!(e, InteropError::FieldValidation { ref field, .. } if field == "quality_bins"));
            }
        }
    }

    #[test]
    fn quality_flat_mapping_is_flat() {
        let bins: Vec<u32> = (0..50).collect();
        let record = QualityRecord::new(0, 1, 2, &bins).unwrap();
        let flat = record.to_flat_mapping();
        let keys: Vec<&str> = flat.keys().collect();
        assert_eq!(keys.len(), 53);
        assert_eq!(&keys[..4], &["lane", "tile", "cycle", "q01"]);
        assert_eq!(keys[52], "q50");
        assert_eq!(flat.get("q30"), Some(&crate::value::FlatValue::Int(29)));
    }

    #[test]
    fn quality_row_with_too_few_bins_rejected() {
        let bins: Vec<u32> = vec![1; 50];
        let mut values = QualityRecord::new(1, 2, 3, &bins).unwrap().to_values();
        values.pop();
        assert!(QualityRecord::from_values(values).is_err());
    }

    #[test]
    fn q30_counts_from_bin_index_29() {
        let mut bins = [0u32; 50];
        bins[28] = 7;   // Q29
        bins[29] = 30;  // Q30
        bins[49] = 3;   // Q50
        let record = QualityRecord::new(1, 1, 1, &bins).unwrap();
        assert_eq!(record.total_clusters(), 40);
        assert_eq!(record.clusters_at_or_above(30), 33);
    }

    #[test]
    fn zero_datestamp_is_year_one() {
        let ts = extraction(0).timestamp().unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (1, 1, 1));
        assert_eq!((ts.hour(), ts.minute(), ts.second(), ts.nanosecond()), (0, 0, 0, 0));
    }

    #[test]
    fn kind_bits_are_ignored() {
        let ticks: u64 = 635_000_000_000_000_000 + 1_234_567;
        let plain = extraction(ticks);
        let flagged = extraction(ticks | (0b11 << 62));
        assert_eq!(flagged.datestamp_kind(), 3);
        assert_eq!(plain.datestamp_kind(), 0);
        assert_eq!(plain.timestamp(), flagged.timestamp());
    }

    #[test]
    fn ticks_are_hundred_nanoseconds() {
        // one day, one second and 3 ticks
        let ticks = 86_400 * TICKS_PER_SECOND + TICKS_PER_SECOND + 3;
        let ts = extraction(ticks).timestamp().unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (1, 1, 2));
        assert_eq!(ts.second(), 1);
        assert_eq!(ts.nanosecond(), 300);
    }

    #[test]
    fn extraction_flat_mapping_has_datetime() {
        let flat = extraction(0).to_flat_mapping();
        assert_eq!(flat.keys().last(), Some("datetime"));
        assert_eq!(flat.get("timestamp"), None);
        assert_eq!(
            flat.get("datetime"),
            Some(&crate::value::FlatValue::Text("0001-01-01T00:00:00".into()))
        );
    }

    #[test]
    fn error_records_compare_floats_with_tolerance() {
        let a = ErrorRecord {
            lane: 1, tile: 2, cycle: 3, error_rate: 0.99,
            num_0_errors: 1, num_1_errors: 2, num_2_errors: 3, num_3_errors: 4, num_4_errors: 5,
        };
        let mut b = a.clone();
        b.error_rate = f32::from_bits(a.error_rate.to_bits() + 1);
        assert_eq!(a, b);
        b.error_rate = 0.9901;
        assert_ne!(a, b);
        let mut c = a.clone();
        c.num_4_errors = 6;
        assert_ne!(a, c);
    }
}
