//! Run-level aggregates over decoded records.
//!
//! Each summary folds a record sequence in one pass and keeps only running
//! sums and counts.  Derived ratios are methods; a zero denominator yields
//! `0.0` rather than an error.
//!
//! # Read partition
//! With [`ReadLengths`] `(forward, index, reverse)`, cycle `c` belongs to
//!
//! | range                              | bucket  |
//! |------------------------------------|---------|
//! | `c <= forward`                     | forward |
//! | `forward < c <= forward + index`   | skipped |
//! | `c >= forward + index + 1`         | reverse |
//!
//! Without read lengths every cycle is forward.

use serde::Serialize;
use std::str::FromStr;

use crate::error::{InteropError, Result};
use crate::record::{ErrorRecord, QualityRecord, TileMetricCodes, TileMetricRecord};

pub mod phix;

pub use phix::write_phix_csv;

/// Quality bins from this index onwards count towards Q30.
pub const Q30_FIRST_BIN: usize = 29;

// ── Read lengths ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadLengths {
    pub forward: u16,
    pub index:   u16,
    pub reverse: u16,
}

/// Which part of the run a cycle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Forward,
    Index,
    Reverse,
}

impl ReadLengths {
    pub fn new(forward: u16, index: u16, reverse: u16) -> Self {
        Self { forward, index, reverse }
    }

    pub fn last_forward_cycle(&self) -> u32 {
        self.forward as u32
    }

    pub fn first_reverse_cycle(&self) -> u32 {
        self.forward as u32 + self.index as u32 + 1
    }

    /// Total cycles in the run.
    pub fn total_cycles(&self) -> u32 {
        self.forward as u32 + self.index as u32 + self.reverse as u32
    }

    pub fn segment(&self, cycle: u16) -> Segment {
        let cycle = cycle as u32;
        if cycle <= self.last_forward_cycle() {
            Segment::Forward
        } else if cycle >= self.first_reverse_cycle() {
            Segment::Reverse
        } else {
            Segment::Index
        }
    }
}

/// Segment of `cycle`, treating everything as forward when no lengths are known.
pub(crate) fn segment_of(read_lengths: Option<&ReadLengths>, cycle: u16) -> Segment {
    read_lengths.map_or(Segment::Forward, |lengths| lengths.segment(cycle))
}

impl FromStr for ReadLengths {
    type Err = InteropError;

    /// Parses `"forward,index,reverse"` or `"forward,index1,index2,reverse"`.
    /// Two index reads are combined into one index length.
    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<u16>()
                    .map_err(|_| InteropError::InvalidReadLengths(s.to_string()))
            })
            .collect::<Result<Vec<u16>>>()?;

        match parts[..] {
            [forward, index, reverse] => Ok(Self::new(forward, index, reverse)),
            [forward, index1, index2, reverse] => {
                let index = index1
                    .checked_add(index2)
                    .ok_or_else(|| InteropError::InvalidReadLengths(s.to_string()))?;
                Ok(Self::new(forward, index, reverse))
            }
            _ => Err(InteropError::InvalidReadLengths(s.to_string())),
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

// ── Tile ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TileMetricSummary {
    pub density_sum:      f64,
    pub density_count:    u64,
    pub total_clusters:   f64,
    pub passing_clusters: f64,
}

impl TileMetricSummary {
    pub fn from_records<'a, I>(records: I, codes: &TileMetricCodes) -> Self
    where
        I: IntoIterator<Item = &'a TileMetricRecord>,
    {
        let mut summary = Self::default();
        for record in records {
            summary.add(record, codes);
        }
        summary
    }

    pub fn add(&mut self, record: &TileMetricRecord, codes: &TileMetricCodes) {
        let value = record.metric_value as f64;
        if record.metric_code == codes.cluster_density {
            self.density_sum += value;
            self.density_count += 1;
        } else if record.metric_code == codes.cluster_count {
            self.total_clusters += value;
        } else if record.metric_code == codes.cluster_count_passing_filters {
            self.passing_clusters += value;
        }
    }

    /// Mean cluster density over tiles, K/mm².
    pub fn cluster_density(&self) -> f64 {
        ratio(self.density_sum, self.density_count as f64)
    }

    pub fn pass_rate(&self) -> f64 {
        ratio(self.passing_clusters, self.total_clusters)
    }
}

// ── Quality ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QualitySummary {
    pub total_count:   u64,
    pub good_count:    u64,
    pub total_reverse: u64,
    pub good_reverse:  u64,
}

impl QualitySummary {
    pub fn from_records<'a, I>(records: I, read_lengths: Option<&ReadLengths>) -> Self
    where
        I: IntoIterator<Item = &'a QualityRecord>,
    {
        let mut summary = Self::default();
        for record in records {
            summary.add(record, read_lengths);
        }
        summary
    }

    pub fn add(&mut self, record: &QualityRecord, read_lengths: Option<&ReadLengths>) {
        let clusters = record.total_clusters();
        let good = record.quality_bins[Q30_FIRST_BIN..].iter().map(|&n| n as u64).sum::<u64>();
        match segment_of(read_lengths, record.cycle) {
            Segment::Forward => {
                self.total_count += clusters;
                self.good_count += good;
            }
            Segment::Reverse => {
                self.total_reverse += clusters;
                self.good_reverse += good;
            }
            Segment::Index => {}
        }
    }

    pub fn q30_forward(&self) -> f64 {
        ratio(self.good_count as f64, self.total_count as f64)
    }

    pub fn q30_reverse(&self) -> f64 {
        ratio(self.good_reverse as f64, self.total_reverse as f64)
    }
}

// ── Error ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorSummary {
    pub error_sum_forward:   f64,
    pub error_count_forward: u64,
    pub error_sum_reverse:   f64,
    pub error_count_reverse: u64,
}

impl ErrorSummary {
    pub fn from_records<'a, I>(records: I, read_lengths: Option<&ReadLengths>) -> Self
    where
        I: IntoIterator<Item = &'a ErrorRecord>,
    {
        let mut summary = Self::default();
        for record in records {
            summary.add(record.cycle, record.error_rate, read_lengths);
        }
        summary
    }

    pub(crate) fn add(&mut self, cycle: u16, error_rate: f32, read_lengths: Option<&ReadLengths>) {
        match segment_of(read_lengths, cycle) {
            Segment::Forward => {
                self.error_sum_forward += error_rate as f64;
                self.error_count_forward += 1;
            }
            Segment::Reverse => {
                self.error_sum_reverse += error_rate as f64;
                self.error_count_reverse += 1;
            }
            Segment::Index => {}
        }
    }

    pub fn error_rate_forward(&self) -> f64 {
        ratio(self.error_sum_forward, self.error_count_forward as f64)
    }

    pub fn error_rate_reverse(&self) -> f64 {
        ratio(self.error_sum_reverse, self.error_count_reverse as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(code: u16, value: f32) -> TileMetricRecord {
        TileMetricRecord { lane: 1, tile: 1101, metric_code: code, metric_value: value }
    }

    fn quality(cycle: u16, bins: &[(usize, u32)]) -> QualityRecord {
        let mut all = [0u32; 50];
        for &(i, n) in bins {
            all[i] = n;
        }
        QualityRecord::new(1, 1101, cycle, &all).unwrap()
    }

    #[test]
    fn tile_summary_density_and_pass_rate() {
        let records = vec![
            tile(100, 40.0),
            tile(100, 60.0),
            tile(102, 1000.0),
            tile(103, 800.0),
            tile(200, 0.1),
        ];
        let summary = TileMetricSummary::from_records(&records, &TileMetricCodes::default());
        assert_eq!(summary.cluster_density(), 50.0);
        assert!((summary.pass_rate() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn tile_summary_custom_codes() {
        let codes = TileMetricCodes { cluster_density: 7, ..TileMetricCodes::default() };
        let summary = TileMetricSummary::from_records(&[tile(7, 12.0), tile(100, 99.0)], &codes);
        assert_eq!(summary.cluster_density(), 12.0);
    }

    #[test]
    fn empty_summaries_are_zero() {
        let tiles = TileMetricSummary::from_records(&[], &TileMetricCodes::default());
        assert_eq!(tiles.cluster_density(), 0.0);
        assert_eq!(tiles.pass_rate(), 0.0);
        let quality = QualitySummary::from_records(&[], None);
        assert_eq!(quality.q30_forward(), 0.0);
        assert_eq!(ErrorSummary::default().error_rate_reverse(), 0.0);
    }

    #[test]
    fn q30_counts_from_bin_29() {
        // 10 clusters at Q29 (index 28), 30 at Q30 (index 29), 60 at Q40.
        let records = vec![quality(1, &[(28, 10), (29, 30), (39, 60)])];
        let summary = QualitySummary::from_records(&records, None);
        assert_eq!(summary.total_count, 100);
        assert_eq!(summary.good_count, 90);
        assert!((summary.q30_forward() - 0.9).abs() < 1e-12);
        assert_eq!(summary.q30_reverse(), 0.0);
    }

    #[test]
    fn quality_partition_skips_index_cycles() {
        let lengths = ReadLengths::new(2, 1, 2);
        let records = vec![
            quality(1, &[(39, 10)]),
            quality(2, &[(0, 10)]),
            quality(3, &[(39, 1000)]), // index
            quality(4, &[(39, 5), (0, 5)]),
            quality(5, &[(39, 5), (0, 5)]),
        ];
        let summary = QualitySummary::from_records(&records, Some(&lengths));
        assert_eq!((summary.good_count, summary.total_count), (10, 20));
        assert_eq!((summary.good_reverse, summary.total_reverse), (10, 20));
        assert!((summary.q30_reverse() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn forward_only_run_has_no_reverse_q30() {
        let lengths = ReadLengths::new(3, 0, 0);
        let records = vec![quality(1, &[(39, 10)]), quality(3, &[(39, 10)])];
        let summary = QualitySummary::from_records(&records, Some(&lengths));
        assert_eq!(summary.q30_reverse(), 0.0);
        assert_eq!(summary.q30_forward(), 1.0);
    }

    #[test]
    fn quality_sums_do_not_overflow() {
        let bins = [u32::MAX; 50];
        let record = QualityRecord::new(1, 1, 1, &bins).unwrap();
        let summary = QualitySummary::from_records([&record, &record], None);
        assert_eq!(summary.total_count, 100 * u32::MAX as u64);
    }

    #[test]
    fn read_lengths_parse() {
        assert_eq!("150,8,150".parse::<ReadLengths>().unwrap(), ReadLengths::new(150, 8, 150));
        assert_eq!(" 150, 8, 8 ,150 ".parse::<ReadLengths>().unwrap(), ReadLengths::new(150, 16, 150));
        let err = "150,150".parse::<ReadLengths>().unwrap_err();
        assert!(err.to_string().contains("must be 3 or 4"));
        assert!("150,x,150".parse::<ReadLengths>().is_err());
        assert!("1,2,3,4,5".parse::<ReadLengths>().is_err());
    }

    #[test]
    fn segments() {
        let lengths = ReadLengths::new(150, 8, 150);
        assert_eq!(lengths.first_reverse_cycle(), 159);
        assert_eq!(lengths.segment(150), Segment::Forward);
        assert_eq!(lengths.segment(151), Segment::Index);
        assert_eq!(lengths.segment(158), Segment::Index);
        assert_eq!(lengths.segment(159), Segment::Reverse);
        assert_eq!(segment_of(None, 400), Segment::Forward);
    }
}
