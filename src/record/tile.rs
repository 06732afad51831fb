use super::{impl_row_eq, record_variant, MetricRecord};
use crate::error::Result;
use crate::format::MetricKind;
use crate::value::{FieldValue, Fields, FlatRecord};

/// Generic `(lane, tile, metric_code, metric_value)` tuple.
///
/// What a code means is decided by [`TileMetricCodes`], not by the decoder.
#[derive(Debug, Clone)]
pub struct TileMetricRecord {
    pub lane:         u16,
    pub tile:         u16,
    pub metric_code:  u16,
    pub metric_value: f32,
}

impl MetricRecord for TileMetricRecord {
    const KIND: MetricKind = MetricKind::Tile;

    fn from_values(values: Vec<FieldValue>) -> Result<Self> {
        let mut f = Fields::new(values);
        let record = Self {
            lane:         f.u16("lane")?,
            tile:         f.u16("tile")?,
            metric_code:  f.u16("metric_code")?,
            metric_value: f.f32("metric_value")?,
        };
        f.finish()?;
        Ok(record)
    }

    fn to_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::U16(self.lane),
            FieldValue::U16(self.tile),
            FieldValue::U16(self.metric_code),
            FieldValue::F32(self.metric_value),
        ]
    }

    fn to_flat_mapping(&self) -> FlatRecord {
        let mut out = FlatRecord::default();
        out.push("lane", self.lane);
        out.push("tile", self.tile);
        out.push("metric_code", self.metric_code);
        out.push("metric_value", self.metric_value);
        out
    }

    fn lane(&self) -> u16 { self.lane }
    fn tile(&self) -> u16 { self.tile }

    record_variant!(Tile);
}

impl_row_eq!(TileMetricRecord);

/// Meaning of tile metric codes.
///
/// Per-read codes are derived: phasing for read `N` is `200 + (N - 1) * 2`,
/// prephasing `201 + (N - 1) * 2`, percent aligned `300 + N - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMetricCodes {
    /// K/mm².
    pub cluster_density:                 u16,
    /// K/mm².
    pub cluster_density_passing_filters: u16,
    pub cluster_count:                   u16,
    pub cluster_count_passing_filters:   u16,
}

impl TileMetricCodes {
    pub const CLUSTER_DENSITY:                 u16 = 100;
    pub const CLUSTER_DENSITY_PASSING_FILTERS: u16 = 101;
    pub const CLUSTER_COUNT:                   u16 = 102;
    pub const CLUSTER_COUNT_PASSING_FILTERS:   u16 = 103;

    /// Phasing code for 1-based read `read`, or `None` once the code
    /// would not fit in a `u16`.
    pub fn phasing(read: u16) -> Option<u16> {
        read.saturating_sub(1).checked_mul(2)?.checked_add(200)
    }

    pub fn prephasing(read: u16) -> Option<u16> {
        read.saturating_sub(1).checked_mul(2)?.checked_add(201)
    }

    pub fn percent_aligned(read: u16) -> Option<u16> {
        read.saturating_sub(1).checked_add(300)
    }

    /// Human-readable name for a code, if it is one this table knows.
    pub fn describe(&self, code: u16) -> Option<String> {
        match code {
            c if c == self.cluster_density                 => Some("cluster density".into()),
            c if c == self.cluster_density_passing_filters => Some("cluster density passing filters".into()),
            c if c == self.cluster_count                   => Some("cluster count".into()),
            c if c == self.cluster_count_passing_filters   => Some("cluster count passing filters".into()),
            200..=299 if code % 2 == 0 => Some(format!("phasing for read {}", (code - 200) / 2 + 1)),
            200..=299                  => Some(format!("prephasing for read {}", (code - 201) / 2 + 1)),
            300..=399                  => Some(format!("percent aligned for read {}", code - 300 + 1)),
            _ => None,
        }
    }
}

impl Default for TileMetricCodes {
    fn default() -> Self {
        Self {
            cluster_density:                 Self::CLUSTER_DENSITY,
            cluster_density_passing_filters: Self::CLUSTER_DENSITY_PASSING_FILTERS,
            cluster_count:                   Self::CLUSTER_COUNT,
            cluster_count_passing_filters:   Self::CLUSTER_COUNT_PASSING_FILTERS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_read_codes() {
        assert_eq!(TileMetricCodes::phasing(1), Some(200));
        assert_eq!(TileMetricCodes::prephasing(1), Some(201));
        assert_eq!(TileMetricCodes::phasing(2), Some(202));
        assert_eq!(TileMetricCodes::prephasing(3), Some(205));
        assert_eq!(TileMetricCodes::percent_aligned(1), Some(300));
        assert_eq!(TileMetricCodes::percent_aligned(4), Some(303));
    }

    #[test]
    fn per_read_codes_out_of_range() {
        assert_eq!(TileMetricCodes::phasing(32_668), Some(65_534));
        assert_eq!(TileMetricCodes::prephasing(32_668), Some(65_535));
        assert_eq!(TileMetricCodes::phasing(32_669), None);
        assert_eq!(TileMetricCodes::prephasing(32_669), None);
        assert_eq!(TileMetricCodes::percent_aligned(u16::MAX), None);
        assert_eq!(TileMetricCodes::phasing(u16::MAX), None);
    }

    #[test]
    fn describe_round_trips_derived_codes() {
        let codes = TileMetricCodes::default();
        assert_eq!(codes.describe(100).as_deref(), Some("cluster density"));
        assert_eq!(codes.describe(103).as_deref(), Some("cluster count passing filters"));
        assert_eq!(codes.describe(TileMetricCodes::phasing(2).unwrap()).as_deref(), Some("phasing for read 2"));
        assert_eq!(codes.describe(TileMetricCodes::prephasing(2).unwrap()).as_deref(), Some("prephasing for read 2"));
        assert_eq!(codes.describe(TileMetricCodes::percent_aligned(3).unwrap()).as_deref(), Some("percent aligned for read 3"));
        assert_eq!(codes.describe(42), None);
    }
}
