use std::borrow::Cow;

use super::{impl_row_eq, record_variant, MetricRecord};
use crate::error::{InteropError, Result};
use crate::format::MetricKind;
use crate::value::{FieldValue, Fields, FlatRecord};

/// Cluster count per index sequence, sample and project.
///
/// The three names are stored as the raw bytes found on disk; the accessor
/// methods decode them as UTF-8, replacing invalid sequences.
#[derive(Debug, Clone)]
pub struct IndexRecord {
    pub lane:          u16,
    pub tile:          u16,
    pub read_number:   u16,
    pub index_name:    Vec<u8>,
    pub cluster_count: u32,
    pub sample_name:   Vec<u8>,
    pub project_name:  Vec<u8>,
}

impl IndexRecord {
    /// Fails with `FieldValidation` if a name does not fit a u16 length prefix.
    pub fn new(
        lane:          u16,
        tile:          u16,
        read_number:   u16,
        index_name:    impl Into<Vec<u8>>,
        cluster_count: u32,
        sample_name:   impl Into<Vec<u8>>,
        project_name:  impl Into<Vec<u8>>,
    ) -> Result<Self> {
        let record = Self {
            lane,
            tile,
            read_number,
            index_name: index_name.into(),
            cluster_count,
            sample_name: sample_name.into(),
            project_name: project_name.into(),
        };
        record.validate()?;
        Ok(record)
    }

    fn validate(&self) -> Result<()> {
        for (field, bytes) in [
            ("index_name", &self.index_name),
            ("sample_name", &self.sample_name),
            ("project_name", &self.project_name),
        ] {
            check_text_len(field, bytes)?;
        }
        Ok(())
    }

    pub fn index_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.index_name)
    }

    pub fn sample_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.sample_name)
    }

    pub fn project_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.project_name)
    }
}

pub(crate) fn check_text_len(field: &str, bytes: &[u8]) -> Result<()> {
    if bytes.len() > u16::MAX as usize {
        return Err(InteropError::field(
            field,
            format!("{} bytes exceeds the u16 length prefix", bytes.len()),
        ));
    }
    Ok(())
}

impl MetricRecord for IndexRecord {
    const KIND: MetricKind = MetricKind::Index;

    fn from_values(values: Vec<FieldValue>) -> Result<Self> {
        let mut f = Fields::new(values);
        let record = Self {
            lane:          f.u16("lane")?,
            tile:          f.u16("tile")?,
            read_number:   f.u16("read_number")?,
            index_name:    f.text("index_name")?,
            cluster_count: f.u32("cluster_count")?,
            sample_name:   f.text("sample_name")?,
            project_name:  f.text("project_name")?,
        };
        f.finish()?;
        record.validate()?;
        Ok(record)
    }

    fn to_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::U16(self.lane),
            FieldValue::U16(self.tile),
            FieldValue::U16(self.read_number),
            FieldValue::Text(self.index_name.clone()),
            FieldValue::U32(self.cluster_count),
            FieldValue::Text(self.sample_name.clone()),
            FieldValue::Text(self.project_name.clone()),
        ]
    }

    fn to_flat_mapping(&self) -> FlatRecord {
        let mut out = FlatRecord::default();
        out.push("lane", self.lane);
        out.push("tile", self.tile);
        out.push("read_number", self.read_number);
        out.push("index_name", self.index_name().into_owned());
        out.push("cluster_count", self.cluster_count);
        out.push("sample_name", self.sample_name().into_owned());
        out.push("project_name", self.project_name().into_owned());
        out
    }

    fn lane(&self) -> u16 { self.lane }
    fn tile(&self) -> u16 { self.tile }

    record_variant!(Index);
}

impl_row_eq!(IndexRecord);
