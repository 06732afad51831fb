//! JSON and CSV export of decoded records.
//!
//! Both formats are built from [`Record::to_flat_mapping`], so column names
//! and order are the same in either.

use serde::Serialize;
use std::io::Write;

use crate::error::Result;
use crate::format::MetricKind;
use crate::record::Record;

#[derive(Serialize)]
struct MetricExport<'a> {
    run_name:     &'a str,
    metric:       &'a str,
    record_count: usize,
    records:      &'a [Record],
}

/// Pretty-printed `{run_name, metric, record_count, records}` document.
pub fn write_json<W: Write>(
    mut writer: W,
    run_name: &str,
    kind: MetricKind,
    records: &[Record],
) -> Result<()> {
    let export = MetricExport {
        run_name,
        metric: kind.name(),
        record_count: records.len(),
        records,
    };
    serde_json::to_writer_pretty(&mut writer, &export)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// One row per record, header taken from the first record's keys.
/// Writes nothing for an empty slice.
pub fn write_csv<W: Write>(writer: W, records: &[Record]) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };

    let mut out = csv::Writer::from_writer(writer);
    out.write_record(first.to_flat_mapping().keys())?;
    for record in records {
        let row = record.to_flat_mapping();
        out.write_record(row.0.iter().map(|(_, value)| value.to_string()))?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{QualityRecord, TileMetricRecord};

    fn tiles() -> Vec<Record> {
        vec![
            Record::Tile(TileMetricRecord { lane: 1, tile: 1101, metric_code: 100, metric_value: 0.5 }),
            Record::Tile(TileMetricRecord { lane: 1, tile: 1102, metric_code: 103, metric_value: 2.0 }),
        ]
    }

    #[test]
    fn json_document_shape() {
        let mut buf = Vec::new();
        write_json(&mut buf, "run_1", MetricKind::Tile, &tiles()).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(doc["run_name"], "run_1");
        assert_eq!(doc["metric"], "tile");
        assert_eq!(doc["record_count"], 2);
        assert_eq!(doc["records"][1]["tile"], 1102);
        assert_eq!(doc["records"][0]["metric_value"], 0.5);
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
        }
    }

    #[test]
    fn json_write_failure_surfaces_through_buffer() {
        let writer = std::io::BufWriter::new(FullDisk);
        assert!(write_json(writer, "run_1", MetricKind::Tile, &tiles()).is_err());
    }

    #[test]
    fn csv_header_and_rows() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &tiles()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, ["lane,tile,metric_code,metric_value", "1,1101,100,0.5", "1,1102,103,2"]);
    }

    #[test]
    fn csv_quality_columns() {
        let record = QualityRecord::new(1, 1101, 1, &[1; 50]).unwrap();
        let mut buf = Vec::new();
        write_csv(&mut buf, &[Record::Quality(record)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.starts_with("lane,tile,cycle,q01,q02,"));
        assert!(header.ends_with(",q50"));
    }

    #[test]
    fn empty_csv_writes_nothing() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());
    }
}
