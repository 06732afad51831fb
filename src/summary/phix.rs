//! PhiX error-rate table: one CSV row per (tile, cycle).
//!
//! Rows are ordered by tile then cycle.  Cycles missing from the input are
//! written with a blank rate so every tile covers a contiguous cycle range.
//! With read lengths, index cycles are left out and reverse cycles are
//! numbered `-1, -2, …` from the start of the reverse read.

use std::io::Write;

use super::{segment_of, ErrorSummary, ReadLengths, Segment};
use crate::error::Result;
use crate::record::ErrorRecord;

const HEADER: [&str; 3] = ["tile", "cycle", "errorrate"];

/// Cycle number as written to the table, `None` for index cycles.
fn display_cycle(cycle: u16, read_lengths: Option<&ReadLengths>) -> Option<i64> {
    match segment_of(read_lengths, cycle) {
        Segment::Forward => Some(cycle as i64),
        Segment::Index   => None,
        Segment::Reverse => {
            let first = read_lengths.map_or(0, |lengths| lengths.first_reverse_cycle()) as i64;
            Some(first - cycle as i64 - 1)
        }
    }
}

fn write_blank<W: Write>(
    out: &mut csv::Writer<W>,
    tile: u16,
    cycle: u16,
    read_lengths: Option<&ReadLengths>,
) -> Result<()> {
    if let Some(shown) = display_cycle(cycle, read_lengths) {
        out.write_record([tile.to_string(), shown.to_string(), String::new()])?;
    }
    Ok(())
}

fn round4(rate: f32) -> f64 {
    (rate as f64 * 1e4).round() / 1e4
}

/// Write the table and return the forward/reverse error summary of the
/// records written.
pub fn write_phix_csv<W: Write>(
    writer: W,
    records: &[ErrorRecord],
    read_lengths: Option<&ReadLengths>,
) -> Result<ErrorSummary> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADER)?;

    let mut sorted: Vec<&ErrorRecord> = records.iter().collect();
    sorted.sort_by_key(|r| (r.tile, r.cycle));

    let mut summary = ErrorSummary::default();

    let mut i = 0;
    while i < sorted.len() {
        let tile = sorted[i].tile;
        let mut previous: u16 = 0;

        while i < sorted.len() && sorted[i].tile == tile {
            let record = sorted[i];
            for missing in previous.saturating_add(1)..record.cycle {
                write_blank(&mut out, tile, missing, read_lengths)?;
            }
            if let Some(shown) = display_cycle(record.cycle, read_lengths) {
                out.write_record([
                    tile.to_string(),
                    shown.to_string(),
                    round4(record.error_rate).to_string(),
                ])?;
            }
            summary.add(record.cycle, record.error_rate, read_lengths);
            previous = previous.max(record.cycle);
            i += 1;
        }

        // Pad each tile out to the end of the run when its length is known.
        if let Some(lengths) = read_lengths {
            let last = lengths.total_cycles().min(u16::MAX as u32) as u16;
            for missing in previous.saturating_add(1)..=last {
                write_blank(&mut out, tile, missing, read_lengths)?;
            }
        }
    }

    out.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(tile: u16, cycle: u16, error_rate: f32) -> ErrorRecord {
        ErrorRecord {
            lane: 1,
            tile,
            cycle,
            error_rate,
            num_0_errors: 0,
            num_1_errors: 0,
            num_2_errors: 0,
            num_3_errors: 0,
            num_4_errors: 0,
        }
    }

    fn render(records: &[ErrorRecord], lengths: Option<&ReadLengths>) -> (Vec<String>, ErrorSummary) {
        let mut buf = Vec::new();
        let summary = write_phix_csv(&mut buf, records, lengths).unwrap();
        let text = String::from_utf8(buf).unwrap();
        (text.lines().map(str::to_string).collect(), summary)
    }

    #[test]
    fn simple_table() {
        let records = [error(1101, 1, 0.5), error(1101, 2, 0.6), error(1101, 3, 0.7)];
        let (lines, summary) = render(&records, None);
        assert_eq!(lines, ["tile,cycle,errorrate", "1101,1,0.5", "1101,2,0.6", "1101,3,0.7"]);
        assert_eq!(summary.error_count_forward, 3);
        assert!((summary.error_rate_forward() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn missing_cycles_are_blank() {
        let records = [error(1101, 1, 0.5), error(1101, 3, 0.7)];
        let (lines, _) = render(&records, Some(&ReadLengths::new(3, 0, 0)));
        assert_eq!(lines, ["tile,cycle,errorrate", "1101,1,0.5", "1101,2,", "1101,3,0.7"]);
    }

    #[test]
    fn reverse_cycles_are_negative() {
        let records = [
            error(1101, 12, 0.8),
            error(1101, 1, 0.5),
            error(1101, 2, 0.6),
            error(1101, 11, 0.7),
        ];
        let (lines, summary) = render(&records, Some(&ReadLengths::new(2, 8, 2)));
        assert_eq!(
            lines,
            ["tile,cycle,errorrate", "1101,1,0.5", "1101,2,0.6", "1101,-1,0.7", "1101,-2,0.8"]
        );
        assert_eq!(summary.error_count_forward, 2);
        assert_eq!(summary.error_count_reverse, 2);
        assert!((summary.error_rate_reverse() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn index_cycles_are_skipped() {
        let records = [error(1101, 1, 0.5), error(1101, 5, 0.9), error(1101, 7, 0.4)];
        let (lines, summary) = render(&records, Some(&ReadLengths::new(2, 4, 2)));
        assert_eq!(
            lines,
            ["tile,cycle,errorrate", "1101,1,0.5", "1101,2,", "1101,-1,0.4", "1101,-2,"]
        );
        assert_eq!(summary.error_count_forward, 1);
        assert_eq!(summary.error_count_reverse, 1);
    }

    #[test]
    fn tiles_are_sorted_and_independent() {
        let records = [error(1102, 2, 0.4), error(1101, 1, 0.5), error(1102, 1, 0.3), error(1101, 2, 0.6)];
        let (lines, summary) = render(&records, None);
        assert_eq!(
            lines,
            ["tile,cycle,errorrate", "1101,1,0.5", "1101,2,0.6", "1102,1,0.3", "1102,2,0.4"]
        );
        assert_eq!(summary.error_count_forward, 4);
    }

    #[test]
    fn rates_rounded_to_four_places() {
        let records = [error(1101, 1, 0.123456789), error(1101, 2, 0.987654321)];
        let (lines, _) = render(&records, None);
        assert_eq!(lines[1], "1101,1,0.1235");
        assert_eq!(lines[2], "1101,2,0.9877");
    }

    #[test]
    fn empty_input_writes_header_only() {
        let (lines, summary) = render(&[], None);
        assert_eq!(lines, ["tile,cycle,errorrate"]);
        assert_eq!(summary, ErrorSummary::default());
        assert_eq!(summary.error_rate_forward(), 0.0);
    }
}
