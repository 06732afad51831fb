use byteorder::WriteBytesExt;
use std::io::{self, Read, Write};

use crate::error::{InteropError, Result};
use crate::format::{HeaderLayout, Layout};
use crate::io_stream::read_full;

/// The bytes preceding the first record of a metric file.
///
/// Parsed as raw unsigned bytes; endianness does not apply.  `record_length`
/// is `None` for layouts whose header carries only a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version:       u8,
    pub record_length: Option<u8>,
}

impl FileHeader {
    /// The header an instrument would write for `layout` at its minimum version.
    pub fn for_layout(layout: &Layout) -> Self {
        let record_length = match layout.header {
            HeaderLayout::VersionAndLength => layout.record_length.map(|len| len as u8),
            HeaderLayout::VersionOnly      => None,
        };
        Self { version: layout.min_version, record_length }
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u8(self.version)?;
        if let Some(len) = self.record_length {
            writer.write_u8(len)?;
        }
        Ok(())
    }

    /// Read the header bytes `layout` prescribes.  Does not check the version.
    pub fn read<R: Read>(reader: R, layout: &Layout) -> Result<Self> {
        let expected = layout.header.byte_len();
        let mut buf = [0u8; 2];
        let actual = read_full(reader, &mut buf[..expected])?;
        if actual < expected {
            return Err(InteropError::TruncatedHeader { kind: layout.kind, expected, actual });
        }
        let record_length = match layout.header {
            HeaderLayout::VersionAndLength => Some(buf[1]),
            HeaderLayout::VersionOnly      => None,
        };
        Ok(Self { version: buf[0], record_length })
    }

    /// Reject versions older than the layout supports, and fixed-width files
    /// whose declared record length disagrees with the layout.
    pub fn validate(&self, layout: &Layout) -> Result<()> {
        if self.version < layout.min_version {
            return Err(InteropError::FormatVersion {
                kind:        layout.kind,
                version:     self.version,
                min_version: layout.min_version,
            });
        }
        if let (Some(declared), Some(expected)) = (self.record_length, layout.record_length) {
            if declared as usize != expected {
                return Err(InteropError::RecordLengthMismatch { kind: layout.kind, declared, expected });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::MetricKind;

    #[test]
    fn default_header_bytes() {
        let mut out = Vec::new();
        FileHeader::for_layout(MetricKind::Quality.layout()).write(&mut out).unwrap();
        assert_eq!(out, vec![4, 206]);

        let mut out = Vec::new();
        FileHeader::for_layout(MetricKind::Index.layout()).write(&mut out).unwrap();
        assert_eq!(out, vec![1]);
    }

    #[test]
    fn old_version_rejected() {
        let layout = MetricKind::Error.layout();
        let header = FileHeader::read(&[2u8, 30][..], layout).unwrap();
        match header.validate(layout) {
            Err(InteropError::FormatVersion { version: 2, min_version: 3, .. }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn newer_version_accepted() {
        let layout = MetricKind::Tile.layout();
        let header = FileHeader::read(&[3u8, 10][..], layout).unwrap();
        assert!(header.validate(layout).is_ok());
    }

    #[test]
    fn declared_length_must_match_layout() {
        let layout = MetricKind::Tile.layout();
        let header = FileHeader::read(&[2u8, 12][..], layout).unwrap();
        assert!(matches!(
            header.validate(layout),
            Err(InteropError::RecordLengthMismatch { declared: 12, expected: 10, .. })
        ));
    }

    #[test]
    fn short_header_is_truncated() {
        let layout = MetricKind::Tile.layout();
        assert!(matches!(
            FileHeader::read(&[2u8][..], layout),
            Err(InteropError::TruncatedHeader { expected: 2, actual: 1, .. })
        ));
    }
}
