//! Streaming record engine: writer and reader.
//!
//! # Reader
//! [`InterOpReader`] reads and validates the file header up front (version
//! gate and declared record length), then yields one record per iteration.
//! It is a single forward pass over the underlying stream: no seeking, no
//! buffering of its own.  Wrap a `File` in a `BufReader` if you want one.
//!
//! End of stream exactly on a record boundary ends the iteration cleanly.
//! Any partial record is a `TruncatedRecord` error; after the first error
//! the iterator is fused and yields `None`.
//!
//! # Writer
//! [`InterOpWriter`] writes a header and then rows packed per the layout.
//! Text fields get their u16 length prefix computed on write.
//!
//! # Endianness
//! Record bodies are strictly little-endian.  The header is raw bytes.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use std::marker::PhantomData;

use crate::error::{InteropError, Result};
use crate::format::{FieldType, Layout, MetricKind};
use crate::header::FileHeader;
use crate::record::{check_text_len, MetricRecord, Record};
use crate::value::FieldValue;

/// Fill `buf` from `reader`, returning how many bytes were read before EOF.
///
/// Unlike `read_exact`, a short read is reported rather than treated as an
/// error, so callers can tell a clean end of stream from a truncated record.
pub(crate) fn read_full<R: Read>(mut reader: R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Unpack one fixed-width scalar from the front of `bytes`.
fn unpack_scalar(ty: FieldType, bytes: &mut &[u8]) -> io::Result<FieldValue> {
    Ok(match ty {
        FieldType::U16  => FieldValue::U16(bytes.read_u16::<LittleEndian>()?),
        FieldType::U32  => FieldValue::U32(bytes.read_u32::<LittleEndian>()?),
        FieldType::U64  => FieldValue::U64(bytes.read_u64::<LittleEndian>()?),
        FieldType::F32  => FieldValue::F32(bytes.read_f32::<LittleEndian>()?),
        FieldType::Text => {
            let len = bytes.read_u16::<LittleEndian>()? as usize;
            let mut text = vec![0u8; len];
            bytes.read_exact(&mut text)?;
            FieldValue::Text(text)
        }
    })
}

// ── Writer ───────────────────────────────────────────────────────────────────

pub struct InterOpWriter<W: Write> {
    writer:              W,
    layout:              &'static Layout,
    pub records_written: u64,
}

impl<W: Write> InterOpWriter<W> {
    /// Start a file of `kind` with the header an instrument would write.
    pub fn new(writer: W, kind: MetricKind) -> Result<Self> {
        Self::with_header(writer, kind, FileHeader::for_layout(kind.layout()))
    }

    /// Start a file with an explicit header.  The header is written as given,
    /// even if a reader would reject it; fixtures rely on that.
    pub fn with_header(mut writer: W, kind: MetricKind, header: FileHeader) -> Result<Self> {
        header.write(&mut writer)?;
        Ok(Self { writer, layout: kind.layout(), records_written: 0 })
    }

    pub fn kind(&self) -> MetricKind {
        self.layout.kind
    }

    /// Pack one row.  The row must match the layout value for value.
    pub fn write_values(&mut self, values: &[FieldValue]) -> Result<()> {
        let expected = self.layout.value_count();
        if values.len() != expected {
            return Err(InteropError::field(
                "<row>",
                format!("{} row needs {expected} values, got {}", self.layout.kind, values.len()),
            ));
        }

        let mut packed = Vec::with_capacity(self.layout.record_length.unwrap_or(64));
        for (i, (value, ty)) in values.iter().zip(self.layout.value_types()).enumerate() {
            let field = self.layout.field_name(i);
            if value.field_type() != ty {
                return Err(InteropError::field(
                    field,
                    format!("expected {}, got {}", ty.name(), value.field_type().name()),
                ));
            }
            match value {
                FieldValue::U16(v)  => packed.write_u16::<LittleEndian>(*v)?,
                FieldValue::U32(v)  => packed.write_u32::<LittleEndian>(*v)?,
                FieldValue::U64(v)  => packed.write_u64::<LittleEndian>(*v)?,
                FieldValue::F32(v)  => packed.write_f32::<LittleEndian>(*v)?,
                FieldValue::Text(v) => {
                    check_text_len(field, v)?;
                    packed.write_u16::<LittleEndian>(v.len() as u16)?;
                    packed.write_all(v)?;
                }
            }
        }

        // Rows are packed whole so a failed row never leaves partial bytes behind.
        self.writer.write_all(&packed)?;
        self.records_written += 1;
        Ok(())
    }

    pub fn write_record<T: MetricRecord>(&mut self, record: &T) -> Result<()> {
        self.write_values(&record.to_values())
    }

    /// Write a record of run-time kind; it must match the writer's kind.
    pub fn write_any(&mut self, record: &Record) -> Result<()> {
        if record.kind() != self.layout.kind {
            return Err(InteropError::field(
                "<row>",
                format!("cannot write a {} record to a {} file", record.kind(), self.layout.kind),
            ));
        }
        self.write_values(&record.to_values())
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Encode `rows` as a complete file of `kind`: default header, then each row.
pub fn encode(kind: MetricKind, rows: &[Vec<FieldValue>]) -> Result<Vec<u8>> {
    let mut writer = InterOpWriter::new(Vec::new(), kind)?;
    for row in rows {
        writer.write_values(row)?;
    }
    writer.finish()
}

// ── Reader ───────────────────────────────────────────────────────────────────

pub struct InterOpReader<R: Read> {
    reader: R,
    layout: &'static Layout,
    header: FileHeader,
    /// Byte offset of the next unread record, counted from the file start.
    offset: u64,
    done:   bool,
}

impl<R: Read> InterOpReader<R> {
    /// Read and validate the header.  Fails before any record is read if
    /// the version is older than the layout's minimum.
    pub fn new(mut reader: R, kind: MetricKind) -> Result<Self> {
        let layout = kind.layout();
        let header = FileHeader::read(&mut reader, layout)?;
        header.validate(layout)?;
        Ok(Self {
            reader,
            layout,
            header,
            offset: layout.header.byte_len() as u64,
            done: false,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn kind(&self) -> MetricKind {
        self.layout.kind
    }

    /// Read the next raw row.  `Ok(None)` on a clean end of stream.
    pub fn next_values(&mut self) -> Result<Option<Vec<FieldValue>>> {
        if self.done {
            return Ok(None);
        }
        let result = match self.layout.record_length {
            Some(len) => self.read_fixed(len),
            None      => self.read_variable(),
        };
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    fn truncated(&self, expected: usize, actual: usize) -> InteropError {
        InteropError::TruncatedRecord { kind: self.layout.kind, offset: self.offset, expected, actual }
    }

    fn read_fixed(&mut self, len: usize) -> Result<Option<Vec<FieldValue>>> {
        let mut chunk = vec![0u8; len];
        let n = read_full(&mut self.reader, &mut chunk)?;
        if n == 0 {
            return Ok(None);
        }
        if n < len {
            return Err(self.truncated(len, n));
        }

        let mut bytes = &chunk[..];
        let mut values = Vec::with_capacity(self.layout.value_count());
        for ty in self.layout.value_types() {
            values.push(unpack_scalar(ty, &mut bytes)?);
        }
        self.offset += len as u64;
        Ok(Some(values))
    }

    /// Field-by-field read for layouts containing `Text` fields.
    fn read_variable(&mut self) -> Result<Option<Vec<FieldValue>>> {
        let mut values = Vec::with_capacity(self.layout.value_count());
        let mut consumed = 0usize;

        for (i, ty) in self.layout.value_types().enumerate() {
            let width = ty.width().unwrap_or(2);
            let mut buf = [0u8; 8];
            let n = read_full(&mut self.reader, &mut buf[..width])?;
            if n == 0 && i == 0 {
                return Ok(None);
            }
            if n < width {
                return Err(self.truncated(consumed + width, consumed + n));
            }
            consumed += width;

            let mut bytes = &buf[..width];
            let value = match ty {
                FieldType::Text => {
                    let len = bytes.read_u16::<LittleEndian>()? as usize;
                    let mut text = vec![0u8; len];
                    let n = read_full(&mut self.reader, &mut text)?;
                    if n < len {
                        return Err(self.truncated(consumed + len, consumed + n));
                    }
                    consumed += len;
                    FieldValue::Text(text)
                }
                _ => unpack_scalar(ty, &mut bytes)?,
            };
            values.push(value);
        }

        self.offset += consumed as u64;
        Ok(Some(values))
    }

    /// Narrow to a typed iterator.  Fails if `T` is not this file's kind.
    pub fn records<T: MetricRecord>(self) -> Result<Records<R, T>> {
        if T::KIND != self.layout.kind {
            return Err(InteropError::field(
                "<kind>",
                format!("reader is for {} records, not {}", self.layout.kind, T::KIND),
            ));
        }
        Ok(Records { inner: self, _marker: PhantomData })
    }
}

impl<R: Read> Iterator for InterOpReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = self.layout.kind;
        match self.next_values() {
            Ok(Some(values)) => {
                let record = Record::from_values(kind, values);
                if record.is_err() {
                    self.done = true;
                }
                Some(record)
            }
            Ok(None) => None,
            Err(e)   => Some(Err(e)),
        }
    }
}

/// Typed view over an [`InterOpReader`].
pub struct Records<R: Read, T: MetricRecord> {
    inner:    InterOpReader<R>,
    _marker:  PhantomData<T>,
}

impl<R: Read, T: MetricRecord> Records<R, T> {
    pub fn header(&self) -> &FileHeader {
        self.inner.header()
    }
}

impl<R: Read, T: MetricRecord> Iterator for Records<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next_values() {
            Ok(Some(values)) => {
                let record = T::from_values(values);
                if record.is_err() {
                    self.inner.done = true;
                }
                Some(record)
            }
            Ok(None) => None,
            Err(e)   => Some(Err(e)),
        }
    }
}

/// Lazily decode a stream of `kind` records.
pub fn decode<R: Read>(reader: R, kind: MetricKind) -> Result<InterOpReader<R>> {
    InterOpReader::new(reader, kind)
}

/// Lazily decode a stream of `T` records.
pub fn read_records<T: MetricRecord, R: Read>(reader: R) -> Result<Records<R, T>> {
    InterOpReader::new(reader, T::KIND)?.records()
}
