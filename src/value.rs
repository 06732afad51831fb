//! Raw field values and the flat values used by exporters.
//!
//! [`FieldValue`] is the unit the stream layer reads and writes: one scalar
//! of the layout's field type.  Records are built from, and flattened back
//! into, ordered `Vec<FieldValue>` rows.
//!
//! Equality on `F32` values is relative-tolerance based (see
//! [`approx_eq`]), so two rows that differ only by binary round-trip noise
//! compare equal.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

use crate::error::{InteropError, Result};
use crate::format::FieldType;

/// Relative tolerance applied to every floating-point field comparison.
pub const FLOAT_REL_TOLERANCE: f64 = 1e-7;

/// `a` and `b` are equal, or within [`FLOAT_REL_TOLERANCE`] of the larger magnitude.
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    if a == b {
        return true;
    }
    let (a, b) = (a as f64, b as f64);
    (a - b).abs() <= FLOAT_REL_TOLERANCE * a.abs().max(b.abs())
}

// ── FieldValue ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum FieldValue {
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    Text(Vec<u8>),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::U16(_)  => FieldType::U16,
            FieldValue::U32(_)  => FieldType::U32,
            FieldValue::U64(_)  => FieldType::U64,
            FieldValue::F32(_)  => FieldType::F32,
            FieldValue::Text(_) => FieldType::Text,
        }
    }

    /// Build an unsigned field from a signed caller-supplied integer.
    ///
    /// Fails with `FieldValidation` if `value` is negative or does not fit
    /// the field's bit width.
    pub fn from_integer(field: &str, ty: FieldType, value: i128) -> Result<Self> {
        if value < 0 {
            return Err(InteropError::field(field, format!("integer must be >= 0, got {value}")));
        }
        let out_of_range = || InteropError::field(
            field,
            format!("{value} does not fit in {}", ty.name()),
        );
        match ty {
            FieldType::U16 => u16::try_from(value).map(FieldValue::U16).map_err(|_| out_of_range()),
            FieldType::U32 => u32::try_from(value).map(FieldValue::U32).map_err(|_| out_of_range()),
            FieldType::U64 => u64::try_from(value).map(FieldValue::U64).map_err(|_| out_of_range()),
            FieldType::F32 => Ok(FieldValue::F32(value as f32)),
            FieldType::Text => Err(InteropError::field(field, "expected text, got an integer")),
        }
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::U16(a), FieldValue::U16(b))   => a == b,
            (FieldValue::U32(a), FieldValue::U32(b))   => a == b,
            (FieldValue::U64(a), FieldValue::U64(b))   => a == b,
            (FieldValue::F32(a), FieldValue::F32(b))   => approx_eq(*a, *b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

// ── Typed row cursor ────────────────────────────────────────────────────────

/// Consumes a row of values in layout order, checking each type.
pub(crate) struct Fields {
    values: std::vec::IntoIter<FieldValue>,
}

impl Fields {
    pub(crate) fn new(values: Vec<FieldValue>) -> Self {
        Self { values: values.into_iter() }
    }

    fn take(&mut self, field: &str) -> Result<FieldValue> {
        self.values
            .next()
            .ok_or_else(|| InteropError::field(field, "missing value"))
    }

    pub(crate) fn u16(&mut self, field: &str) -> Result<u16> {
        match self.take(field)? {
            FieldValue::U16(v) => Ok(v),
            other => Err(mismatch(field, FieldType::U16, &other)),
        }
    }

    pub(crate) fn u32(&mut self, field: &str) -> Result<u32> {
        match self.take(field)? {
            FieldValue::U32(v) => Ok(v),
            other => Err(mismatch(field, FieldType::U32, &other)),
        }
    }

    pub(crate) fn u64(&mut self, field: &str) -> Result<u64> {
        match self.take(field)? {
            FieldValue::U64(v) => Ok(v),
            other => Err(mismatch(field, FieldType::U64, &other)),
        }
    }

    pub(crate) fn f32(&mut self, field: &str) -> Result<f32> {
        match self.take(field)? {
            FieldValue::F32(v) => Ok(v),
            other => Err(mismatch(field, FieldType::F32, &other)),
        }
    }

    pub(crate) fn text(&mut self, field: &str) -> Result<Vec<u8>> {
        match self.take(field)? {
            FieldValue::Text(v) => Ok(v),
            other => Err(mismatch(field, FieldType::Text, &other)),
        }
    }

    /// Take `N` consecutive values of `field`.
    pub(crate) fn u32_array<const N: usize>(&mut self, field: &str) -> Result<[u32; N]> {
        let mut out = [0u32; N];
        for slot in out.iter_mut() {
            *slot = self.u32(field)?;
        }
        Ok(out)
    }

    /// Fail if the row carried more values than the record consumed.
    pub(crate) fn finish(mut self) -> Result<()> {
        match self.values.next() {
            None    => Ok(()),
            Some(_) => Err(InteropError::field(
                "<row>",
                format!("{} unexpected trailing value(s)", self.values.len() + 1),
            )),
        }
    }
}

fn mismatch(field: &str, expected: FieldType, found: &FieldValue) -> InteropError {
    InteropError::field(
        field,
        format!("expected {}, got {}", expected.name(), found.field_type().name()),
    )
}

// ── Flat export values ──────────────────────────────────────────────────────

/// One cell of a record's flat mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    Int(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for FlatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatValue::Int(v)   => write!(f, "{v}"),
            FlatValue::Float(v) => write!(f, "{v}"),
            FlatValue::Text(v)  => f.write_str(v),
        }
    }
}

impl Serialize for FlatValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FlatValue::Int(v)   => serializer.serialize_u64(*v),
            FlatValue::Float(v) => serializer.serialize_f64(*v),
            FlatValue::Text(v)  => serializer.serialize_str(v),
        }
    }
}

impl From<u16> for FlatValue {
    fn from(v: u16) -> Self { FlatValue::Int(v as u64) }
}
impl From<u32> for FlatValue {
    fn from(v: u32) -> Self { FlatValue::Int(v as u64) }
}
impl From<u64> for FlatValue {
    fn from(v: u64) -> Self { FlatValue::Int(v) }
}
impl From<f32> for FlatValue {
    fn from(v: f32) -> Self { FlatValue::Float(v as f64) }
}
impl From<String> for FlatValue {
    fn from(v: String) -> Self { FlatValue::Text(v) }
}

/// Ordered key/value pairs; serializes as a map in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord(pub Vec<(String, FlatValue)>);

impl FlatRecord {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<FlatValue>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&FlatValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl Serialize for FlatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_tolerance_is_relative() {
        assert!(approx_eq(1.0, 1.0));
        assert!(approx_eq(0.0, 0.0));
        assert!(approx_eq(1.0e6, 1.0e6 + 0.0625));
        assert!(!approx_eq(1.0, 1.0001));
        assert!(!approx_eq(0.0, 1.0e-30));
        assert!(!approx_eq(f32::NAN, f32::NAN));
    }

    #[test]
    fn negative_integer_rejected() {
        let err = FieldValue::from_integer("lane", FieldType::U16, -1).unwrap_err();
        match err {
            InteropError::FieldValidation { field, constraint } => {
                assert_eq!(field, "lane");
                assert!(constraint.contains(">= 0"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn integer_width_enforced() {
        assert!(FieldValue::from_integer("tile", FieldType::U16, 65_535).is_ok());
        assert!(FieldValue::from_integer("tile", FieldType::U16, 65_536).is_err());
        assert_eq!(
            FieldValue::from_integer("datestamp", FieldType::U64, u64::MAX as i128).unwrap(),
            FieldValue::U64(u64::MAX)
        );
    }

    #[test]
    fn cursor_checks_types_and_arity() {
        let mut fields = Fields::new(vec![FieldValue::U16(1), FieldValue::F32(0.5)]);
        assert_eq!(fields.u16("lane").unwrap(), 1);
        assert!(fields.u32("count").is_err());

        let mut fields = Fields::new(vec![FieldValue::U16(1), FieldValue::U16(2)]);
        fields.u16("lane").unwrap();
        assert!(fields.finish().is_err());
    }

    #[test]
    fn flat_record_keeps_insertion_order() {
        let mut rec = FlatRecord::default();
        rec.push("tile", 1101u16);
        rec.push("cycle", 3u16);
        rec.push("error_rate", 0.5f32);
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"tile":1101,"cycle":3,"error_rate":0.5}"#);
    }
}
