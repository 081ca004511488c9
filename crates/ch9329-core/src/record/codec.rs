//! Decoding and encoding of flat binary records against a [`Layout`].
//!
//! Decoding copies every field out of the source buffer into a [`Record`];
//! nothing borrows the buffer afterwards. Encoding walks the layout in order
//! and looks every field up by name, so the output always has exactly
//! [`Layout::size`] bytes in layout order regardless of how the record was
//! built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::layout::{Field, FieldKind, Layout};

/// Errors that can occur while decoding or encoding a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The source buffer is shorter than the layout.
    #[error("buffer too small: layout needs {needed} bytes, got {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// The record has no value for a field the layout requires.
    #[error("missing field: {0}")]
    MissingField(String),

    /// Two layout fields share a name.
    #[error("duplicate field name in layout: {0}")]
    DuplicateField(String),

    /// An integer field holds bytes, or a byte field holds an integer.
    #[error("field {field}: expected {expected} value")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    /// The integer does not fit the field's width or signedness.
    #[error("field {field}: value {value} does not fit {kind}")]
    ValueOutOfRange {
        field: String,
        value: i64,
        kind: FieldKind,
    },

    /// A byte block value is longer than the field.
    #[error("field {field}: {len} bytes exceed the {size}-byte block")]
    BlockTooLong {
        field: String,
        len: usize,
        size: usize,
    },
}

// ── Values ────────────────────────────────────────────────────────────────────

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::Int(_) => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

// ── Record ────────────────────────────────────────────────────────────────────

/// Field values keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.get(name).and_then(Value::as_bytes)
    }

    /// Sets a value, returning the previous one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Decodes `bytes` against `layout`. Bytes past the layout size are ignored.
///
/// # Errors
///
/// Returns [`RecordError::BufferTooSmall`] if `bytes` is shorter than the
/// layout.
///
/// # Examples
///
/// ```rust
/// use ch9329_core::record::{decode, ByteOrder, Field, FieldKind, Layout};
///
/// let layout = Layout::new([
///     Field::new("rate", FieldKind::U32(ByteOrder::Big)),
///     Field::new("vid", FieldKind::U16(ByteOrder::Little)),
/// ])
/// .unwrap();
/// let record = decode(&layout, &[0x00, 0x00, 0x25, 0x80, 0x86, 0x1A]).unwrap();
/// assert_eq!(record.get_int("rate"), Some(9600));
/// assert_eq!(record.get_int("vid"), Some(0x1A86));
/// ```
pub fn decode(layout: &Layout, bytes: &[u8]) -> Result<Record, RecordError> {
    if bytes.len() < layout.size() {
        return Err(RecordError::BufferTooSmall {
            needed: layout.size(),
            available: bytes.len(),
        });
    }

    let mut record = Record::new();
    for (offset, field) in layout.with_offsets() {
        let chunk = &bytes[offset..offset + field.kind.size()];
        record.set(field.name.clone(), decode_value(field.kind, chunk));
    }
    Ok(record)
}

/// Encodes `record` into exactly `layout.size()` bytes.
///
/// Record entries that the layout does not name are ignored. Byte blocks
/// shorter than their field are padded with zeros.
///
/// # Errors
///
/// - [`RecordError::MissingField`] if a layout field has no value.
/// - [`RecordError::TypeMismatch`], [`RecordError::ValueOutOfRange`] or
///   [`RecordError::BlockTooLong`] if a value does not fit its field.
pub fn encode(record: &Record, layout: &Layout) -> Result<Vec<u8>, RecordError> {
    let mut buf = Vec::with_capacity(layout.size());
    for field in layout.fields() {
        let value = record
            .get(&field.name)
            .ok_or_else(|| RecordError::MissingField(field.name.clone()))?;
        encode_value(&mut buf, field, value)?;
    }
    Ok(buf)
}

// ── Field helpers ─────────────────────────────────────────────────────────────

fn decode_value(kind: FieldKind, b: &[u8]) -> Value {
    match kind {
        FieldKind::U8 => Value::Int(i64::from(b[0])),
        FieldKind::I8 => Value::Int(i64::from(b[0] as i8)),
        FieldKind::U16(order) => Value::Int(i64::from(order.read_u16([b[0], b[1]]))),
        FieldKind::I16(order) => Value::Int(i64::from(order.read_u16([b[0], b[1]]) as i16)),
        FieldKind::U32(order) => {
            Value::Int(i64::from(order.read_u32([b[0], b[1], b[2], b[3]])))
        }
        FieldKind::I32(order) => {
            Value::Int(i64::from(order.read_u32([b[0], b[1], b[2], b[3]]) as i32))
        }
        FieldKind::Bytes(_) => Value::Bytes(b.to_vec()),
    }
}

fn encode_value(buf: &mut Vec<u8>, field: &Field, value: &Value) -> Result<(), RecordError> {
    let v = match (field.kind, value) {
        (FieldKind::Bytes(size), Value::Bytes(bytes)) => {
            return encode_block(buf, field, size, bytes)
        }
        (_, Value::Int(v)) => *v,
        (_, Value::Bytes(_)) => return Err(type_mismatch(field, "integer")),
    };
    let out_of_range = || RecordError::ValueOutOfRange {
        field: field.name.clone(),
        value: v,
        kind: field.kind,
    };

    match field.kind {
        FieldKind::U8 => buf.push(u8::try_from(v).map_err(|_| out_of_range())?),
        FieldKind::I8 => buf.push(i8::try_from(v).map_err(|_| out_of_range())? as u8),
        FieldKind::U16(order) => {
            let n = u16::try_from(v).map_err(|_| out_of_range())?;
            buf.extend_from_slice(&order.write_u16(n));
        }
        FieldKind::I16(order) => {
            let n = i16::try_from(v).map_err(|_| out_of_range())?;
            buf.extend_from_slice(&order.write_u16(n as u16));
        }
        FieldKind::U32(order) => {
            let n = u32::try_from(v).map_err(|_| out_of_range())?;
            buf.extend_from_slice(&order.write_u32(n));
        }
        FieldKind::I32(order) => {
            let n = i32::try_from(v).map_err(|_| out_of_range())?;
            buf.extend_from_slice(&order.write_u32(n as u32));
        }
        FieldKind::Bytes(_) => return Err(type_mismatch(field, "byte block")),
    }
    Ok(())
}

fn encode_block(
    buf: &mut Vec<u8>,
    field: &Field,
    size: usize,
    bytes: &[u8],
) -> Result<(), RecordError> {
    if bytes.len() > size {
        return Err(RecordError::BlockTooLong {
            field: field.name.clone(),
            len: bytes.len(),
            size,
        });
    }
    buf.extend_from_slice(bytes);
    buf.resize(buf.len() + size - bytes.len(), 0x00);
    Ok(())
}

fn type_mismatch(field: &Field, expected: &'static str) -> RecordError {
    RecordError::TypeMismatch {
        field: field.name.clone(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::record::layout::ByteOrder;

    fn mixed_layout() -> Layout {
        Layout::new([
            Field::new("mode", FieldKind::U8),
            Field::new("offset", FieldKind::I8),
            Field::new("rate", FieldKind::U32(ByteOrder::Big)),
            Field::new("vid", FieldKind::U16(ByteOrder::Little)),
            Field::new("delta", FieldKind::I16(ByteOrder::Big)),
            Field::new("temp", FieldKind::I32(ByteOrder::Little)),
            Field::new("tag", FieldKind::Bytes(4)),
        ])
        .unwrap()
    }

    fn mixed_bytes() -> Vec<u8> {
        vec![
            0x80, // mode
            0xFE, // offset = -2
            0x00, 0x00, 0x25, 0x80, // rate = 9600 BE
            0x86, 0x1A, // vid = 0x1A86 LE
            0xFF, 0x38, // delta = -200 BE
            0x9C, 0xFF, 0xFF, 0xFF, // temp = -100 LE
            b'W', b'C', b'H', 0x00, // tag
        ]
    }

    #[test]
    fn test_decode_mixed_endianness_and_signedness() {
        let record = decode(&mixed_layout(), &mixed_bytes()).unwrap();
        assert_eq!(record.get_int("mode"), Some(0x80));
        assert_eq!(record.get_int("offset"), Some(-2));
        assert_eq!(record.get_int("rate"), Some(9600));
        assert_eq!(record.get_int("vid"), Some(0x1A86));
        assert_eq!(record.get_int("delta"), Some(-200));
        assert_eq!(record.get_int("temp"), Some(-100));
        assert_eq!(record.get_bytes("tag"), Some(&b"WCH\0"[..]));
        assert_eq!(record.len(), 7);
    }

    #[test]
    fn test_encode_reproduces_source_bytes() {
        let bytes = mixed_bytes();
        let layout = mixed_layout();
        let record = decode(&layout, &bytes).unwrap();
        assert_eq!(encode(&record, &layout).unwrap(), bytes);
    }

    #[test]
    fn test_decode_of_encode_is_identity() {
        let layout = mixed_layout();
        let mut record = Record::new();
        record.set("mode", 1u8);
        record.set("offset", -128i64);
        record.set("rate", 115_200u32);
        record.set("vid", 0xFFFFu16);
        record.set("delta", i64::from(i16::MIN));
        record.set("temp", i64::from(i32::MAX));
        record.set("tag", vec![1, 2, 3, 4]);
        let bytes = encode(&record, &layout).unwrap();
        assert_eq!(bytes.len(), layout.size());
        assert_eq!(decode(&layout, &bytes).unwrap(), record);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut bytes = mixed_bytes();
        bytes.extend_from_slice(&[0xAA; 6]);
        let record = decode(&mixed_layout(), &bytes).unwrap();
        assert_eq!(record.get_int("rate"), Some(9600));
    }

    #[test]
    fn test_decode_short_buffer_fails() {
        let bytes = mixed_bytes();
        let result = decode(&mixed_layout(), &bytes[..bytes.len() - 1]);
        assert_eq!(
            result,
            Err(RecordError::BufferTooSmall {
                needed: 18,
                available: 17
            })
        );
    }

    #[test]
    fn test_encode_missing_field_fails() {
        let layout = mixed_layout();
        let mut record = decode(&layout, &mixed_bytes()).unwrap();
        record.remove("vid");
        assert_eq!(
            encode(&record, &layout),
            Err(RecordError::MissingField("vid".to_string()))
        );
    }

    #[test]
    fn test_encode_rejects_out_of_range_integer() {
        let layout = mixed_layout();
        let mut record = decode(&layout, &mixed_bytes()).unwrap();
        record.set("vid", 0x1_0000i64);
        assert!(matches!(
            encode(&record, &layout),
            Err(RecordError::ValueOutOfRange { value: 0x1_0000, .. })
        ));
        record.set("vid", -1i64);
        assert!(matches!(
            encode(&record, &layout),
            Err(RecordError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_encode_rejects_type_mismatch() {
        let layout = mixed_layout();
        let mut record = decode(&layout, &mixed_bytes()).unwrap();
        record.set("rate", vec![0u8; 4]);
        assert!(matches!(
            encode(&record, &layout),
            Err(RecordError::TypeMismatch { expected: "integer", .. })
        ));
    }

    #[test]
    fn test_encode_pads_short_block_and_rejects_long_block() {
        let layout = mixed_layout();
        let mut record = decode(&layout, &mixed_bytes()).unwrap();
        record.set("tag", b"AB".as_slice());
        let bytes = encode(&record, &layout).unwrap();
        assert_eq!(&bytes[bytes.len() - 4..], &[b'A', b'B', 0x00, 0x00]);

        record.set("tag", b"ABCDE".as_slice());
        assert_eq!(
            encode(&record, &layout),
            Err(RecordError::BlockTooLong {
                field: "tag".to_string(),
                len: 5,
                size: 4
            })
        );
    }

    #[test]
    fn test_encode_ignores_unknown_record_entries() {
        let layout = mixed_layout();
        let mut record = decode(&layout, &mixed_bytes()).unwrap();
        record.set("comment", 42i64);
        assert_eq!(encode(&record, &layout).unwrap(), mixed_bytes());
    }

    #[test]
    fn test_native_order_round_trips() {
        let layout = Layout::new([Field::new("n", FieldKind::U32(ByteOrder::Native))]).unwrap();
        let mut record = Record::new();
        record.set("n", 0x0102_0304u32);
        let bytes = encode(&record, &layout).unwrap();
        assert_eq!(bytes, 0x0102_0304u32.to_ne_bytes());
        assert_eq!(decode(&layout, &bytes).unwrap(), record);
    }

    proptest! {
        #[test]
        fn test_decode_of_encode_round_trips_any_in_range_record(
            mode in any::<u8>(),
            offset in any::<i8>(),
            rate in any::<u32>(),
            vid in any::<u16>(),
            delta in any::<i16>(),
            temp in any::<i32>(),
            tag in any::<[u8; 4]>(),
        ) {
            let layout = mixed_layout();
            let mut record = Record::new();
            record.set("mode", mode);
            record.set("offset", i64::from(offset));
            record.set("rate", rate);
            record.set("vid", vid);
            record.set("delta", i64::from(delta));
            record.set("temp", i64::from(temp));
            record.set("tag", tag.to_vec());

            let bytes = encode(&record, &layout).expect("in-range values encode");
            prop_assert_eq!(bytes.len(), layout.size());
            prop_assert_eq!(decode(&layout, &bytes).expect("encoded bytes decode"), record);
        }
    }
}
