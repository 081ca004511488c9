//! Declarative fixed-size record layouts.
//!
//! A [`Layout`] is an ordered list of named fields. Each field has a
//! [`FieldKind`] that fixes its width and, for integers, its signedness and
//! byte order. Offsets are implicit: a field starts where the previous one
//! ends.
//!
//! Byte order is chosen per field, so a single layout can mix big-endian and
//! little-endian integers. The CH9329 parameter record relies on this: its
//! USB vendor/product IDs are little-endian while everything else is
//! big-endian.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::codec::RecordError;

// ── Field kinds ───────────────────────────────────────────────────────────────

/// Byte order of a multi-byte integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    Big,
    Little,
    /// Whatever the host uses.
    Native,
}

impl ByteOrder {
    pub(crate) fn read_u16(self, b: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Big => u16::from_be_bytes(b),
            ByteOrder::Little => u16::from_le_bytes(b),
            ByteOrder::Native => u16::from_ne_bytes(b),
        }
    }

    pub(crate) fn write_u16(self, v: u16) -> [u8; 2] {
        match self {
            ByteOrder::Big => v.to_be_bytes(),
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Native => v.to_ne_bytes(),
        }
    }

    pub(crate) fn read_u32(self, b: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Big => u32::from_be_bytes(b),
            ByteOrder::Little => u32::from_le_bytes(b),
            ByteOrder::Native => u32::from_ne_bytes(b),
        }
    }

    pub(crate) fn write_u32(self, v: u32) -> [u8; 4] {
        match self {
            ByteOrder::Big => v.to_be_bytes(),
            ByteOrder::Little => v.to_le_bytes(),
            ByteOrder::Native => v.to_ne_bytes(),
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ByteOrder::Big => "be",
            ByteOrder::Little => "le",
            ByteOrder::Native => "ne",
        })
    }
}

/// Type and width of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    U8,
    I8,
    U16(ByteOrder),
    I16(ByteOrder),
    U32(ByteOrder),
    I32(ByteOrder),
    /// Raw block of exactly `n` bytes.
    Bytes(usize),
}

impl FieldKind {
    /// Width of the field in bytes.
    pub const fn size(&self) -> usize {
        match self {
            FieldKind::U8 | FieldKind::I8 => 1,
            FieldKind::U16(_) | FieldKind::I16(_) => 2,
            FieldKind::U32(_) | FieldKind::I32(_) => 4,
            FieldKind::Bytes(n) => *n,
        }
    }

    /// Whether values of this kind are integers rather than byte blocks.
    pub const fn is_integer(&self) -> bool {
        !matches!(self, FieldKind::Bytes(_))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::U8 => f.write_str("u8"),
            FieldKind::I8 => f.write_str("i8"),
            FieldKind::U16(o) => write!(f, "u16 {o}"),
            FieldKind::I16(o) => write!(f, "i16 {o}"),
            FieldKind::U32(o) => write!(f, "u32 {o}"),
            FieldKind::I32(o) => write!(f, "i32 {o}"),
            FieldKind::Bytes(n) => write!(f, "[u8; {n}]"),
        }
    }
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// One named field of a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered, uniquely named fields with a precomputed total size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    fields: Vec<Field>,
    size: usize,
}

impl Layout {
    /// Builds a layout from fields in wire order.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::DuplicateField`] if two fields share a name.
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Result<Self, RecordError> {
        let fields: Vec<Field> = fields.into_iter().collect();
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(RecordError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Self::from_unique(fields))
    }

    /// Builds a layout from fields already known to have unique names.
    pub(crate) fn from_unique(fields: Vec<Field>) -> Self {
        let size = fields.iter().map(|f| f.kind.size()).sum();
        Self { fields, size }
    }

    /// Total encoded size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Byte offset of the named field.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.with_offsets()
            .find(|(_, f)| f.name == name)
            .map(|(offset, _)| offset)
    }

    /// Iterates fields in order together with their byte offsets.
    pub fn with_offsets(&self) -> impl Iterator<Item = (usize, &Field)> {
        self.fields.iter().scan(0usize, |offset, field| {
            let start = *offset;
            *offset += field.kind.size();
            Some((start, field))
        })
    }
}

/// Total size of `layout` in bytes. Computed once when the layout is built.
pub fn layout_size(layout: &Layout) -> usize {
    layout.size()
}
