//! Structured field codec: declarative layouts and the records decoded from
//! them, plus the chip's own parameter layout.

pub mod chip;
pub mod codec;
pub mod layout;

pub use chip::{chip_parameter_layout, ChipParameters, CHIP_PARAMETERS_SIZE};
pub use codec::{decode, encode, Record, RecordError, Value};
pub use layout::{layout_size, ByteOrder, Field, FieldKind, Layout};
