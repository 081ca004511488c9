//! The chip's 50-byte parameter configuration record.
//!
//! Read with [`CommandCode::GetParameterConfig`] and written back with
//! [`CommandCode::SetParameterConfig`]. Integers are big-endian except
//! `usb_vid` and `usb_pid`, which the chip stores little-endian.
//!
//! | Offset | Field                           | Kind      |
//! |--------|---------------------------------|-----------|
//! | 0      | `work_mode`                     | u8        |
//! | 1      | `serial_communication_mode`     | u8        |
//! | 2      | `serial_address`                | u8        |
//! | 3      | `serial_baud_rate`              | u32 be    |
//! | 7      | `reserve_00`                    | u16 be    |
//! | 9      | `communication_packet_interval` | u16 be    |
//! | 11     | `usb_vid`                       | u16 le    |
//! | 13     | `usb_pid`                       | u16 le    |
//! | 15     | `keyboard_upload_interval`      | u16 be    |
//! | 17     | `keyboard_release_delay`        | u16 be    |
//! | 19     | `keyboard_auto_enter_flag`      | u16 be    |
//! | 21     | `keyboard_enter_data_1`         | [u8; 4]   |
//! | 25     | `keyboard_enter_data_2`         | [u8; 4]   |
//! | 29     | `keyboard_filtering_start`      | [u8; 4]   |
//! | 33     | `usb_string_descriptor_flag`    | u8        |
//! | 34     | `keyboard_fast_upload_flag`     | [u8; 4]   |
//! | 38     | `reserve_01`                    | [u8; 12]  |
//!
//! [`CommandCode::GetParameterConfig`]: crate::protocol::CommandCode::GetParameterConfig
//! [`CommandCode::SetParameterConfig`]: crate::protocol::CommandCode::SetParameterConfig

use std::sync::OnceLock;

use crate::record::codec::{decode, encode, Record, RecordError};
use crate::record::layout::{ByteOrder, Field, FieldKind, Layout};

/// Size of the parameter record in bytes.
pub const CHIP_PARAMETERS_SIZE: usize = 50;

/// Field names of the parameter record.
pub mod field {
    pub const WORK_MODE: &str = "work_mode";
    pub const SERIAL_COMMUNICATION_MODE: &str = "serial_communication_mode";
    pub const SERIAL_ADDRESS: &str = "serial_address";
    pub const SERIAL_BAUD_RATE: &str = "serial_baud_rate";
    pub const RESERVE_00: &str = "reserve_00";
    pub const COMMUNICATION_PACKET_INTERVAL: &str = "communication_packet_interval";
    pub const USB_VID: &str = "usb_vid";
    pub const USB_PID: &str = "usb_pid";
    pub const KEYBOARD_UPLOAD_INTERVAL: &str = "keyboard_upload_interval";
    pub const KEYBOARD_RELEASE_DELAY: &str = "keyboard_release_delay";
    pub const KEYBOARD_AUTO_ENTER_FLAG: &str = "keyboard_auto_enter_flag";
    pub const KEYBOARD_ENTER_DATA_1: &str = "keyboard_enter_data_1";
    pub const KEYBOARD_ENTER_DATA_2: &str = "keyboard_enter_data_2";
    pub const KEYBOARD_FILTERING_START: &str = "keyboard_filtering_start";
    pub const USB_STRING_DESCRIPTOR_FLAG: &str = "usb_string_descriptor_flag";
    pub const KEYBOARD_FAST_UPLOAD_FLAG: &str = "keyboard_fast_upload_flag";
    pub const RESERVE_01: &str = "reserve_01";
}

fn chip_parameter_fields() -> Vec<Field> {
    use field::*;
    use ByteOrder::{Big, Little};

    vec![
        Field::new(WORK_MODE, FieldKind::U8),
        Field::new(SERIAL_COMMUNICATION_MODE, FieldKind::U8),
        Field::new(SERIAL_ADDRESS, FieldKind::U8),
        Field::new(SERIAL_BAUD_RATE, FieldKind::U32(Big)),
        Field::new(RESERVE_00, FieldKind::U16(Big)),
        Field::new(COMMUNICATION_PACKET_INTERVAL, FieldKind::U16(Big)),
        Field::new(USB_VID, FieldKind::U16(Little)),
        Field::new(USB_PID, FieldKind::U16(Little)),
        Field::new(KEYBOARD_UPLOAD_INTERVAL, FieldKind::U16(Big)),
        Field::new(KEYBOARD_RELEASE_DELAY, FieldKind::U16(Big)),
        Field::new(KEYBOARD_AUTO_ENTER_FLAG, FieldKind::U16(Big)),
        Field::new(KEYBOARD_ENTER_DATA_1, FieldKind::Bytes(4)),
        Field::new(KEYBOARD_ENTER_DATA_2, FieldKind::Bytes(4)),
        Field::new(KEYBOARD_FILTERING_START, FieldKind::Bytes(4)),
        Field::new(USB_STRING_DESCRIPTOR_FLAG, FieldKind::U8),
        Field::new(KEYBOARD_FAST_UPLOAD_FLAG, FieldKind::Bytes(4)),
        Field::new(RESERVE_01, FieldKind::Bytes(12)),
    ]
}

/// Layout of the parameter record, built on first use.
pub fn chip_parameter_layout() -> &'static Layout {
    static LAYOUT: OnceLock<Layout> = OnceLock::new();
    LAYOUT.get_or_init(|| Layout::from_unique(chip_parameter_fields()))
}

/// Typed view over a decoded parameter record.
///
/// Fields without an accessor are still reachable through [`Self::record`]
/// and [`Self::record_mut`]; they survive a decode/encode cycle untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipParameters {
    record: Record,
}

impl ChipParameters {
    /// Decodes the payload of a `GetParameterConfig` reply.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::BufferTooSmall`] for payloads under 50 bytes.
    pub fn from_payload(payload: &[u8]) -> Result<Self, RecordError> {
        decode(chip_parameter_layout(), payload).map(|record| Self { record })
    }

    /// Encodes the record into the 50-byte `SetParameterConfig` payload.
    ///
    /// # Errors
    ///
    /// Any [`RecordError`] from [`encode`], e.g. after a field was removed
    /// through [`Self::record_mut`].
    pub fn to_payload(&self) -> Result<Vec<u8>, RecordError> {
        encode(&self.record, chip_parameter_layout())
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    pub fn work_mode(&self) -> Option<u8> {
        self.int_field(field::WORK_MODE)
    }

    pub fn serial_address(&self) -> Option<u8> {
        self.int_field(field::SERIAL_ADDRESS)
    }

    pub fn baud_rate(&self) -> Option<u32> {
        self.int_field(field::SERIAL_BAUD_RATE)
    }

    pub fn set_baud_rate(&mut self, baud: u32) {
        self.record.set(field::SERIAL_BAUD_RATE, baud);
    }

    pub fn usb_vid(&self) -> Option<u16> {
        self.int_field(field::USB_VID)
    }

    pub fn set_usb_vid(&mut self, vid: u16) {
        self.record.set(field::USB_VID, vid);
    }

    pub fn usb_pid(&self) -> Option<u16> {
        self.int_field(field::USB_PID)
    }

    pub fn set_usb_pid(&mut self, pid: u16) {
        self.record.set(field::USB_PID, pid);
    }

    fn int_field<T: TryFrom<i64>>(&self, name: &str) -> Option<T> {
        self.record
            .get_int(name)
            .and_then(|v| T::try_from(v).ok())
    }
}

impl From<Record> for ChipParameters {
    fn from(record: Record) -> Self {
        Self { record }
    }
}
