//! Request builders and reply interpreters for the chip's commands.
//!
//! Nothing here touches a serial port. Builders return [`Frame`]s ready to
//! be serialized with [`Frame::to_bytes`]; interpreters take the payload of
//! a reply the caller has already parsed. This keeps the command layer
//! usable from blocking, async, and test code alike.
//!
//! ```rust
//! use ch9329_core::command::Commands;
//!
//! let commands = Commands::default();
//! assert_eq!(
//!     commands.reset().unwrap().to_bytes(),
//!     [0x57, 0xAB, 0x00, 0x0F, 0x00, 0x11]
//! );
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::protocol::codec::{Frame, FrameCodec, FrameError};
use crate::protocol::messages::{CommandCode, ReplyStatus, MIN_FRAME_SIZE};
use crate::record::chip::{ChipParameters, CHIP_PARAMETERS_SIZE};
use crate::record::codec::RecordError;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Keys a single keyboard report can hold.
pub const MAX_KEYS: usize = 6;

/// Longest USB string descriptor the chip stores, in UTF-8 bytes.
pub const MAX_USB_STRING_LEN: usize = 23;

/// Absolute pointer reports span `0..=4096` on both axes.
pub const ABSOLUTE_RESOLUTION: u32 = 4096;

/// Size of the reply to [`CommandCode::GetParameterConfig`].
pub const GET_PARAMETERS_REPLY_LEN: usize = MIN_FRAME_SIZE + CHIP_PARAMETERS_SIZE;

/// Size of a reply carrying only a status byte.
pub const STATUS_REPLY_LEN: usize = MIN_FRAME_SIZE + 1;

/// Errors produced while building requests or interpreting replies.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Record(#[from] RecordError),

    /// More distinct keys than one report can carry.
    #[error("too many keys: {0} distinct keys, a report holds at most 6")]
    TooManyKeys(usize),

    /// An absolute coordinate or screen dimension is out of range.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// A USB string does not fit the descriptor.
    #[error("USB string too long: {0} bytes, limit is 23")]
    StringTooLong(usize),

    /// The reply payload is shorter than its format requires.
    #[error("reply too short: need {needed} bytes, got {available}")]
    ShortReply { needed: usize, available: usize },

    /// A USB string reply is not valid UTF-8.
    #[error("USB string is not valid UTF-8: {0}")]
    InvalidString(#[from] std::str::Utf8Error),

    /// The status byte is not a known code.
    #[error("unknown reply status: 0x{0:02X}")]
    UnknownStatus(u8),

    /// The chip answered with an error status.
    #[error("chip rejected the command: {0:?}")]
    Rejected(ReplyStatus),
}

// ── Report types ──────────────────────────────────────────────────────────────

/// Keyboard modifier bitmask, first byte of a keyboard report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModifierFlags(pub u8);

impl ModifierFlags {
    pub const LEFT_CTRL: u8 = 0x01;
    pub const LEFT_SHIFT: u8 = 0x02;
    pub const LEFT_ALT: u8 = 0x04;
    pub const LEFT_GUI: u8 = 0x08;
    pub const RIGHT_CTRL: u8 = 0x10;
    pub const RIGHT_SHIFT: u8 = 0x20;
    pub const RIGHT_ALT: u8 = 0x40;
    pub const RIGHT_GUI: u8 = 0x80;

    pub fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub fn with(self, bit: u8) -> Self {
        Self(self.0 | bit)
    }
}

/// Mouse button bitmask, shared by absolute and relative reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButtons(pub u8);

impl MouseButtons {
    pub const LEFT: u8 = 0x01;
    pub const RIGHT: u8 = 0x02;
    pub const MIDDLE: u8 = 0x04;

    pub fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }
}

/// Pointer position in screen pixels, scaled to the chip's 4096 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsoluteMouseReport {
    pub x: u32,
    pub y: u32,
    pub screen_width: u32,
    pub screen_height: u32,
    pub buttons: MouseButtons,
    /// Positive scrolls up, negative scrolls down.
    pub wheel: i8,
}

/// Pointer movement relative to the current position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelativeMouseReport {
    pub dx: i8,
    pub dy: i8,
    pub buttons: MouseButtons,
    pub wheel: i8,
}

/// Which USB string descriptor to read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum UsbStringKind {
    Manufacturer = 0x00,
    Product = 0x01,
    SerialNumber = 0x02,
}

impl TryFrom<u8> for UsbStringKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x00 => Ok(UsbStringKind::Manufacturer),
            0x01 => Ok(UsbStringKind::Product),
            0x02 => Ok(UsbStringKind::SerialNumber),
            _ => Err(()),
        }
    }
}

// ── Request builders ──────────────────────────────────────────────────────────

/// Builds request frames for one chip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Commands {
    codec: FrameCodec,
}

impl Commands {
    pub fn new(codec: FrameCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &FrameCodec {
        &self.codec
    }

    /// Asks for chip version, USB state and keyboard LEDs.
    pub fn get_info(&self) -> Result<Frame, CommandError> {
        self.empty(CommandCode::GetInfo)
    }

    /// Builds an 8-byte keyboard report.
    ///
    /// `keys` are HID usage codes; zeros and repeats are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::TooManyKeys`] for more than six distinct keys.
    pub fn keyboard_report(
        &self,
        modifiers: ModifierFlags,
        keys: &[u8],
    ) -> Result<Frame, CommandError> {
        let mut distinct: Vec<u8> = Vec::with_capacity(MAX_KEYS);
        for &key in keys {
            if key != 0x00 && !distinct.contains(&key) {
                distinct.push(key);
            }
        }
        if distinct.len() > MAX_KEYS {
            return Err(CommandError::TooManyKeys(distinct.len()));
        }

        let mut payload = vec![modifiers.0, 0x00];
        payload.extend_from_slice(&distinct);
        payload.resize(2 + MAX_KEYS, 0x00);
        self.request(CommandCode::SendKeyboardGeneralData, payload)
    }

    /// Keyboard report with nothing pressed.
    pub fn release_keyboard(&self) -> Result<Frame, CommandError> {
        self.keyboard_report(ModifierFlags::default(), &[])
    }

    /// Builds a 7-byte absolute pointer report.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidCoordinate`] when a screen dimension
    /// is outside `1..=4096` or a coordinate exceeds its dimension.
    pub fn mouse_absolute(&self, report: &AbsoluteMouseReport) -> Result<Frame, CommandError> {
        let x = scale_axis("x", report.x, report.screen_width)?;
        let y = scale_axis("y", report.y, report.screen_height)?;

        let mut payload = vec![0x02, report.buttons.0];
        payload.extend_from_slice(&x.to_le_bytes());
        payload.extend_from_slice(&y.to_le_bytes());
        payload.push(report.wheel as u8);
        self.request(CommandCode::SendMouseAbsoluteData, payload)
    }

    /// Builds a 5-byte relative pointer report.
    pub fn mouse_relative(&self, report: &RelativeMouseReport) -> Result<Frame, CommandError> {
        let payload = vec![
            0x01,
            report.buttons.0,
            report.dx as u8,
            report.dy as u8,
            report.wheel as u8,
        ];
        self.request(CommandCode::SendMouseRelativeData, payload)
    }

    /// Asks for the parameter record; the reply is
    /// [`GET_PARAMETERS_REPLY_LEN`] bytes.
    pub fn get_parameters(&self) -> Result<Frame, CommandError> {
        self.empty(CommandCode::GetParameterConfig)
    }

    /// Writes the parameter record; the reply is [`STATUS_REPLY_LEN`] bytes.
    pub fn set_parameters(&self, params: &ChipParameters) -> Result<Frame, CommandError> {
        let payload = params.to_payload()?;
        self.request(CommandCode::SetParameterConfig, payload)
    }

    pub fn get_usb_string(&self, kind: UsbStringKind) -> Result<Frame, CommandError> {
        self.request(CommandCode::GetUsbString, vec![kind as u8])
    }

    /// Writes a USB string descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::StringTooLong`] for more than 23 UTF-8 bytes.
    pub fn set_usb_string(&self, kind: UsbStringKind, text: &str) -> Result<Frame, CommandError> {
        let bytes = text.as_bytes();
        if bytes.len() > MAX_USB_STRING_LEN {
            return Err(CommandError::StringTooLong(bytes.len()));
        }
        let mut payload = Vec::with_capacity(2 + bytes.len());
        payload.push(kind as u8);
        payload.push(bytes.len() as u8);
        payload.extend_from_slice(bytes);
        self.request(CommandCode::SetUsbString, payload)
    }

    pub fn restore_factory_config(&self) -> Result<Frame, CommandError> {
        self.empty(CommandCode::RestoreFactoryConfig)
    }

    /// Soft reset. The chip does not reply.
    pub fn reset(&self) -> Result<Frame, CommandError> {
        self.empty(CommandCode::Reset)
    }

    fn empty(&self, command: CommandCode) -> Result<Frame, CommandError> {
        self.request(command, Vec::new())
    }

    fn request(&self, command: CommandCode, payload: Vec<u8>) -> Result<Frame, CommandError> {
        let frame = self.codec.request(command, payload)?;
        debug!(?command, payload_len = frame.payload().len(), "built request");
        Ok(frame)
    }
}

fn scale_axis(axis: &str, value: u32, extent: u32) -> Result<u16, CommandError> {
    if extent == 0 || extent > ABSOLUTE_RESOLUTION {
        return Err(CommandError::InvalidCoordinate(format!(
            "{axis} extent {extent} outside 1..=4096"
        )));
    }
    if value > extent {
        return Err(CommandError::InvalidCoordinate(format!(
            "{axis} = {value} exceeds extent {extent}"
        )));
    }
    // value <= extent <= 4096, so the result is at most 4096.
    Ok((ABSOLUTE_RESOLUTION * value / extent) as u16)
}

// ── Reply interpreters ────────────────────────────────────────────────────────

/// Reads the status byte at the start of a reply payload.
pub fn reply_status(payload: &[u8]) -> Result<ReplyStatus, CommandError> {
    let first = *payload.first().ok_or(CommandError::ShortReply {
        needed: 1,
        available: 0,
    })?;
    ReplyStatus::try_from(first).map_err(|_| CommandError::UnknownStatus(first))
}

/// Succeeds only if the reply status is [`ReplyStatus::Success`].
pub fn expect_success(payload: &[u8]) -> Result<(), CommandError> {
    match reply_status(payload)? {
        ReplyStatus::Success => Ok(()),
        status => Err(CommandError::Rejected(status)),
    }
}

/// Decodes the payload of a `GetParameterConfig` reply.
pub fn parameters_from_reply(payload: &[u8]) -> Result<ChipParameters, CommandError> {
    Ok(ChipParameters::from_payload(payload)?)
}

/// Decodes the payload of a `GetUsbString` reply: `[kind, len, bytes...]`.
///
/// A length byte larger than the bytes present is clamped to what arrived.
pub fn usb_string_from_reply(payload: &[u8]) -> Result<String, CommandError> {
    if payload.len() < 2 {
        return Err(CommandError::ShortReply {
            needed: 2,
            available: payload.len(),
        });
    }
    let declared = payload[1] as usize;
    let text = &payload[2..];
    let text = &text[..declared.min(text.len())];
    Ok(std::str::from_utf8(text)?.to_string())
}

/// Chip state reported by [`CommandCode::GetInfo`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorStatus {
    /// Firmware version byte, e.g. `0x30` for V1.0.
    pub version: u8,
    pub usb_connected: bool,
    pub num_lock: bool,
    pub caps_lock: bool,
    pub scroll_lock: bool,
}

impl IndicatorStatus {
    pub const NUM_LOCK: u8 = 0x01;
    pub const CAPS_LOCK: u8 = 0x02;
    pub const SCROLL_LOCK: u8 = 0x04;

    /// Decodes the payload of a `GetInfo` reply.
    pub fn from_info_reply(payload: &[u8]) -> Result<Self, CommandError> {
        if payload.len() < 3 {
            return Err(CommandError::ShortReply {
                needed: 3,
                available: payload.len(),
            });
        }
        let leds = payload[2];
        Ok(Self {
            version: payload[0],
            usb_connected: payload[1] != 0,
            num_lock: leds & Self::NUM_LOCK != 0,
            caps_lock: leds & Self::CAPS_LOCK != 0,
            scroll_lock: leds & Self::SCROLL_LOCK != 0,
        })
    }
}
