//! Wire constants, command opcodes, and reply status codes of the CH9329
//! serial protocol.
//!
//! Frame layout on the wire:
//!
//! ```text
//! [head:2][address:1][command:1][length:1][payload:length][checksum:1]
//! ```
//!
//! The checksum is the wrapping 8-bit sum of every byte before it.

use serde::{Deserialize, Serialize};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Two-byte marker that starts every frame, in both directions.
pub const FRAME_HEAD: [u8; 2] = [0x57, 0xAB];

/// Address used when the chip is configured with the factory default.
pub const DEFAULT_ADDRESS: u8 = 0x00;

/// Bytes before the payload: head (2) + address (1) + command (1) + length (1).
pub const PREFIX_SIZE: usize = 5;

/// Offset of the single length byte inside the prefix.
pub const LENGTH_OFFSET: usize = 4;

/// Trailing checksum byte.
pub const CHECKSUM_SIZE: usize = 1;

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

/// Smallest possible frame: prefix plus checksum with an empty payload.
pub const MIN_FRAME_SIZE: usize = PREFIX_SIZE + CHECKSUM_SIZE;

// ── Command codes ─────────────────────────────────────────────────────────────

/// Request opcodes understood by the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CommandCode {
    /// Chip version, USB enumeration state and keyboard LED state.
    GetInfo = 0x01,
    /// Standard 8-byte keyboard report.
    SendKeyboardGeneralData = 0x02,
    /// Absolute pointer report (coordinates in 0..4096).
    SendMouseAbsoluteData = 0x04,
    /// Relative pointer report.
    SendMouseRelativeData = 0x05,
    /// Read the 50-byte parameter configuration record.
    GetParameterConfig = 0x08,
    /// Write the 50-byte parameter configuration record.
    SetParameterConfig = 0x09,
    /// Read a USB string descriptor.
    GetUsbString = 0x0A,
    /// Write a USB string descriptor.
    SetUsbString = 0x0B,
    /// Restore the factory parameter configuration.
    RestoreFactoryConfig = 0x0C,
    /// Soft reset. The chip sends no reply.
    Reset = 0x0F,
}

impl TryFrom<u8> for CommandCode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x01 => Ok(CommandCode::GetInfo),
            0x02 => Ok(CommandCode::SendKeyboardGeneralData),
            0x04 => Ok(CommandCode::SendMouseAbsoluteData),
            0x05 => Ok(CommandCode::SendMouseRelativeData),
            0x08 => Ok(CommandCode::GetParameterConfig),
            0x09 => Ok(CommandCode::SetParameterConfig),
            0x0A => Ok(CommandCode::GetUsbString),
            0x0B => Ok(CommandCode::SetUsbString),
            0x0C => Ok(CommandCode::RestoreFactoryConfig),
            0x0F => Ok(CommandCode::Reset),
            _ => Err(()),
        }
    }
}

impl From<CommandCode> for u8 {
    fn from(code: CommandCode) -> u8 {
        code as u8
    }
}

// ── Reply status ──────────────────────────────────────────────────────────────

/// Status byte returned as the first payload byte of one-byte replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ReplyStatus {
    Success = 0x00,
    /// The chip timed out waiting for the rest of a frame.
    Timeout = 0xE1,
    /// The frame head bytes were wrong.
    HeadError = 0xE2,
    /// Unknown command code.
    CommandError = 0xE3,
    /// The request checksum did not match.
    ChecksumError = 0xE4,
    /// A payload parameter was out of range.
    ParameterError = 0xE5,
    /// The frame was valid but execution failed.
    OperationFailed = 0xE6,
}

impl ReplyStatus {
    /// Returns `true` only for [`ReplyStatus::Success`].
    pub fn is_success(self) -> bool {
        self == ReplyStatus::Success
    }
}

impl TryFrom<u8> for ReplyStatus {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x00 => Ok(ReplyStatus::Success),
            0xE1 => Ok(ReplyStatus::Timeout),
            0xE2 => Ok(ReplyStatus::HeadError),
            0xE3 => Ok(ReplyStatus::CommandError),
            0xE4 => Ok(ReplyStatus::ChecksumError),
            0xE5 => Ok(ReplyStatus::ParameterError),
            0xE6 => Ok(ReplyStatus::OperationFailed),
            _ => Err(()),
        }
    }
}
