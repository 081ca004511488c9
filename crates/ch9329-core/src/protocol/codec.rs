//! Binary codec for building and parsing CH9329 request/reply frames.
//!
//! Wire format:
//! ```text
//! [head:2][address:1][command:1][length:1][payload:length][checksum:1]
//! ```
//! Prefix size: 5 bytes. The checksum is the wrapping 8-bit sum of every
//! preceding byte, prefix included.
//!
//! Parsing never produces a partially filled frame: either a complete frame
//! is found at the start of the buffer, or an error says why not. Bytes
//! after the frame are ignored, because serial reads routinely return more
//! than one frame or trailing line noise.

use thiserror::Error;
use tracing::{trace, warn};

use crate::config::CodecConfig;
use crate::protocol::messages::{
    CHECKSUM_SIZE, FRAME_HEAD, LENGTH_OFFSET, MAX_PAYLOAD_LEN, PREFIX_SIZE,
};

/// Errors that can occur while building or parsing a frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// The buffer does not yet hold a complete frame. Read more and retry.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The trailing checksum byte disagrees with the recomputed sum.
    #[error("checksum mismatch: computed 0x{expected:02X}, frame carries 0x{received:02X}")]
    ChecksumMismatch { expected: u8, received: u8 },

    /// The payload cannot be described by the one-byte length field.
    #[error("payload too large: {0} bytes exceeds the 255-byte limit")]
    PayloadTooLarge(usize),

    /// The buffer does not start with the configured head marker.
    #[error("unexpected frame head: {0:02X?}")]
    UnexpectedHead([u8; 2]),
}

// ── Frame ─────────────────────────────────────────────────────────────────────

/// One request or reply frame.
///
/// The length byte is not stored: it is always derived from the payload, so
/// a `Frame` cannot disagree with itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    head: [u8; 2],
    address: u8,
    command: u8,
    payload: Vec<u8>,
}

impl Frame {
    /// Creates a frame, checking that the payload fits the length byte.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PayloadTooLarge`] for payloads over 255 bytes.
    pub fn new(
        head: [u8; 2],
        address: u8,
        command: u8,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Self, FrameError> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(FrameError::PayloadTooLarge(payload.len()));
        }
        Ok(Self {
            head,
            address,
            command,
            payload,
        })
    }

    pub fn head(&self) -> [u8; 2] {
        self.head
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the frame and returns its payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Value of the length byte.
    pub fn payload_len(&self) -> u8 {
        // Bounded by MAX_PAYLOAD_LEN in `new`.
        self.payload.len() as u8
    }

    /// Total number of bytes this frame occupies on the wire.
    pub fn wire_len(&self) -> usize {
        PREFIX_SIZE + self.payload.len() + CHECKSUM_SIZE
    }

    /// Checksum byte that [`Frame::to_bytes`] appends.
    pub fn checksum(&self) -> u8 {
        checksum(&self.prefix()).wrapping_add(checksum(&self.payload))
    }

    /// Serializes the frame, appending the computed checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.wire_len());
        buf.extend_from_slice(&self.prefix());
        buf.extend_from_slice(&self.payload);
        buf.push(self.checksum());
        buf
    }

    fn prefix(&self) -> [u8; PREFIX_SIZE] {
        [
            self.head[0],
            self.head[1],
            self.address,
            self.command,
            self.payload_len(),
        ]
    }
}

/// A frame located at the start of a receive buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFrame {
    /// The decoded frame.
    pub frame: Frame,
    /// Checksum byte as received, which may differ from `frame.checksum()`
    /// when verification is off.
    pub received_checksum: u8,
    /// Number of bytes the frame occupied; advance the read cursor by this.
    pub frame_len: usize,
}

impl ParsedFrame {
    /// Whether the received checksum matches the recomputed one.
    pub fn checksum_ok(&self) -> bool {
        self.received_checksum == self.frame.checksum()
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Wrapping 8-bit sum of `bytes`.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Builds the wire bytes for one frame.
///
/// # Errors
///
/// Returns [`FrameError::PayloadTooLarge`] if `payload` exceeds 255 bytes.
///
/// # Examples
///
/// ```rust
/// use ch9329_core::protocol::build;
///
/// // Reset command: no payload.
/// let bytes = build([0x57, 0xAB], 0x00, 0x0F, &[]).unwrap();
/// assert_eq!(bytes, [0x57, 0xAB, 0x00, 0x0F, 0x00, 0x11]);
/// ```
pub fn build(
    head: [u8; 2],
    address: u8,
    command: u8,
    payload: &[u8],
) -> Result<Vec<u8>, FrameError> {
    let frame = Frame::new(head, address, command, payload)?;
    let bytes = frame.to_bytes();
    trace!(command, len = bytes.len(), "built frame");
    Ok(bytes)
}

/// Peeks at the length byte and returns the full frame length in bytes.
///
/// Returns 0 while fewer than [`PREFIX_SIZE`] bytes are available. This is a
/// pure function: it never records anything about the buffer.
pub fn compute_frame_length(bytes: &[u8]) -> usize {
    if bytes.len() < PREFIX_SIZE {
        return 0;
    }
    PREFIX_SIZE + bytes[LENGTH_OFFSET] as usize + CHECKSUM_SIZE
}

/// Parses one frame from the beginning of `bytes`.
///
/// With `verify_checksum` off, a wrong checksum is logged and the frame is
/// still returned; [`ParsedFrame::checksum_ok`] reports the outcome.
///
/// # Errors
///
/// - [`FrameError::InsufficientData`] if the buffer is shorter than the
///   prefix or than the length the prefix declares.
/// - [`FrameError::ChecksumMismatch`] if `verify_checksum` is set and the
///   trailing byte is wrong.
///
/// # Examples
///
/// ```rust
/// use ch9329_core::protocol::{build, parse};
///
/// let bytes = build([0x57, 0xAB], 0x00, 0x09, &[0x01, 0x02]).unwrap();
/// let parsed = parse(&bytes, true).unwrap();
/// assert_eq!(parsed.frame.payload(), &[0x01, 0x02]);
/// assert_eq!(parsed.frame_len, bytes.len());
/// ```
pub fn parse(bytes: &[u8], verify_checksum: bool) -> Result<ParsedFrame, FrameError> {
    let frame_len = compute_frame_length(bytes);
    if frame_len == 0 {
        return Err(FrameError::InsufficientData {
            needed: PREFIX_SIZE,
            available: bytes.len(),
        });
    }
    if bytes.len() < frame_len {
        return Err(FrameError::InsufficientData {
            needed: frame_len,
            available: bytes.len(),
        });
    }

    let checksum_at = frame_len - CHECKSUM_SIZE;
    let received = bytes[checksum_at];
    let expected = checksum(&bytes[..checksum_at]);
    if expected != received {
        if verify_checksum {
            return Err(FrameError::ChecksumMismatch { expected, received });
        }
        warn!(
            expected = format_args!("0x{expected:02X}"),
            received = format_args!("0x{received:02X}"),
            "tolerating frame checksum mismatch"
        );
    }

    let frame = Frame::new(
        [bytes[0], bytes[1]],
        bytes[2],
        bytes[3],
        &bytes[PREFIX_SIZE..checksum_at],
    )?;
    Ok(ParsedFrame {
        frame,
        received_checksum: received,
        frame_len,
    })
}

// ── Configured codec ──────────────────────────────────────────────────────────

/// Frame builder/parser bound to one chip's [`CodecConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCodec {
    config: CodecConfig,
}

impl FrameCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Creates a request frame with the configured head and address.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::PayloadTooLarge`] for payloads over 255 bytes.
    pub fn request(
        &self,
        command: impl Into<u8>,
        payload: impl Into<Vec<u8>>,
    ) -> Result<Frame, FrameError> {
        Frame::new(self.config.head, self.config.address, command.into(), payload)
    }

    /// Parses one frame, also rejecting a head other than the configured one.
    ///
    /// # Errors
    ///
    /// Everything [`parse`] returns, plus [`FrameError::UnexpectedHead`].
    pub fn parse(&self, bytes: &[u8]) -> Result<ParsedFrame, FrameError> {
        if bytes.len() >= FRAME_HEAD.len() {
            let head = [bytes[0], bytes[1]];
            if head != self.config.head {
                return Err(FrameError::UnexpectedHead(head));
            }
        }
        parse(bytes, self.config.verify_checksum)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
