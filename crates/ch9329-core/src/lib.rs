//! # ch9329-core
//!
//! Wire codecs for the CH9329, a chip that turns commands received on a UART
//! into USB keyboard and mouse reports.
//!
//! The crate does no I/O. It builds the bytes to write to the serial port
//! and makes sense of the bytes read back, so it can sit under a blocking
//! port, an async runtime, or a test harness without change.
//!
//! - **`protocol`**: the frame format `[head:2][address][command][length]
//!   [payload][checksum]`, with a one-shot builder/parser and a
//!   [`FrameAccumulator`] for reassembling frames from a byte stream.
//!
//! - **`record`**: a declarative layout codec that maps fixed-size binary
//!   records to named values, with per-field byte order. The chip's 50-byte
//!   parameter block is described as one such layout.
//!
//! - **`command`**: request builders for every chip command (keyboard and
//!   mouse reports, parameter and USB string access, reset) and
//!   interpreters for their replies.
//!
//! - **`config`**: [`CodecConfig`], the frame head, chip address and
//!   checksum policy applied by [`FrameCodec`].
//!
//! ```rust
//! use ch9329_core::{CodecConfig, FrameAccumulator};
//!
//! let mut acc = FrameAccumulator::new(CodecConfig::default());
//! let frames = acc.push(&[0x57, 0xAB, 0x00, 0x89, 0x01, 0x00, 0x8C]);
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].frame.payload(), &[0x00]);
//! ```

pub mod command;
pub mod config;
pub mod protocol;
pub mod record;

pub use command::{CommandError, Commands};
pub use config::CodecConfig;
pub use protocol::accumulator::FrameAccumulator;
pub use protocol::codec::{
    build, checksum, compute_frame_length, parse, Frame, FrameCodec, FrameError, ParsedFrame,
};
pub use protocol::messages::{CommandCode, ReplyStatus};
pub use record::chip::ChipParameters;
pub use record::codec::{decode, encode, Record, RecordError, Value};
pub use record::layout::{layout_size, ByteOrder, Field, FieldKind, Layout};
