//! Protocol module containing the frame codec, wire constants, and the
//! receive-side frame accumulator.

pub mod accumulator;
pub mod codec;
pub mod messages;

pub use accumulator::FrameAccumulator;
pub use codec::{
    build, checksum, compute_frame_length, parse, Frame, FrameCodec, FrameError, ParsedFrame,
};
pub use messages::*;
