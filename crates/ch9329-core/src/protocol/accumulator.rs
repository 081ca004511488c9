//! Receive-side buffer that turns chunked serial reads into whole frames.
//!
//! Serial reads return whatever happened to arrive: half a frame, two frames,
//! or a frame preceded by noise left over from an earlier timeout. The
//! accumulator keeps the unconsumed tail between calls and resynchronises on
//! the configured head marker.
//!
//! ```rust
//! use ch9329_core::{CodecConfig, FrameAccumulator};
//!
//! let mut acc = FrameAccumulator::new(CodecConfig::default());
//! assert!(acc.push(&[0x57, 0xAB, 0x00]).is_empty());
//! let frames = acc.push(&[0x89, 0x01, 0x00, 0x8C]);
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].frame.payload(), &[0x00]);
//! ```

use tracing::{debug, warn};

use crate::config::CodecConfig;
use crate::protocol::codec::{parse, FrameError, ParsedFrame};

/// Accumulates bytes and yields complete frames.
#[derive(Debug, Clone, Default)]
pub struct FrameAccumulator {
    buffer: Vec<u8>,
    config: CodecConfig,
}

impl FrameAccumulator {
    pub fn new(config: CodecConfig) -> Self {
        Self {
            buffer: Vec::new(),
            config,
        }
    }

    /// Appends `chunk` and returns every frame that is now complete, in
    /// arrival order.
    ///
    /// Bytes before a head marker are discarded. With checksum verification
    /// on, a frame that fails it is dropped and scanning resumes one byte
    /// after its head.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ParsedFrame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();

        loop {
            if !self.align_to_head() {
                break;
            }
            match parse(&self.buffer, self.config.verify_checksum) {
                Ok(parsed) => {
                    self.buffer.drain(..parsed.frame_len);
                    frames.push(parsed);
                }
                Err(FrameError::InsufficientData { .. }) => break,
                Err(err) => {
                    warn!(error = %err, "dropping invalid frame");
                    self.buffer.drain(..1);
                }
            }
        }
        frames
    }

    /// Number of buffered bytes not yet returned as a frame.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Discards everything buffered, e.g. after the caller flushes the port.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Drops leading bytes until the buffer starts with the head marker.
    ///
    /// Returns `false` when no complete head is buffered. A trailing byte
    /// that could be the first half of a head is kept.
    fn align_to_head(&mut self) -> bool {
        let head = self.config.head;
        match self.buffer.windows(head.len()).position(|w| w == head.as_slice()) {
            Some(0) => true,
            Some(skip) => {
                debug!(skipped = skip, "discarding bytes before frame head");
                self.buffer.drain(..skip);
                true
            }
            None => {
                let keep = usize::from(self.buffer.last() == Some(&head[0]));
                let skip = self.buffer.len() - keep;
                if skip > 0 {
                    debug!(skipped = skip, "discarding bytes without frame head");
                    self.buffer.drain(..skip);
                }
                false
            }
        }
    }
}
