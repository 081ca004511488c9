//! Codec settings shared by [`crate::protocol::FrameCodec`] and
//! [`crate::protocol::FrameAccumulator`].
//!
//! The struct derives `serde` so applications can embed it in their own
//! configuration files:
//!
//! ```toml
//! [codec]
//! head = [0x57, 0xAB]
//! address = 0
//! verify_checksum = false
//! ```
//!
//! Every field has a default, so an empty `[codec]` table is valid.

use serde::{Deserialize, Serialize};

use crate::protocol::messages::{DEFAULT_ADDRESS, FRAME_HEAD};

/// Framing parameters for one chip on one serial link.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodecConfig {
    /// Frame start marker written on requests and expected on replies.
    #[serde(default = "default_head")]
    pub head: [u8; 2],
    /// Chip address written on requests.
    #[serde(default = "default_address")]
    pub address: u8,
    /// Reject replies whose trailing checksum does not match.
    ///
    /// Off by default: some firmware revisions send replies with a wrong
    /// checksum, and the chip itself never enforces it on replies.
    #[serde(default)]
    pub verify_checksum: bool,
}

fn default_head() -> [u8; 2] {
    FRAME_HEAD
}

fn default_address() -> u8 {
    DEFAULT_ADDRESS
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            head: default_head(),
            address: default_address(),
            verify_checksum: false,
        }
    }
}

impl CodecConfig {
    /// Returns a copy with checksum verification switched on.
    pub fn strict(self) -> Self {
        Self {
            verify_checksum: true,
            ..self
        }
    }
}
