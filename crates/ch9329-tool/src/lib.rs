//! # ch9329-tool
//!
//! Offline inspector for the CH9329 serial protocol. It builds request
//! frames, describes captured frames, and decodes parameter records from hex
//! dumps. Nothing here opens a serial port.
//!
//! The binary in `main.rs` is a thin wrapper: argument parsing lives in
//! [`cli`], configuration loading in [`config`], and hex text handling in
//! [`hex`].

pub mod cli;
pub mod config;
pub mod hex;

pub use cli::{run, Cli, Command};
pub use config::{load_config, parse_config, ConfigError, ToolConfig};
