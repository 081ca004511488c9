//! Command-line surface: argument definitions and the subcommand handlers.
//!
//! Handlers return the text to print instead of printing it, so the
//! integration tests and `main` share one code path.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use ch9329_core::command::reply_status;
use ch9329_core::record::chip::CHIP_PARAMETERS_SIZE;
use ch9329_core::{ChipParameters, CommandCode, FrameCodec, ParsedFrame};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use crate::config::ToolConfig;
use crate::hex::{format_hex, parse_hex};

#[derive(Parser, Debug)]
#[command(name = "ch9329-tool", version)]
#[command(
    about = "Offline inspector for CH9329 serial frames and parameter records.",
    long_about = None,
    after_help = "Examples:\n  ch9329-tool build reset\n  ch9329-tool build get-usb-string 01\n  ch9329-tool parse 57 AB 00 89 01 00 8C --json\n  ch9329-tool params 57AB0088328080...24"
)]
pub struct Cli {
    /// TOML config file
    #[arg(long, value_name = "PATH", global = true, env = "CH9329_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a request frame and print it as hex
    Build {
        /// Command name (e.g. `reset`, `get-info`) or code (e.g. `0x0F`)
        command: String,

        /// Payload bytes as hex
        payload: Vec<String>,
    },

    /// Parse one frame from hex and describe it
    Parse {
        /// Frame bytes as hex
        #[arg(required = true)]
        hex: Vec<String>,

        /// Reject a wrong checksum even if the config tolerates it
        #[arg(long)]
        strict: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Decode a parameter reply frame, or a bare 50-byte record, as JSON
    Params {
        /// Frame or record bytes as hex
        #[arg(required = true)]
        hex: Vec<String>,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// Accepted command names for `build`, in opcode order.
pub const COMMAND_NAMES: &[(&str, CommandCode)] = &[
    ("get-info", CommandCode::GetInfo),
    ("keyboard", CommandCode::SendKeyboardGeneralData),
    ("mouse-absolute", CommandCode::SendMouseAbsoluteData),
    ("mouse-relative", CommandCode::SendMouseRelativeData),
    ("get-params", CommandCode::GetParameterConfig),
    ("set-params", CommandCode::SetParameterConfig),
    ("get-usb-string", CommandCode::GetUsbString),
    ("set-usb-string", CommandCode::SetUsbString),
    ("factory-reset", CommandCode::RestoreFactoryConfig),
    ("reset", CommandCode::Reset),
];

const REPLY_BIT: u8 = 0x80;
const ERROR_BIT: u8 = 0x40;

/// Runs one subcommand and returns what it prints.
///
/// # Errors
///
/// Any hex, frame, record or config error, with context naming the input.
pub fn run(command: &Command, config: &ToolConfig) -> Result<String> {
    match command {
        Command::Build { command, payload } => cmd_build(command, &payload.join(" "), config),
        Command::Parse { hex, strict, json } => cmd_parse(&hex.join(" "), *strict, *json, config),
        Command::Params { hex } => cmd_params(&hex.join(" "), config),
        Command::Config => Ok(config.to_toml()?),
    }
}

/// Resolves a command name or numeric code to an opcode.
pub fn resolve_command(name: &str) -> Result<u8> {
    if let Some((_, code)) = COMMAND_NAMES.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
        return Ok(*code as u8);
    }
    let parsed = match name.strip_prefix("0x").or_else(|| name.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => name.parse::<u8>(),
    };
    match parsed {
        Ok(code) => Ok(code),
        Err(_) => {
            let known: Vec<&str> = COMMAND_NAMES.iter().map(|(n, _)| *n).collect();
            bail!(
                "unknown command {name:?}; expected a code such as 0x0F or one of: {}",
                known.join(", ")
            )
        }
    }
}

/// Names the opcode, marking reply and error-reply codes.
pub fn describe_command(code: u8) -> Option<String> {
    let base = CommandCode::try_from(code & !(REPLY_BIT | ERROR_BIT)).ok()?;
    let described = match (code & REPLY_BIT != 0, code & ERROR_BIT != 0) {
        (false, false) => format!("{base:?}"),
        (true, false) => format!("reply to {base:?}"),
        (true, true) => format!("error reply to {base:?}"),
        (false, true) => return None,
    };
    Some(described)
}

fn cmd_build(command: &str, payload: &str, config: &ToolConfig) -> Result<String> {
    let code = resolve_command(command)?;
    let payload = parse_hex(payload).context("invalid payload hex")?;
    let frame = FrameCodec::new(config.codec)
        .request(code, payload)
        .context("cannot build frame")?;
    debug!(code, len = frame.wire_len(), "built frame");
    Ok(format_hex(&frame.to_bytes()))
}

#[derive(Debug, Serialize)]
struct FrameReport {
    head: String,
    address: u8,
    command: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    command_name: Option<String>,
    length: u8,
    payload: String,
    checksum: u8,
    checksum_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    frame_len: usize,
    trailing: usize,
}

impl FrameReport {
    fn new(parsed: &ParsedFrame, input_len: usize) -> Self {
        let frame = &parsed.frame;
        let is_status_reply = frame.command() & REPLY_BIT != 0 && frame.payload().len() == 1;
        let status = is_status_reply
            .then(|| reply_status(frame.payload()).ok())
            .flatten()
            .map(|s| format!("{s:?}"));
        Self {
            head: format_hex(&frame.head()),
            address: frame.address(),
            command: frame.command(),
            command_name: describe_command(frame.command()),
            length: frame.payload_len(),
            payload: format_hex(frame.payload()),
            checksum: parsed.received_checksum,
            checksum_ok: parsed.checksum_ok(),
            status,
            frame_len: parsed.frame_len,
            trailing: input_len - parsed.frame_len,
        }
    }

    fn to_text(&self) -> String {
        let command = match &self.command_name {
            Some(name) => format!("0x{:02X} ({name})", self.command),
            None => format!("0x{:02X}", self.command),
        };
        let verdict = if self.checksum_ok { "ok" } else { "MISMATCH" };

        let mut lines = vec![
            format!("head:      {}", self.head),
            format!("address:   0x{:02X}", self.address),
            format!("command:   {command}"),
            format!("length:    {}", self.length),
            format!("payload:   {}", self.payload),
            format!("checksum:  0x{:02X} ({verdict})", self.checksum),
        ];
        if let Some(status) = &self.status {
            lines.push(format!("status:    {status}"));
        }
        lines.push(format!("frame_len: {}", self.frame_len));
        if self.trailing > 0 {
            lines.push(format!("trailing:  {} bytes ignored", self.trailing));
        }
        lines.join("\n")
    }
}

fn cmd_parse(hex: &str, strict: bool, json: bool, config: &ToolConfig) -> Result<String> {
    let bytes = parse_hex(hex).context("invalid frame hex")?;
    let mut codec_config = config.codec;
    if strict {
        codec_config = codec_config.strict();
    }
    let parsed = FrameCodec::new(codec_config)
        .parse(&bytes)
        .context("cannot parse frame")?;

    let report = FrameReport::new(&parsed, bytes.len());
    if json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(report.to_text())
    }
}

fn cmd_params(hex: &str, config: &ToolConfig) -> Result<String> {
    let bytes = parse_hex(hex).context("invalid record hex")?;
    let payload = if bytes.len() == CHIP_PARAMETERS_SIZE {
        bytes
    } else {
        FrameCodec::new(config.codec)
            .parse(&bytes)
            .context("input is neither a 50-byte record nor a parseable frame")?
            .frame
            .into_payload()
    };
    let params =
        ChipParameters::from_payload(&payload).context("cannot decode parameter record")?;

    Ok(serde_json::to_string_pretty(params.record())?)
}
