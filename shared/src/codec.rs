//! Line codec for the controller socket
//!
//! Each line is one command, colon separated and selected by its prefix:
//! ```text
//! btn:<button>:true              -> hold <button>
//! btn:<button>:false             -> release <button>
//! stick:<side>:<direction>:true  -> stick <side> <direction>
//! stick:<side>:<direction>:false -> stick <side> center
//! nfc:<path>                     -> nfc <path>
//! cmd:<name> <arg> <arg> ...     -> <name> <arg> <arg> ...
//! ```
//! Anything else parses to a command with an empty name, which no handler
//! answers to.

use thiserror::Error;

/// Errors for lines that use a known prefix with the wrong shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Malformed \"{prefix}\" line \"{line}\": expected {expected} fields, got {got}")]
    FieldCount {
        prefix: &'static str,
        line: String,
        expected: usize,
        got: usize,
    },
}

/// A parsed command: a name plus its ordered arguments
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The command produced by lines no prefix matches
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Parse one protocol line (without its newline)
pub fn parse_line(line: &str) -> Result<Command, CodecError> {
    if line.starts_with("btn:") {
        let [_, button, pressed] = split_fields::<3>("btn", line)?;
        let name = if pressed == "true" { "hold" } else { "release" };
        return Ok(Command::new(name, vec![button.to_string()]));
    }

    if line.starts_with("stick:") {
        let [_, side, direction, pressed] = split_fields::<4>("stick", line)?;
        let direction = if pressed == "true" { direction } else { "center" };
        return Ok(Command::new(
            "stick",
            vec![side.to_string(), direction.to_string()],
        ));
    }

    if let Some(path) = line.strip_prefix("nfc:") {
        return Ok(Command::new("nfc", vec![path.to_string()]));
    }

    if let Some(rest) = line.strip_prefix("cmd:") {
        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();
        return Ok(Command::new(name, words.map(str::to_string).collect()));
    }

    Ok(Command::unknown())
}

fn split_fields<'a, const N: usize>(
    prefix: &'static str,
    line: &'a str,
) -> Result<[&'a str; N], CodecError> {
    let fields: Vec<&str> = line.split(':').collect();
    let got = fields.len();
    fields.try_into().map_err(|_| CodecError::FieldCount {
        prefix,
        line: line.to_string(),
        expected: N,
        got,
    })
}
