//! Command error types

use joycontrol_shared::{Button, CodecError, Controller, DeviceError, StickError, UnknownButton};
use std::path::PathBuf;
use thiserror::Error;

/// Failures of a single command
///
/// None of these are fatal: the dispatcher reports them and carries on.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Malformed(#[from] CodecError),

    #[error("\"{command}\" command requires {what}!")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error(transparent)]
    InvalidButton(#[from] UnknownButton),

    #[error("Button {button} does not exist on {controller}")]
    UnavailableButton { button: Button, controller: Controller },

    #[error("Value of side must be \"l\", \"left\" or \"r\", \"right\", got \"{0}\"")]
    InvalidSide(String),

    #[error("Unexpected argument \"{0}\"")]
    InvalidDirection(String),

    #[error("Missing value")]
    MissingValue,

    #[error("Unexpected stick value \"{0}\"")]
    InvalidValue(String),

    #[error(transparent)]
    OutOfRange(#[from] StickError),

    #[error("NFC content cannot be set for {0}")]
    Unsupported(Controller),

    #[error("Failed to read NFC dump {path:?}: {source}")]
    ReadTag {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Failure raised by a host-registered command
    #[error(transparent)]
    Extension(#[from] anyhow::Error),
}
