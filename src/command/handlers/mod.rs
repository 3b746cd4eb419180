//! Built-in command handlers

mod button;
mod nfc;
mod stick;

pub use button::{decode_buttons, handle_hold, handle_release};
pub use nfc::{handle_nfc, NfcCommand, TagScheduler};
pub use stick::{handle_stick, StickCommand, StickMotion};

use crate::command::CommandError;
use joycontrol_shared::{Button, DeviceState};
use std::sync::Arc;
use std::time::Duration;

/// Context passed to command handlers
#[derive(Clone)]
pub struct HandlerContext {
    pub device: Arc<dyn DeviceState>,
    pub tags: Arc<TagScheduler>,
    /// Auto-clear delay for `nfc` when the line gives none
    pub nfc_clear_delay: Duration,
}

/// Names answered by built-in handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Hold,
    Release,
    Stick,
    Nfc,
}

impl Builtin {
    pub const ALL: [Builtin; 4] = [Builtin::Hold, Builtin::Release, Builtin::Stick, Builtin::Nfc];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Hold => "hold",
            Builtin::Release => "release",
            Builtin::Stick => "stick",
            Builtin::Nfc => "nfc",
        }
    }
}

/// Arguments of a built-in command, decoded once
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinCommand {
    Hold { buttons: Vec<Button> },
    Release { buttons: Vec<Button> },
    Stick(StickCommand),
    Nfc(NfcCommand),
}

impl BuiltinCommand {
    /// Decode raw line arguments for the given built-in
    pub fn decode(kind: Builtin, args: &[String]) -> Result<Self, CommandError> {
        let command = match kind {
            Builtin::Hold => BuiltinCommand::Hold {
                buttons: decode_buttons("hold", args)?,
            },
            Builtin::Release => BuiltinCommand::Release {
                buttons: decode_buttons("release", args)?,
            },
            Builtin::Stick => BuiltinCommand::Stick(StickCommand::decode(args)?),
            Builtin::Nfc => BuiltinCommand::Nfc(NfcCommand::decode(args)?),
        };
        Ok(command)
    }
}

/// Run a decoded built-in command
pub async fn execute(
    ctx: &HandlerContext,
    command: &BuiltinCommand,
) -> Result<Option<String>, CommandError> {
    match command {
        BuiltinCommand::Hold { buttons } => handle_hold(ctx, buttons).await,
        BuiltinCommand::Release { buttons } => handle_release(ctx, buttons).await,
        BuiltinCommand::Stick(stick) => handle_stick(ctx, stick).await,
        BuiltinCommand::Nfc(nfc) => handle_nfc(ctx, nfc).await,
    }
}
