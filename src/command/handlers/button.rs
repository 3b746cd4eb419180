//! Hold and release handlers

use super::HandlerContext;
use crate::command::CommandError;
use joycontrol_shared::Button;
use tracing::info;

/// Parse button names, requiring at least one
pub fn decode_buttons(command: &'static str, args: &[String]) -> Result<Vec<Button>, CommandError> {
    if args.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            what: "a button",
        });
    }
    args.iter()
        .map(|arg| arg.parse::<Button>().map_err(CommandError::from))
        .collect()
}

/// Press and hold the given buttons
pub async fn handle_hold(ctx: &HandlerContext, buttons: &[Button]) -> Result<Option<String>, CommandError> {
    ensure_available(ctx, buttons)?;

    info!("Holding {}", join(buttons));
    ctx.device.connect().await?;
    ctx.device.set_buttons(buttons, true);
    Ok(None)
}

/// Release the given buttons
pub async fn handle_release(ctx: &HandlerContext, buttons: &[Button]) -> Result<Option<String>, CommandError> {
    ensure_available(ctx, buttons)?;

    info!("Releasing {}", join(buttons));
    ctx.device.connect().await?;
    ctx.device.set_buttons(buttons, false);
    Ok(None)
}

/// Every button must exist on the emulated variant before any is touched
fn ensure_available(ctx: &HandlerContext, buttons: &[Button]) -> Result<(), CommandError> {
    let available = ctx.device.available_buttons();
    match buttons.iter().find(|&&b| !available.contains(&b)) {
        Some(&button) => Err(CommandError::UnavailableButton {
            button,
            controller: ctx.device.controller(),
        }),
        None => Ok(()),
    }
}

fn join(buttons: &[Button]) -> String {
    buttons
        .iter()
        .map(|b| b.name())
        .collect::<Vec<_>>()
        .join(" ")
}
