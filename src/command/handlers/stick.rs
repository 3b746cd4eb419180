//! Stick command handler
//!
//! `stick <side> <direction> [value]` where side is `l`/`left` or
//! `r`/`right`, direction is one of the presets or `h`/`horizontal`,
//! `v`/`vertical` followed by the raw axis value.

use super::HandlerContext;
use crate::command::CommandError;
use joycontrol_shared::StickSide;

/// What to do with the selected stick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickMotion {
    Center,
    Up,
    Down,
    Left,
    Right,
    Horizontal(i64),
    Vertical(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickCommand {
    pub side: StickSide,
    pub motion: StickMotion,
}

impl StickCommand {
    /// Decode `[side, direction, value?]`
    ///
    /// The side is checked first, so a bad side wins over any other problem.
    pub fn decode(args: &[String]) -> Result<Self, CommandError> {
        let side = args.first().ok_or(CommandError::MissingArgument {
            command: "stick",
            what: "a side and a direction",
        })?;
        let side = StickSide::from_token(side).ok_or_else(|| CommandError::InvalidSide(side.clone()))?;

        let direction = args.get(1).ok_or(CommandError::MissingArgument {
            command: "stick",
            what: "a direction",
        })?;
        let value = args.get(2).map(String::as_str);

        let motion = match direction.as_str() {
            "center" => StickMotion::Center,
            "up" => StickMotion::Up,
            "down" => StickMotion::Down,
            "left" => StickMotion::Left,
            "right" => StickMotion::Right,
            "h" | "horizontal" => StickMotion::Horizontal(parse_value(value)?),
            "v" | "vertical" => StickMotion::Vertical(parse_value(value)?),
            other => return Err(CommandError::InvalidDirection(other.to_string())),
        };

        Ok(Self { side, motion })
    }
}

fn parse_value(value: Option<&str>) -> Result<i64, CommandError> {
    let value = value.ok_or(CommandError::MissingValue)?;
    value
        .trim()
        .parse()
        .map_err(|_| CommandError::InvalidValue(value.to_string()))
}

/// Apply a stick command and report the resulting position
pub async fn handle_stick(ctx: &HandlerContext, command: &StickCommand) -> Result<Option<String>, CommandError> {
    let mut stick = ctx.device.stick(command.side);

    match command.motion {
        StickMotion::Center => stick.set_center(),
        StickMotion::Up => stick.set_up(),
        StickMotion::Down => stick.set_down(),
        StickMotion::Left => stick.set_left(),
        StickMotion::Right => stick.set_right(),
        StickMotion::Horizontal(value) => stick.set_h(value)?,
        StickMotion::Vertical(value) => stick.set_v(value)?,
    }

    ctx.device.set_stick(command.side, stick);

    Ok(Some(format!(
        "{} was set to ({}, {}).",
        command.side,
        stick.h(),
        stick.v()
    )))
}
