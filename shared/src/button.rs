//! Buttons and controller variants

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A physical button on one of the emulated controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Button {
    Y,
    X,
    B,
    A,
    R,
    Zr,
    Minus,
    Plus,
    RStick,
    LStick,
    Home,
    Capture,
    Down,
    Up,
    Right,
    Left,
    L,
    Zl,
    Sr,
    Sl,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown button \"{0}\"")]
pub struct UnknownButton(pub String);

impl Button {
    /// Protocol name of the button
    pub fn name(self) -> &'static str {
        match self {
            Button::Y => "y",
            Button::X => "x",
            Button::B => "b",
            Button::A => "a",
            Button::R => "r",
            Button::Zr => "zr",
            Button::Minus => "minus",
            Button::Plus => "plus",
            Button::RStick => "r_stick",
            Button::LStick => "l_stick",
            Button::Home => "home",
            Button::Capture => "capture",
            Button::Down => "down",
            Button::Up => "up",
            Button::Right => "right",
            Button::Left => "left",
            Button::L => "l",
            Button::Zl => "zl",
            Button::Sr => "sr",
            Button::Sl => "sl",
        }
    }
}

impl FromStr for Button {
    type Err = UnknownButton;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let button = match s {
            "y" => Button::Y,
            "x" => Button::X,
            "b" => Button::B,
            "a" => Button::A,
            "r" => Button::R,
            "zr" => Button::Zr,
            "minus" => Button::Minus,
            "plus" => Button::Plus,
            "r_stick" => Button::RStick,
            "l_stick" => Button::LStick,
            "home" => Button::Home,
            "capture" => Button::Capture,
            "down" => Button::Down,
            "up" => Button::Up,
            "right" => Button::Right,
            "left" => Button::Left,
            "l" => Button::L,
            "zl" => Button::Zl,
            "sr" => Button::Sr,
            "sl" => Button::Sl,
            other => return Err(UnknownButton(other.to_string())),
        };
        Ok(button)
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Emulated controller variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Controller {
    JoyconL,
    JoyconR,
    #[default]
    ProController,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown controller \"{0}\", expected JOYCON_R, JOYCON_L or PRO_CONTROLLER")]
pub struct UnknownController(pub String);

const JOYCON_L_BUTTONS: &[Button] = &[
    Button::Minus,
    Button::LStick,
    Button::Capture,
    Button::Down,
    Button::Up,
    Button::Right,
    Button::Left,
    Button::Sr,
    Button::Sl,
    Button::L,
    Button::Zl,
];

const JOYCON_R_BUTTONS: &[Button] = &[
    Button::Y,
    Button::X,
    Button::B,
    Button::A,
    Button::Sr,
    Button::Sl,
    Button::R,
    Button::Zr,
    Button::Plus,
    Button::RStick,
    Button::Home,
];

const PRO_CONTROLLER_BUTTONS: &[Button] = &[
    Button::Y,
    Button::X,
    Button::B,
    Button::A,
    Button::R,
    Button::Zr,
    Button::Minus,
    Button::Plus,
    Button::RStick,
    Button::LStick,
    Button::Home,
    Button::Capture,
    Button::Down,
    Button::Up,
    Button::Right,
    Button::Left,
    Button::L,
    Button::Zl,
];

impl Controller {
    /// Buttons physically present on this variant
    pub fn available_buttons(self) -> &'static [Button] {
        match self {
            Controller::JoyconL => JOYCON_L_BUTTONS,
            Controller::JoyconR => JOYCON_R_BUTTONS,
            Controller::ProController => PRO_CONTROLLER_BUTTONS,
        }
    }

    pub fn has_button(self, button: Button) -> bool {
        self.available_buttons().contains(&button)
    }

    /// Whether the variant carries an NFC reader
    ///
    /// Only the right Joy-Con and the Pro Controller have one.
    pub fn supports_nfc(self) -> bool {
        !matches!(self, Controller::JoyconL)
    }
}

impl FromStr for Controller {
    type Err = UnknownController;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "JOYCON_L" => Ok(Controller::JoyconL),
            "JOYCON_R" => Ok(Controller::JoyconR),
            "PRO_CONTROLLER" => Ok(Controller::ProController),
            _ => Err(UnknownController(s.to_string())),
        }
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Controller::JoyconL => write!(f, "JOYCON_L"),
            Controller::JoyconR => write!(f, "JOYCON_R"),
            Controller::ProController => write!(f, "PRO_CONTROLLER"),
        }
    }
}
