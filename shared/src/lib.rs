//! joycontrol shared types
//!
//! This crate provides the controller state model and the line codec used
//! by the socket front end and by anything that drives it.

pub mod button;
pub mod codec;
pub mod state;
pub mod stick;

pub use button::{Button, Controller, UnknownButton, UnknownController};
pub use codec::{CodecError, Command};
pub use state::{ControllerState, DeviceError, DeviceState, InputReport};
pub use stick::{StickCalibration, StickError, StickSide, StickState};

/// Default timings and locations
pub mod defaults {
    use std::time::Duration;

    /// Socket path used when none is configured
    pub const SOCKET_PATH: &str = "./joycontrol.socket";

    /// How long a loaded tag payload stays visible before it is cleared
    pub const NFC_CLEAR_DELAY: Duration = Duration::from_secs(3);

    /// Longest accepted command line, newline excluded
    pub const MAX_LINE_LEN: usize = 64 * 1024;

    /// Hold time for a compound button click
    pub const CLICK_DURATION: Duration = Duration::from_millis(100);
}
