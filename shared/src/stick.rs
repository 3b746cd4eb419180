//! Analog stick state
//!
//! Each axis is a 12-bit value. Presets are derived from the stick's
//! calibration: center is the calibrated rest position, the four
//! directions push one axis to its calibrated extreme.

use std::fmt;
use thiserror::Error;

/// Exclusive upper bound of an axis value (12 bits)
pub const AXIS_LIMIT: i64 = 0x1000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StickError {
    #[error("{axis} value {value} out of range, must be within 0..{AXIS_LIMIT}")]
    OutOfRange { axis: &'static str, value: i64 },

    #[error("{axis} calibration reaches {value}, must stay within 0..{AXIS_LIMIT}")]
    InvalidCalibration { axis: &'static str, value: i64 },
}

/// Which of the two sticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickSide {
    Left,
    Right,
}

impl StickSide {
    /// Parse a protocol side token (`l`, `left`, `r`, `right`)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "l" | "left" => Some(StickSide::Left),
            "r" | "right" => Some(StickSide::Right),
            _ => None,
        }
    }
}

impl fmt::Display for StickSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StickSide::Left => write!(f, "Left stick"),
            StickSide::Right => write!(f, "Right stick"),
        }
    }
}

/// Calibrated rest position and travel of one stick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickCalibration {
    pub h_center: u16,
    pub v_center: u16,
    pub h_max_above_center: u16,
    pub v_max_above_center: u16,
    pub h_max_below_center: u16,
    pub v_max_below_center: u16,
}

impl Default for StickCalibration {
    fn default() -> Self {
        Self {
            h_center: 0x800,
            v_center: 0x800,
            h_max_above_center: 0x600,
            v_max_above_center: 0x600,
            h_max_below_center: 0x600,
            v_max_below_center: 0x600,
        }
    }
}

impl StickCalibration {
    /// Check that every preset derived from this calibration is a valid axis value
    pub fn validate(&self) -> Result<(), StickError> {
        let extremes = [
            ("Horizontal", self.h_center, self.h_max_below_center, self.h_max_above_center),
            ("Vertical", self.v_center, self.v_max_below_center, self.v_max_above_center),
        ];
        for (axis, center, below, above) in extremes {
            let (center, below, above) = (i64::from(center), i64::from(below), i64::from(above));
            for value in [center - below, center + above] {
                if !(0..AXIS_LIMIT).contains(&value) {
                    return Err(StickError::InvalidCalibration { axis, value });
                }
            }
        }
        Ok(())
    }
}

/// Position of one analog stick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickState {
    h: u16,
    v: u16,
    calibration: StickCalibration,
}

impl StickState {
    /// Create a centered stick with the given calibration
    ///
    /// Fails if a preset would leave the 12-bit axis range.
    pub fn new(calibration: StickCalibration) -> Result<Self, StickError> {
        calibration.validate()?;
        Ok(Self::centered(calibration))
    }

    fn centered(calibration: StickCalibration) -> Self {
        Self {
            h: calibration.h_center,
            v: calibration.v_center,
            calibration,
        }
    }

    pub fn h(&self) -> u16 {
        self.h
    }

    pub fn v(&self) -> u16 {
        self.v
    }

    pub fn calibration(&self) -> &StickCalibration {
        &self.calibration
    }

    /// Set the horizontal axis directly
    pub fn set_h(&mut self, value: i64) -> Result<(), StickError> {
        self.h = check_axis("Horizontal", value)?;
        Ok(())
    }

    /// Set the vertical axis directly
    pub fn set_v(&mut self, value: i64) -> Result<(), StickError> {
        self.v = check_axis("Vertical", value)?;
        Ok(())
    }

    pub fn set_center(&mut self) {
        self.h = self.calibration.h_center;
        self.v = self.calibration.v_center;
    }

    pub fn set_up(&mut self) {
        self.h = self.calibration.h_center;
        self.v = self.calibration.v_center + self.calibration.v_max_above_center;
    }

    pub fn set_down(&mut self) {
        self.h = self.calibration.h_center;
        self.v = self.calibration.v_center - self.calibration.v_max_below_center;
    }

    pub fn set_left(&mut self) {
        self.h = self.calibration.h_center - self.calibration.h_max_below_center;
        self.v = self.calibration.v_center;
    }

    pub fn set_right(&mut self) {
        self.h = self.calibration.h_center + self.calibration.h_max_above_center;
        self.v = self.calibration.v_center;
    }
}

impl Default for StickState {
    fn default() -> Self {
        Self::centered(StickCalibration::default())
    }
}

fn check_axis(axis: &'static str, value: i64) -> Result<u16, StickError> {
    if (0..AXIS_LIMIT).contains(&value) {
        Ok(value as u16)
    } else {
        Err(StickError::OutOfRange { axis, value })
    }
}
