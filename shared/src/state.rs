//! Controller state facade
//!
//! [`DeviceState`] is the capability the command layer drives: buttons,
//! two sticks, an NFC payload and a flush that pushes the current state to
//! the device link. [`ControllerState`] is the in-memory implementation;
//! its link is a `watch` channel whose receiver belongs to the transport.

use crate::button::{Button, Controller};
use crate::stick::{StickCalibration, StickError, StickSide, StickState};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::watch;

/// Failures of the device link
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The link to the console is gone
    #[error("Controller is not connected")]
    NotConnected,

    #[error("Device link error: {0}")]
    Link(String),
}

/// Mutable state of an emulated controller plus its outbound link
#[async_trait]
pub trait DeviceState: Send + Sync {
    /// Variant being emulated
    fn controller(&self) -> Controller;

    /// Buttons this device accepts
    fn available_buttons(&self) -> &'static [Button] {
        self.controller().available_buttons()
    }

    /// Press or release the given buttons
    fn set_buttons(&self, buttons: &[Button], pressed: bool);

    fn is_pressed(&self, button: Button) -> bool;

    /// Current position of one stick
    fn stick(&self, side: StickSide) -> StickState;

    /// Replace the position of one stick
    fn set_stick(&self, side: StickSide, stick: StickState);

    fn nfc(&self) -> Option<Bytes>;

    /// Set or clear the NFC payload
    fn set_nfc(&self, payload: Option<Bytes>);

    /// Wait until the device link is usable
    async fn connect(&self) -> Result<(), DeviceError>;

    /// Push the current state to the device link
    async fn send(&self) -> Result<(), DeviceError>;
}

/// Snapshot of the controller state as pushed to the link
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputReport {
    pub buttons: Vec<Button>,
    pub left_stick: (u16, u16),
    pub right_stick: (u16, u16),
    pub nfc: Option<Bytes>,
}

struct Inner {
    buttons: BTreeSet<Button>,
    left: StickState,
    right: StickState,
    nfc: Option<Bytes>,
}

/// In-memory controller state
pub struct ControllerState {
    controller: Controller,
    inner: Mutex<Inner>,
    link: watch::Sender<InputReport>,
    reports_sent: AtomicU64,
}

impl ControllerState {
    /// Create a controller with default stick calibration
    ///
    /// The returned receiver is the device link. Dropping it makes every
    /// later `connect`/`send` fail with [`DeviceError::NotConnected`].
    pub fn new(controller: Controller) -> (Self, watch::Receiver<InputReport>) {
        Self::build(controller, StickState::default(), StickState::default())
    }

    /// Create a controller with explicit stick calibration
    ///
    /// Fails with [`StickError::InvalidCalibration`] if either calibration
    /// would put a preset outside the axis range.
    pub fn with_calibration(
        controller: Controller,
        left: StickCalibration,
        right: StickCalibration,
    ) -> Result<(Self, watch::Receiver<InputReport>), StickError> {
        Ok(Self::build(
            controller,
            StickState::new(left)?,
            StickState::new(right)?,
        ))
    }

    fn build(
        controller: Controller,
        left: StickState,
        right: StickState,
    ) -> (Self, watch::Receiver<InputReport>) {
        let inner = Inner {
            buttons: BTreeSet::new(),
            left,
            right,
            nfc: None,
        };
        let (link, link_rx) = watch::channel(InputReport::default());

        let state = Self {
            controller,
            inner: Mutex::new(inner),
            link,
            reports_sent: AtomicU64::new(0),
        };
        (state, link_rx)
    }

    /// Number of reports successfully pushed to the link
    pub fn reports_sent(&self) -> u64 {
        self.reports_sent.load(Ordering::SeqCst)
    }

    /// Snapshot of the current state
    pub fn report(&self) -> InputReport {
        let inner = self.lock();
        InputReport {
            buttons: inner.buttons.iter().copied().collect(),
            left_stick: (inner.left.h(), inner.left.v()),
            right_stick: (inner.right.h(), inner.right.v()),
            nfc: inner.nfc.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DeviceState for ControllerState {
    fn controller(&self) -> Controller {
        self.controller
    }

    fn set_buttons(&self, buttons: &[Button], pressed: bool) {
        let mut inner = self.lock();
        for &button in buttons {
            if pressed {
                inner.buttons.insert(button);
            } else {
                inner.buttons.remove(&button);
            }
        }
    }

    fn is_pressed(&self, button: Button) -> bool {
        self.lock().buttons.contains(&button)
    }

    fn stick(&self, side: StickSide) -> StickState {
        let inner = self.lock();
        match side {
            StickSide::Left => inner.left,
            StickSide::Right => inner.right,
        }
    }

    fn set_stick(&self, side: StickSide, stick: StickState) {
        let mut inner = self.lock();
        match side {
            StickSide::Left => inner.left = stick,
            StickSide::Right => inner.right = stick,
        }
    }

    fn nfc(&self) -> Option<Bytes> {
        self.lock().nfc.clone()
    }

    fn set_nfc(&self, payload: Option<Bytes>) {
        self.lock().nfc = payload;
    }

    async fn connect(&self) -> Result<(), DeviceError> {
        if self.link.is_closed() {
            return Err(DeviceError::NotConnected);
        }
        Ok(())
    }

    async fn send(&self) -> Result<(), DeviceError> {
        let report = self.report();
        self.link
            .send(report)
            .map_err(|_| DeviceError::NotConnected)?;
        self.reports_sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
