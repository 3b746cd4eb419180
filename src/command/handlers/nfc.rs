//! NFC tag handler
//!
//! Loading a dump clears the current tag, reads the file on the blocking
//! pool, sets it as the payload and schedules a clear. Only the most recent
//! load owns a pending clear: scheduling a new one aborts the previous
//! timer, so an older load can never wipe a newer tag early.

use super::HandlerContext;
use crate::command::CommandError;
use bytes::Bytes;
use joycontrol_shared::DeviceState;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::info;

/// `nfc <path> [seconds]`
#[derive(Debug, Clone, PartialEq)]
pub struct NfcCommand {
    pub path: String,
    /// Overrides the configured clear delay
    pub delay: Option<Duration>,
}

impl NfcCommand {
    pub fn decode(args: &[String]) -> Result<Self, CommandError> {
        let path = args.first().cloned().unwrap_or_default();
        let delay = match args.get(1) {
            Some(seconds) => Some(parse_seconds(seconds)?),
            None => None,
        };
        Ok(Self { path, delay })
    }
}

fn parse_seconds(value: &str) -> Result<Duration, CommandError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| CommandError::InvalidValue(value.to_string()))
}

/// Owner of the pending tag clear
#[derive(Default)]
pub struct TagScheduler {
    pending: Mutex<Option<AbortHandle>>,
}

impl TagScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending clear and remove the tag right away
    pub fn clear_now(&self, device: &dyn DeviceState) {
        self.cancel();
        device.set_nfc(None);
    }

    /// Clear the tag after `delay`, replacing any earlier schedule
    pub fn schedule_clear(&self, device: Arc<dyn DeviceState>, delay: Duration) {
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!("Clearing NFC content");
            device.set_nfc(None);
        });

        let previous = self.lock().replace(task.abort_handle());
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Whether a clear is still waiting to fire
    pub fn has_pending(&self) -> bool {
        self.lock().as_ref().is_some_and(|handle| !handle.is_finished())
    }

    fn cancel(&self) {
        if let Some(handle) = self.lock().take() {
            handle.abort();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<AbortHandle>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TagScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Load an NFC dump and schedule its removal
pub async fn handle_nfc(ctx: &HandlerContext, command: &NfcCommand) -> Result<Option<String>, CommandError> {
    let controller = ctx.device.controller();
    if !controller.supports_nfc() {
        return Err(CommandError::Unsupported(controller));
    }
    if command.path.is_empty() {
        return Err(CommandError::MissingArgument {
            command: "nfc",
            what: "file path to an nfc dump as argument",
        });
    }

    ctx.tags.clear_now(ctx.device.as_ref());

    let path = PathBuf::from(&command.path);
    let content = tokio::fs::read(&path)
        .await
        .map_err(|source| CommandError::ReadTag { path, source })?;

    info!("Setting NFC content: {}", command.path);
    ctx.device.set_nfc(Some(Bytes::from(content)));

    let delay = command.delay.unwrap_or(ctx.nfc_clear_delay);
    ctx.tags.schedule_clear(ctx.device.clone(), delay);
    Ok(None)
}
