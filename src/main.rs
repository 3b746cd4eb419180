use anyhow::{Context, Result};
use bytes::Bytes;
use joycontrol_shared::{ControllerState, DeviceState, InputReport};
use joycontrol_socket::command::{extensions, CommandDispatcher, CommandRegistry};
use joycontrol_socket::config::ServerConfig;
use joycontrol_socket::diagnostics::TracingSink;
use joycontrol_socket::server::SocketServer;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = ServerConfig::from_args(std::env::args().skip(1))?;
    info!("Emulating {}", config.controller);
    info!("  Socket: {}", config.socket_path.display());

    let (state, link) = ControllerState::new(config.controller);
    let device: Arc<dyn DeviceState> = Arc::new(state);

    if let Some(path) = &config.nfc {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read NFC dump {}", path.display()))?;
        device.set_nfc(Some(Bytes::from(content)));
        info!("  Initial NFC content: {}", path.display());
    }

    // The HID transport owns the other end of the link; until one is
    // attached the reports are only traced.
    tokio::spawn(trace_reports(link));

    let mut registry = CommandRegistry::new();
    extensions::register_defaults(&mut registry, device.clone())?;

    let dispatcher = CommandDispatcher::new(device, registry, Arc::new(TracingSink))
        .with_nfc_clear_delay(config.nfc_clear_delay);
    let server = SocketServer::bind(&config.socket_path, Arc::new(dispatcher))?;

    server.serve_until(tokio::signal::ctrl_c()).await
}

async fn trace_reports(mut link: watch::Receiver<InputReport>) {
    while link.changed().await.is_ok() {
        let report = link.borrow_and_update().clone();
        debug!(
            "Input report: buttons={:?} left={:?} right={:?} nfc={}",
            report.buttons,
            report.left_stick,
            report.right_stick,
            report.nfc.as_ref().map_or(0, |tag| tag.len())
        );
    }
}
