//! Unix socket listener

use super::connection::{ClientConnection, ConnectionError};
use crate::command::CommandDispatcher;
use anyhow::{Context, Result};
use joycontrol_shared::DeviceError;
use std::fs::{self, Permissions};
use std::future::Future;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::UnixListener;
use tracing::{debug, info, warn};

/// Socket file mode, any local user may connect
const SOCKET_MODE: u32 = 0o777;

/// Accepts controller clients on a filesystem socket
pub struct SocketServer {
    path: PathBuf,
    listener: UnixListener,
    dispatcher: Arc<CommandDispatcher>,
    next_id: AtomicU64,
}

impl SocketServer {
    /// Bind the socket, replacing a stale socket file
    pub fn bind(path: impl AsRef<Path>, dispatcher: Arc<CommandDispatcher>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        remove_stale(&path)?;
        let listener = UnixListener::bind(&path)
            .with_context(|| format!("Failed to bind socket {}", path.display()))?;
        fs::set_permissions(&path, Permissions::from_mode(SOCKET_MODE))
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;

        info!("Listening on {}", path.display());

        Ok(Self {
            path,
            listener,
            dispatcher,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accept clients forever, each served by its own task
    pub async fn run(&self) -> Result<()> {
        loop {
            let (stream, _addr) = self.listener.accept().await?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let dispatcher = self.dispatcher.clone();

            debug!("Client {} connected", id);
            tokio::spawn(async move {
                let connection = ClientConnection::new(id, stream);
                if let Err(e) = connection.run(&dispatcher).await {
                    log_disconnect(id, &e);
                }
            });
        }
    }

    /// Serve until `shutdown` resolves or accepting fails
    ///
    /// The socket file is removed on both paths. An accept error takes
    /// precedence over a cleanup error.
    pub async fn serve_until<F: Future>(self, shutdown: F) -> Result<()> {
        let result = tokio::select! {
            result = self.run() => result,
            _ = shutdown => {
                info!("Stopping communication...");
                Ok(())
            }
        };

        let cleanup = self.cleanup();
        result.and(cleanup)
    }

    /// Stop listening and remove the socket file
    pub fn cleanup(self) -> Result<()> {
        let path = self.path;
        drop(self.listener);
        fs::remove_file(&path).with_context(|| format!("Failed to remove socket {}", path.display()))
    }
}

fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed stale socket {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove stale socket {}", path.display())),
    }
}

fn log_disconnect(id: u64, error: &anyhow::Error) {
    if let Some(ConnectionError::Closed) = error.downcast_ref::<ConnectionError>() {
        debug!("Client {} disconnected", id);
    } else if let Some(DeviceError::NotConnected) = error.downcast_ref::<DeviceError>() {
        warn!("Client {} dropped, controller connection was lost", id);
    } else {
        warn!("Client {} dropped: {:#}", id, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandRegistry;
    use crate::diagnostics::MemorySink;
    use joycontrol_shared::{Button, Controller, ControllerState, DeviceState};
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::UnixStream;

    fn dispatcher(state: Arc<ControllerState>) -> Arc<CommandDispatcher> {
        Arc::new(CommandDispatcher::new(
            state,
            CommandRegistry::new(),
            Arc::new(MemorySink::new()),
        ))
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..100 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_bind_replaces_stale_file_and_opens_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("joycontrol.socket");
        fs::write(&path, b"stale").unwrap();

        let (state, _link) = ControllerState::new(Controller::ProController);
        let server = SocketServer::bind(&path, dispatcher(Arc::new(state))).unwrap();

        let mode = fs::metadata(server.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o777);

        server.cleanup().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_bind_fails_when_stale_path_cannot_be_removed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be unlinked with remove_file
        let path = dir.path().join("occupied");
        fs::create_dir(&path).unwrap();

        let (state, _link) = ControllerState::new(Controller::ProController);
        assert!(SocketServer::bind(&path, dispatcher(Arc::new(state))).is_err());
    }

    #[tokio::test]
    async fn test_serve_until_removes_socket_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("joycontrol.socket");
        let (state, _link) = ControllerState::new(Controller::ProController);
        let server = SocketServer::bind(&path, dispatcher(Arc::new(state))).unwrap();
        assert!(path.exists());

        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        let serve = tokio::spawn(server.serve_until(stopped));
        let _client = UnixStream::connect(&path).await.unwrap();

        stop.send(()).unwrap();
        serve.await.unwrap().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_clients() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("joycontrol.socket");
        let (state, _link) = ControllerState::new(Controller::ProController);
        let state = Arc::new(state);

        let server = Arc::new(SocketServer::bind(&path, dispatcher(state.clone())).unwrap());
        let accept = {
            let server = server.clone();
            tokio::spawn(async move { server.run().await })
        };

        let mut first = UnixStream::connect(&path).await.unwrap();
        let mut second = UnixStream::connect(&path).await.unwrap();
        first.write_all(b"btn:a:true\n").await.unwrap();
        second.write_all(b"btn:b:true\n").await.unwrap();

        wait_for(|| state.is_pressed(Button::A) && state.is_pressed(Button::B)).await;

        // One client leaving does not affect the other
        drop(first);
        second.write_all(b"stick:l:up:true\n").await.unwrap();
        wait_for(|| state.stick(joycontrol_shared::StickSide::Left).v() == 0xE00).await;

        accept.abort();
    }
}
