//! Individual client connection handling

use crate::command::CommandDispatcher;
use anyhow::Result;
use joycontrol_shared::defaults::MAX_LINE_LEN;
use std::str::Utf8Error;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

/// Reasons a connection's read loop stops
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Connection closed by peer")]
    Closed,

    #[error("Line exceeds {MAX_LINE_LEN} bytes")]
    LineTooLong,

    #[error("Line is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] Utf8Error),
}

/// One accepted client
///
/// Reads a line, hands it to the dispatcher and waits for it to finish
/// (including the flush) before reading the next one.
pub struct ClientConnection<S> {
    id: u64,
    reader: BufReader<S>,
}

impl<S: AsyncRead + Unpin> ClientConnection<S> {
    pub fn new(id: u64, stream: S) -> Self {
        Self {
            id,
            reader: BufReader::new(stream),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Serve lines until the peer goes away or the device link is lost
    ///
    /// Never returns `Ok`: every way out of the loop is an error.
    pub async fn run(mut self, dispatcher: &CommandDispatcher) -> Result<()> {
        let mut buf = Vec::with_capacity(256);

        loop {
            buf.clear();
            let n = (&mut self.reader)
                .take(MAX_LINE_LEN as u64 + 1)
                .read_until(b'\n', &mut buf)
                .await?;

            if buf.last() != Some(&b'\n') {
                if n > MAX_LINE_LEN {
                    return Err(ConnectionError::LineTooLong.into());
                }
                // A trailing fragment without its newline is dropped with the connection
                return Err(ConnectionError::Closed.into());
            }

            let line = std::str::from_utf8(&buf).map_err(ConnectionError::from)?;
            dispatcher.handle_line(line.trim_end_matches('\n')).await?;
        }
    }
}
