//! Unix socket front end
//!
//! This module handles:
//! - Binding the socket file and opening it to every local user
//! - Accepting any number of concurrent clients
//! - Reading newline-delimited commands, one in flight per client

mod connection;
mod listener;

pub use connection::{ClientConnection, ConnectionError};
pub use listener::SocketServer;
