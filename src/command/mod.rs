//! Command handling for the controller socket
//!
//! This module handles:
//! - Resolving parsed lines to built-in or host-registered handlers
//! - Running handlers with their failures contained
//! - Flushing the controller state after every command

mod dispatcher;
mod error;
pub mod extensions;
pub mod handlers;
mod registry;

pub use dispatcher::CommandDispatcher;
pub use error::CommandError;
pub use registry::{CommandHandler, CommandRegistry, RegistryError};
