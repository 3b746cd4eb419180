//! Local reporting of command outcomes
//!
//! Nothing is ever written back to socket clients. What a command produced,
//! or why it failed, goes to the [`DiagnosticSink`] the dispatcher was built
//! with.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

/// Outcome of one dispatched line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A handler returned a message
    Completed { command: String, message: String },
    /// A handler or the parser rejected the line
    Failed { command: String, message: String },
    /// No handler answers to this name
    NotFound { command: String },
    /// The device link went away during a flush
    ConnectionLost,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Completed { message, .. } => write!(f, "{}", message),
            Diagnostic::Failed { command, message } if command.is_empty() => write!(f, "{}", message),
            Diagnostic::Failed { command, message } => write!(f, "{}: {}", command, message),
            Diagnostic::NotFound { command } => write!(f, "command \"{}\" not found", command),
            Diagnostic::ConnectionLost => write!(f, "Connection was lost."),
        }
    }
}

/// Destination for command outcomes
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Sink that forwards outcomes to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::Completed { .. } | Diagnostic::ConnectionLost => info!("{}", diagnostic),
            Diagnostic::Failed { .. } | Diagnostic::NotFound { .. } => warn!("{}", diagnostic),
        }
    }
}

/// Sink that keeps every outcome in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything reported so far
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}
