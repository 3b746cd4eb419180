//! Socket control for an emulated Switch controller
//!
//! Clients write one command per line to a Unix socket; each line is
//! resolved to a built-in or host-registered command, applied to the
//! controller state and followed by a push to the device link. Nothing is
//! written back to clients, outcomes are reported locally.

pub mod command;
pub mod config;
pub mod diagnostics;
pub mod server;
