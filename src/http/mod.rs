//! HTTP server module.
//!
//! The service listens on plain HTTP; TLS and routing are handled in front of it by
//! the orchestrator. The server includes:
//! - Graceful shutdown on SIGTERM/SIGINT with a bounded grace period

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
