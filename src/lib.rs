//! tritier - application tier of a three-tier demo deployment.
//!
//! Serves a color-themed home page, stores and lists messages in MongoDB, reports a
//! configurable simulated failure and answers liveness/readiness probes.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod templates;

pub use config::{AppConfig, ConfigError};
pub use error::{AppError, AppErrorResponse};
pub use routes::create_router;
pub use state::AppState;
