//! Request-independent application logic used by the route handlers.

pub mod color;
pub mod health;
pub mod messages;

pub use color::{ColorService, InvalidColor};
pub use health::{HealthController, Readiness};
pub use messages::{MessageError, MessageService};
