//! Liveness and readiness signals.
//!
//! Liveness depends on nothing but the process answering. Readiness follows store
//! reachability so the orchestrator stops routing traffic while the database is down
//! without restarting a healthy process.

use std::sync::Arc;

use crate::store::MessageStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    NotReady,
}

impl Readiness {
    pub fn is_ready(self) -> bool {
        self == Readiness::Ready
    }
}

#[derive(Clone)]
pub struct HealthController {
    store: Arc<dyn MessageStore>,
}

impl HealthController {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Always true while the process runs.
    pub fn is_alive(&self) -> bool {
        true
    }

    pub async fn readiness(&self) -> Readiness {
        if self.store.ping().await {
            Readiness::Ready
        } else {
            Readiness::NotReady
        }
    }
}
