//! Shared application state for request handlers.

use std::sync::Arc;

use tera::Tera;

use crate::config::AppConfig;
use crate::services::{ColorService, HealthController, MessageService};
use crate::store::MessageStore;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Built once at startup from the resolved configuration and the store handle; the
/// services hold the only references to the store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tera: Arc<Tera>,
    pub colors: ColorService,
    pub messages: MessageService,
    pub health: HealthController,
}

impl AppState {
    pub fn new(config: AppConfig, tera: Tera, store: Arc<dyn MessageStore>) -> Self {
        Self {
            colors: ColorService::new(&config.colors),
            messages: MessageService::new(store.clone()),
            health: HealthController::new(store),
            config: Arc::new(config),
            tera: Arc::new(tera),
        }
    }
}
