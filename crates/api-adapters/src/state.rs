use std::sync::Arc;

use services::{ChatSessions, MaintenanceService};

use crate::metrics::Metrics;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MaintenanceService>,
    /// Assistant transcripts, one per client session.
    pub chat: Arc<ChatSessions>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(service: MaintenanceService) -> Self {
        Self::with_chat(service, ChatSessions::default())
    }

    pub fn with_chat(service: MaintenanceService, chat: ChatSessions) -> Self {
        Self {
            service: Arc::new(service),
            chat: Arc::new(chat),
            metrics: Arc::new(Metrics::new()),
        }
    }
}
