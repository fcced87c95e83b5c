//! Shared state injected into every handler.

use std::sync::Arc;

use crate::application::services::EntryService;
use crate::domain::broadcast::BroadcastHub;
use crate::domain::repositories::EntryStore;

#[derive(Clone)]
pub struct AppState {
    pub entry_service: Arc<EntryService>,
    pub hub: Arc<BroadcastHub>,
}

impl AppState {
    /// Wires the service to the chosen store and a running hub.
    pub fn new(store: Arc<dyn EntryStore>, hub: Arc<BroadcastHub>) -> Self {
        let entry_service = Arc::new(EntryService::new(store, hub.clone()));
        Self { entry_service, hub }
    }
}
