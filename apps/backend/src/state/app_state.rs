//! Application state shared across handlers.
//!
//! No process-global singletons: everything a handler needs is constructed
//! explicitly and carried here, so tests can build as many independent
//! instances as they like.

use std::sync::Arc;

use crate::catalog::ContentCatalog;
use crate::config::EngineConfig;
use crate::services::progression::ProgressionSink;
use crate::services::rooms::RoomService;
use crate::ws::TopicHub;

pub struct AppState {
    config: EngineConfig,
    hub: Arc<TopicHub>,
    rooms: Arc<RoomService>,
}

impl AppState {
    /// Wire the full engine: topic hub, seeded rooms, lifecycle dispatcher.
    pub fn build(
        config: EngineConfig,
        catalog: Arc<dyn ContentCatalog>,
        progression: Arc<dyn ProgressionSink>,
    ) -> Self {
        let hub = Arc::new(TopicHub::new());
        let rooms = RoomService::start(config.clone(), catalog, hub.clone(), progression);
        Self { config, hub, rooms }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn hub(&self) -> Arc<TopicHub> {
        self.hub.clone()
    }

    pub fn rooms(&self) -> &RoomService {
        &self.rooms
    }
}
