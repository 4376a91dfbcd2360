//! Player session: a coordinator wired to an engine
//!
//! Construction is explicit; nothing global. `dispose` releases the engine
//! subscription owned by the session.

use crate::config::CoordinatorConfig;
use crate::engine::AudioEngine;
use crate::library::Library;
use crate::playback::Coordinator;
use crate::settings::CrossfadeSettings;
use crate::sync::{EventSynchronizer, ListenerHandle};
use std::sync::Arc;
use tracing::info;

pub struct PlayerSession {
    coordinator: Arc<Coordinator>,
    synchronizer: EventSynchronizer,
    listeners: Option<ListenerHandle>,
}

impl PlayerSession {
    /// Build the coordinator and subscribe it to the engine's channels
    pub fn create(
        engine: Arc<dyn AudioEngine>,
        library: Arc<dyn Library>,
        settings: Arc<dyn CrossfadeSettings>,
        config: CoordinatorConfig,
    ) -> Self {
        let coordinator = Coordinator::new(Arc::clone(&engine), library, settings, config);
        let synchronizer = EventSynchronizer::new(engine, Arc::clone(&coordinator));
        let listeners = synchronizer.init_listeners();
        info!("Player session created");

        Self {
            coordinator,
            synchronizer,
            listeners: Some(listeners),
        }
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    pub fn synchronizer(&self) -> &EventSynchronizer {
        &self.synchronizer
    }

    /// Stop listening to the engine; safe to call more than once
    pub fn dispose(&mut self) {
        if let Some(listeners) = self.listeners.take() {
            listeners.teardown();
            info!("Player session disposed");
        }
    }
}
