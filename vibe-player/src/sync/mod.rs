//! Event synchronizer
//!
//! Subscribes to every engine push channel and feeds normalized events into
//! the coordinator. All channels are merged into one stream consumed by a
//! single task, so the coordinator reduces events one at a time. Order is
//! preserved within each channel.
//!
//! Subscriptions are reference counted: each [`EventSynchronizer::init_listeners`]
//! call returns a [`ListenerHandle`], the first one subscribes, and releasing
//! the last one tears the subscription down.

mod normalize;

pub use normalize::{normalize, MediaKey, SyncEvent};

use crate::engine::{AudioEngine, EngineChannel};
use crate::playback::Coordinator;
use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamMap;
use tracing::{debug, info, warn};

#[derive(Default)]
struct Listeners {
    count: usize,
    task: Option<JoinHandle<()>>,
}

fn lock(listeners: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    listeners.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct EventSynchronizer {
    engine: Arc<dyn AudioEngine>,
    coordinator: Arc<Coordinator>,
    listeners: Arc<Mutex<Listeners>>,
}

impl EventSynchronizer {
    pub fn new(engine: Arc<dyn AudioEngine>, coordinator: Arc<Coordinator>) -> Self {
        Self {
            engine,
            coordinator,
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    /// Make sure every channel is subscribed and return a handle keeping it so
    ///
    /// Channel registration happens before this returns. Must be called from
    /// within a tokio runtime.
    pub fn init_listeners(&self) -> ListenerHandle {
        let mut listeners = lock(&self.listeners);
        if listeners.count == 0 {
            listeners.task = Some(self.subscribe_all());
            info!("Subscribed to {} engine channels", EngineChannel::ALL.len());
        }
        listeners.count += 1;
        debug!("Listener handles: {}", listeners.count);

        ListenerHandle {
            listeners: Arc::clone(&self.listeners),
            released: false,
        }
    }

    pub fn is_active(&self) -> bool {
        lock(&self.listeners).task.is_some()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).count
    }

    fn subscribe_all(&self) -> JoinHandle<()> {
        let mut streams = StreamMap::new();
        for channel in EngineChannel::ALL {
            streams.insert(channel, BroadcastStream::new(self.engine.listen(channel)));
        }

        let coordinator = Arc::clone(&self.coordinator);
        tokio::spawn(async move {
            while let Some((channel, received)) = streams.next().await {
                let payload = match received {
                    Ok(payload) => payload,
                    Err(BroadcastStreamRecvError::Lagged(missed)) => {
                        warn!("Dropped {} '{}' events (consumer lagging)", missed, channel);
                        continue;
                    }
                };

                match normalize(channel, payload) {
                    Ok(event) => coordinator.handle_event(event).await,
                    Err(e) => warn!("Dropping engine event: {}", e),
                }
            }
            debug!("All engine channels closed");
        })
    }
}

/// Keeps the engine subscription alive
///
/// Released by [`ListenerHandle::teardown`] or on drop.
pub struct ListenerHandle {
    listeners: Arc<Mutex<Listeners>>,
    released: bool,
}

impl ListenerHandle {
    pub fn teardown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let mut listeners = lock(&self.listeners);
        listeners.count = listeners.count.saturating_sub(1);
        if listeners.count == 0 {
            if let Some(task) = listeners.task.take() {
                task.abort();
                info!("Engine channel listeners torn down");
            }
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.release();
    }
}
