use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveTime;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::Backend;
use crate::config::ClientConfig;
use crate::services::scheduler::DEFAULT_POLL_INTERVAL;
use crate::services::{ConfigEngine, CourseEngine, RosterPoller, SessionEngine};
use crate::state::Store;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub poll_interval: Duration,
    pub debounce: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl From<&ClientConfig> for EngineOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            debounce: config.debounce,
        }
    }
}

/// The store plus the three sync engines sharing it.
pub struct Engine {
    store: Arc<Store>,
    pub session: SessionEngine,
    pub courses: CourseEngine,
    pub config: ConfigEngine,
    poll_interval: Duration,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl Engine {
    pub fn new(backend: Arc<dyn Backend>, options: EngineOptions) -> Self {
        let store = Arc::new(Store::default());
        let courses = CourseEngine::new(store.clone(), backend.clone());
        let session = SessionEngine::new(store.clone(), backend.clone(), courses.clone());
        let config = ConfigEngine::new(store.clone(), backend, options.debounce);

        Self {
            store,
            session,
            courses,
            config,
            poll_interval: options.poll_interval,
            poller: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Probe the session, pull config and start polling. Failures are logged;
    /// the engine keeps running on whatever state it has.
    pub async fn start(&self) {
        if let Err(e) = self.session.probe().await {
            warn!("Initial session probe failed: {}", e);
        }
        if let Err(e) = self.config.pull().await {
            warn!("Initial config pull failed: {}", e);
        }
        self.start_polling();
    }

    pub fn start_polling(&self) {
        let mut poller = self.poller.lock().unwrap_or_else(|e| e.into_inner());
        if poller.is_some() {
            return;
        }
        let task = RosterPoller::new(self.courses.clone(), self.poll_interval);
        *poller = Some(tokio::spawn(task.start()));
    }

    pub fn stop(&self) {
        let handle = self.poller.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            handle.abort();
            info!("Roster poller stopped");
        }
    }

    /// Whether the backend is inside its configured checking window at `now`.
    pub fn is_running(&self, now: NaiveTime) -> bool {
        self.store
            .snapshot()
            .config
            .map_or(true, |config| config.is_active(now))
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop();
    }
}
