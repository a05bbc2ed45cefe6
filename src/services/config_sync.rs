use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::{Backend, ConfigUpdate};
use crate::error::AppError;
use crate::models::{ConfigFields, MonitorConfig, TimeRange};
use crate::services::debounce::Debouncer;
use crate::state::{Event, Store};

/// Global polling interval and active window.
///
/// Pulls replace the local config wholesale. Edits land in the draft at once
/// and reach the backend through one debounce channel per field.
#[derive(Clone)]
pub struct ConfigEngine {
    store: Arc<Store>,
    backend: Arc<dyn Backend>,
    interval_channel: Debouncer,
    range_channel: Debouncer,
}

impl ConfigEngine {
    pub fn new(store: Arc<Store>, backend: Arc<dyn Backend>, quiet_period: Duration) -> Self {
        Self {
            store,
            backend,
            interval_channel: Debouncer::new("interval", quiet_period),
            range_channel: Debouncer::new("range", quiet_period),
        }
    }

    pub async fn pull(&self) -> Result<MonitorConfig, AppError> {
        let seq = self.store.next_config_seq();
        let payload = self.backend.fetch_config().await.map_err(|e| {
            warn!("Unable to load settings: {}", e);
            e
        })?;

        let (config, sid) = payload.into_config()?;
        let keep = ConfigFields {
            interval: self.interval_channel.is_pending(),
            range: self.range_channel.is_pending(),
        };
        self.store.dispatch(Event::ConfigLoaded { seq, config: config.clone(), sid, keep });
        debug!("Config pulled: {:?}", config);
        Ok(config)
    }

    pub fn set_interval(&self, secs: u32) {
        self.store.dispatch(Event::IntervalEdited(secs));
        let engine = self.clone();
        self.interval_channel
            .schedule(async move { engine.push_debounced(ConfigFields::INTERVAL).await });
    }

    pub fn set_range(&self, range: Option<TimeRange>) {
        self.store.dispatch(Event::RangeEdited(range));
        let engine = self.clone();
        self.range_channel
            .schedule(async move { engine.push_debounced(ConfigFields::RANGE).await });
    }

    /// Send every field of the draft that differs from the pulled baseline,
    /// then re-pull. Returns `None` when there was nothing to send.
    pub async fn push(&self) -> Result<Option<MonitorConfig>, AppError> {
        self.push_fields(ConfigFields::ALL).await
    }

    /// Drop pending edits, ask the backend to restore its defaults, and re-pull.
    /// The pull runs even when the reset is refused, so the draft falls back
    /// to whatever the backend holds.
    pub async fn reset(&self) -> Result<MonitorConfig, AppError> {
        self.interval_channel.cancel();
        self.range_channel.cancel();

        let posted = self.backend.post_config(&ConfigUpdate::default()).await;
        let pulled = self.pull().await;
        match posted {
            Ok(_) => {
                info!("Settings reset to backend defaults");
                pulled
            }
            Err(e) => {
                warn!("Unable to reset settings: {}", e);
                Err(e)
            }
        }
    }

    pub fn has_pending_edits(&self) -> bool {
        self.interval_channel.is_pending() || self.range_channel.is_pending()
    }

    async fn push_fields(&self, fields: ConfigFields) -> Result<Option<MonitorConfig>, AppError> {
        let state = self.store.snapshot();
        let update = ConfigUpdate::diff(state.config.as_ref(), &state.draft, fields);
        if update.is_empty() {
            debug!("No config changes to push");
            return Ok(None);
        }

        self.backend.post_config(&update).await.map_err(|e| {
            warn!("Unable to update settings: {}", e);
            e
        })?;
        info!("Updated settings: {:?}", update);
        self.pull().await.map(Some)
    }

    async fn push_debounced(&self, fields: ConfigFields) {
        if let Err(e) = self.push_fields(fields).await {
            warn!("Debounced settings push failed: {}", e);
        }
    }
}
