use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::services::course_sync::CourseEngine;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Periodic roster refresh.
/// Refreshes once immediately, then every `interval`.
pub struct RosterPoller {
    courses: CourseEngine,
    interval: Duration,
}

impl RosterPoller {
    pub fn new(courses: CourseEngine, interval: Duration) -> Self {
        Self { courses, interval }
    }

    /// Runs until the task is aborted. Each tick spawns its own refresh, so a
    /// slow request never delays the next tick and refreshes may overlap.
    pub async fn start(self) {
        info!("Starting roster poller (interval: {:?})", self.interval);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let courses = self.courses.clone();
            tokio::spawn(async move {
                if let Err(e) = courses.refresh().await {
                    // keep polling
                    warn!("Scheduled roster refresh failed: {}", e);
                }
            });
        }
    }
}
