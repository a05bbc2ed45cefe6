use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::api::{Backend, CoursePatch};
use crate::error::AppError;
use crate::models::{Course, is_valid_uid};
use crate::state::{Event, Store};

/// Keeps the tracked-course roster in step with the backend.
#[derive(Clone)]
pub struct CourseEngine {
    store: Arc<Store>,
    backend: Arc<dyn Backend>,
}

impl CourseEngine {
    pub fn new(store: Arc<Store>, backend: Arc<dyn Backend>) -> Self {
        Self { store, backend }
    }

    /// Replace the whole roster with the backend's. On failure the current
    /// roster is kept and only the loading flag is cleared.
    pub async fn refresh(&self) -> Result<usize, AppError> {
        let seq = self.store.next_roster_seq();
        self.store.dispatch(Event::CoursesRequested);

        match self.backend.fetch_courses().await {
            Ok(courses) => {
                let count = courses.len();
                self.store.dispatch(Event::CoursesLoaded { seq, courses });
                info!("Roster refreshed: {} courses", count);
                Ok(count)
            }
            Err(e) => {
                self.store.dispatch(Event::CoursesFailed);
                warn!("Unable to load course data: {}", e);
                Err(e)
            }
        }
    }

    pub async fn add(&self, uid: &str) -> Result<Course, AppError> {
        if !is_valid_uid(uid) {
            return Err(AppError::InvalidUid(uid.to_string()));
        }
        let course = self.post(uid, CoursePatch::default()).await?;
        info!("Added course {}", course.uid);
        Ok(course)
    }

    pub async fn set_attribute(&self, uid: &str, patch: CoursePatch) -> Result<Course, AppError> {
        self.post(uid, patch).await
    }

    pub async fn pause(&self, uid: &str) -> Result<Course, AppError> {
        self.post(uid, CoursePatch::pause(true)).await
    }

    pub async fn resume(&self, uid: &str) -> Result<Course, AppError> {
        self.post(uid, CoursePatch::pause(false)).await
    }

    /// Flip automated registration based on the roster as currently displayed.
    pub async fn toggle_register(&self, uid: &str) -> Result<Course, AppError> {
        let enabled = self
            .store
            .snapshot()
            .courses
            .iter()
            .find(|c| c.uid == uid)
            .map(|c| c.register.is_enabled())
            .unwrap_or(false);
        self.post(uid, CoursePatch::register(!enabled)).await
    }

    /// Delete every uid concurrently. When all deletes succeed, exactly the
    /// uids echoed back by the responses leave the roster; if any fails, the
    /// roster is re-derived from a full refresh instead.
    pub async fn remove(&self, uids: &[String]) -> Result<Vec<String>, AppError> {
        let requested: HashSet<String> = uids.iter().cloned().collect();
        if requested.is_empty() {
            return Ok(Vec::new());
        }

        let seq = self.store.next_roster_seq();
        self.store.dispatch(Event::CoursesRequested);

        let mut deletes = JoinSet::new();
        for uid in &requested {
            let backend = self.backend.clone();
            let uid = uid.clone();
            deletes.spawn(async move {
                let result = backend.delete_course(&uid).await;
                (uid, result)
            });
        }

        let total = requested.len();
        let mut confirmed = Vec::with_capacity(total);
        let mut failed = 0;
        while let Some(joined) = deletes.join_next().await {
            match joined {
                Ok((_, Ok(course))) => confirmed.push(course.uid),
                Ok((uid, Err(e))) => {
                    warn!("Failed to delete course {}: {}", uid, e);
                    failed += 1;
                }
                Err(e) => {
                    warn!("Delete task aborted: {}", e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            self.store.dispatch(Event::CoursesFailed);
            warn!("{} of {} deletes failed, reloading roster", failed, total);
            if let Err(e) = self.refresh().await {
                warn!("Roster reload after partial delete failed: {}", e);
            }
            return Err(AppError::PartialDelete { failed, total });
        }

        confirmed.retain(|uid| requested.contains(uid));
        self.store.dispatch(Event::CoursesRemoved { seq, uids: confirmed.clone() });
        info!("Deleted {} courses", confirmed.len());
        Ok(confirmed)
    }

    async fn post(&self, uid: &str, patch: CoursePatch) -> Result<Course, AppError> {
        let seq = self.store.next_roster_seq();
        self.store.dispatch(Event::CoursesRequested);

        match self.backend.post_course(uid, &patch).await {
            Ok(course) => {
                self.store.dispatch(Event::CourseUpserted { seq, course: course.clone() });
                Ok(course)
            }
            Err(e) => {
                self.store.dispatch(Event::CoursesFailed);
                warn!("Course update for {} failed: {}", uid, e);
                Err(e)
            }
        }
    }
}
