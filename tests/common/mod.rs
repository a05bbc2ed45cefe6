#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use course_dash::api::dto::IntervalValue;
use course_dash::api::{Backend, ConfigPayload, ConfigUpdate, CoursePatch, RangeUpdate};
use course_dash::models::{
    Course, CourseStatus, Credentials, MonitorConfig, RegisterState, SessionPayload,
};
use course_dash::{AppError, Engine, EngineOptions};

pub const PASSWORD: &str = "hook-em";

/// In-memory stand-in for the monitor backend.
#[derive(Default)]
pub struct FakeBackend {
    inner: Mutex<BackendState>,
}

#[derive(Default)]
pub struct BackendState {
    pub roster: Vec<Course>,
    pub session: SessionPayload,
    pub browser_reply: SessionPayload,
    pub config: MonitorConfig,
    pub sid: String,
    pub fail_session: bool,
    pub fail_fetch_courses: bool,
    pub fail_posts: bool,
    pub fail_deletes: HashSet<String>,
    pub fail_config_posts: bool,
    /// Per-uid latency for course posts and deletes.
    pub course_delays: HashMap<String, Duration>,
    /// Latency for roster fetches; the roster is read when the request arrives.
    pub fetch_delay: Option<Duration>,
    pub fetch_count: usize,
    pub config_posts: Vec<ConfigUpdate>,
    pub course_posts: Vec<(String, CoursePatch)>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        let backend = Self::default();
        backend.state().sid = "20219".to_string();
        Arc::new(backend)
    }

    pub fn with_roster(uids: &[&str]) -> Arc<Self> {
        let backend = Self::new();
        backend.state().roster = uids.iter().map(|uid| course(uid)).collect();
        backend
    }

    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.inner.lock().unwrap()
    }

    pub fn roster_uids(&self) -> Vec<String> {
        self.state().roster.iter().map(|c| c.uid.clone()).collect()
    }

    fn course_delay(&self, uid: &str) -> Option<Duration> {
        self.state().course_delays.get(uid).copied()
    }

    fn config_payload(state: &BackendState) -> ConfigPayload {
        let (start, end) = match state.config.time_range {
            Some(range) => {
                let (s, e) = range.to_wire();
                (Some(s), Some(e))
            }
            None => (None, None),
        };
        ConfigPayload {
            sid: Some(state.sid.clone()),
            interval: IntervalValue::Text(state.config.interval_secs.to_string()),
            start,
            end,
        }
    }
}

fn status(code: u16, body: &str) -> AppError {
    AppError::Status { status: code, body: body.to_string() }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn session_status(&self) -> Result<SessionPayload, AppError> {
        let state = self.state();
        if state.fail_session {
            return Err(status(503, "unavailable"));
        }
        Ok(state.session)
    }

    async fn login(&self, credentials: &Credentials) -> Result<SessionPayload, AppError> {
        let mut state = self.state();
        if credentials.password != PASSWORD {
            return Err(status(401, r#"{"user": false}"#));
        }
        state.session.user = Some(true);
        Ok(SessionPayload {
            user: Some(true),
            browser: Some(state.session.browser.unwrap_or(false)),
        })
    }

    async fn browser_login(&self) -> Result<SessionPayload, AppError> {
        let mut state = self.state();
        if state.browser_reply.browser == Some(true) {
            state.session.browser = Some(true);
        }
        Ok(state.browser_reply)
    }

    async fn fetch_config(&self) -> Result<ConfigPayload, AppError> {
        Ok(Self::config_payload(&self.state()))
    }

    async fn post_config(&self, update: &ConfigUpdate) -> Result<ConfigPayload, AppError> {
        let mut state = self.state();
        if state.fail_config_posts {
            return Err(status(502, "bad gateway"));
        }
        state.config_posts.push(update.clone());
        if update.is_empty() {
            state.config = MonitorConfig::default();
        }
        if let Some(interval) = update.interval {
            state.config.interval_secs = interval;
        }
        match update.range {
            Some(RangeUpdate::Set(range)) => state.config.time_range = Some(range),
            Some(RangeUpdate::Clear) => state.config.time_range = None,
            None => {}
        }
        Ok(Self::config_payload(&state))
    }

    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        let (roster, delay) = {
            let mut state = self.state();
            state.fetch_count += 1;
            if state.fail_fetch_courses {
                return Err(status(500, "scraper down"));
            }
            (state.roster.clone(), state.fetch_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(roster)
    }

    async fn post_course(&self, uid: &str, patch: &CoursePatch) -> Result<Course, AppError> {
        if let Some(delay) = self.course_delay(uid) {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state();
        state.course_posts.push((uid.to_string(), *patch));
        if state.fail_posts {
            return Err(status(500, "failed"));
        }

        let mut updated = state
            .roster
            .iter()
            .find(|c| c.uid == uid)
            .cloned()
            .unwrap_or_else(|| course(uid));
        if let Some(pause) = patch.pause {
            updated.paused = pause;
        }
        if let Some(register) = patch.register {
            updated.register = if register { RegisterState::Armed } else { RegisterState::Off };
        }
        course_dash::models::upsert_course(&mut state.roster, updated.clone());
        Ok(updated)
    }

    async fn delete_course(&self, uid: &str) -> Result<Course, AppError> {
        if let Some(delay) = self.course_delay(uid) {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state();
        if state.fail_deletes.contains(uid) {
            return Err(status(500, "delete failed"));
        }
        match state.roster.iter().position(|c| c.uid == uid) {
            Some(idx) => Ok(state.roster.remove(idx)),
            None => Err(status(404, "not found")),
        }
    }
}

pub fn course(uid: &str) -> Course {
    Course {
        uid: uid.to_string(),
        abbreviation: Some("C S 439".to_string()),
        title: Some(format!("Course {}", uid)),
        professor: Some("PATT".to_string()),
        status: CourseStatus::Open,
        paused: false,
        register: RegisterState::Off,
    }
}

pub fn engine(backend: &Arc<FakeBackend>) -> Engine {
    let backend: Arc<dyn Backend> = backend.clone();
    Engine::new(
        backend,
        EngineOptions {
            poll_interval: Duration::from_secs(300),
            debounce: Duration::from_secs(3),
        },
    )
}

pub fn displayed_uids(engine: &Engine) -> Vec<String> {
    engine.store().snapshot().courses.iter().map(|c| c.uid.clone()).collect()
}

pub fn credentials(password: &str) -> Credentials {
    Credentials {
        id: "abc123".to_string(),
        password: password.to_string(),
        remember: false,
    }
}
