use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use crate::models::{
    ConfigFields, Course, MonitorConfig, Session, SessionPayload, TimeRange, upsert_course,
};

/// One immutable snapshot of everything the dashboard renders.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub session: Session,
    pub courses: Arc<Vec<Course>>,
    pub courses_loading: bool,
    /// Roster requests issued and not yet settled.
    pub roster_requests: u32,
    /// Last config pulled from the backend. `None` until the first pull lands.
    pub config: Option<MonitorConfig>,
    /// Locally edited config, pushed after the debounce period.
    pub draft: MonitorConfig,
    pub sid: Option<String>,
    pub roster_seq: u64,
    pub config_seq: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: Session::default(),
            courses: Arc::new(Vec::new()),
            courses_loading: false,
            roster_requests: 0,
            config: None,
            draft: MonitorConfig::default(),
            sid: None,
            roster_seq: 0,
            config_seq: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SessionProbeStarted,
    UserLoginStarted,
    BrowserLoginStarted,
    SessionResolved(SessionPayload),
    CoursesRequested,
    CoursesLoaded { seq: u64, courses: Vec<Course> },
    CoursesFailed,
    CourseUpserted { seq: u64, course: Course },
    CoursesRemoved { seq: u64, uids: Vec<String> },
    /// `keep` names draft fields with unsent edits that the pull must not overwrite.
    ConfigLoaded {
        seq: u64,
        config: MonitorConfig,
        sid: Option<String>,
        keep: ConfigFields,
    },
    IntervalEdited(u32),
    RangeEdited(Option<TimeRange>),
    Noop,
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SessionProbeStarted => "session_probe_started",
            Event::UserLoginStarted => "user_login_started",
            Event::BrowserLoginStarted => "browser_login_started",
            Event::SessionResolved(_) => "session_resolved",
            Event::CoursesRequested => "courses_requested",
            Event::CoursesLoaded { .. } => "courses_loaded",
            Event::CoursesFailed => "courses_failed",
            Event::CourseUpserted { .. } => "course_upserted",
            Event::CoursesRemoved { .. } => "courses_removed",
            Event::ConfigLoaded { .. } => "config_loaded",
            Event::IntervalEdited(_) => "interval_edited",
            Event::RangeEdited(_) => "range_edited",
            Event::Noop => "noop",
        }
    }

    fn settles_roster_request(&self) -> bool {
        matches!(
            self,
            Event::CoursesLoaded { .. }
                | Event::CoursesFailed
                | Event::CourseUpserted { .. }
                | Event::CoursesRemoved { .. }
        )
    }
}

/// Pure transition function.
///
/// `roster_seq` is the newest ticket among applied roster events. Mutations
/// always apply and raise it; a wholesale load issued before it is dropped.
/// Config loads older than the last applied one are dropped.
pub fn reduce(state: &AppState, event: &Event) -> AppState {
    let mut next = state.clone();

    if event.settles_roster_request() {
        next.roster_requests = state.roster_requests.saturating_sub(1);
        next.courses_loading = next.roster_requests > 0;
    }

    match event {
        Event::SessionProbeStarted => {
            next.session.user_pending = !state.session.user_authenticated;
        }
        Event::UserLoginStarted => {
            next.session.user_pending = true;
        }
        Event::BrowserLoginStarted => {
            next.session.browser_pending = true;
        }
        Event::SessionResolved(payload) => {
            next.session = state.session.resolve(payload);
        }
        Event::CoursesRequested => {
            next.roster_requests = state.roster_requests + 1;
            next.courses_loading = true;
        }
        Event::CoursesFailed => {}
        Event::CoursesLoaded { seq, courses } => {
            if *seq > state.roster_seq {
                next.roster_seq = *seq;
                next.courses = Arc::new(courses.clone());
            }
        }
        Event::CourseUpserted { seq, course } => {
            next.roster_seq = state.roster_seq.max(*seq);
            let mut courses = state.courses.as_ref().clone();
            upsert_course(&mut courses, course.clone());
            next.courses = Arc::new(courses);
        }
        Event::CoursesRemoved { seq, uids } => {
            next.roster_seq = state.roster_seq.max(*seq);
            let removed: HashSet<&str> = uids.iter().map(String::as_str).collect();
            let courses = state
                .courses
                .iter()
                .filter(|c| !removed.contains(c.uid.as_str()))
                .cloned()
                .collect();
            next.courses = Arc::new(courses);
        }
        Event::ConfigLoaded { seq, config, sid, keep } => {
            if *seq > state.config_seq {
                next.config_seq = *seq;
                next.config = Some(config.clone());
                next.draft = config.clone();
                if keep.interval {
                    next.draft.interval_secs = state.draft.interval_secs;
                }
                if keep.range {
                    next.draft.time_range = state.draft.time_range;
                }
                if sid.is_some() {
                    next.sid = sid.clone();
                }
            }
        }
        Event::IntervalEdited(secs) => {
            next.draft.interval_secs = (*secs).max(1);
        }
        Event::RangeEdited(range) => {
            next.draft.time_range = *range;
        }
        Event::Noop => {}
    }

    next
}

/// Owns the current snapshot. Dispatches are serialized through the watch
/// sender, so each reduce + publish completes before the next begins.
pub struct Store {
    tx: watch::Sender<AppState>,
    roster_tickets: AtomicU64,
    config_tickets: AtomicU64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl Store {
    pub fn new(initial: AppState) -> Self {
        let roster = initial.roster_seq;
        let config = initial.config_seq;
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx,
            roster_tickets: AtomicU64::new(roster),
            config_tickets: AtomicU64::new(config),
        }
    }

    pub fn dispatch(&self, event: Event) {
        debug!(event = event.kind(), "dispatch");
        self.tx.send_modify(|state| {
            *state = reduce(state, &event);
        });
    }

    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }

    /// Ticket for a roster request, taken when the request is issued.
    pub fn next_roster_seq(&self) -> u64 {
        self.roster_tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn next_config_seq(&self) -> u64 {
        self.config_tickets.fetch_add(1, Ordering::SeqCst) + 1
    }
}
