use std::sync::Arc;

use tracing::{info, warn};

use crate::api::Backend;
use crate::error::AppError;
use crate::models::{Credentials, Session, SessionPayload};
use crate::services::course_sync::CourseEngine;
use crate::state::{Event, Store};

/// Site-session and browser-session authentication.
///
/// Every operation resolves its pending flag before returning, whatever the outcome.
#[derive(Clone)]
pub struct SessionEngine {
    store: Arc<Store>,
    backend: Arc<dyn Backend>,
    courses: CourseEngine,
}

impl SessionEngine {
    pub fn new(store: Arc<Store>, backend: Arc<dyn Backend>, courses: CourseEngine) -> Self {
        Self { store, backend, courses }
    }

    /// Ask the backend who we are. A failed probe keeps the last known flags.
    pub async fn probe(&self) -> Result<Session, AppError> {
        self.store.dispatch(Event::SessionProbeStarted);

        match self.backend.session_status().await {
            Ok(payload) => {
                self.store.dispatch(Event::SessionResolved(payload));
                Ok(self.store.snapshot().session)
            }
            Err(e) => {
                self.store.dispatch(Event::SessionResolved(SessionPayload::default()));
                if e.is_transport() {
                    warn!("Backend unreachable, keeping last session state: {}", e);
                } else {
                    warn!("Session probe failed: {}", e);
                }
                Err(e)
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Session, AppError> {
        self.store.dispatch(Event::UserLoginStarted);

        match self.backend.login(credentials).await {
            Ok(payload) => {
                self.store.dispatch(Event::SessionResolved(payload));
                if payload.user == Some(true) {
                    info!("Signed in as {}", credentials.id);
                    Ok(self.store.snapshot().session)
                } else {
                    warn!("Login for {} was refused", credentials.id);
                    Err(AppError::Rejected("site login refused".to_string()))
                }
            }
            Err(e) => {
                self.store.dispatch(Event::SessionResolved(SessionPayload::default()));
                warn!("Login request failed: {}", e);
                Err(e)
            }
        }
    }

    /// Start the backend's browser-automation login. Success reloads the roster,
    /// since course polling is only meaningful with a browser session.
    pub async fn browser_login(&self) -> Result<Session, AppError> {
        self.store.dispatch(Event::BrowserLoginStarted);

        let payload = match self.backend.browser_login().await {
            Ok(payload) => payload,
            Err(e) => {
                self.store.dispatch(Event::SessionResolved(SessionPayload::default()));
                warn!("Browser login request failed: {}", e);
                return Err(e);
            }
        };

        self.store.dispatch(Event::SessionResolved(SessionPayload {
            user: None,
            browser: payload.browser,
        }));

        if payload.browser != Some(true) {
            warn!("Browser login was unsuccessful");
            return Err(AppError::Rejected("browser login unsuccessful".to_string()));
        }

        info!("Browser session established");
        if let Err(e) = self.courses.refresh().await {
            warn!("Roster refresh after browser login failed: {}", e);
        }
        Ok(self.store.snapshot().session)
    }
}
