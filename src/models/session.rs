use std::fmt;

use serde::{Deserialize, Serialize};

/// Authentication flags reported by the backend. Absent fields mean "unchanged".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unknown,
    Anonymous,
    UserAuthenticated,
    BrowserAuthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_authenticated: bool,
    pub browser_authenticated: bool,
    pub user_pending: bool,
    pub browser_pending: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user_authenticated: false,
            browser_authenticated: false,
            user_pending: true,
            browser_pending: false,
        }
    }
}

impl Session {
    /// Apply a reply: clear both pending flags and take whichever fields are present.
    pub fn resolve(&self, payload: &SessionPayload) -> Session {
        Session {
            user_authenticated: payload.user.unwrap_or(self.user_authenticated),
            browser_authenticated: payload.browser.unwrap_or(self.browser_authenticated),
            user_pending: false,
            browser_pending: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.user_pending && !self.user_authenticated {
            SessionPhase::Unknown
        } else if !self.user_authenticated {
            SessionPhase::Anonymous
        } else if self.browser_authenticated {
            SessionPhase::BrowserAuthenticated
        } else {
            SessionPhase::UserAuthenticated
        }
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub id: String,
    pub password: String,
    pub remember: bool,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("password", &"<redacted>")
            .field("remember", &self.remember)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unknown() {
        assert_eq!(Session::default().phase(), SessionPhase::Unknown);
    }

    #[test]
    fn resolve_keeps_absent_fields() {
        let session = Session {
            user_authenticated: true,
            browser_authenticated: true,
            user_pending: true,
            browser_pending: true,
        };
        let next = session.resolve(&SessionPayload { user: Some(true), browser: None });

        assert!(next.browser_authenticated);
        assert!(!next.user_pending);
        assert!(!next.browser_pending);
        assert_eq!(next.phase(), SessionPhase::BrowserAuthenticated);
    }

    #[test]
    fn anonymous_reply_only_has_user_field() {
        let payload: SessionPayload = serde_json::from_str(r#"{"user": false}"#).unwrap();
        let next = Session::default().resolve(&payload);

        assert_eq!(payload.browser, None);
        assert_eq!(next.phase(), SessionPhase::Anonymous);
    }
}
