use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const REGISTRAR_BASE: &str = "https://utdirect.utexas.edu";

/// A tracked course section as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub uid: String,
    #[serde(rename = "abbr", default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "prof", default)]
    pub professor: Option<String>,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub register: RegisterState,
}

impl Course {
    /// Pause, resume and registration controls are disabled for invalid courses.
    pub fn actions_enabled(&self) -> bool {
        self.status != CourseStatus::Invalid
    }

    pub fn schedule_url(&self, sid: &str) -> Option<String> {
        if !self.actions_enabled() {
            return None;
        }
        Some(format!(
            "{}/apps/registrar/course_schedule/{}/{}/",
            REGISTRAR_BASE, sid, self.uid
        ))
    }

    pub fn registration_url(&self, sid: &str) -> String {
        format!(
            "{}/registration/registration.WBX?s_ccyys={}&s_af_unique={}",
            REGISTRAR_BASE, sid, self.uid
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CourseStatus {
    Open,
    OpenReserved,
    Reserved,
    Waitlisted,
    WaitlistedReserved,
    Closed,
    Cancelled,
    Invalid,
    /// Tracked but not scraped yet; the backend reports a null status.
    #[default]
    Unchecked,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Open => "open",
            CourseStatus::OpenReserved => "open; reserved",
            CourseStatus::Reserved => "reserved",
            CourseStatus::Waitlisted => "waitlisted",
            CourseStatus::WaitlistedReserved => "waitlisted; reserved",
            CourseStatus::Closed => "closed",
            CourseStatus::Cancelled => "cancelled",
            CourseStatus::Invalid => "invalid",
            CourseStatus::Unchecked => "unchecked",
        }
    }

    /// Unrecognized strings map to `Invalid` so one odd entry cannot fail a roster load.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => CourseStatus::Open,
            "open; reserved" => CourseStatus::OpenReserved,
            "reserved" => CourseStatus::Reserved,
            "waitlisted" => CourseStatus::Waitlisted,
            "waitlisted; reserved" => CourseStatus::WaitlistedReserved,
            "closed" => CourseStatus::Closed,
            "cancelled" => CourseStatus::Cancelled,
            _ => CourseStatus::Invalid,
        }
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CourseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CourseStatus::Unchecked => serializer.serialize_none(),
            other => serializer.serialize_str(other.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for CourseStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or(CourseStatus::Unchecked, |s| CourseStatus::parse(&s)))
    }
}

/// Automated registration state for a course.
///
/// On the wire this is `null`/`false` when off, `"register"`/`true` when armed,
/// and `"success"` or `"fail"` once an attempt has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterState {
    #[default]
    Off,
    Armed,
    Succeeded,
    Failed,
}

impl RegisterState {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, RegisterState::Off)
    }
}

impl Serialize for RegisterState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RegisterState::Off => serializer.serialize_none(),
            RegisterState::Armed => serializer.serialize_str("register"),
            RegisterState::Succeeded => serializer.serialize_str("success"),
            RegisterState::Failed => serializer.serialize_str("fail"),
        }
    }
}

impl<'de> Deserialize<'de> for RegisterState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(match raw {
            serde_json::Value::Bool(true) => RegisterState::Armed,
            serde_json::Value::String(s) => match s.as_str() {
                "success" => RegisterState::Succeeded,
                "fail" => RegisterState::Failed,
                "" => RegisterState::Off,
                _ => RegisterState::Armed,
            },
            _ => RegisterState::Off,
        })
    }
}

pub fn is_valid_uid(uid: &str) -> bool {
    uid.len() == 5 && uid.bytes().all(|b| b.is_ascii_digit())
}

/// Replace the first course with a matching uid, or append when none matches.
///
/// Later entries with the same uid are left untouched.
pub fn upsert_course(courses: &mut Vec<Course>, course: Course) {
    match courses.iter().position(|c| c.uid == course.uid) {
        Some(idx) => courses[idx] = course,
        None => courses.push(course),
    }
}
