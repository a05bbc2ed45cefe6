use chrono::NaiveTime;
use serde::Serialize;

use crate::error::AppError;
use crate::time_window;

pub const DEFAULT_INTERVAL_SECS: u32 = 180;

const WIRE_TIME_FORMAT: &str = "%H%M";

/// Daily window during which the backend checks courses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Build a range from optional wire bounds. Anything but both-present yields `None`.
    pub fn from_wire(start: Option<&str>, end: Option<&str>) -> Result<Option<Self>, AppError> {
        match (start, end) {
            (Some(s), Some(e)) if !s.is_empty() && !e.is_empty() => {
                Ok(Some(Self::new(parse_hhmm(s)?, parse_hhmm(e)?)))
            }
            _ => Ok(None),
        }
    }

    pub fn to_wire(&self) -> (String, String) {
        (format_hhmm(self.start), format_hhmm(self.end))
    }

    pub fn contains(&self, now: NaiveTime) -> bool {
        time_window::is_active(now, Some(self.start), Some(self.end))
    }
}

/// A selection of config fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigFields {
    pub interval: bool,
    pub range: bool,
}

impl ConfigFields {
    pub const NONE: ConfigFields = ConfigFields { interval: false, range: false };
    pub const ALL: ConfigFields = ConfigFields { interval: true, range: true };
    pub const INTERVAL: ConfigFields = ConfigFields { interval: true, range: false };
    pub const RANGE: ConfigFields = ConfigFields { interval: false, range: true };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorConfig {
    pub interval_secs: u32,
    pub time_range: Option<TimeRange>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            time_range: None,
        }
    }
}

impl MonitorConfig {
    pub fn is_active(&self, now: NaiveTime) -> bool {
        match &self.time_range {
            Some(range) => range.contains(now),
            None => true,
        }
    }
}

pub fn parse_hhmm(value: &str) -> Result<NaiveTime, AppError> {
    let value = value.trim();
    if value.len() != 4 {
        return Err(AppError::InvalidTime(value.to_string()));
    }
    NaiveTime::parse_from_str(value, WIRE_TIME_FORMAT)
        .map_err(|_| AppError::InvalidTime(value.to_string()))
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format(WIRE_TIME_FORMAT).to_string()
}
