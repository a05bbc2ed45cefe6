use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::config::{ConfigFields, TimeRange};
use crate::models::MonitorConfig;

/// Sentinel sent for both bounds to clear the active window.
pub const CLEAR_RANGE: &str = "none";

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigPayload {
    #[serde(default)]
    pub sid: Option<String>,
    pub interval: IntervalValue,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// The backend sends the interval as a string, older builds as a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IntervalValue {
    Number(u64),
    Text(String),
}

impl IntervalValue {
    fn seconds(&self) -> Result<u32, AppError> {
        let secs = match self {
            IntervalValue::Number(n) => *n,
            IntervalValue::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|e| AppError::Decode(format!("interval {:?}: {}", s, e)))?,
        };
        let secs = u32::try_from(secs)
            .map_err(|_| AppError::Decode(format!("interval {} out of range", secs)))?;
        Ok(secs.max(1))
    }
}

impl ConfigPayload {
    pub fn into_config(self) -> Result<(MonitorConfig, Option<String>), AppError> {
        let config = MonitorConfig {
            interval_secs: self.interval.seconds()?,
            time_range: TimeRange::from_wire(self.start.as_deref(), self.end.as_deref())?,
        };
        let sid = self.sid.filter(|s| !s.is_empty());
        Ok((config, sid))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RangeUpdate {
    Set(TimeRange),
    Clear,
}

/// Fields to change on the backend config. Empty means "restore defaults".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigUpdate {
    pub interval: Option<u32>,
    pub range: Option<RangeUpdate>,
}

impl ConfigUpdate {
    /// Only fields selected by `fields` that differ from the baseline are included.
    pub fn diff(
        baseline: Option<&MonitorConfig>,
        draft: &MonitorConfig,
        fields: ConfigFields,
    ) -> Self {
        let interval = (fields.interval
            && baseline.map(|b| b.interval_secs) != Some(draft.interval_secs))
        .then_some(draft.interval_secs);

        let range = (fields.range && baseline.map(|b| b.time_range) != Some(draft.time_range))
            .then(|| match draft.time_range {
                Some(range) => RangeUpdate::Set(range),
                None => RangeUpdate::Clear,
            });

        Self { interval, range }
    }

    pub fn is_empty(&self) -> bool {
        self.interval.is_none() && self.range.is_none()
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(interval) = self.interval {
            pairs.push(("interval", interval.to_string()));
        }
        match self.range {
            Some(RangeUpdate::Set(range)) => {
                let (start, end) = range.to_wire();
                pairs.push(("start", start));
                pairs.push(("end", end));
            }
            Some(RangeUpdate::Clear) => {
                pairs.push(("start", CLEAR_RANGE.to_string()));
                pairs.push(("end", CLEAR_RANGE.to_string()));
            }
            None => {}
        }
        pairs
    }
}

/// Partial update for one course. An empty patch just creates/fetches the course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoursePatch {
    pub pause: Option<bool>,
    pub register: Option<bool>,
}

impl CoursePatch {
    pub fn pause(paused: bool) -> Self {
        Self { pause: Some(paused), register: None }
    }

    pub fn register(enabled: bool) -> Self {
        Self { pause: None, register: Some(enabled) }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(pause) = self.pause {
            pairs.push(("pause", pause.to_string()));
        }
        if let Some(register) = self.register {
            pairs.push(("register", register.to_string()));
        }
        pairs
    }
}
