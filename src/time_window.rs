use chrono::{NaiveTime, Timelike};

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Whether `now` falls inside the daily window `[start, end)`.
///
/// A missing bound means no restriction. When `start` is later than `end` the
/// window crosses midnight: `start` moves back a day if `now` is before `end`,
/// otherwise `end` moves forward a day.
pub fn is_active(now: NaiveTime, start: Option<NaiveTime>, end: Option<NaiveTime>) -> bool {
    let (Some(start), Some(end)) = (start, end) else {
        return true;
    };

    let now = seconds(now);
    let mut start = seconds(start);
    let mut end = seconds(end);

    if start > end {
        if now < end {
            start -= SECS_PER_DAY;
        } else {
            end += SECS_PER_DAY;
        }
    }

    start <= now && now < end
}

fn seconds(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight())
}
