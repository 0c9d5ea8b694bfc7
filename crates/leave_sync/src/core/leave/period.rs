// Leave period parsed from the civil timestamps of a leave_approval event.
//
// Purpose
// - Interpret "YYYY-MM-DD HH:MM:SS" in the approval app's time zone (Asia/Shanghai, UTC+8,
//   no daylight saving time).
// - Compute how long a leave still runs, which becomes the correlation TTL.
//
// Boundaries
// - No input or output. `end > start` is not validated here.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, TimeZone, Utc};
use thiserror::Error;

pub const LEAVE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const LEAVE_TIME_ZONE: &str = "Asia/Shanghai";
const LEAVE_UTC_OFFSET_SECS: i32 = 8 * 3600;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {field} {value:?}: {reason}")]
pub struct TimeParseError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeavePeriod {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl LeavePeriod {
    pub fn parse(start: &str, end: &str) -> Result<Self, TimeParseError> {
        Ok(Self {
            start: parse_leave_time("leave_start_time", start)?,
            end: parse_leave_time("leave_end_time", end)?,
        })
    }

    /// Time left until the leave ends, or `None` once it is over.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        let remaining = self.end.with_timezone(&Utc) - now;
        (remaining > TimeDelta::zero()).then_some(remaining)
    }
}

/// Strict: zero-padded fields, single spaces, nothing before or after.
fn parse_leave_time(field: &'static str, value: &str) -> Result<DateTime<FixedOffset>, TimeParseError> {
    let invalid = |reason: String| TimeParseError {
        field,
        value: value.to_string(),
        reason,
    };

    let naive = NaiveDateTime::parse_from_str(value, LEAVE_TIME_FORMAT)
        .map_err(|e| invalid(e.to_string()))?;
    if naive.format(LEAVE_TIME_FORMAT).to_string() != value {
        return Err(invalid("expected YYYY-MM-DD HH:MM:SS".into()));
    }
    FixedOffset::east_opt(LEAVE_UTC_OFFSET_SECS)
        .and_then(|offset| offset.from_local_datetime(&naive).single())
        .ok_or_else(|| invalid("not representable at +08:00".into()))
}
