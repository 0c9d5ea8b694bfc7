// Correlation between an approval instance and the time-off event it produced.
//
// Lifecycle
// - Absent until an approval creates a time-off event for a leave that has not ended yet.
// - Cached until the leave ends, at which point the store expires it.
// - A revert reads it to find the time-off event to cancel. The key is left to expire.

use chrono::TimeDelta;
use std::time::Duration;

pub const DEFAULT_KEY_NAMESPACE: &str = "leaveHelper";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrelationState {
    Cached { event_id: String },
    Absent,
}

pub fn correlation_key(namespace: &str, instance_code: &str) -> String {
    format!("{namespace}:approval:{instance_code}")
}

/// Non-positive TTLs are never written.
pub fn positive_ttl(ttl: TimeDelta) -> Option<Duration> {
    if ttl <= TimeDelta::zero() {
        return None;
    }
    ttl.to_std().ok()
}

/// Whole seconds for SETEX: truncated, but at least one second for a positive TTL.
pub fn expiry_seconds(ttl: TimeDelta) -> Option<u64> {
    positive_ttl(ttl).map(|ttl| ttl.as_secs().max(1))
}
