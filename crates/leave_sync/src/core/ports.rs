// Ports define what the core needs from the outside world, without implementing it.
//
// Purpose
// - Describe the correlation store and the time-off calendar as traits.
//
// Responsibilities
// - Keep the handlers independent of Redis and of the Lark open platform by coding against traits.
//
// Boundaries
// - No concrete input or output here. Adapters implement these traits in the adapters layer.
//
// Testing guidance
// - Provide in memory implementations for tests and local development.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeDelta};
use thiserror::Error;

use crate::core::leave::correlation::CorrelationState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result of a `put`. A non-positive TTL means the leave is already over and
/// nothing is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Stored,
    SkippedExpired,
}

#[async_trait]
pub trait CorrelationStore: Send + Sync {
    async fn put(
        &self,
        instance_code: &str,
        event_id: &str,
        ttl: TimeDelta,
    ) -> Result<PutOutcome, StoreError>;

    /// `Ok(None)` covers both a missing and an expired key.
    async fn get(&self, instance_code: &str) -> Result<Option<String>, StoreError>;

    async fn lookup(&self, instance_code: &str) -> Result<CorrelationState, StoreError> {
        Ok(match self.get(instance_code).await? {
            Some(event_id) => CorrelationState::Cached { event_id },
            None => CorrelationState::Absent,
        })
    }
}

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar client setup failed: {0}")]
    Setup(String),

    #[error("calendar request failed: {0}")]
    Transport(String),

    #[error("invoke failed: request_id={request_id}, code={code}, msg={msg}, data={data}")]
    Rejected {
        request_id: String,
        code: i64,
        msg: String,
        data: serde_json::Value,
    },
}

impl CalendarError {
    pub fn request_id(&self) -> Option<&str> {
        match self {
            CalendarError::Setup(_) | CalendarError::Transport(_) => None,
            CalendarError::Rejected { request_id, .. } => Some(request_id),
        }
    }
}

#[async_trait]
pub trait TimeOffCalendar: Send + Sync {
    /// Blocks out `[start, end]` on the subject's calendar and returns the id of the new entry.
    async fn create_time_off(
        &self,
        subject_id: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<String, CalendarError>;

    async fn delete_time_off(&self, event_id: &str) -> Result<(), CalendarError>;
}
