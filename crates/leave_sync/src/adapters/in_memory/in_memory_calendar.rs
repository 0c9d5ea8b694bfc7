// In memory implementation of the TimeOffCalendar port.
//
// Purpose
// - Support handler tests and local development without the Lark open platform.
//
// Responsibilities
// - Mint a fresh id for every created time-off event.
// - Record every create and delete attempt, including failed ones.
// - Reject deletes of unknown ids the way the remote calendar does.

use crate::core::ports::{CalendarError, TimeOffCalendar};
use chrono::{DateTime, FixedOffset};
use std::collections::HashSet;
use tokio::sync::Mutex;
use uuid::Uuid;

const TIMEOFF_EVENT_NOT_FOUND: i64 = 193_001;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOffRequest {
    pub subject_id: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

#[derive(Default)]
pub struct InMemoryCalendar {
    create_calls: Mutex<Vec<TimeOffRequest>>,
    delete_calls: Mutex<Vec<String>>,
    live: Mutex<HashSet<String>>,
    is_offline: bool,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub async fn create_calls(&self) -> Vec<TimeOffRequest> {
        self.create_calls.lock().await.clone()
    }

    pub async fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().await.clone()
    }

    pub async fn is_live(&self, event_id: &str) -> bool {
        self.live.lock().await.contains(event_id)
    }

    fn offline_error() -> CalendarError {
        CalendarError::Transport("Calendar offline".into())
    }
}

#[async_trait::async_trait]
impl TimeOffCalendar for InMemoryCalendar {
    async fn create_time_off(
        &self,
        subject_id: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<String, CalendarError> {
        self.create_calls.lock().await.push(TimeOffRequest {
            subject_id: subject_id.to_string(),
            start,
            end,
        });
        if self.is_offline {
            return Err(Self::offline_error());
        }

        let event_id = Uuid::now_v7().to_string();
        self.live.lock().await.insert(event_id.clone());
        Ok(event_id)
    }

    async fn delete_time_off(&self, event_id: &str) -> Result<(), CalendarError> {
        self.delete_calls.lock().await.push(event_id.to_string());
        if self.is_offline {
            return Err(Self::offline_error());
        }

        if self.live.lock().await.remove(event_id) {
            Ok(())
        } else {
            Err(CalendarError::Rejected {
                request_id: Uuid::now_v7().to_string(),
                code: TIMEOFF_EVENT_NOT_FOUND,
                msg: format!("timeoff event {event_id} not found"),
                data: serde_json::Value::Null,
            })
        }
    }
}
