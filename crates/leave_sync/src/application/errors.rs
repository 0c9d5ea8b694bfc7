use thiserror::Error;

use crate::core::leave::period::TimeParseError;
use crate::core::ports::{CalendarError, StoreError};

/// Everything that can go wrong while reconciling one leave event.
///
/// Handlers log these and still report the event as handled. A correlation lookup miss
/// is an outcome, not an error.
#[derive(Debug, Error)]
pub enum LeaveSyncError {
    #[error("event body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    TimeParse(#[from] TimeParseError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("time-off event {event_id} created but its correlation was not saved: {source}")]
    CorrelationNotSaved {
        event_id: String,
        #[source]
        source: StoreError,
    },
}

impl LeaveSyncError {
    /// The event itself is unusable, as opposed to a remote call that failed.
    pub fn is_malformed_event(&self) -> bool {
        matches!(self, LeaveSyncError::Decode(_) | LeaveSyncError::TimeParse(_))
    }
}
