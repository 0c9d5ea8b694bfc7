// Handler for leave_approval_revert: cancel the time-off event of a leave that was taken back.
//
// Responsibilities
// - Decode the event.
// - Look up the correlation written when the leave was approved.
// - Delete the correlated time-off event, if any.
//
// Notes
// - The correlation key is not deleted after a successful cancel; it expires with the leave.
// - Every failure is logged and the event is still acknowledged.

use std::sync::Arc;

use crate::application::dispatcher::EventHandler;
use crate::application::errors::LeaveSyncError;
use crate::core::leave::correlation::CorrelationState;
use crate::core::leave::event::EventPayload;
use crate::core::leave::event::v1::leave_approval_revert::LeaveApprovalRevertV1;
use crate::core::ports::{CorrelationStore, TimeOffCalendar};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveReverted {
    Cancelled {
        instance_code: String,
        event_id: String,
    },
    /// Never correlated, already expired, or the store lost it.
    NothingToCancel { instance_code: String },
}

pub struct LeaveRevertedHandler<TCalendar, TStore>
where
    TCalendar: TimeOffCalendar + 'static,
    TStore: CorrelationStore + 'static,
{
    calendar: Arc<TCalendar>,
    store: Arc<TStore>,
}

impl<TCalendar, TStore> LeaveRevertedHandler<TCalendar, TStore>
where
    TCalendar: TimeOffCalendar + 'static,
    TStore: CorrelationStore + 'static,
{
    pub fn new(calendar: Arc<TCalendar>, store: Arc<TStore>) -> Self {
        Self { calendar, store }
    }

    pub async fn process(&self, body: &[u8]) -> Result<LeaveReverted, LeaveSyncError> {
        let payload: EventPayload<LeaveApprovalRevertV1> = serde_json::from_slice(body)?;
        let instance_code = payload.event.instance_code;
        let span = tracing::Span::current();
        span.record("instance_code", instance_code.as_str());

        match self.store.lookup(&instance_code).await? {
            CorrelationState::Absent => Ok(LeaveReverted::NothingToCancel { instance_code }),
            CorrelationState::Cached { event_id } => {
                span.record("event_id", event_id.as_str());
                self.calendar.delete_time_off(&event_id).await?;
                Ok(LeaveReverted::Cancelled {
                    instance_code,
                    event_id,
                })
            }
        }
    }
}

#[async_trait::async_trait]
impl<TCalendar, TStore> EventHandler for LeaveRevertedHandler<TCalendar, TStore>
where
    TCalendar: TimeOffCalendar + 'static,
    TStore: CorrelationStore + 'static,
{
    #[tracing::instrument(
        name = "leave_approval_revert",
        skip_all,
        fields(instance_code = tracing::field::Empty, event_id = tracing::field::Empty)
    )]
    async fn handle(&self, body: &[u8]) -> anyhow::Result<()> {
        match self.process(body).await {
            Ok(LeaveReverted::Cancelled { .. }) => tracing::info!("time-off event cancelled"),
            Ok(LeaveReverted::NothingToCancel { .. }) => {
                tracing::info!("no time-off event correlated, nothing to cancel")
            }
            Err(error) if error.is_malformed_event() => {
                tracing::warn!(%error, "leave revert dropped")
            }
            Err(error) => tracing::error!(%error, "leave revert not synced"),
        }
        Ok(())
    }
}
