// Handler for leave_approval: mirror an approved leave into the employee's calendar.
//
// Responsibilities
// - Decode the event and parse the leave period.
// - Create the time-off event.
// - Cache instance code -> time-off event id until the leave ends, so a revert can find it.
//
// Failure policy
// - Every failure is logged and the event is still acknowledged. Redelivery would create a
//   second time-off event, so nothing here asks for it.

use chrono::TimeDelta;
use std::sync::Arc;

use crate::application::dispatcher::EventHandler;
use crate::application::errors::LeaveSyncError;
use crate::core::clock::Clock;
use crate::core::leave::event::EventPayload;
use crate::core::leave::event::v1::leave_approval::LeaveApprovalV1;
use crate::core::leave::period::LeavePeriod;
use crate::core::ports::{CorrelationStore, PutOutcome, TimeOffCalendar};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveApproved {
    /// Time-off created and correlated until the leave ends.
    Correlated {
        instance_code: String,
        event_id: String,
        ttl: TimeDelta,
    },
    /// Time-off created for a leave that is already over; nothing left to revert.
    LeaveAlreadyEnded {
        instance_code: String,
        event_id: String,
    },
}

pub struct LeaveApprovedHandler<TCalendar, TStore>
where
    TCalendar: TimeOffCalendar + 'static,
    TStore: CorrelationStore + 'static,
{
    calendar: Arc<TCalendar>,
    store: Arc<TStore>,
    clock: Arc<dyn Clock>,
}

impl<TCalendar, TStore> LeaveApprovedHandler<TCalendar, TStore>
where
    TCalendar: TimeOffCalendar + 'static,
    TStore: CorrelationStore + 'static,
{
    pub fn new(calendar: Arc<TCalendar>, store: Arc<TStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            calendar,
            store,
            clock,
        }
    }

    pub async fn process(&self, body: &[u8]) -> Result<LeaveApproved, LeaveSyncError> {
        let payload: EventPayload<LeaveApprovalV1> = serde_json::from_slice(body)?;
        let approval = payload.event;
        tracing::Span::current().record("instance_code", approval.instance_code.as_str());

        let period = LeavePeriod::parse(&approval.leave_start_time, &approval.leave_end_time)?;
        let event_id = self
            .calendar
            .create_time_off(&approval.employee_id, period.start, period.end)
            .await?;

        let Some(ttl) = period.remaining_at(self.clock.now()) else {
            return Ok(LeaveApproved::LeaveAlreadyEnded {
                instance_code: approval.instance_code,
                event_id,
            });
        };

        match self.store.put(&approval.instance_code, &event_id, ttl).await {
            Ok(PutOutcome::Stored) => Ok(LeaveApproved::Correlated {
                instance_code: approval.instance_code,
                event_id,
                ttl,
            }),
            Ok(PutOutcome::SkippedExpired) => Ok(LeaveApproved::LeaveAlreadyEnded {
                instance_code: approval.instance_code,
                event_id,
            }),
            Err(source) => Err(LeaveSyncError::CorrelationNotSaved { event_id, source }),
        }
    }
}

#[async_trait::async_trait]
impl<TCalendar, TStore> EventHandler for LeaveApprovedHandler<TCalendar, TStore>
where
    TCalendar: TimeOffCalendar + 'static,
    TStore: CorrelationStore + 'static,
{
    #[tracing::instrument(name = "leave_approval", skip_all, fields(instance_code = tracing::field::Empty))]
    async fn handle(&self, body: &[u8]) -> anyhow::Result<()> {
        match self.process(body).await {
            Ok(LeaveApproved::Correlated { event_id, ttl, .. }) => {
                tracing::info!(%event_id, ttl_secs = ttl.num_seconds(), "time-off event created");
            }
            Ok(LeaveApproved::LeaveAlreadyEnded { event_id, .. }) => {
                tracing::info!(%event_id, "time-off event created for a finished leave, not correlated");
            }
            Err(error) if error.is_malformed_event() => {
                tracing::warn!(%error, "leave approval dropped");
            }
            Err(error) => {
                tracing::error!(%error, "leave approval not synced");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod leave_approved_handler_tests {
    use super::*;
    use crate::adapters::in_memory::in_memory_calendar::{InMemoryCalendar, TimeOffRequest};
    use crate::adapters::in_memory::in_memory_correlation_store::{
        InMemoryCorrelationStore, StoreOperation,
    };
    use crate::adapters::in_memory::manual_clock::ManualClock;
    use crate::core::leave::correlation::CorrelationState;
    use crate::test_support::fixtures::events::leave_approval_v1::LeaveApprovalV1Builder;
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::{fixture, rstest};
    use tokio::join;

    type BeforeEachReturn = (Arc<ManualClock>, InMemoryCalendar, InMemoryCorrelationStore);

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    #[fixture]
    fn before_each() -> BeforeEachReturn {
        let clock = Arc::new(ManualClock::new(fixed_now()));
        let store = InMemoryCorrelationStore::with_clock(clock.clone());
        (clock, InMemoryCalendar::new(), store)
    }

    fn handler(
        clock: Arc<ManualClock>,
        calendar: InMemoryCalendar,
        store: InMemoryCorrelationStore,
    ) -> (
        LeaveApprovedHandler<InMemoryCalendar, InMemoryCorrelationStore>,
        Arc<InMemoryCalendar>,
        Arc<InMemoryCorrelationStore>,
    ) {
        let calendar = Arc::new(calendar);
        let store = Arc::new(store);
        let handler = LeaveApprovedHandler::new(calendar.clone(), store.clone(), clock);
        (handler, calendar, store)
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_create_the_time_off_and_correlate_it_until_the_leave_ends(
        before_each: BeforeEachReturn,
    ) {
        let (clock, calendar, store) = before_each;
        let (handler, calendar, store) = handler(clock, calendar, store);

        let outcome = handler
            .process(&LeaveApprovalV1Builder::new().body())
            .await
            .expect("process failed");

        let period = LeavePeriod::parse("2025-01-01 09:00:00", "2099-01-01 18:00:00").unwrap();
        assert_eq!(
            calendar.create_calls().await,
            vec![TimeOffRequest {
                subject_id: "U1".into(),
                start: period.start,
                end: period.end,
            }]
        );
        let expected_ttl = period.end.with_timezone(&Utc) - fixed_now();
        let LeaveApproved::Correlated { event_id, ttl, instance_code } = outcome else {
            panic!("expected Correlated outcome");
        };
        assert_eq!(instance_code, "A1");
        assert_eq!(ttl, expected_ttl);
        assert!(ttl > TimeDelta::days(365 * 70));
        assert_eq!(
            store.lookup("A1").await.unwrap(),
            CorrelationState::Cached {
                event_id: event_id.clone()
            }
        );
        assert_eq!(store.ttl_of("A1").await, Some(expected_ttl));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_submit_the_leave_in_utc_plus_eight(before_each: BeforeEachReturn) {
        let (clock, calendar, store) = before_each;
        let (handler, calendar, _) = handler(clock, calendar, store);
        handler
            .process(&LeaveApprovalV1Builder::new().body())
            .await
            .unwrap();
        let request = &calendar.create_calls().await[0];
        assert_eq!(request.start.to_rfc3339(), "2025-01-01T09:00:00+08:00");
        assert_eq!(request.end.to_rfc3339(), "2099-01-01T18:00:00+08:00");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_create_but_not_correlate_a_leave_that_already_ended(
        before_each: BeforeEachReturn,
    ) {
        let (clock, calendar, store) = before_each;
        let (handler, calendar, store) = handler(clock, calendar, store);
        let body = LeaveApprovalV1Builder::new()
            .leave_start_time("2025-01-01 09:00:00")
            .leave_end_time("2025-01-01 18:00:00")
            .body();

        let outcome = handler.process(&body).await.unwrap();

        assert!(matches!(outcome, LeaveApproved::LeaveAlreadyEnded { .. }));
        assert_eq!(calendar.create_calls().await.len(), 1);
        assert!(store.operations().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_treat_a_leave_ending_right_now_as_ended(before_each: BeforeEachReturn) {
        let (clock, calendar, store) = before_each;
        let (handler, _, store) = handler(clock, calendar, store);
        // fixed_now() is 2025-06-01 08:00 in UTC+8.
        let body = LeaveApprovalV1Builder::new()
            .leave_start_time("2025-05-31 09:00:00")
            .leave_end_time("2025-06-01 08:00:00")
            .body();
        let outcome = handler.process(&body).await.unwrap();
        assert!(matches!(outcome, LeaveApproved::LeaveAlreadyEnded { .. }));
        assert!(store.operations().await.is_empty());
    }

    #[rstest]
    #[case(b"not-json".to_vec())]
    #[case(br#"{"event":{"instance_code":"A1"}}"#.to_vec())]
    #[case(LeaveApprovalV1Builder::new().leave_start_time("2025-01-01T09:00:00").body())]
    #[case(LeaveApprovalV1Builder::new().leave_end_time("2099-01-01").body())]
    #[case(LeaveApprovalV1Builder::new().leave_start_time("2025-1-1 09:00:00").body())]
    #[case(LeaveApprovalV1Builder::new().leave_end_time("2099-01-01 18:00:00 ").body())]
    #[tokio::test]
    async fn it_should_acknowledge_a_malformed_event_without_side_effects(
        before_each: BeforeEachReturn,
        #[case] body: Vec<u8>,
    ) {
        let (clock, calendar, store) = before_each;
        let (handler, calendar, store) = handler(clock, calendar, store);

        let processed = handler.process(&body).await;
        assert!(processed.unwrap_err().is_malformed_event());
        assert!(handler.handle(&body).await.is_ok());

        assert!(calendar.create_calls().await.is_empty());
        assert!(store.operations().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_acknowledge_when_the_calendar_is_offline(before_each: BeforeEachReturn) {
        let (clock, mut calendar, store) = before_each;
        calendar.toggle_offline();
        let (handler, calendar, store) = handler(clock, calendar, store);
        let body = LeaveApprovalV1Builder::new().body();

        let processed = handler.process(&body).await;
        assert!(matches!(processed, Err(LeaveSyncError::Calendar(_))));
        assert!(handler.handle(&body).await.is_ok());
        assert_eq!(calendar.create_calls().await.len(), 2);
        assert!(store.operations().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_acknowledge_when_the_correlation_cannot_be_saved(
        before_each: BeforeEachReturn,
    ) {
        let (clock, calendar, mut store) = before_each;
        store.toggle_offline();
        let (handler, calendar, _) = handler(clock, calendar, store);
        let body = LeaveApprovalV1Builder::new().body();

        let processed = handler.process(&body).await;
        let Err(LeaveSyncError::CorrelationNotSaved { event_id, .. }) = processed else {
            panic!("expected CorrelationNotSaved");
        };
        assert!(calendar.is_live(&event_id).await);
        assert!(handler.handle(&body).await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_not_deduplicate_a_repeated_approval(before_each: BeforeEachReturn) {
        let (clock, calendar, store) = before_each;
        let (handler, calendar, store) = handler(clock, calendar, store);
        let body = LeaveApprovalV1Builder::new().body();

        handler.process(&body).await.unwrap();
        let second = handler.process(&body).await.unwrap();

        let LeaveApproved::Correlated { event_id: latest, .. } = second else {
            panic!("expected Correlated outcome");
        };
        let created = calendar.create_calls().await;
        assert_eq!(created.len(), 2);
        assert_eq!(created[0], created[1]);
        assert_eq!(
            store.lookup("A1").await.unwrap(),
            CorrelationState::Cached { event_id: latest }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_tolerate_concurrent_deliveries_of_the_same_approval(
        before_each: BeforeEachReturn,
    ) {
        let (clock, calendar, store) = before_each;
        let (handler, calendar, store) = handler(clock, calendar, store);
        let body = LeaveApprovalV1Builder::new().body();

        let (first, second) = join!(handler.process(&body), handler.process(&body));
        let ids: Vec<String> = [first.unwrap(), second.unwrap()]
            .into_iter()
            .map(|outcome| match outcome {
                LeaveApproved::Correlated { event_id, .. } => event_id,
                other => panic!("unexpected outcome {other:?}"),
            })
            .collect();

        assert_eq!(calendar.create_calls().await.len(), 2);
        let puts = store
            .operations()
            .await
            .into_iter()
            .filter(|operation| matches!(operation, StoreOperation::Put { .. }))
            .count();
        assert_eq!(puts, 2);
        let CorrelationState::Cached { event_id } = store.lookup("A1").await.unwrap() else {
            panic!("expected a cached correlation");
        };
        assert!(ids.contains(&event_id));
    }
}
