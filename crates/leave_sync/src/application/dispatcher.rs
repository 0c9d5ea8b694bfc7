// Routes decoded platform events to the handler registered for their event type.
//
// Responsibilities
// - Keep a registry of event type -> handler.
// - Hand the plaintext event body to the matching handler.
//
// Boundaries
// - Authenticity checks and decryption happen in the inbound adapter before dispatch.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::application::event_handlers::leave_approved_handler::LeaveApprovedHandler;
use crate::application::event_handlers::leave_approved_v2_handler::LeaveApprovedV2Handler;
use crate::application::event_handlers::leave_reverted_handler::LeaveRevertedHandler;
use crate::core::clock::Clock;
use crate::core::leave::event::LeaveEventType;
use crate::core::ports::{CorrelationStore, TimeOffCalendar};

/// An `Err` asks the transport to redeliver the event.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, body: &[u8]) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Handled,
    NoHandler,
}

#[derive(Default, Clone)]
pub struct EventDispatcher {
    handlers: HashMap<String, Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_event(mut self, event_type: impl Into<String>, handler: Arc<dyn EventHandler>) -> Self {
        self.handlers.insert(event_type.into(), handler);
        self
    }

    /// Registers the three leave handlers over shared adapters.
    pub fn for_leave_events<TCalendar, TStore>(
        calendar: Arc<TCalendar>,
        store: Arc<TStore>,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        TCalendar: TimeOffCalendar + 'static,
        TStore: CorrelationStore + 'static,
    {
        Self::new()
            .on_event(
                LeaveEventType::Approval.as_str(),
                Arc::new(LeaveApprovedHandler::new(
                    calendar.clone(),
                    store.clone(),
                    clock,
                )),
            )
            .on_event(
                LeaveEventType::ApprovalV2.as_str(),
                Arc::new(LeaveApprovedV2Handler),
            )
            .on_event(
                LeaveEventType::ApprovalRevert.as_str(),
                Arc::new(LeaveRevertedHandler::new(calendar, store)),
            )
    }

    pub fn handles(&self, event_type: &str) -> bool {
        self.handlers.contains_key(event_type)
    }

    pub async fn dispatch(&self, event_type: &str, body: &[u8]) -> anyhow::Result<Dispatched> {
        let Some(handler) = self.handlers.get(event_type) else {
            tracing::warn!(event_type, "no handler registered, event acknowledged");
            return Ok(Dispatched::NoHandler);
        };
        handler.handle(body).await?;
        Ok(Dispatched::Handled)
    }
}
