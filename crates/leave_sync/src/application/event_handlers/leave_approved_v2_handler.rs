// Handler for leave_approvalV2.
//
// The v2 schema is not supported. The event is acknowledged without side effects so the
// platform does not keep redelivering it.

use crate::application::dispatcher::EventHandler;

pub struct LeaveApprovedV2Handler;

#[async_trait::async_trait]
impl EventHandler for LeaveApprovedV2Handler {
    async fn handle(&self, body: &[u8]) -> anyhow::Result<()> {
        tracing::debug!(body_len = body.len(), "leave_approvalV2 is not supported, ignored");
        Ok(())
    }
}
