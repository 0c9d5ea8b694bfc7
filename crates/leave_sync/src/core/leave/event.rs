// Inbound leave events as published by the HR approval app.
//
// Purpose
// - Name the event types this service subscribes to.
// - Provide the envelope shape shared by every customized event body.
//
// Versioning and evolution
// - `leave_approvalV2` is a different schema that is acknowledged and ignored.

use serde::{Deserialize, Serialize};

pub mod v1 {
    pub mod leave_approval;
    pub mod leave_approval_revert;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaveEventType {
    Approval,
    ApprovalV2,
    ApprovalRevert,
}

impl LeaveEventType {
    pub const ALL: [LeaveEventType; 3] = [
        LeaveEventType::Approval,
        LeaveEventType::ApprovalV2,
        LeaveEventType::ApprovalRevert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveEventType::Approval => "leave_approval",
            LeaveEventType::ApprovalV2 => "leave_approvalV2",
            LeaveEventType::ApprovalRevert => "leave_approval_revert",
        }
    }
}

/// Callback body: platform metadata around the business `event`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventPayload<E> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    pub event: E,
}

impl<E> EventPayload<E> {
    pub fn new(event: E) -> Self {
        Self {
            uuid: None,
            ts: None,
            event,
        }
    }
}
