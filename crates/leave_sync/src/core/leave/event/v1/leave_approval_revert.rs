// Event payload: leave_approval_revert.
//
// Purpose
// - Signal that a previously approved leave was taken back.
//
// Fields
// - `instance_code` matches the `instance_code` of the original leave_approval event.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaveApprovalRevertV1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_key: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    pub instance_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operate_time: Option<i64>,
}
