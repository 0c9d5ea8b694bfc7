// Event payload: leave_approval (v1).
//
// Purpose
// - Carry an approved leave: who is away and the civil start and end of the leave.
//
// Fields
// - `leave_start_time` / `leave_end_time` are "YYYY-MM-DD HH:MM:SS" in Asia/Shanghai.
// - `start_time` / `end_time` describe the approval workflow itself, not the leave.
// - Everything besides the instance code, employee id and leave times is informational.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaveApprovalV1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_key: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    pub instance_code: String,
    pub employee_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_unit: Option<i64>,
    pub leave_start_time: String,
    pub leave_end_time: String,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leave_reason: Option<String>,
}
