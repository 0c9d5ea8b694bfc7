// Shared test fixture for the leave_approval_revert event.

use crate::core::leave::event::EventPayload;
use crate::core::leave::event::v1::leave_approval_revert::LeaveApprovalRevertV1;
use std::fs;

pub struct LeaveApprovalRevertBuilder {
    inner: LeaveApprovalRevertV1,
}

impl Default for LeaveApprovalRevertBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LeaveApprovalRevertBuilder {
    pub fn new() -> Self {
        let json_str =
            fs::read_to_string("./src/test_support/fixtures/events/json/leave_approval_revert.json")
                .unwrap();
        Self {
            inner: serde_json::from_str(&json_str).unwrap(),
        }
    }

    pub fn instance_code(mut self, v: impl Into<String>) -> Self {
        self.inner.instance_code = v.into();
        self
    }

    pub fn body(self) -> Vec<u8> {
        serde_json::to_vec(&EventPayload::new(self.inner)).unwrap()
    }
}
