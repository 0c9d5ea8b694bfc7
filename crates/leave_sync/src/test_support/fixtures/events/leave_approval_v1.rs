// Shared test fixture for the leave_approval (v1) event.
// Compiled into the crate only during tests (see `test_support` in src/lib.rs).

use crate::core::leave::event::EventPayload;
use crate::core::leave::event::v1::leave_approval::LeaveApprovalV1;
use std::fs;

pub struct LeaveApprovalV1Builder {
    inner: LeaveApprovalV1,
}

impl Default for LeaveApprovalV1Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
impl LeaveApprovalV1Builder {
    pub fn new() -> Self {
        let json_str =
            fs::read_to_string("./src/test_support/fixtures/events/json/leave_approval_v1.json")
                .unwrap();
        Self {
            inner: serde_json::from_str(&json_str).unwrap(),
        }
    }

    pub fn instance_code(mut self, v: impl Into<String>) -> Self {
        self.inner.instance_code = v.into();
        self
    }

    pub fn employee_id(mut self, v: impl Into<String>) -> Self {
        self.inner.employee_id = v.into();
        self
    }

    pub fn leave_start_time(mut self, v: impl Into<String>) -> Self {
        self.inner.leave_start_time = v.into();
        self
    }

    pub fn leave_end_time(mut self, v: impl Into<String>) -> Self {
        self.inner.leave_end_time = v.into();
        self
    }

    pub fn build(self) -> LeaveApprovalV1 {
        self.inner
    }

    /// Callback body as the platform delivers it.
    pub fn body(self) -> Vec<u8> {
        serde_json::to_vec(&EventPayload::new(self.inner)).unwrap()
    }
}
