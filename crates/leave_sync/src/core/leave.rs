// This module groups the leave domain components.
//
// Structure
// - event.rs + event/: inbound event payloads per platform event type
// - period.rs: civil leave timestamps and the remaining duration of a leave
// - correlation.rs: the approval -> time-off correlation and its lifecycle

pub mod correlation;
pub mod event;
pub mod period;
