//! The approval workflow proper: the transition table, derived lead-time
//! metrics, and the timeline view model. Everything here is a pure function
//! of order fields so it can be tested without any network call.

pub mod lead_time;
pub mod timeline;
pub mod transitions;
