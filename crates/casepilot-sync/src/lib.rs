//! Pulls hearing-date updates from the external case-status service.

pub mod http;
pub mod runner;

pub use http::{CaseStatusSource, StatusClient, SyncError};
pub use runner::{FETCH_DELAY, SyncReport, roll_to_tomorrow, sync_cases};
