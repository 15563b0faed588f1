pub mod reconcile;
pub mod report;

pub use report::{SyncIssue, SyncReport, ValidationOutcome};
