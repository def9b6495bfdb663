//! Reconciliation of the local mirror with the remote listing

mod driver;
mod reconcile;

pub use driver::{CycleOutcome, Driver};
pub use reconcile::{CycleReport, Reconciler, TrackedSet};
