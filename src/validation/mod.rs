//! Read-only checks that gate order creation.
//!
//! Both validators only read, so they can run side by side and be repeated
//! freely. Neither reserves anything: the capacity slot is claimed later, at
//! creation time, against the ledger.

pub mod availability;
pub mod scheduling;

pub use availability::{AvailabilityValidator, LineItem};
pub use scheduling::{SchedulingDecision, SchedulingValidator};
