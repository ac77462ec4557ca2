//! Business entities and their status state machines.
//!
//! Every status-bearing record gets a dedicated enum with an explicit
//! `transition` function. Handlers never write a status string directly;
//! they ask the enum for the edge and persist only when it is allowed.
//! Statuses are stored as their `as_str()` form and parsed back on read,
//! so an out-of-vocabulary value in the database is an error, not a state.

pub mod appraisal;
pub mod change_request;
pub mod dispute;
pub mod employee;
pub mod leave;
pub mod offboarding;
pub mod payslip;
pub mod refund;
pub mod signing_bonus;

pub use appraisal::{AppraisalStatus, Scores, SCORE_MAX, SCORE_MIN};
pub use change_request::{ChangeField, ChangeRequestStatus};
pub use dispute::{DisputeKind, DisputeStatus};
pub use employee::EmployeeStatus;
pub use leave::{LeaveStatus, LeaveType};
pub use offboarding::{ChecklistStatus, OffboardingReason, TaskStatus};
pub use payslip::{InitiationStatus, PayslipStatus};
pub use refund::RefundStatus;
pub use signing_bonus::BonusStatus;

use thiserror::Error;

/// A status transition that the entity's state machine does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid status transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: String,
    pub to: String,
}

impl TransitionError {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self { from: from.into(), to: to.into() }
    }
}

/// A status string read from the database that is outside the declared
/// vocabulary. Surfaced as an internal error, never accepted as a state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {entity} status '{value}'")]
pub struct UnknownStatus {
    pub entity: &'static str,
    pub value: String,
}
