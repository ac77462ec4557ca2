//! Refund records: pending_inclusion -> included_in_payroll | cancelled.
//!
//! Inclusion is performed only by payroll run execution, which also sets
//! `included_in_run`. Cancellation is manual and blocked once included.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{TransitionError, UnknownStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    PendingInclusion,
    IncludedInPayroll,
    Cancelled,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundStatus::PendingInclusion => "pending_inclusion",
            RefundStatus::IncludedInPayroll => "included_in_payroll",
            RefundStatus::Cancelled => "cancelled",
        }
    }

    pub fn transition(self, to: RefundStatus) -> Result<RefundStatus, TransitionError> {
        use RefundStatus::*;
        match (self, to) {
            (PendingInclusion, IncludedInPayroll) | (PendingInclusion, Cancelled) => Ok(to),
            _ => Err(TransitionError::new(self.as_str(), to.as_str())),
        }
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefundStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_inclusion" => Ok(RefundStatus::PendingInclusion),
            "included_in_payroll" => Ok(RefundStatus::IncludedInPayroll),
            "cancelled" => Ok(RefundStatus::Cancelled),
            other => Err(UnknownStatus { entity: "refund", value: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn included_and_cancelled_are_terminal() {
        assert!(RefundStatus::IncludedInPayroll.transition(RefundStatus::Cancelled).is_err());
        assert!(RefundStatus::Cancelled.transition(RefundStatus::IncludedInPayroll).is_err());
        assert!(RefundStatus::PendingInclusion.transition(RefundStatus::Cancelled).is_ok());
    }
}
