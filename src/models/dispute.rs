//! Expense claims and payroll disputes share one two-stage approval chain:
//! submitted -> approved_by_specialist -> approved_by_manager -> closed,
//! with rejection possible until the manager has signed off.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{TransitionError, UnknownStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeKind {
    ExpenseClaim,
    PayrollDispute,
}

impl DisputeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeKind::ExpenseClaim => "expense_claim",
            DisputeKind::PayrollDispute => "payroll_dispute",
        }
    }
}

impl fmt::Display for DisputeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisputeKind {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense_claim" => Ok(DisputeKind::ExpenseClaim),
            "payroll_dispute" => Ok(DisputeKind::PayrollDispute),
            other => Err(UnknownStatus { entity: "dispute kind", value: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Submitted,
    ApprovedBySpecialist,
    ApprovedByManager,
    Rejected,
    Closed,
}

impl DisputeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisputeStatus::Submitted => "submitted",
            DisputeStatus::ApprovedBySpecialist => "approved_by_specialist",
            DisputeStatus::ApprovedByManager => "approved_by_manager",
            DisputeStatus::Rejected => "rejected",
            DisputeStatus::Closed => "closed",
        }
    }

    pub fn transition(self, to: DisputeStatus) -> Result<DisputeStatus, TransitionError> {
        use DisputeStatus::*;
        match (self, to) {
            (Submitted, ApprovedBySpecialist)
            | (ApprovedBySpecialist, ApprovedByManager)
            | (ApprovedByManager, Closed)
            | (Submitted, Rejected)
            | (ApprovedBySpecialist, Rejected) => Ok(to),
            _ => Err(TransitionError::new(self.as_str(), to.as_str())),
        }
    }
}

impl fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisputeStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(DisputeStatus::Submitted),
            "approved_by_specialist" => Ok(DisputeStatus::ApprovedBySpecialist),
            "approved_by_manager" => Ok(DisputeStatus::ApprovedByManager),
            "rejected" => Ok(DisputeStatus::Rejected),
            "closed" => Ok(DisputeStatus::Closed),
            other => Err(UnknownStatus { entity: "dispute", value: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_chain_is_ordered() {
        let s = DisputeStatus::Submitted;
        assert!(s.transition(DisputeStatus::ApprovedByManager).is_err());
        let s = s.transition(DisputeStatus::ApprovedBySpecialist).unwrap();
        let s = s.transition(DisputeStatus::ApprovedByManager).unwrap();
        assert_eq!(s.transition(DisputeStatus::Closed), Ok(DisputeStatus::Closed));
    }

    #[test]
    fn rejection_window_ends_at_manager_approval() {
        assert!(DisputeStatus::Submitted.transition(DisputeStatus::Rejected).is_ok());
        assert!(DisputeStatus::ApprovedBySpecialist.transition(DisputeStatus::Rejected).is_ok());
        assert!(DisputeStatus::ApprovedByManager.transition(DisputeStatus::Rejected).is_err());
        assert!(DisputeStatus::Closed.transition(DisputeStatus::Rejected).is_err());
    }
}
