//! Signing bonus lifecycle: pending -> approved -> processed, or rejected.
//!
//! The approved -> processed edge belongs to payroll run execution alone;
//! `processed_in_run` is set in the same statement and exactly once.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{TransitionError, UnknownStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusStatus {
    Pending,
    Approved,
    Rejected,
    Processed,
}

impl BonusStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BonusStatus::Pending => "pending",
            BonusStatus::Approved => "approved",
            BonusStatus::Rejected => "rejected",
            BonusStatus::Processed => "processed",
        }
    }

    pub fn transition(self, to: BonusStatus) -> Result<BonusStatus, TransitionError> {
        use BonusStatus::*;
        match (self, to) {
            (Pending, Approved) | (Pending, Rejected) | (Approved, Processed) => Ok(to),
            _ => Err(TransitionError::new(self.as_str(), to.as_str())),
        }
    }
}

impl fmt::Display for BonusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BonusStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BonusStatus::Pending),
            "approved" => Ok(BonusStatus::Approved),
            "rejected" => Ok(BonusStatus::Rejected),
            "processed" => Ok(BonusStatus::Processed),
            other => Err(UnknownStatus { entity: "signing bonus", value: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_requires_prior_approval() {
        assert!(BonusStatus::Pending.transition(BonusStatus::Processed).is_err());
        assert!(BonusStatus::Approved.transition(BonusStatus::Processed).is_ok());
        assert!(BonusStatus::Rejected.transition(BonusStatus::Processed).is_err());
    }

    #[test]
    fn processed_is_terminal() {
        for to in [BonusStatus::Pending, BonusStatus::Approved, BonusStatus::Rejected] {
            assert!(BonusStatus::Processed.transition(to).is_err());
        }
    }
}
