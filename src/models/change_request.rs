//! Employee change requests: pending -> approved | rejected.
//!
//! Approval applies the requested field change to the employee row in the
//! same transaction, so a change request is the only sanctioned write path
//! for the mutable employee attributes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{TransitionError, UnknownStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl ChangeRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeRequestStatus::Pending => "pending",
            ChangeRequestStatus::Approved => "approved",
            ChangeRequestStatus::Rejected => "rejected",
        }
    }

    pub fn transition(self, to: ChangeRequestStatus) -> Result<ChangeRequestStatus, TransitionError> {
        use ChangeRequestStatus::*;
        match (self, to) {
            (Pending, Approved) | (Pending, Rejected) => Ok(to),
            _ => Err(TransitionError::new(self.as_str(), to.as_str())),
        }
    }
}

impl fmt::Display for ChangeRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeRequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ChangeRequestStatus::Pending),
            "approved" => Ok(ChangeRequestStatus::Approved),
            "rejected" => Ok(ChangeRequestStatus::Rejected),
            other => Err(UnknownStatus { entity: "change request", value: other.to_string() }),
        }
    }
}

/// The employee attributes a change request may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeField {
    Department,
    Position,
    BaseSalary,
}

impl ChangeField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeField::Department => "department",
            ChangeField::Position => "position",
            ChangeField::BaseSalary => "base_salary",
        }
    }

    /// The employee table column the field maps to. Kept separate from
    /// `as_str` so the wire vocabulary can drift from the schema if needed.
    pub fn column(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ChangeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeField {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "department" => Ok(ChangeField::Department),
            "position" => Ok(ChangeField::Position),
            "base_salary" => Ok(ChangeField::BaseSalary),
            other => Err(UnknownStatus { entity: "change field", value: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_can_be_decided() {
        assert!(ChangeRequestStatus::Pending.transition(ChangeRequestStatus::Approved).is_ok());
        assert!(ChangeRequestStatus::Pending.transition(ChangeRequestStatus::Rejected).is_ok());
        assert!(ChangeRequestStatus::Approved.transition(ChangeRequestStatus::Rejected).is_err());
        assert!(ChangeRequestStatus::Rejected.transition(ChangeRequestStatus::Approved).is_err());
    }

    #[test]
    fn change_field_vocabulary() {
        assert_eq!("base_salary".parse::<ChangeField>(), Ok(ChangeField::BaseSalary));
        assert!("email".parse::<ChangeField>().is_err());
    }
}
