//! Leave requests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{TransitionError, UnknownStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Annual,
    Sick,
    Unpaid,
    Parental,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::Annual => "annual",
            LeaveType::Sick => "sick",
            LeaveType::Unpaid => "unpaid",
            LeaveType::Parental => "parental",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaveType {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "annual" => Ok(LeaveType::Annual),
            "sick" => Ok(LeaveType::Sick),
            "unpaid" => Ok(LeaveType::Unpaid),
            "parental" => Ok(LeaveType::Parental),
            other => Err(UnknownStatus { entity: "leave type", value: other.to_string() }),
        }
    }
}

/// pending -> approved | rejected; pending or approved -> cancelled.
/// The route layer additionally requires cancellation to happen before the
/// leave starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }

    pub fn transition(self, to: LeaveStatus) -> Result<LeaveStatus, TransitionError> {
        use LeaveStatus::*;
        match (self, to) {
            (Pending, Approved) | (Pending, Rejected) | (Pending, Cancelled) | (Approved, Cancelled) => {
                Ok(to)
            }
            _ => Err(TransitionError::new(self.as_str(), to.as_str())),
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaveStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LeaveStatus::Pending),
            "approved" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            "cancelled" => Ok(LeaveStatus::Cancelled),
            other => Err(UnknownStatus { entity: "leave request", value: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_cannot_be_cancelled() {
        assert!(LeaveStatus::Rejected.transition(LeaveStatus::Cancelled).is_err());
    }

    #[test]
    fn approved_can_still_be_cancelled() {
        assert_eq!(
            LeaveStatus::Approved.transition(LeaveStatus::Cancelled),
            Ok(LeaveStatus::Cancelled)
        );
    }
}
