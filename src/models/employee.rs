//! Employee lifecycle status.
//!
//! Employees move `active -> offboarding -> exited`, driven exclusively by
//! the offboarding checklist: opening a checklist starts offboarding,
//! completing its last task exits the employee.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{TransitionError, UnknownStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Offboarding,
    Exited,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Offboarding => "offboarding",
            EmployeeStatus::Exited => "exited",
        }
    }

    /// Checks the requested edge and returns the new status, or a
    /// `TransitionError` if the lifecycle does not allow it.
    pub fn transition(self, to: EmployeeStatus) -> Result<EmployeeStatus, TransitionError> {
        use EmployeeStatus::*;
        match (self, to) {
            (Active, Offboarding) | (Offboarding, Exited) => Ok(to),
            _ => Err(TransitionError::new(self.as_str(), to.as_str())),
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmployeeStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EmployeeStatus::Active),
            "offboarding" => Ok(EmployeeStatus::Offboarding),
            "exited" => Ok(EmployeeStatus::Exited),
            other => Err(UnknownStatus { entity: "employee", value: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_edges() {
        assert_eq!(
            EmployeeStatus::Active.transition(EmployeeStatus::Offboarding),
            Ok(EmployeeStatus::Offboarding)
        );
        assert_eq!(
            EmployeeStatus::Offboarding.transition(EmployeeStatus::Exited),
            Ok(EmployeeStatus::Exited)
        );
    }

    #[test]
    fn no_shortcuts_or_reversals() {
        assert!(EmployeeStatus::Active.transition(EmployeeStatus::Exited).is_err());
        assert!(EmployeeStatus::Exited.transition(EmployeeStatus::Active).is_err());
        assert!(EmployeeStatus::Offboarding.transition(EmployeeStatus::Active).is_err());
    }

    #[test]
    fn round_trips_through_storage_form() {
        for s in [EmployeeStatus::Active, EmployeeStatus::Offboarding, EmployeeStatus::Exited] {
            assert_eq!(s.as_str().parse::<EmployeeStatus>(), Ok(s));
        }
        assert!("fired".parse::<EmployeeStatus>().is_err());
    }
}
