//! Offboarding checklists and their embedded task records.
//!
//! A checklist is created with the configured default task set and is
//! completed implicitly when its last open task is done; completing the
//! checklist exits the employee.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{TransitionError, UnknownStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffboardingReason {
    Resignation,
    Termination,
    Retirement,
    EndOfContract,
}

impl OffboardingReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            OffboardingReason::Resignation => "resignation",
            OffboardingReason::Termination => "termination",
            OffboardingReason::Retirement => "retirement",
            OffboardingReason::EndOfContract => "end_of_contract",
        }
    }
}

impl fmt::Display for OffboardingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OffboardingReason {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resignation" => Ok(OffboardingReason::Resignation),
            "termination" => Ok(OffboardingReason::Termination),
            "retirement" => Ok(OffboardingReason::Retirement),
            "end_of_contract" => Ok(OffboardingReason::EndOfContract),
            other => Err(UnknownStatus { entity: "offboarding reason", value: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStatus {
    InProgress,
    Completed,
}

impl ChecklistStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecklistStatus::InProgress => "in_progress",
            ChecklistStatus::Completed => "completed",
        }
    }

    pub fn transition(self, to: ChecklistStatus) -> Result<ChecklistStatus, TransitionError> {
        match (self, to) {
            (ChecklistStatus::InProgress, ChecklistStatus::Completed) => Ok(to),
            _ => Err(TransitionError::new(self.as_str(), to.as_str())),
        }
    }
}

impl fmt::Display for ChecklistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecklistStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(ChecklistStatus::InProgress),
            "completed" => Ok(ChecklistStatus::Completed),
            other => Err(UnknownStatus { entity: "offboarding checklist", value: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::Done => "done",
        }
    }

    pub fn transition(self, to: TaskStatus) -> Result<TaskStatus, TransitionError> {
        match (self, to) {
            (TaskStatus::Open, TaskStatus::Done) => Ok(to),
            _ => Err(TransitionError::new(self.as_str(), to.as_str())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(TaskStatus::Open),
            "done" => Ok(TaskStatus::Done),
            other => Err(UnknownStatus { entity: "offboarding task", value: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_complete_once() {
        assert!(TaskStatus::Open.transition(TaskStatus::Done).is_ok());
        assert!(TaskStatus::Done.transition(TaskStatus::Done).is_err());
        assert!(TaskStatus::Done.transition(TaskStatus::Open).is_err());
    }

    #[test]
    fn checklist_completes_once() {
        assert!(ChecklistStatus::InProgress.transition(ChecklistStatus::Completed).is_ok());
        assert!(ChecklistStatus::Completed.transition(ChecklistStatus::InProgress).is_err());
    }
}
