//! Payroll initiation review and payslip lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{TransitionError, UnknownStatus};

/// Review status of a payroll initiation. Approving one executes the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitiationStatus {
    PendingReview,
    Approved,
    Rejected,
}

impl InitiationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitiationStatus::PendingReview => "pending_review",
            InitiationStatus::Approved => "approved",
            InitiationStatus::Rejected => "rejected",
        }
    }

    pub fn transition(self, to: InitiationStatus) -> Result<InitiationStatus, TransitionError> {
        use InitiationStatus::*;
        match (self, to) {
            (PendingReview, Approved) | (PendingReview, Rejected) => Ok(to),
            _ => Err(TransitionError::new(self.as_str(), to.as_str())),
        }
    }
}

impl fmt::Display for InitiationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InitiationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_review" => Ok(InitiationStatus::PendingReview),
            "approved" => Ok(InitiationStatus::Approved),
            "rejected" => Ok(InitiationStatus::Rejected),
            other => Err(UnknownStatus { entity: "payroll initiation", value: other.to_string() }),
        }
    }
}

/// Lifecycle of a single payslip.
///
/// `draft` slips are created by run execution, become `available` when
/// published, `paid` when settlement is confirmed. A payroll dispute moves a
/// paid slip to `disputed`; manager approval of that dispute schedules a
/// refund (`refund_scheduled`, terminal — the money rides a later run),
/// while rejection or refund-less closure returns the slip to `paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayslipStatus {
    Draft,
    Available,
    Paid,
    Disputed,
    RefundScheduled,
}

impl PayslipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayslipStatus::Draft => "draft",
            PayslipStatus::Available => "available",
            PayslipStatus::Paid => "paid",
            PayslipStatus::Disputed => "disputed",
            PayslipStatus::RefundScheduled => "refund_scheduled",
        }
    }

    pub fn transition(self, to: PayslipStatus) -> Result<PayslipStatus, TransitionError> {
        use PayslipStatus::*;
        match (self, to) {
            (Draft, Available)
            | (Available, Paid)
            | (Paid, Disputed)
            | (Disputed, RefundScheduled)
            | (Disputed, Paid) => Ok(to),
            _ => Err(TransitionError::new(self.as_str(), to.as_str())),
        }
    }
}

impl fmt::Display for PayslipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayslipStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PayslipStatus::Draft),
            "available" => Ok(PayslipStatus::Available),
            "paid" => Ok(PayslipStatus::Paid),
            "disputed" => Ok(PayslipStatus::Disputed),
            "refund_scheduled" => Ok(PayslipStatus::RefundScheduled),
            other => Err(UnknownStatus { entity: "payslip", value: other.to_string() }),
        }
    }
}
