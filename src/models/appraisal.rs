//! Performance appraisals: draft -> submitted -> acknowledged.
//!
//! Scores are 1..=5 integers and freeze on submission; the overall rating
//! is the mean of the three criteria, rounded to two decimal places.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{TransitionError, UnknownStatus};

pub const SCORE_MIN: i64 = 1;
pub const SCORE_MAX: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppraisalStatus {
    Draft,
    Submitted,
    Acknowledged,
}

impl AppraisalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppraisalStatus::Draft => "draft",
            AppraisalStatus::Submitted => "submitted",
            AppraisalStatus::Acknowledged => "acknowledged",
        }
    }

    pub fn transition(self, to: AppraisalStatus) -> Result<AppraisalStatus, TransitionError> {
        use AppraisalStatus::*;
        match (self, to) {
            (Draft, Submitted) | (Submitted, Acknowledged) => Ok(to),
            _ => Err(TransitionError::new(self.as_str(), to.as_str())),
        }
    }
}

impl fmt::Display for AppraisalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppraisalStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(AppraisalStatus::Draft),
            "submitted" => Ok(AppraisalStatus::Submitted),
            "acknowledged" => Ok(AppraisalStatus::Acknowledged),
            other => Err(UnknownStatus { entity: "appraisal", value: other.to_string() }),
        }
    }
}

/// The three rated criteria of an appraisal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub performance: i64,
    pub teamwork: i64,
    pub reliability: i64,
}

impl Scores {
    /// Returns the name of the first out-of-range criterion, if any.
    pub fn out_of_range(&self) -> Option<&'static str> {
        let checks = [
            ("performance", self.performance),
            ("teamwork", self.teamwork),
            ("reliability", self.reliability),
        ];
        checks.iter().find(|(_, v)| !(SCORE_MIN..=SCORE_MAX).contains(v)).map(|(name, _)| *name)
    }

    /// Mean of the three scores with two decimal places.
    pub fn overall(&self) -> Decimal {
        let sum = Decimal::from(self.performance + self.teamwork + self.reliability);
        (sum / Decimal::from(3)).round_dp(2)
    }
}
