//! Type definitions for the Lohnwerk web UI.
//!
//! These mirror the backend's JSON responses. Decimals, UUIDs and dates
//! arrive as strings on the wire and stay strings here; the UI never does
//! arithmetic on them.

use serde::{Deserialize, Serialize};

/// An employee row as returned by `GET /register`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EmployeeDto {
    pub id: String,
    pub staff_no: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub base_salary: String,
    pub hire_date: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// A payslip row as returned by `GET /payslips`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PayslipDto {
    pub id: String,
    pub run_id: String,
    pub employee_id: String,
    pub period_start: String,
    pub period_end: String,
    pub base_amount: String,
    pub bonus_amount: String,
    pub refund_amount: String,
    pub gross_amount: String,
    pub net_amount: String,
    pub status: String,
    pub published_at: Option<String>,
    pub paid_at: Option<String>,
    pub created_at: String,
}

/// Counter snapshot from `GET /metrics`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MetricsSnapshot {
    pub records_created: u64,
    pub approvals: u64,
    pub rejections: u64,
    pub payroll_runs_executed: u64,
    pub payslips_issued: u64,
    pub bonuses_processed: u64,
    pub refunds_included: u64,
    pub validation_failures: u64,
    pub uptime_seconds: u64,
}
