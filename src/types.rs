use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    AppraisalStatus, BonusStatus, ChangeRequestStatus, ChecklistStatus, DisputeKind, DisputeStatus,
    EmployeeStatus, InitiationStatus, LeaveStatus, LeaveType, PayslipStatus, RefundStatus, TaskStatus,
};

// ---------------------- Requests ----------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmployeeRequest {
    pub staff_no: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    /// Monthly base salary.
    pub base_salary: Decimal,
    pub hire_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateChangeRequest {
    pub employee_id: Uuid,
    /// One of `department`, `position`, `base_salary`.
    pub field: String,
    pub new_value: String,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBonusRequest {
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInitiationRequest {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub initiated_by: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDisputeRequest {
    pub kind: DisputeKind,
    pub employee_id: Uuid,
    /// Required for payroll disputes, forbidden for expense claims.
    pub payslip_id: Option<Uuid>,
    pub amount: Decimal,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLeaveRequest {
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppraisalRequest {
    pub employee_id: Uuid,
    pub period: String,
    pub reviewer: String,
    pub performance: i64,
    pub teamwork: i64,
    pub reliability: i64,
    pub comments: Option<String>,
}

/// Score update for a draft appraisal. Absent fields keep their value.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAppraisalRequest {
    pub performance: Option<i64>,
    pub teamwork: Option<i64>,
    pub reliability: Option<i64>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOffboardingRequest {
    pub employee_id: Uuid,
    pub reason: String,
    pub exit_date: NaiveDate,
}

/// Body of every approve/reject style endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub decided_by: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteTaskRequest {
    pub completed_by: String,
}

// ---------------------- Responses ----------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeDto {
    pub id: Uuid,
    pub staff_no: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub base_salary: Decimal,
    pub hire_date: NaiveDate,
    pub status: EmployeeStatus,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRequestDto {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub field: String,
    pub new_value: String,
    pub reason: String,
    pub status: ChangeRequestStatus,
    pub decided_by: Option<String>,
    pub decided_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusDto {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub amount: Decimal,
    pub reason: String,
    pub status: BonusStatus,
    pub decided_by: Option<String>,
    pub decided_at: Option<String>,
    pub processed_in_run: Option<Uuid>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitiationDto {
    pub id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub initiated_by: String,
    pub notes: Option<String>,
    pub status: InitiationStatus,
    pub decided_by: Option<String>,
    pub decided_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDto {
    pub id: Uuid,
    pub initiation_id: Uuid,
    pub executed_at: String,
    pub employee_count: i64,
    pub gross_total: Decimal,
    pub bonus_total: Decimal,
    pub refund_total: Decimal,
    pub net_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipDto {
    pub id: Uuid,
    pub run_id: Uuid,
    pub employee_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub base_amount: Decimal,
    pub bonus_amount: Decimal,
    pub refund_amount: Decimal,
    pub gross_amount: Decimal,
    pub net_amount: Decimal,
    pub status: PayslipStatus,
    pub published_at: Option<String>,
    pub paid_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeDto {
    pub id: Uuid,
    pub kind: DisputeKind,
    pub employee_id: Uuid,
    pub payslip_id: Option<Uuid>,
    pub amount: Decimal,
    pub description: String,
    pub status: DisputeStatus,
    pub specialist_decided_by: Option<String>,
    pub specialist_decided_at: Option<String>,
    pub manager_decided_by: Option<String>,
    pub manager_decided_at: Option<String>,
    pub closed_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundDto {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub payslip_id: Option<Uuid>,
    pub dispute_id: Option<Uuid>,
    pub amount: Decimal,
    pub reason: String,
    pub status: RefundStatus,
    pub included_in_run: Option<Uuid>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveDto {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub decided_by: Option<String>,
    pub decided_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppraisalDto {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub period: String,
    pub reviewer: String,
    pub performance: i64,
    pub teamwork: i64,
    pub reliability: i64,
    pub overall: Decimal,
    pub comments: Option<String>,
    pub status: AppraisalStatus,
    pub submitted_at: Option<String>,
    pub acknowledged_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDto {
    pub id: Uuid,
    pub task_key: String,
    pub label: String,
    pub position: i64,
    pub status: TaskStatus,
    pub completed_by: Option<String>,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistDto {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub reason: String,
    pub exit_date: NaiveDate,
    pub status: ChecklistStatus,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub tasks: Vec<TaskDto>,
}
