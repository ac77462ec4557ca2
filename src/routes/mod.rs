//! HTTP route handlers for the Lohnwerk API.
//!
//! Each sub-module handles one resource family:
//!
//! - `employees`: employee registration and lifecycle (`/register`)
//! - `change_requests`: employee attribute change requests
//! - `bonuses`: signing bonus approval flow
//! - `payroll`: payroll initiations and run execution
//! - `payslips`: payslip queries and publish/pay transitions
//! - `disputes`: expense claims and payroll disputes
//! - `refunds`: refund records and cancellation
//! - `leave`: leave requests
//! - `appraisals`: performance appraisals
//! - `offboarding`: offboarding checklists and tasks
//! - `health`: health check and system status endpoints
//! - `helpers`: row parsing utilities shared by the handlers

pub mod appraisals;
pub mod bonuses;
pub mod change_requests;
pub mod disputes;
pub mod employees;
pub mod health;
pub mod helpers;
pub mod leave;
pub mod offboarding;
pub mod payroll;
pub mod payslips;
pub mod refunds;
