//! The HTTP route table, shared between the binary and the tests.

use axum::{
    routing::{get, post},
    Router,
};

use crate::routes;
use crate::state::AppState;

/// Builds the API router with all endpoints registered. Middleware layers
/// are applied by the caller so tests can opt in selectively.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Ops
        .route("/healthz", get(routes::health::healthz))
        .route("/readyz", get(routes::health::readyz))
        .route("/metrics", get(routes::health::metrics))
        .route("/metrics/prometheus", get(routes::health::metrics_prometheus))
        .route("/version", get(routes::health::version))
        // Employees
        .route(
            "/register",
            post(routes::employees::register_employee).get(routes::employees::list_employees),
        )
        .route(
            "/register/{id}",
            get(routes::employees::get_employee).delete(routes::employees::delete_employee),
        )
        // Employee data change requests
        .route(
            "/change-requests",
            post(routes::change_requests::create_change_request).get(routes::change_requests::list_change_requests),
        )
        .route("/change-requests/{id}", get(routes::change_requests::get_change_request))
        .route("/change-requests/{id}/approve", post(routes::change_requests::approve_change_request))
        .route("/change-requests/{id}/reject", post(routes::change_requests::reject_change_request))
        // Signing bonuses
        .route("/bonuses", post(routes::bonuses::create_bonus).get(routes::bonuses::list_bonuses))
        .route("/bonuses/{id}", get(routes::bonuses::get_bonus))
        .route("/bonuses/{id}/approve", post(routes::bonuses::approve_bonus))
        .route("/bonuses/{id}/reject", post(routes::bonuses::reject_bonus))
        // Payroll
        .route(
            "/payroll/initiations",
            post(routes::payroll::create_initiation).get(routes::payroll::list_initiations),
        )
        .route("/payroll/initiations/{id}", get(routes::payroll::get_initiation))
        .route("/payroll/initiations/{id}/approve", post(routes::payroll::approve_initiation))
        .route("/payroll/initiations/{id}/reject", post(routes::payroll::reject_initiation))
        .route("/payroll/runs", get(routes::payroll::list_runs))
        .route("/payroll/runs/{id}", get(routes::payroll::get_run))
        // Payslips
        .route("/payslips", get(routes::payslips::list_payslips))
        .route("/payslips/{id}", get(routes::payslips::get_payslip))
        .route("/payslips/{id}/publish", post(routes::payslips::publish_payslip))
        .route("/payslips/{id}/pay", post(routes::payslips::pay_payslip))
        // Disputes and expense claims
        .route("/disputes", post(routes::disputes::create_dispute).get(routes::disputes::list_disputes))
        .route("/disputes/{id}", get(routes::disputes::get_dispute))
        .route("/disputes/{id}/approve-specialist", post(routes::disputes::approve_by_specialist))
        .route("/disputes/{id}/approve-manager", post(routes::disputes::approve_by_manager))
        .route("/disputes/{id}/reject", post(routes::disputes::reject_dispute))
        .route("/disputes/{id}/close", post(routes::disputes::close_dispute))
        // Refunds
        .route("/refunds", get(routes::refunds::list_refunds))
        .route("/refunds/{id}", get(routes::refunds::get_refund))
        .route("/refunds/{id}/cancel", post(routes::refunds::cancel_refund))
        // Leave
        .route(
            "/leave-requests",
            post(routes::leave::create_leave_request).get(routes::leave::list_leave_requests),
        )
        .route("/leave-requests/{id}", get(routes::leave::get_leave_request))
        .route("/leave-requests/{id}/approve", post(routes::leave::approve_leave))
        .route("/leave-requests/{id}/reject", post(routes::leave::reject_leave))
        .route("/leave-requests/{id}/cancel", post(routes::leave::cancel_leave))
        // Appraisals
        .route("/appraisals", post(routes::appraisals::create_appraisal).get(routes::appraisals::list_appraisals))
        .route("/appraisals/{id}", get(routes::appraisals::get_appraisal).put(routes::appraisals::update_appraisal))
        .route("/appraisals/{id}/submit", post(routes::appraisals::submit_appraisal))
        .route("/appraisals/{id}/acknowledge", post(routes::appraisals::acknowledge_appraisal))
        // Offboarding
        .route(
            "/offboarding",
            post(routes::offboarding::create_checklist).get(routes::offboarding::list_checklists),
        )
        .route("/offboarding/{id}", get(routes::offboarding::get_checklist))
        .route("/offboarding/{id}/tasks/{task_id}/complete", post(routes::offboarding::complete_task))
        .with_state(state)
}
