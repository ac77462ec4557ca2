use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Health check endpoint - lightweight, no rate limiting
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness probe: checks DB connectivity with timeout protection
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let query = sqlx::query("SELECT 1").fetch_one(&state.db);
    match tokio::time::timeout(std::time::Duration::from_secs(5), query).await {
        Ok(Ok(_)) => (StatusCode::OK, "ready").into_response(),
        Ok(Err(e)) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}", e)).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready: timeout").into_response(),
    }
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.get_snapshot();
    Json(snapshot)
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let body = format!(
        "# HELP lohnwerk_records_created Total records created\n# TYPE lohnwerk_records_created counter\nlohnwerk_records_created {}\n\
# HELP lohnwerk_approvals Total approval decisions\n# TYPE lohnwerk_approvals counter\nlohnwerk_approvals {}\n\
# HELP lohnwerk_rejections Total rejection decisions\n# TYPE lohnwerk_rejections counter\nlohnwerk_rejections {}\n\
# HELP lohnwerk_payroll_runs_executed Payroll runs executed\n# TYPE lohnwerk_payroll_runs_executed counter\nlohnwerk_payroll_runs_executed {}\n\
# HELP lohnwerk_payslips_issued Payslips issued\n# TYPE lohnwerk_payslips_issued counter\nlohnwerk_payslips_issued {}\n\
# HELP lohnwerk_bonuses_processed Signing bonuses processed\n# TYPE lohnwerk_bonuses_processed counter\nlohnwerk_bonuses_processed {}\n\
# HELP lohnwerk_refunds_included Refunds included in payroll\n# TYPE lohnwerk_refunds_included counter\nlohnwerk_refunds_included {}\n\
# HELP lohnwerk_validation_failures Rejected request payloads\n# TYPE lohnwerk_validation_failures counter\nlohnwerk_validation_failures {}\n\
# HELP lohnwerk_uptime_seconds Uptime seconds\n# TYPE lohnwerk_uptime_seconds gauge\nlohnwerk_uptime_seconds {}\n",
        m.records_created,
        m.approvals,
        m.rejections,
        m.payroll_runs_executed,
        m.payslips_issued,
        m.bonuses_processed,
        m.refunds_included,
        m.validation_failures,
        m.uptime_seconds,
    );
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/Build info endpoint (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
