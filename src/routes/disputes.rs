use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, OptionExt},
    middleware::validation::{page_params, validate_amount, validate_name, validate_text, MAX_NAME_LEN},
    models::{DisputeKind, DisputeStatus, PayslipStatus},
    routes::helpers::{get_decimal, get_opt_uuid, get_status, get_uuid, now_utc},
    state::AppState,
    types::{CreateDisputeRequest, DecisionRequest, DisputeDto},
};

fn dispute_to_dto(r: &SqliteRow) -> AppResult<DisputeDto> {
    Ok(DisputeDto {
        id: get_uuid(r, "id")?,
        kind: get_status(r, "kind")?,
        employee_id: get_uuid(r, "employee_id")?,
        payslip_id: get_opt_uuid(r, "payslip_id")?,
        amount: get_decimal(r, "amount")?,
        description: r.get("description"),
        status: get_status(r, "status")?,
        specialist_decided_by: r.get("specialist_decided_by"),
        specialist_decided_at: r.get("specialist_decided_at"),
        manager_decided_by: r.get("manager_decided_by"),
        manager_decided_at: r.get("manager_decided_at"),
        closed_at: r.get("closed_at"),
        created_at: r.get("created_at"),
    })
}

const SELECT_DISPUTE: &str = r#"SELECT id, kind, employee_id, payslip_id, amount, description,
    status, specialist_decided_by, specialist_decided_at, manager_decided_by, manager_decided_at,
    closed_at, created_at FROM disputes"#;

pub async fn create_dispute(
    State(state): State<AppState>,
    Json(req): Json<CreateDisputeRequest>,
) -> AppResult<impl IntoResponse> {
    let check = || -> AppResult<()> {
        validate_amount("amount", req.amount, &state.config.payroll, true)?;
        validate_text("description", &req.description)?;
        if req.description.trim().is_empty() {
            return Err(AppError::ValidationError {
                field: "description".into(),
                message: "must not be empty".into(),
            });
        }
        Ok(())
    };
    if let Err(e) = check() {
        state.metrics.inc_validation_failures();
        return Err(e);
    }

    let employee = sqlx::query("SELECT id FROM employees WHERE id = ?1")
        .bind(req.employee_id.to_string())
        .fetch_optional(&state.db)
        .await?;
    if employee.is_none() {
        return Err(AppError::NotFound("employee not found".into()));
    }

    let mut tx = state.db.begin().await?;

    match req.kind {
        DisputeKind::PayrollDispute => {
            let payslip_id = req.payslip_id.ok_or_else(|| AppError::ValidationError {
                field: "payslip_id".into(),
                message: "required for payroll disputes".into(),
            })?;
            let row = sqlx::query("SELECT employee_id, status FROM payslips WHERE id = ?1")
                .bind(payslip_id.to_string())
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_not_found("payslip")?;
            let owner = get_uuid(&row, "employee_id")?;
            if owner != req.employee_id {
                return Err(AppError::BadRequest("payslip does not belong to this employee".into()));
            }
            let current: PayslipStatus = get_status(&row, "status")?;
            let next = current.transition(PayslipStatus::Disputed)?;
            let updated = sqlx::query("UPDATE payslips SET status = ?1 WHERE id = ?2 AND status = ?3")
                .bind(next.as_str())
                .bind(payslip_id.to_string())
                .bind(current.as_str())
                .execute(&mut *tx)
                .await?;
            if updated.rows_affected() == 0 {
                return Err(AppError::Conflict("payslip status changed concurrently".into()));
            }
        }
        DisputeKind::ExpenseClaim => {
            if req.payslip_id.is_some() {
                return Err(AppError::ValidationError {
                    field: "payslip_id".into(),
                    message: "not allowed for expense claims".into(),
                });
            }
        }
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO disputes (id, kind, employee_id, payslip_id, amount, description)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
    )
    .bind(id.to_string())
    .bind(req.kind.as_str())
    .bind(req.employee_id.to_string())
    .bind(req.payslip_id.map(|p| p.to_string()))
    .bind(req.amount.to_string())
    .bind(req.description.trim())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    state.metrics.inc_records_created();
    tracing::info!(dispute_id = %id, kind = %req.kind, employee_id = %req.employee_id, "Dispute submitted");

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_DISPUTE))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok((StatusCode::CREATED, Json(dispute_to_dto(&row)?)))
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_disputes(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_params(q.limit, q.offset, &state.config.payroll);

    let mut sql = format!("{} WHERE 1=1", SELECT_DISPUTE);
    let mut idx = 1;
    if q.employee_id.is_some() {
        sql.push_str(&format!(" AND employee_id = ?{}", idx));
        idx += 1;
    }
    if q.kind.is_some() {
        sql.push_str(&format!(" AND kind = ?{}", idx));
        idx += 1;
    }
    if q.status.is_some() {
        sql.push_str(&format!(" AND status = ?{}", idx));
        idx += 1;
    }
    sql.push_str(&format!(" ORDER BY created_at DESC LIMIT ?{} OFFSET ?{}", idx, idx + 1));

    let mut qx = sqlx::query(&sql);
    if let Some(employee_id) = q.employee_id {
        qx = qx.bind(employee_id.to_string());
    }
    if let Some(kind) = &q.kind {
        let parsed: DisputeKind = kind
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unknown kind filter: {}", kind)))?;
        qx = qx.bind(parsed.as_str());
    }
    if let Some(status) = &q.status {
        let parsed: DisputeStatus = status
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unknown status filter: {}", status)))?;
        qx = qx.bind(parsed.as_str());
    }
    qx = qx.bind(limit).bind(offset);

    let rows = qx.fetch_all(&state.db).await?;
    let items = rows.iter().map(dispute_to_dto).collect::<AppResult<Vec<_>>>()?;
    Ok(Json(items))
}

pub async fn get_dispute(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_DISPUTE))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("dispute")?;
    Ok(Json(dispute_to_dto(&row)?))
}

/// First approval stage.
pub async fn approve_by_specialist(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    validate_name("decided_by", &req.decided_by, MAX_NAME_LEN)?;

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_DISPUTE))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("dispute")?;
    let current: DisputeStatus = get_status(&row, "status")?;
    let next = current.transition(DisputeStatus::ApprovedBySpecialist)?;

    let updated = sqlx::query(
        r#"UPDATE disputes SET status = ?1, specialist_decided_by = ?2, specialist_decided_at = ?3
           WHERE id = ?4 AND status = ?5"#,
    )
    .bind(next.as_str())
    .bind(req.decided_by.trim())
    .bind(now_utc())
    .bind(id.to_string())
    .bind(current.as_str())
    .execute(&state.db)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict("dispute was already decided".into()));
    }

    state.metrics.inc_approvals();

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_DISPUTE))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok(Json(dispute_to_dto(&row)?))
}

/// Second approval stage. Schedules the payout: a refund row is created
/// (tied to the payslip for payroll disputes, standalone for expense
/// claims) and a disputed payslip moves to refund_scheduled.
pub async fn approve_by_manager(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    validate_name("decided_by", &req.decided_by, MAX_NAME_LEN)?;

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_DISPUTE))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("dispute")?;
    let current: DisputeStatus = get_status(&row, "status")?;
    let next = current.transition(DisputeStatus::ApprovedByManager)?;
    let kind: DisputeKind = get_status(&row, "kind")?;
    let employee_id = get_uuid(&row, "employee_id")?;
    let payslip_id = get_opt_uuid(&row, "payslip_id")?;
    let amount = get_decimal(&row, "amount")?;
    let description: String = row.get("description");

    let mut tx = state.db.begin().await?;

    let updated = sqlx::query(
        r#"UPDATE disputes SET status = ?1, manager_decided_by = ?2, manager_decided_at = ?3
           WHERE id = ?4 AND status = ?5"#,
    )
    .bind(next.as_str())
    .bind(req.decided_by.trim())
    .bind(now_utc())
    .bind(id.to_string())
    .bind(current.as_str())
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict("dispute was already decided".into()));
    }

    if kind == DisputeKind::PayrollDispute {
        let payslip_id = payslip_id.ok_or_else(|| {
            AppError::Database("payroll dispute has no payslip reference".into())
        })?;
        let ps = sqlx::query("SELECT status FROM payslips WHERE id = ?1")
            .bind(payslip_id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_not_found("payslip")?;
        let ps_current: PayslipStatus = get_status(&ps, "status")?;
        let ps_next = ps_current.transition(PayslipStatus::RefundScheduled)?;
        let moved = sqlx::query("UPDATE payslips SET status = ?1 WHERE id = ?2 AND status = ?3")
            .bind(ps_next.as_str())
            .bind(payslip_id.to_string())
            .bind(ps_current.as_str())
            .execute(&mut *tx)
            .await?;
        if moved.rows_affected() == 0 {
            return Err(AppError::Conflict("payslip status changed concurrently".into()));
        }
    }

    let refund_id = Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO refunds (id, employee_id, payslip_id, dispute_id, amount, reason)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
    )
    .bind(refund_id.to_string())
    .bind(employee_id.to_string())
    .bind(payslip_id.map(|p| p.to_string()))
    .bind(id.to_string())
    .bind(amount.to_string())
    .bind(description)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    state.metrics.inc_approvals();
    tracing::info!(dispute_id = %id, refund_id = %refund_id, "Dispute approved by manager, refund scheduled");

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_DISPUTE))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok(Json(dispute_to_dto(&row)?))
}

/// Rejection is allowed before manager sign-off. A disputed payslip
/// reverts to paid.
pub async fn reject_dispute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    validate_name("decided_by", &req.decided_by, MAX_NAME_LEN)?;

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_DISPUTE))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("dispute")?;
    let current: DisputeStatus = get_status(&row, "status")?;
    let next = current.transition(DisputeStatus::Rejected)?;
    let kind: DisputeKind = get_status(&row, "kind")?;
    let payslip_id = get_opt_uuid(&row, "payslip_id")?;

    // The rejecting stage stamps its own columns.
    let (by_col, at_col) = match current {
        DisputeStatus::Submitted => ("specialist_decided_by", "specialist_decided_at"),
        _ => ("manager_decided_by", "manager_decided_at"),
    };

    let mut tx = state.db.begin().await?;

    let updated = sqlx::query(&format!(
        "UPDATE disputes SET status = ?1, {} = ?2, {} = ?3 WHERE id = ?4 AND status = ?5",
        by_col, at_col
    ))
    .bind(next.as_str())
    .bind(req.decided_by.trim())
    .bind(now_utc())
    .bind(id.to_string())
    .bind(current.as_str())
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict("dispute was already decided".into()));
    }

    if kind == DisputeKind::PayrollDispute {
        if let Some(payslip_id) = payslip_id {
            let ps = sqlx::query("SELECT status FROM payslips WHERE id = ?1")
                .bind(payslip_id.to_string())
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_not_found("payslip")?;
            let ps_current: PayslipStatus = get_status(&ps, "status")?;
            let ps_next = ps_current.transition(PayslipStatus::Paid)?;
            sqlx::query("UPDATE payslips SET status = ?1 WHERE id = ?2 AND status = ?3")
                .bind(ps_next.as_str())
                .bind(payslip_id.to_string())
                .bind(ps_current.as_str())
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;

    state.metrics.inc_rejections();

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_DISPUTE))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok(Json(dispute_to_dto(&row)?))
}

/// approved_by_manager -> closed, once the payout has been handled.
pub async fn close_dispute(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_DISPUTE))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("dispute")?;
    let current: DisputeStatus = get_status(&row, "status")?;
    let next = current.transition(DisputeStatus::Closed)?;

    let updated = sqlx::query(
        "UPDATE disputes SET status = ?1, closed_at = ?2 WHERE id = ?3 AND status = ?4",
    )
    .bind(next.as_str())
    .bind(now_utc())
    .bind(id.to_string())
    .bind(current.as_str())
    .execute(&state.db)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict("dispute status changed concurrently".into()));
    }

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_DISPUTE))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok(Json(dispute_to_dto(&row)?))
}
