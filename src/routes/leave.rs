use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, OptionExt},
    middleware::validation::{page_params, validate_date_order, validate_name, validate_text, MAX_NAME_LEN},
    models::{EmployeeStatus, LeaveStatus, LeaveType},
    routes::helpers::{get_date, get_status, get_uuid, now_utc},
    state::AppState,
    types::{CreateLeaveRequest, DecisionRequest, LeaveDto},
};

fn leave_to_dto(r: &SqliteRow) -> AppResult<LeaveDto> {
    Ok(LeaveDto {
        id: get_uuid(r, "id")?,
        employee_id: get_uuid(r, "employee_id")?,
        leave_type: get_status(r, "leave_type")?,
        start_date: get_date(r, "start_date")?,
        end_date: get_date(r, "end_date")?,
        reason: r.get("reason"),
        status: get_status(r, "status")?,
        decided_by: r.get("decided_by"),
        decided_at: r.get("decided_at"),
        created_at: r.get("created_at"),
    })
}

const SELECT_LEAVE: &str = r#"SELECT id, employee_id, leave_type, start_date, end_date, reason,
    status, decided_by, decided_at, created_at FROM leave_requests"#;

pub async fn create_leave_request(
    State(state): State<AppState>,
    Json(req): Json<CreateLeaveRequest>,
) -> AppResult<impl IntoResponse> {
    let check = || -> AppResult<()> {
        validate_date_order(req.start_date, req.end_date)?;
        validate_text("reason", &req.reason)?;
        Ok(())
    };
    if let Err(e) = check() {
        state.metrics.inc_validation_failures();
        return Err(e);
    }

    let employee = sqlx::query("SELECT status FROM employees WHERE id = ?1")
        .bind(req.employee_id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("employee")?;
    let emp_status: EmployeeStatus = get_status(&employee, "status")?;
    if emp_status == EmployeeStatus::Exited {
        return Err(AppError::Conflict("employee has exited".into()));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO leave_requests (id, employee_id, leave_type, start_date, end_date, reason)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
    )
    .bind(id.to_string())
    .bind(req.employee_id.to_string())
    .bind(req.leave_type.as_str())
    .bind(req.start_date.to_string())
    .bind(req.end_date.to_string())
    .bind(req.reason.trim())
    .execute(&state.db)
    .await?;

    state.metrics.inc_records_created();
    tracing::info!(leave_id = %id, employee_id = %req.employee_id, leave_type = %req.leave_type, "Leave request submitted");

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_LEAVE))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok((StatusCode::CREATED, Json(leave_to_dto(&row)?)))
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub leave_type: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_leave_requests(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_params(q.limit, q.offset, &state.config.payroll);

    let mut sql = format!("{} WHERE 1=1", SELECT_LEAVE);
    let mut idx = 1;
    if q.employee_id.is_some() {
        sql.push_str(&format!(" AND employee_id = ?{}", idx));
        idx += 1;
    }
    if q.leave_type.is_some() {
        sql.push_str(&format!(" AND leave_type = ?{}", idx));
        idx += 1;
    }
    if q.status.is_some() {
        sql.push_str(&format!(" AND status = ?{}", idx));
        idx += 1;
    }
    sql.push_str(&format!(" ORDER BY start_date DESC LIMIT ?{} OFFSET ?{}", idx, idx + 1));

    let mut qx = sqlx::query(&sql);
    if let Some(eid) = &q.employee_id {
        qx = qx.bind(eid.to_string());
    }
    if let Some(leave_type) = &q.leave_type {
        let parsed: LeaveType = leave_type
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unknown leave type filter: {}", leave_type)))?;
        qx = qx.bind(parsed.as_str());
    }
    if let Some(status) = &q.status {
        let parsed: LeaveStatus = status
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unknown status filter: {}", status)))?;
        qx = qx.bind(parsed.as_str());
    }
    qx = qx.bind(limit).bind(offset);

    let rows = qx.fetch_all(&state.db).await?;
    let items = rows.iter().map(leave_to_dto).collect::<AppResult<Vec<_>>>()?;
    Ok(Json(items))
}

pub async fn get_leave_request(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_LEAVE))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("leave request")?;
    Ok(Json(leave_to_dto(&row)?))
}

async fn decide_leave(
    state: &AppState,
    id: Uuid,
    decided_by: &str,
    target: LeaveStatus,
) -> AppResult<LeaveDto> {
    validate_name("decided_by", decided_by, MAX_NAME_LEN)?;

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_LEAVE))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("leave request")?;
    let current: LeaveStatus = get_status(&row, "status")?;
    let next = current.transition(target)?;

    let updated = sqlx::query(
        r#"UPDATE leave_requests SET status = ?1, decided_by = ?2, decided_at = ?3
           WHERE id = ?4 AND status = ?5"#,
    )
    .bind(next.as_str())
    .bind(decided_by.trim())
    .bind(now_utc())
    .bind(id.to_string())
    .bind(current.as_str())
    .execute(&state.db)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict("leave request was already decided".into()));
    }

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_LEAVE))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    leave_to_dto(&row)
}

pub async fn approve_leave(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    let dto = decide_leave(&state, id, &req.decided_by, LeaveStatus::Approved).await?;
    state.metrics.inc_approvals();
    Ok(Json(dto))
}

pub async fn reject_leave(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    let dto = decide_leave(&state, id, &req.decided_by, LeaveStatus::Rejected).await?;
    state.metrics.inc_rejections();
    Ok(Json(dto))
}

/// Cancellation is only possible before the leave starts.
pub async fn cancel_leave(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    validate_name("decided_by", &req.decided_by, MAX_NAME_LEN)?;

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_LEAVE))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("leave request")?;
    let current: LeaveStatus = get_status(&row, "status")?;
    let next = current.transition(LeaveStatus::Cancelled)?;

    let start_date = get_date(&row, "start_date")?;
    if Utc::now().date_naive() >= start_date {
        return Err(AppError::Conflict("leave has already started".into()));
    }

    let updated = sqlx::query(
        r#"UPDATE leave_requests SET status = ?1, decided_by = ?2, decided_at = ?3
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
        return Err(AppError::Conflict("leave request was already decided".into()));
    }

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_LEAVE))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok(Json(leave_to_dto(&row)?))
}
