use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, OptionExt},
    middleware::validation::{page_params, validate_amount, validate_name, validate_text, MAX_NAME_LEN},
    models::{ChangeField, ChangeRequestStatus},
    routes::helpers::{get_status, get_uuid, now_utc},
    state::AppState,
    types::{ChangeRequestDto, CreateChangeRequest, DecisionRequest},
};

fn row_to_dto(r: &SqliteRow) -> AppResult<ChangeRequestDto> {
    Ok(ChangeRequestDto {
        id: get_uuid(r, "id")?,
        employee_id: get_uuid(r, "employee_id")?,
        field: r.get("field"),
        new_value: r.get("new_value"),
        reason: r.get("reason"),
        status: get_status(r, "status")?,
        decided_by: r.get("decided_by"),
        decided_at: r.get("decided_at"),
        created_at: r.get("created_at"),
    })
}

const SELECT_CR: &str = r#"SELECT id, employee_id, field, new_value, reason, status,
    decided_by, decided_at, created_at FROM change_requests"#;

pub async fn create_change_request(
    State(state): State<AppState>,
    Json(req): Json<CreateChangeRequest>,
) -> AppResult<impl IntoResponse> {
    let field: ChangeField = req.field.parse().map_err(|_| {
        state.metrics.inc_validation_failures();
        AppError::ValidationError {
            field: "field".to_string(),
            message: format!("'{}' is not a changeable employee attribute", req.field),
        }
    })?;
    validate_text("reason", &req.reason)?;
    match field {
        ChangeField::BaseSalary => {
            let amount = Decimal::from_str(&req.new_value).map_err(|_| AppError::ValidationError {
                field: "new_value".to_string(),
                message: "must be a decimal amount for base_salary changes".to_string(),
            })?;
            validate_amount("new_value", amount, &state.config.payroll, true)?;
        }
        ChangeField::Department | ChangeField::Position => {
            validate_name("new_value", &req.new_value, MAX_NAME_LEN)?;
        }
    }

    let employee = sqlx::query("SELECT 1 FROM employees WHERE id = ?1")
        .bind(req.employee_id.to_string())
        .fetch_optional(&state.db)
        .await?;
    employee.ok_or_not_found("employee")?;

    let id = Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO change_requests (id, employee_id, field, new_value, reason)
           VALUES (?1, ?2, ?3, ?4, ?5)"#,
    )
    .bind(id.to_string())
    .bind(req.employee_id.to_string())
    .bind(field.as_str())
    .bind(req.new_value.trim())
    .bind(req.reason.trim())
    .execute(&state.db)
    .await?;

    state.metrics.inc_records_created();

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_CR))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok((StatusCode::CREATED, Json(row_to_dto(&row)?)))
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_change_requests(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_params(q.limit, q.offset, &state.config.payroll);

    let mut sql = format!("{} WHERE 1=1", SELECT_CR);
    let mut idx = 1;
    if q.employee_id.is_some() {
        sql.push_str(&format!(" AND employee_id = ?{}", idx));
        idx += 1;
    }
    if q.status.is_some() {
        sql.push_str(&format!(" AND status = ?{}", idx));
        idx += 1;
    }
    sql.push_str(&format!(" ORDER BY created_at DESC LIMIT ?{} OFFSET ?{}", idx, idx + 1));

    let mut qx = sqlx::query(&sql);
    if let Some(eid) = &q.employee_id {
        qx = qx.bind(eid.to_string());
    }
    if let Some(status) = &q.status {
        let parsed: ChangeRequestStatus = status
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unknown status filter: {}", status)))?;
        qx = qx.bind(parsed.as_str());
    }
    qx = qx.bind(limit).bind(offset);

    let rows = qx.fetch_all(&state.db).await?;
    let items = rows.iter().map(row_to_dto).collect::<AppResult<Vec<_>>>()?;
    Ok(Json(items))
}

pub async fn get_change_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_CR))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("change request")?;
    Ok(Json(row_to_dto(&row)?))
}

pub async fn approve_change_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    validate_name("decided_by", &req.decided_by, MAX_NAME_LEN)?;

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_CR))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("change request")?;
    let current: ChangeRequestStatus = get_status(&row, "status")?;
    let next = current.transition(ChangeRequestStatus::Approved)?;

    let field: ChangeField = get_status(&row, "field")?;
    let employee_id = get_uuid(&row, "employee_id")?;
    let new_value: String = row.get("new_value");

    // Apply the change and record the decision in one transaction.
    let mut tx = state.db.begin().await?;

    let updated = sqlx::query(
        r#"UPDATE change_requests SET status = ?1, decided_by = ?2, decided_at = ?3
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
        // Another approver decided first
        return Err(AppError::Conflict("change request was already decided".into()));
    }

    sqlx::query(&format!("UPDATE employees SET {} = ?1, updated_at = ?2 WHERE id = ?3", field.column()))
        .bind(&new_value)
        .bind(now_utc())
        .bind(employee_id.to_string())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    state.metrics.inc_approvals();
    tracing::info!(change_request_id = %id, employee_id = %employee_id, field = %field, "Change request approved");

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_CR))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok(Json(row_to_dto(&row)?))
}

pub async fn reject_change_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    validate_name("decided_by", &req.decided_by, MAX_NAME_LEN)?;

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_CR))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("change request")?;
    let current: ChangeRequestStatus = get_status(&row, "status")?;
    let next = current.transition(ChangeRequestStatus::Rejected)?;

    let updated = sqlx::query(
        r#"UPDATE change_requests SET status = ?1, decided_by = ?2, decided_at = ?3
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
        return Err(AppError::Conflict("change request was already decided".into()));
    }

    state.metrics.inc_rejections();

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_CR))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok(Json(row_to_dto(&row)?))
}
