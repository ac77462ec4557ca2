use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, OptionExt},
    middleware::validation::page_params,
    models::RefundStatus,
    routes::helpers::{get_decimal, get_opt_uuid, get_status, get_uuid},
    state::AppState,
    types::RefundDto,
};

fn refund_to_dto(r: &SqliteRow) -> AppResult<RefundDto> {
    Ok(RefundDto {
        id: get_uuid(r, "id")?,
        employee_id: get_uuid(r, "employee_id")?,
        payslip_id: get_opt_uuid(r, "payslip_id")?,
        dispute_id: get_opt_uuid(r, "dispute_id")?,
        amount: get_decimal(r, "amount")?,
        reason: r.get("reason"),
        status: get_status(r, "status")?,
        included_in_run: get_opt_uuid(r, "included_in_run")?,
        created_at: r.get("created_at"),
    })
}

const SELECT_REFUND: &str = r#"SELECT id, employee_id, payslip_id, dispute_id, amount, reason,
    status, included_in_run, created_at FROM refunds"#;

#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_refunds(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_params(q.limit, q.offset, &state.config.payroll);

    let mut sql = format!("{} WHERE 1=1", SELECT_REFUND);
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
    if let Some(employee_id) = q.employee_id {
        qx = qx.bind(employee_id.to_string());
    }
    if let Some(status) = &q.status {
        let parsed: RefundStatus = status
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unknown status filter: {}", status)))?;
        qx = qx.bind(parsed.as_str());
    }
    qx = qx.bind(limit).bind(offset);

    let rows = qx.fetch_all(&state.db).await?;
    let items = rows.iter().map(refund_to_dto).collect::<AppResult<Vec<_>>>()?;
    Ok(Json(items))
}

pub async fn get_refund(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_REFUND))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("refund")?;
    Ok(Json(refund_to_dto(&row)?))
}

/// A refund can be withdrawn only while it is still waiting for a run.
pub async fn cancel_refund(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_REFUND))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("refund")?;
    let current: RefundStatus = get_status(&row, "status")?;
    let next = current.transition(RefundStatus::Cancelled)?;

    let updated = sqlx::query("UPDATE refunds SET status = ?1 WHERE id = ?2 AND status = ?3")
        .bind(next.as_str())
        .bind(id.to_string())
        .bind(current.as_str())
        .execute(&state.db)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict("refund was already picked up by a run".into()));
    }

    tracing::info!(refund_id = %id, "Refund cancelled");

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_REFUND))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok(Json(refund_to_dto(&row)?))
}
