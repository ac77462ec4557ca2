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
    models::PayslipStatus,
    routes::helpers::{get_date, get_decimal, get_status, get_uuid, now_utc},
    state::AppState,
    types::PayslipDto,
};

pub(crate) fn payslip_to_dto(r: &SqliteRow) -> AppResult<PayslipDto> {
    Ok(PayslipDto {
        id: get_uuid(r, "id")?,
        run_id: get_uuid(r, "run_id")?,
        employee_id: get_uuid(r, "employee_id")?,
        period_start: get_date(r, "period_start")?,
        period_end: get_date(r, "period_end")?,
        base_amount: get_decimal(r, "base_amount")?,
        bonus_amount: get_decimal(r, "bonus_amount")?,
        refund_amount: get_decimal(r, "refund_amount")?,
        gross_amount: get_decimal(r, "gross_amount")?,
        net_amount: get_decimal(r, "net_amount")?,
        status: get_status(r, "status")?,
        published_at: r.get("published_at"),
        paid_at: r.get("paid_at"),
        created_at: r.get("created_at"),
    })
}

pub(crate) const SELECT_PAYSLIP: &str = r#"SELECT id, run_id, employee_id, period_start, period_end,
    base_amount, bonus_amount, refund_amount, gross_amount, net_amount,
    status, published_at, paid_at, created_at FROM payslips"#;

#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub run_id: Option<Uuid>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_payslips(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_params(q.limit, q.offset, &state.config.payroll);

    let mut sql = format!("{} WHERE 1=1", SELECT_PAYSLIP);
    let mut idx = 1;
    if q.employee_id.is_some() {
        sql.push_str(&format!(" AND employee_id = ?{}", idx));
        idx += 1;
    }
    if q.run_id.is_some() {
        sql.push_str(&format!(" AND run_id = ?{}", idx));
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
    if let Some(run_id) = q.run_id {
        qx = qx.bind(run_id.to_string());
    }
    if let Some(status) = &q.status {
        let parsed: PayslipStatus = status
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unknown status filter: {}", status)))?;
        qx = qx.bind(parsed.as_str());
    }
    qx = qx.bind(limit).bind(offset);

    let rows = qx.fetch_all(&state.db).await?;
    let items = rows.iter().map(payslip_to_dto).collect::<AppResult<Vec<_>>>()?;
    Ok(Json(items))
}

pub async fn get_payslip(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_PAYSLIP))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("payslip")?;
    Ok(Json(payslip_to_dto(&row)?))
}

async fn move_payslip(
    state: &AppState,
    id: Uuid,
    target: PayslipStatus,
    stamp_column: &str,
) -> AppResult<PayslipDto> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_PAYSLIP))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("payslip")?;
    let current: PayslipStatus = get_status(&row, "status")?;
    let next = current.transition(target)?;

    let updated = sqlx::query(&format!(
        "UPDATE payslips SET status = ?1, {} = ?2 WHERE id = ?3 AND status = ?4",
        stamp_column
    ))
    .bind(next.as_str())
    .bind(now_utc())
    .bind(id.to_string())
    .bind(current.as_str())
    .execute(&state.db)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict("payslip status changed concurrently".into()));
    }

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_PAYSLIP))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    payslip_to_dto(&row)
}

/// draft -> available: the payslip becomes visible to the employee.
pub async fn publish_payslip(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let dto = move_payslip(&state, id, PayslipStatus::Available, "published_at").await?;
    tracing::info!(payslip_id = %id, "Payslip published");
    Ok(Json(dto))
}

/// available -> paid: payment has gone out.
pub async fn pay_payslip(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let dto = move_payslip(&state, id, PayslipStatus::Paid, "paid_at").await?;
    tracing::info!(payslip_id = %id, "Payslip marked paid");
    Ok(Json(dto))
}
