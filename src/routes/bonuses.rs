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
    models::BonusStatus,
    routes::helpers::{get_decimal, get_opt_uuid, get_status, get_uuid, now_utc},
    state::AppState,
    types::{BonusDto, CreateBonusRequest, DecisionRequest},
};

fn row_to_dto(r: &SqliteRow) -> AppResult<BonusDto> {
    Ok(BonusDto {
        id: get_uuid(r, "id")?,
        employee_id: get_uuid(r, "employee_id")?,
        amount: get_decimal(r, "amount")?,
        reason: r.get("reason"),
        status: get_status(r, "status")?,
        decided_by: r.get("decided_by"),
        decided_at: r.get("decided_at"),
        processed_in_run: get_opt_uuid(r, "processed_in_run")?,
        created_at: r.get("created_at"),
    })
}

const SELECT_BONUS: &str = r#"SELECT id, employee_id, amount, reason, status,
    decided_by, decided_at, processed_in_run, created_at FROM signing_bonuses"#;

pub async fn create_bonus(
    State(state): State<AppState>,
    Json(req): Json<CreateBonusRequest>,
) -> AppResult<impl IntoResponse> {
    if let Err(e) = validate_amount("amount", req.amount, &state.config.payroll, true)
        .and_then(|_| validate_text("reason", &req.reason))
    {
        state.metrics.inc_validation_failures();
        return Err(e);
    }

    let employee = sqlx::query("SELECT 1 FROM employees WHERE id = ?1")
        .bind(req.employee_id.to_string())
        .fetch_optional(&state.db)
        .await?;
    employee.ok_or_not_found("employee")?;

    let id = Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO signing_bonuses (id, employee_id, amount, reason)
           VALUES (?1, ?2, ?3, ?4)"#,
    )
    .bind(id.to_string())
    .bind(req.employee_id.to_string())
    .bind(req.amount.to_string())
    .bind(req.reason.trim())
    .execute(&state.db)
    .await?;

    state.metrics.inc_records_created();

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_BONUS))
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

pub async fn list_bonuses(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_params(q.limit, q.offset, &state.config.payroll);

    let mut sql = format!("{} WHERE 1=1", SELECT_BONUS);
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
        let parsed: BonusStatus = status
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unknown status filter: {}", status)))?;
        qx = qx.bind(parsed.as_str());
    }
    qx = qx.bind(limit).bind(offset);

    let rows = qx.fetch_all(&state.db).await?;
    let items = rows.iter().map(row_to_dto).collect::<AppResult<Vec<_>>>()?;
    Ok(Json(items))
}

pub async fn get_bonus(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_BONUS))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("signing bonus")?;
    Ok(Json(row_to_dto(&row)?))
}

async fn decide_bonus(
    state: &AppState,
    id: Uuid,
    decided_by: &str,
    target: BonusStatus,
) -> AppResult<BonusDto> {
    validate_name("decided_by", decided_by, MAX_NAME_LEN)?;

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_BONUS))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("signing bonus")?;
    let current: BonusStatus = get_status(&row, "status")?;
    let next = current.transition(target)?;

    let updated = sqlx::query(
        r#"UPDATE signing_bonuses SET status = ?1, decided_by = ?2, decided_at = ?3
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
        return Err(AppError::Conflict("signing bonus was already decided".into()));
    }

    match target {
        BonusStatus::Approved => state.metrics.inc_approvals(),
        BonusStatus::Rejected => state.metrics.inc_rejections(),
        _ => {}
    }

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_BONUS))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    row_to_dto(&row)
}

pub async fn approve_bonus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(decide_bonus(&state, id, &req.decided_by, BonusStatus::Approved).await?))
}

pub async fn reject_bonus(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(decide_bonus(&state, id, &req.decided_by, BonusStatus::Rejected).await?))
}
