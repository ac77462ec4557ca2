use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row, Sqlite, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, OptionExt},
    middleware::ip::extract_ip_from_headers,
    middleware::validation::{page_params, validate_date_order, validate_name, validate_text, MAX_NAME_LEN},
    models::{BonusStatus, InitiationStatus, RefundStatus},
    routes::helpers::{get_date, get_decimal, get_status, get_uuid, now_utc},
    state::AppState,
    types::{CreateInitiationRequest, DecisionRequest, InitiationDto, RunDto},
};

fn initiation_to_dto(r: &SqliteRow) -> AppResult<InitiationDto> {
    Ok(InitiationDto {
        id: get_uuid(r, "id")?,
        period_start: get_date(r, "period_start")?,
        period_end: get_date(r, "period_end")?,
        initiated_by: r.get("initiated_by"),
        notes: r.get("notes"),
        status: get_status(r, "status")?,
        decided_by: r.get("decided_by"),
        decided_at: r.get("decided_at"),
        created_at: r.get("created_at"),
    })
}

fn run_to_dto(r: &SqliteRow) -> AppResult<RunDto> {
    Ok(RunDto {
        id: get_uuid(r, "id")?,
        initiation_id: get_uuid(r, "initiation_id")?,
        executed_at: r.get("executed_at"),
        employee_count: r.get("employee_count"),
        gross_total: get_decimal(r, "gross_total")?,
        bonus_total: get_decimal(r, "bonus_total")?,
        refund_total: get_decimal(r, "refund_total")?,
        net_total: get_decimal(r, "net_total")?,
    })
}

const SELECT_INITIATION: &str = r#"SELECT id, period_start, period_end, initiated_by, notes,
    status, decided_by, decided_at, created_at FROM payroll_initiations"#;

const SELECT_RUN: &str = r#"SELECT id, initiation_id, executed_at, employee_count,
    gross_total, bonus_total, refund_total, net_total FROM payroll_runs"#;

pub async fn create_initiation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateInitiationRequest>,
) -> AppResult<Response> {
    // Per-endpoint rate limit: "/payroll/initiations"
    let ip = extract_ip_from_headers(&headers, None);
    if let Err((status, body)) = state.rate_limiter.check_endpoint_limit("/payroll/initiations", ip).await {
        return Ok((status, body).into_response());
    }

    validate_name("initiated_by", &req.initiated_by, MAX_NAME_LEN)?;
    validate_date_order(req.period_start, req.period_end)?;
    if let Some(notes) = &req.notes {
        validate_text("notes", notes)?;
    }

    // An approved initiation's period is settled; a new one must not
    // overlap it. Pending and rejected initiations do not block.
    let overlap = sqlx::query(
        r#"SELECT 1 FROM payroll_initiations
           WHERE status = 'approved' AND period_start <= ?1 AND period_end >= ?2 LIMIT 1"#,
    )
    .bind(req.period_end.to_string())
    .bind(req.period_start.to_string())
    .fetch_optional(&state.db)
    .await?;
    if overlap.is_some() {
        return Err(AppError::Conflict("period overlaps an approved payroll initiation".into()));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO payroll_initiations (id, period_start, period_end, initiated_by, notes)
           VALUES (?1, ?2, ?3, ?4, ?5)"#,
    )
    .bind(id.to_string())
    .bind(req.period_start.to_string())
    .bind(req.period_end.to_string())
    .bind(req.initiated_by.trim())
    .bind(req.notes.as_deref().map(str::trim))
    .execute(&state.db)
    .await?;

    state.metrics.inc_records_created();
    tracing::info!(initiation_id = %id, period_start = %req.period_start, period_end = %req.period_end, "Payroll initiation created");

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_INITIATION))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok((StatusCode::CREATED, Json(initiation_to_dto(&row)?)).into_response())
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_initiations(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_params(q.limit, q.offset, &state.config.payroll);

    let mut sql = format!("{} WHERE 1=1", SELECT_INITIATION);
    let mut idx = 1;
    if q.status.is_some() {
        sql.push_str(&format!(" AND status = ?{}", idx));
        idx += 1;
    }
    sql.push_str(&format!(" ORDER BY created_at DESC LIMIT ?{} OFFSET ?{}", idx, idx + 1));

    let mut qx = sqlx::query(&sql);
    if let Some(status) = &q.status {
        let parsed: InitiationStatus = status
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unknown status filter: {}", status)))?;
        qx = qx.bind(parsed.as_str());
    }
    qx = qx.bind(limit).bind(offset);

    let rows = qx.fetch_all(&state.db).await?;
    let items = rows.iter().map(initiation_to_dto).collect::<AppResult<Vec<_>>>()?;
    Ok(Json(items))
}

pub async fn get_initiation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_INITIATION))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("payroll initiation")?;
    Ok(Json(initiation_to_dto(&row)?))
}

/// Approves a pending initiation and executes the payroll run in the same
/// transaction: one draft payslip per active employee, absorbing approved
/// signing bonuses and pending refunds exactly once.
pub async fn approve_initiation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    validate_name("decided_by", &req.decided_by, MAX_NAME_LEN)?;

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_INITIATION))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("payroll initiation")?;
    let current: InitiationStatus = get_status(&row, "status")?;
    let next = current.transition(InitiationStatus::Approved)?;
    let period_start: String = row.get("period_start");
    let period_end: String = row.get("period_end");

    let mut tx = state.db.begin().await?;

    // Creation only checks against initiations approved at that time; two
    // overlapping pending ones both pass it. The period has to be re-checked
    // here, before this one settles as approved.
    let overlap = sqlx::query(
        r#"SELECT 1 FROM payroll_initiations
           WHERE status = 'approved' AND id != ?1
             AND period_start <= ?2 AND period_end >= ?3 LIMIT 1"#,
    )
    .bind(id.to_string())
    .bind(&period_end)
    .bind(&period_start)
    .fetch_optional(&mut *tx)
    .await?;
    if overlap.is_some() {
        return Err(AppError::Conflict("period overlaps an approved payroll initiation".into()));
    }

    let updated = sqlx::query(
        r#"UPDATE payroll_initiations SET status = ?1, decided_by = ?2, decided_at = ?3
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
        return Err(AppError::Conflict("payroll initiation was already decided".into()));
    }

    let run_id = Uuid::new_v4();
    // Insert with zero totals first so the payslip FK has a target; the
    // real totals are written after the loop, still inside the transaction.
    sqlx::query(
        r#"INSERT INTO payroll_runs (id, initiation_id, employee_count, gross_total, bonus_total, refund_total, net_total)
           VALUES (?1, ?2, 0, '0', '0', '0', '0')"#,
    )
    .bind(run_id.to_string())
    .bind(id.to_string())
    .execute(&mut *tx)
    .await?;

    let summary =
        execute_run(&mut tx, run_id, &period_start, &period_end).await?;

    sqlx::query(
        r#"UPDATE payroll_runs SET employee_count = ?1, gross_total = ?2, bonus_total = ?3,
           refund_total = ?4, net_total = ?5 WHERE id = ?6"#,
    )
    .bind(summary.employee_count)
    .bind(summary.gross_total.to_string())
    .bind(summary.bonus_total.to_string())
    .bind(summary.refund_total.to_string())
    .bind(summary.net_total.to_string())
    .bind(run_id.to_string())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    state.metrics.inc_approvals();
    state.metrics.inc_payroll_runs();
    state.metrics.add_payslips(summary.employee_count as u64);
    state.metrics.add_bonuses_processed(summary.bonuses_processed);
    state.metrics.add_refunds_included(summary.refunds_included);
    tracing::info!(
        initiation_id = %id,
        run_id = %run_id,
        employees = summary.employee_count,
        gross_total = %summary.gross_total,
        "Payroll run executed"
    );

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_RUN))
        .bind(run_id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok((StatusCode::CREATED, Json(run_to_dto(&row)?)))
}

struct RunSummary {
    employee_count: i64,
    gross_total: Decimal,
    bonus_total: Decimal,
    refund_total: Decimal,
    net_total: Decimal,
    bonuses_processed: u64,
    refunds_included: u64,
}

async fn execute_run(
    tx: &mut Transaction<'_, Sqlite>,
    run_id: Uuid,
    period_start: &str,
    period_end: &str,
) -> AppResult<RunSummary> {
    let employees = sqlx::query("SELECT id, base_salary FROM employees WHERE status = 'active' ORDER BY staff_no")
        .fetch_all(&mut **tx)
        .await?;

    let mut summary = RunSummary {
        employee_count: 0,
        gross_total: Decimal::ZERO,
        bonus_total: Decimal::ZERO,
        refund_total: Decimal::ZERO,
        net_total: Decimal::ZERO,
        bonuses_processed: 0,
        refunds_included: 0,
    };

    for emp in &employees {
        let employee_id = get_uuid(emp, "id")?;
        let base = get_decimal(emp, "base_salary")?;

        let mut bonus_amount = Decimal::ZERO;
        let bonuses = sqlx::query(
            "SELECT id, amount FROM signing_bonuses WHERE employee_id = ?1 AND status = ?2",
        )
        .bind(employee_id.to_string())
        .bind(BonusStatus::Approved.as_str())
        .fetch_all(&mut **tx)
        .await?;
        for b in &bonuses {
            bonus_amount += get_decimal(b, "amount")?;
            // approved -> processed, processed_in_run set exactly once
            sqlx::query(
                r#"UPDATE signing_bonuses SET status = ?1, processed_in_run = ?2
                   WHERE id = ?3 AND status = ?4 AND processed_in_run IS NULL"#,
            )
            .bind(BonusStatus::Processed.as_str())
            .bind(run_id.to_string())
            .bind(get_uuid(b, "id")?.to_string())
            .bind(BonusStatus::Approved.as_str())
            .execute(&mut **tx)
            .await?;
            summary.bonuses_processed += 1;
        }

        let mut refund_amount = Decimal::ZERO;
        let refunds = sqlx::query(
            "SELECT id, amount FROM refunds WHERE employee_id = ?1 AND status = ?2",
        )
        .bind(employee_id.to_string())
        .bind(RefundStatus::PendingInclusion.as_str())
        .fetch_all(&mut **tx)
        .await?;
        for rf in &refunds {
            refund_amount += get_decimal(rf, "amount")?;
            sqlx::query(
                r#"UPDATE refunds SET status = ?1, included_in_run = ?2
                   WHERE id = ?3 AND status = ?4 AND included_in_run IS NULL"#,
            )
            .bind(RefundStatus::IncludedInPayroll.as_str())
            .bind(run_id.to_string())
            .bind(get_uuid(rf, "id")?.to_string())
            .bind(RefundStatus::PendingInclusion.as_str())
            .execute(&mut **tx)
            .await?;
            summary.refunds_included += 1;
        }

        let gross = base + bonus_amount + refund_amount;
        // No statutory deductions modeled; net equals gross for now.
        let net = gross;

        sqlx::query(
            r#"INSERT INTO payslips (id, run_id, employee_id, period_start, period_end,
               base_amount, bonus_amount, refund_amount, gross_amount, net_amount)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(run_id.to_string())
        .bind(employee_id.to_string())
        .bind(period_start)
        .bind(period_end)
        .bind(base.to_string())
        .bind(bonus_amount.to_string())
        .bind(refund_amount.to_string())
        .bind(gross.to_string())
        .bind(net.to_string())
        .execute(&mut **tx)
        .await?;

        summary.employee_count += 1;
        summary.gross_total += gross;
        summary.bonus_total += bonus_amount;
        summary.refund_total += refund_amount;
        summary.net_total += net;
    }

    Ok(summary)
}

pub async fn reject_initiation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DecisionRequest>,
) -> AppResult<impl IntoResponse> {
    validate_name("decided_by", &req.decided_by, MAX_NAME_LEN)?;

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_INITIATION))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("payroll initiation")?;
    let current: InitiationStatus = get_status(&row, "status")?;
    let next = current.transition(InitiationStatus::Rejected)?;

    let updated = sqlx::query(
        r#"UPDATE payroll_initiations SET status = ?1, decided_by = ?2, decided_at = ?3
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
        return Err(AppError::Conflict("payroll initiation was already decided".into()));
    }

    state.metrics.inc_rejections();

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_INITIATION))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok(Json(initiation_to_dto(&row)?))
}

pub async fn list_runs(State(state): State<AppState>, Query(q): Query<ListQuery>) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_params(q.limit, q.offset, &state.config.payroll);

    let rows = sqlx::query(&format!("{} ORDER BY executed_at DESC LIMIT ?1 OFFSET ?2", SELECT_RUN))
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.db)
        .await?;
    let items = rows.iter().map(run_to_dto).collect::<AppResult<Vec<_>>>()?;
    Ok(Json(items))
}

pub async fn get_run(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_RUN))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("payroll run")?;
    Ok(Json(run_to_dto(&row)?))
}
