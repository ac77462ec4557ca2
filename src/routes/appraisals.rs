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
    middleware::validation::{page_params, validate_name, validate_text, MAX_NAME_LEN},
    models::{AppraisalStatus, Scores},
    routes::helpers::{get_decimal, get_status, get_uuid, now_utc},
    state::AppState,
    types::{AppraisalDto, CreateAppraisalRequest, UpdateAppraisalRequest},
};

fn appraisal_to_dto(r: &SqliteRow) -> AppResult<AppraisalDto> {
    Ok(AppraisalDto {
        id: get_uuid(r, "id")?,
        employee_id: get_uuid(r, "employee_id")?,
        period: r.get("period"),
        reviewer: r.get("reviewer"),
        performance: r.get("performance"),
        teamwork: r.get("teamwork"),
        reliability: r.get("reliability"),
        overall: get_decimal(r, "overall")?,
        comments: r.get("comments"),
        status: get_status(r, "status")?,
        submitted_at: r.get("submitted_at"),
        acknowledged_at: r.get("acknowledged_at"),
        created_at: r.get("created_at"),
    })
}

const SELECT_APPRAISAL: &str = r#"SELECT id, employee_id, period, reviewer, performance, teamwork,
    reliability, overall, comments, status, submitted_at, acknowledged_at, created_at FROM appraisals"#;

fn validate_scores(scores: &Scores) -> AppResult<()> {
    if let Some(field) = scores.out_of_range() {
        return Err(AppError::ValidationError {
            field: field.into(),
            message: format!("score must be between {} and {}", crate::models::SCORE_MIN, crate::models::SCORE_MAX),
        });
    }
    Ok(())
}

pub async fn create_appraisal(
    State(state): State<AppState>,
    Json(req): Json<CreateAppraisalRequest>,
) -> AppResult<impl IntoResponse> {
    let scores = Scores {
        performance: req.performance,
        teamwork: req.teamwork,
        reliability: req.reliability,
    };
    let check = || -> AppResult<()> {
        validate_name("period", &req.period, MAX_NAME_LEN)?;
        validate_name("reviewer", &req.reviewer, MAX_NAME_LEN)?;
        validate_scores(&scores)?;
        if let Some(comments) = &req.comments {
            validate_text("comments", comments)?;
        }
        Ok(())
    };
    if let Err(e) = check() {
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
        r#"INSERT INTO appraisals (id, employee_id, period, reviewer, performance, teamwork, reliability, overall, comments)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
    )
    .bind(id.to_string())
    .bind(req.employee_id.to_string())
    .bind(req.period.trim())
    .bind(req.reviewer.trim())
    .bind(req.performance)
    .bind(req.teamwork)
    .bind(req.reliability)
    .bind(scores.overall().to_string())
    .bind(req.comments.as_deref().map(str::trim))
    .execute(&state.db)
    .await?;

    state.metrics.inc_records_created();
    tracing::info!(appraisal_id = %id, employee_id = %req.employee_id, "Appraisal drafted");

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_APPRAISAL))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok((StatusCode::CREATED, Json(appraisal_to_dto(&row)?)))
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_appraisals(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_params(q.limit, q.offset, &state.config.payroll);

    let mut sql = format!("{} WHERE 1=1", SELECT_APPRAISAL);
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
        let parsed: AppraisalStatus = status
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unknown status filter: {}", status)))?;
        qx = qx.bind(parsed.as_str());
    }
    qx = qx.bind(limit).bind(offset);

    let rows = qx.fetch_all(&state.db).await?;
    let items = rows.iter().map(appraisal_to_dto).collect::<AppResult<Vec<_>>>()?;
    Ok(Json(items))
}

pub async fn get_appraisal(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_APPRAISAL))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("appraisal")?;
    Ok(Json(appraisal_to_dto(&row)?))
}

/// Scores and comments can change while the appraisal is a draft. The
/// overall rating is recomputed from the effective scores.
pub async fn update_appraisal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAppraisalRequest>,
) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_APPRAISAL))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("appraisal")?;
    let current: AppraisalStatus = get_status(&row, "status")?;
    if current != AppraisalStatus::Draft {
        return Err(AppError::Conflict("only draft appraisals can be edited".into()));
    }

    let scores = Scores {
        performance: req.performance.unwrap_or_else(|| row.get("performance")),
        teamwork: req.teamwork.unwrap_or_else(|| row.get("teamwork")),
        reliability: req.reliability.unwrap_or_else(|| row.get("reliability")),
    };
    let check = || -> AppResult<()> {
        validate_scores(&scores)?;
        if let Some(comments) = &req.comments {
            validate_text("comments", comments)?;
        }
        Ok(())
    };
    if let Err(e) = check() {
        state.metrics.inc_validation_failures();
        return Err(e);
    }

    let comments: Option<String> = match &req.comments {
        Some(c) => Some(c.trim().to_string()),
        None => row.get("comments"),
    };

    let updated = sqlx::query(
        r#"UPDATE appraisals SET performance = ?1, teamwork = ?2, reliability = ?3, overall = ?4, comments = ?5
           WHERE id = ?6 AND status = 'draft'"#,
    )
    .bind(scores.performance)
    .bind(scores.teamwork)
    .bind(scores.reliability)
    .bind(scores.overall().to_string())
    .bind(comments)
    .bind(id.to_string())
    .execute(&state.db)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict("appraisal was submitted concurrently".into()));
    }

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_APPRAISAL))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok(Json(appraisal_to_dto(&row)?))
}

async fn move_appraisal(
    state: &AppState,
    id: Uuid,
    target: AppraisalStatus,
    stamp_column: &str,
) -> AppResult<AppraisalDto> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_APPRAISAL))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("appraisal")?;
    let current: AppraisalStatus = get_status(&row, "status")?;
    let next = current.transition(target)?;

    let updated = sqlx::query(&format!(
        "UPDATE appraisals SET status = ?1, {} = ?2 WHERE id = ?3 AND status = ?4",
        stamp_column
    ))
    .bind(next.as_str())
    .bind(now_utc())
    .bind(id.to_string())
    .bind(current.as_str())
    .execute(&state.db)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict("appraisal status changed concurrently".into()));
    }

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_APPRAISAL))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    appraisal_to_dto(&row)
}

/// draft -> submitted: scores freeze.
pub async fn submit_appraisal(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let dto = move_appraisal(&state, id, AppraisalStatus::Submitted, "submitted_at").await?;
    tracing::info!(appraisal_id = %id, "Appraisal submitted");
    Ok(Json(dto))
}

/// submitted -> acknowledged by the employee.
pub async fn acknowledge_appraisal(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let dto = move_appraisal(&state, id, AppraisalStatus::Acknowledged, "acknowledged_at").await?;
    Ok(Json(dto))
}
