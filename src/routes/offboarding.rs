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
    middleware::validation::{page_params, validate_name, MAX_NAME_LEN},
    models::{ChecklistStatus, EmployeeStatus, OffboardingReason, TaskStatus},
    routes::helpers::{get_date, get_status, get_uuid, now_utc},
    state::AppState,
    types::{ChecklistDto, CompleteTaskRequest, CreateOffboardingRequest, TaskDto},
};

fn task_to_dto(r: &SqliteRow) -> AppResult<TaskDto> {
    Ok(TaskDto {
        id: get_uuid(r, "id")?,
        task_key: r.get("task_key"),
        label: r.get("label"),
        position: r.get("position"),
        status: get_status(r, "status")?,
        completed_by: r.get("completed_by"),
        completed_at: r.get("completed_at"),
    })
}

fn checklist_to_dto(r: &SqliteRow, tasks: Vec<TaskDto>) -> AppResult<ChecklistDto> {
    Ok(ChecklistDto {
        id: get_uuid(r, "id")?,
        employee_id: get_uuid(r, "employee_id")?,
        reason: r.get("reason"),
        exit_date: get_date(r, "exit_date")?,
        status: get_status(r, "status")?,
        completed_at: r.get("completed_at"),
        created_at: r.get("created_at"),
        tasks,
    })
}

const SELECT_CHECKLIST: &str = r#"SELECT id, employee_id, reason, exit_date, status, completed_at,
    created_at FROM offboarding_checklists"#;

const SELECT_TASKS: &str = r#"SELECT id, task_key, label, position, status, completed_by, completed_at
    FROM offboarding_tasks WHERE checklist_id = ?1 ORDER BY position"#;

async fn load_tasks(state: &AppState, checklist_id: Uuid) -> AppResult<Vec<TaskDto>> {
    let rows = sqlx::query(SELECT_TASKS)
        .bind(checklist_id.to_string())
        .fetch_all(&state.db)
        .await?;
    rows.iter().map(task_to_dto).collect()
}

/// Starts offboarding: seeds the configured task set and moves the
/// employee to `offboarding` in the same transaction.
pub async fn create_checklist(
    State(state): State<AppState>,
    Json(req): Json<CreateOffboardingRequest>,
) -> AppResult<impl IntoResponse> {
    let reason: OffboardingReason = req
        .reason
        .parse()
        .map_err(|_| AppError::ValidationError {
            field: "reason".into(),
            message: format!("unknown offboarding reason: {}", req.reason),
        })?;

    let employee = sqlx::query("SELECT status FROM employees WHERE id = ?1")
        .bind(req.employee_id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("employee")?;
    let current: EmployeeStatus = get_status(&employee, "status")?;
    let next = current.transition(EmployeeStatus::Offboarding)?;

    let open = sqlx::query(
        "SELECT 1 FROM offboarding_checklists WHERE employee_id = ?1 AND status = 'in_progress' LIMIT 1",
    )
    .bind(req.employee_id.to_string())
    .fetch_optional(&state.db)
    .await?;
    if open.is_some() {
        return Err(AppError::Conflict("employee already has an open offboarding checklist".into()));
    }

    let mut tx = state.db.begin().await?;

    let moved = sqlx::query("UPDATE employees SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4")
        .bind(next.as_str())
        .bind(now_utc())
        .bind(req.employee_id.to_string())
        .bind(current.as_str())
        .execute(&mut *tx)
        .await?;
    if moved.rows_affected() == 0 {
        return Err(AppError::Conflict("employee status changed concurrently".into()));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO offboarding_checklists (id, employee_id, reason, exit_date)
           VALUES (?1, ?2, ?3, ?4)"#,
    )
    .bind(id.to_string())
    .bind(req.employee_id.to_string())
    .bind(reason.as_str())
    .bind(req.exit_date.to_string())
    .execute(&mut *tx)
    .await?;

    for (position, (task_key, label)) in state.config.offboarding.default_tasks.iter().enumerate() {
        sqlx::query(
            r#"INSERT INTO offboarding_tasks (id, checklist_id, task_key, label, position)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(id.to_string())
        .bind(task_key)
        .bind(label)
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    state.metrics.inc_records_created();
    tracing::info!(checklist_id = %id, employee_id = %req.employee_id, reason = %reason, "Offboarding started");

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_CHECKLIST))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    let tasks = load_tasks(&state, id).await?;
    Ok((StatusCode::CREATED, Json(checklist_to_dto(&row, tasks)?)))
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_checklists(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_params(q.limit, q.offset, &state.config.payroll);

    let mut sql = format!("{} WHERE 1=1", SELECT_CHECKLIST);
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
        let parsed: ChecklistStatus = status
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unknown status filter: {}", status)))?;
        qx = qx.bind(parsed.as_str());
    }
    qx = qx.bind(limit).bind(offset);

    let rows = qx.fetch_all(&state.db).await?;
    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
        let id = get_uuid(row, "id")?;
        let tasks = load_tasks(&state, id).await?;
        items.push(checklist_to_dto(row, tasks)?);
    }
    Ok(Json(items))
}

pub async fn get_checklist(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_CHECKLIST))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("offboarding checklist")?;
    let tasks = load_tasks(&state, id).await?;
    Ok(Json(checklist_to_dto(&row, tasks)?))
}

/// Marks one task done. Completing the last open task completes the
/// checklist and exits the employee, all in one transaction.
pub async fn complete_task(
    State(state): State<AppState>,
    Path((checklist_id, task_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<CompleteTaskRequest>,
) -> AppResult<impl IntoResponse> {
    validate_name("completed_by", &req.completed_by, MAX_NAME_LEN)?;

    let checklist = sqlx::query(&format!("{} WHERE id = ?1", SELECT_CHECKLIST))
        .bind(checklist_id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("offboarding checklist")?;
    let checklist_status: ChecklistStatus = get_status(&checklist, "status")?;
    if checklist_status != ChecklistStatus::InProgress {
        return Err(AppError::Conflict("checklist is already completed".into()));
    }
    let employee_id = get_uuid(&checklist, "employee_id")?;

    let task = sqlx::query("SELECT status FROM offboarding_tasks WHERE id = ?1 AND checklist_id = ?2")
        .bind(task_id.to_string())
        .bind(checklist_id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("offboarding task")?;
    let current: TaskStatus = get_status(&task, "status")?;
    let next = current.transition(TaskStatus::Done)?;

    let mut tx = state.db.begin().await?;

    let updated = sqlx::query(
        r#"UPDATE offboarding_tasks SET status = ?1, completed_by = ?2, completed_at = ?3
           WHERE id = ?4 AND status = ?5"#,
    )
    .bind(next.as_str())
    .bind(req.completed_by.trim())
    .bind(now_utc())
    .bind(task_id.to_string())
    .bind(current.as_str())
    .execute(&mut *tx)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::Conflict("task was already completed".into()));
    }

    let remaining: i64 = sqlx::query(
        "SELECT COUNT(*) AS n FROM offboarding_tasks WHERE checklist_id = ?1 AND status = 'open'",
    )
    .bind(checklist_id.to_string())
    .fetch_one(&mut *tx)
    .await?
    .get("n");

    if remaining == 0 {
        let done = checklist_status.transition(ChecklistStatus::Completed)?;
        sqlx::query(
            r#"UPDATE offboarding_checklists SET status = ?1, completed_at = ?2
               WHERE id = ?3 AND status = ?4"#,
        )
        .bind(done.as_str())
        .bind(now_utc())
        .bind(checklist_id.to_string())
        .bind(checklist_status.as_str())
        .execute(&mut *tx)
        .await?;

        let emp = sqlx::query("SELECT status FROM employees WHERE id = ?1")
            .bind(employee_id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_not_found("employee")?;
        let emp_status: EmployeeStatus = get_status(&emp, "status")?;
        let exited = emp_status.transition(EmployeeStatus::Exited)?;
        sqlx::query("UPDATE employees SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4")
            .bind(exited.as_str())
            .bind(now_utc())
            .bind(employee_id.to_string())
            .bind(emp_status.as_str())
            .execute(&mut *tx)
            .await?;

        tracing::info!(checklist_id = %checklist_id, employee_id = %employee_id, "Offboarding completed, employee exited");
    }

    tx.commit().await?;

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_CHECKLIST))
        .bind(checklist_id.to_string())
        .fetch_one(&state.db)
        .await?;
    let tasks = load_tasks(&state, checklist_id).await?;
    Ok(Json(checklist_to_dto(&row, tasks)?))
}
