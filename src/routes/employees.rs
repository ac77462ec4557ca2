use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, OptionExt},
    middleware::ip::extract_ip_from_headers,
    middleware::validation::{
        page_params, validate_amount, validate_email, validate_name, MAX_NAME_LEN,
    },
    routes::helpers::{get_date, get_decimal, get_status, get_uuid},
    state::AppState,
    types::{CreateEmployeeRequest, EmployeeDto},
};

fn row_to_dto(r: &SqliteRow) -> AppResult<EmployeeDto> {
    Ok(EmployeeDto {
        id: get_uuid(r, "id")?,
        staff_no: r.get("staff_no"),
        first_name: r.get("first_name"),
        last_name: r.get("last_name"),
        email: r.get("email"),
        department: r.get("department"),
        position: r.get("position"),
        base_salary: get_decimal(r, "base_salary")?,
        hire_date: get_date(r, "hire_date")?,
        status: get_status(r, "status")?,
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

const SELECT_EMPLOYEE: &str = r#"SELECT id, staff_no, first_name, last_name, email, department,
    position, base_salary, hire_date, status, created_at, updated_at FROM employees"#;

pub async fn register_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateEmployeeRequest>,
) -> AppResult<Response> {
    // Per-endpoint rate limit: "/register"
    let ip = extract_ip_from_headers(&headers, None);
    if let Err((status, body)) = state.rate_limiter.check_endpoint_limit("/register", ip).await {
        return Ok((status, body).into_response());
    }

    let validated = (|| {
        validate_name("staff_no", &req.staff_no, MAX_NAME_LEN)?;
        validate_name("first_name", &req.first_name, MAX_NAME_LEN)?;
        validate_name("last_name", &req.last_name, MAX_NAME_LEN)?;
        validate_email(&req.email)?;
        validate_name("department", &req.department, MAX_NAME_LEN)?;
        validate_name("position", &req.position, MAX_NAME_LEN)?;
        validate_amount("base_salary", req.base_salary, &state.config.payroll, true)
    })();
    if let Err(e) = validated {
        state.metrics.inc_validation_failures();
        return Err(e);
    }

    let staff_no = req.staff_no.trim();
    let email = req.email.trim();

    let taken = sqlx::query("SELECT 1 FROM employees WHERE staff_no = ?1 OR email = ?2 LIMIT 1")
        .bind(staff_no)
        .bind(email)
        .fetch_optional(&state.db)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict("staff_no or email is already registered".into()));
    }

    let id = Uuid::new_v4();
    sqlx::query(
        r#"INSERT INTO employees (id, staff_no, first_name, last_name, email, department, position, base_salary, hire_date)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
    )
    .bind(id.to_string())
    .bind(staff_no)
    .bind(req.first_name.trim())
    .bind(req.last_name.trim())
    .bind(email)
    .bind(req.department.trim())
    .bind(req.position.trim())
    .bind(req.base_salary.to_string())
    .bind(req.hire_date.to_string())
    .execute(&state.db)
    .await?;

    state.metrics.inc_records_created();
    tracing::info!(employee_id = %id, staff_no = %staff_no, "Employee registered");

    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_EMPLOYEE))
        .bind(id.to_string())
        .fetch_one(&state.db)
        .await?;
    Ok((StatusCode::CREATED, Json(row_to_dto(&row)?)).into_response())
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ListEmployeesQuery {
    pub status: Option<String>,
    pub department: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_employees(
    State(state): State<AppState>,
    Query(q): Query<ListEmployeesQuery>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_params(q.limit, q.offset, &state.config.payroll);

    let mut sql = format!("{} WHERE 1=1", SELECT_EMPLOYEE);
    let mut idx = 1;
    if q.status.is_some() {
        sql.push_str(&format!(" AND status = ?{}", idx));
        idx += 1;
    }
    if q.department.is_some() {
        sql.push_str(&format!(" AND department = ?{}", idx));
        idx += 1;
    }
    sql.push_str(&format!(" ORDER BY staff_no ASC LIMIT ?{} OFFSET ?{}", idx, idx + 1));

    let mut qx = sqlx::query(&sql);
    if let Some(status) = &q.status {
        // Reject unknown status filters up front instead of returning an empty list
        let parsed: crate::models::EmployeeStatus = status
            .parse()
            .map_err(|_| AppError::BadRequest(format!("unknown status filter: {}", status)))?;
        qx = qx.bind(parsed.as_str());
    }
    if let Some(dep) = &q.department {
        qx = qx.bind(dep.clone());
    }
    qx = qx.bind(limit).bind(offset);

    let rows = qx.fetch_all(&state.db).await?;
    let items = rows.iter().map(row_to_dto).collect::<AppResult<Vec<_>>>()?;
    Ok(Json(items))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let row = sqlx::query(&format!("{} WHERE id = ?1", SELECT_EMPLOYEE))
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("employee")?;
    Ok(Json(row_to_dto(&row)?))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let exists = sqlx::query("SELECT 1 FROM employees WHERE id = ?1")
        .bind(id.to_string())
        .fetch_optional(&state.db)
        .await?;
    exists.ok_or_not_found("employee")?;

    // Payroll and workflow history must stay reconstructible, so a
    // referenced employee cannot be deleted.
    for table in [
        "payslips",
        "change_requests",
        "signing_bonuses",
        "disputes",
        "refunds",
        "leave_requests",
        "appraisals",
        "offboarding_checklists",
    ] {
        let referenced = sqlx::query(&format!("SELECT 1 FROM {} WHERE employee_id = ?1 LIMIT 1", table))
            .bind(id.to_string())
            .fetch_optional(&state.db)
            .await?;
        if referenced.is_some() {
            return Err(AppError::Conflict(format!(
                "employee has {} records and cannot be deleted",
                table.replace('_', " ")
            )));
        }
    }

    sqlx::query("DELETE FROM employees WHERE id = ?1").bind(id.to_string()).execute(&state.db).await?;
    tracing::info!(employee_id = %id, "Employee record deleted");
    Ok(StatusCode::NO_CONTENT)
}
