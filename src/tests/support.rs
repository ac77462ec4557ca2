//! Shared scaffolding for the HTTP tests: a router over a temporary SQLite
//! database and small request helpers.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt; // for .collect()
use serde_json::{json, Value};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use crate::config::{
    AppConfig, DatabaseConfig, OffboardingConfig, PayrollConfig, ServerConfig,
};
use crate::router::api_router;
use crate::state::AppState;

pub fn test_config(db_url: String) -> AppConfig {
    AppConfig {
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 8085 },
        database: DatabaseConfig { url: db_url },
        payroll: PayrollConfig {
            currency: "EUR".to_string(),
            default_page_size: 100,
            max_page_size: 500,
            max_amount: "1000000000".to_string(),
        },
        offboarding: OffboardingConfig {
            default_tasks: vec![
                ("return_equipment".to_string(), "Return company equipment".to_string()),
                ("revoke_access".to_string(), "Revoke system access".to_string()),
            ],
        },
        security: None,
    }
}

/// Boots a full app over a fresh temporary database. The `NamedTempFile`
/// must be kept alive for the duration of the test.
pub async fn setup_test_app() -> (axum::Router, AppState, NamedTempFile) {
    let temp_db = NamedTempFile::new().unwrap();
    let db_url = format!("sqlite:{}", temp_db.path().display());

    sqlx::Sqlite::create_database(&db_url).await.unwrap();

    let pool = SqlitePoolOptions::new().max_connections(1).connect(&db_url).await.unwrap();

    crate::db::init_db(&pool).await.unwrap();

    let state = AppState::new(pool, test_config(db_url));
    let app = api_router(state.clone());

    (app, state, temp_db)
}

/// Sends one request and returns (status, parsed JSON body). Non-JSON or
/// empty bodies come back as `Value::Null`.
pub async fn request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            builder.body(Body::from(v.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Registers an employee and returns the response body. Panics if the
/// registration is not accepted.
pub async fn register_employee(app: &axum::Router, staff_no: &str, base_salary: &str) -> Value {
    let (status, body) = request(
        app,
        "POST",
        "/register",
        Some(json!({
            "staff_no": staff_no,
            "first_name": "Mara",
            "last_name": "Weber",
            "email": format!("{}@example.com", staff_no),
            "department": "Engineering",
            "position": "Developer",
            "base_salary": base_salary,
            "hire_date": "2024-01-15",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", body);
    body
}
