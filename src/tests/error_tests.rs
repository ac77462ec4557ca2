#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use serde_json::Value;

    use crate::error::{AppError, OptionExt};
    use crate::models::{BonusStatus, TransitionError, UnknownStatus};

    async fn response_parts(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_status_codes() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (AppError::Database("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::RateLimited { retry_after_seconds: 60 }, StatusCode::TOO_MANY_REQUESTS),
        ];
        for (err, expected) in cases {
            let (status, body) = response_parts(err).await;
            assert_eq!(status, expected);
            assert!(body["error"]["code"].is_string());
            assert!(body["timestamp"].is_string());
        }
    }

    #[tokio::test]
    async fn test_invalid_transition_payload() {
        let err: AppError = TransitionError::new("paid", "draft").into();
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
        assert_eq!(body["error"]["details"]["from"], "paid");
        assert_eq!(body["error"]["details"]["to"], "draft");
    }

    #[tokio::test]
    async fn test_validation_error_names_the_field() {
        let err = AppError::ValidationError { field: "email".into(), message: "is invalid".into() };
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"]["field"], "email");
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let err = AppError::Internal(anyhow::anyhow!("secret connection string"));
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"]["message"].as_str().unwrap().contains("secret"));
        assert!(body["error"]["details"]["error_id"].is_string());
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_conflict() {
        // Two inserts racing past the duplicate pre-check surface as a raw
        // sqlx UNIQUE violation; that must stay a 409, not a 500.
        let (_, state, _db) = crate::tests::support::setup_test_app().await;
        let insert = "INSERT INTO employees (id, staff_no, first_name, last_name, email, department, position, base_salary, hire_date) \
             VALUES (?1, ?2, 'Ada', 'Lovelace', ?3, 'Engineering', 'Engineer', '3000', '2024-01-15')";
        sqlx::query(insert)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind("E9001")
            .bind("e9001@example.com")
            .execute(&state.db)
            .await
            .unwrap();
        let dup = sqlx::query(insert)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind("E9001")
            .bind("e9001-other@example.com")
            .execute(&state.db)
            .await
            .unwrap_err();

        let err: AppError = dup.into();
        assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);
        let (status, body) = response_parts(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[test]
    fn test_unknown_status_maps_to_database_error() {
        let err: AppError =
            UnknownStatus { entity: "payslip", value: "weird".into() }.into();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn test_transition_error_round_trip() {
        let err = BonusStatus::Processed.transition(BonusStatus::Pending).unwrap_err();
        assert_eq!(err.from, "processed");
        assert_eq!(err.to, "pending");
        assert_eq!(err.to_string(), "invalid status transition: processed -> pending");
    }

    #[test]
    fn test_ok_or_not_found() {
        let some: Option<i32> = Some(1);
        assert_eq!(some.ok_or_not_found("thing").unwrap(), 1);
        let none: Option<i32> = None;
        let err = none.ok_or_not_found("payslip").unwrap_err();
        assert_eq!(err.to_string(), "Not found: payslip not found");
    }
}
