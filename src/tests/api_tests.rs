#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::tests::support::{register_employee, request, setup_test_app};

    #[tokio::test]
    async fn test_register_and_fetch_employee() {
        let (app, _, _db) = setup_test_app().await;

        let body = register_employee(&app, "E1001", "3000").await;
        assert_eq!(body["staff_no"], "E1001");
        assert_eq!(body["status"], "active");
        assert_eq!(body["base_salary"], "3000");
        let id = body["id"].as_str().unwrap().to_string();

        let (status, fetched) = request(&app, "GET", &format!("/register/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["id"], id.as_str());

        let (status, list) = request(&app, "GET", "/register", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_email() {
        let (app, state, _db) = setup_test_app().await;

        let (status, body) = request(
            &app,
            "POST",
            "/register",
            Some(json!({
                "staff_no": "E1002",
                "first_name": "Jonas",
                "last_name": "Brandt",
                "email": "not-an-email",
                "department": "Sales",
                "position": "Rep",
                "base_salary": "2500",
                "hire_date": "2024-02-01",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(state.metrics.get_snapshot().validation_failures, 1);
    }

    #[tokio::test]
    async fn test_register_duplicate_staff_no_conflicts() {
        let (app, _, _db) = setup_test_app().await;

        register_employee(&app, "E1003", "3000").await;
        let (status, body) = request(
            &app,
            "POST",
            "/register",
            Some(json!({
                "staff_no": "E1003",
                "first_name": "Other",
                "last_name": "Person",
                "email": "other@example.com",
                "department": "Sales",
                "position": "Rep",
                "base_salary": "2500",
                "hire_date": "2024-02-01",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_employee_list_rejects_unknown_status_filter() {
        let (app, _, _db) = setup_test_app().await;

        let (status, _) = request(&app, "GET", "/register?status=fired", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_unknown_employee_is_404() {
        let (app, _, _db) = setup_test_app().await;

        let (status, body) = request(
            &app,
            "GET",
            "/register/00000000-0000-0000-0000-000000000000",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_change_request_approval_applies_field() {
        let (app, _, _db) = setup_test_app().await;

        let employee = register_employee(&app, "E2001", "3000").await;
        let employee_id = employee["id"].as_str().unwrap().to_string();

        let (status, cr) = request(
            &app,
            "POST",
            "/change-requests",
            Some(json!({
                "employee_id": employee_id,
                "field": "base_salary",
                "new_value": "3500",
                "reason": "annual adjustment",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(cr["status"], "pending");
        let cr_id = cr["id"].as_str().unwrap().to_string();

        let (status, approved) = request(
            &app,
            "POST",
            &format!("/change-requests/{}/approve", cr_id),
            Some(json!({ "decided_by": "hr.lead" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["status"], "approved");

        // The new value is live on the employee record.
        let (_, emp) = request(&app, "GET", &format!("/register/{}", employee_id), None).await;
        assert_eq!(emp["base_salary"], "3500");

        // A second decision on the same request is refused.
        let (status, body) = request(
            &app,
            "POST",
            &format!("/change-requests/{}/reject", cr_id),
            Some(json!({ "decided_by": "hr.lead" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn test_change_request_rejection_leaves_employee_untouched() {
        let (app, _, _db) = setup_test_app().await;

        let employee = register_employee(&app, "E2002", "3000").await;
        let employee_id = employee["id"].as_str().unwrap().to_string();

        let (_, cr) = request(
            &app,
            "POST",
            "/change-requests",
            Some(json!({
                "employee_id": employee_id,
                "field": "department",
                "new_value": "Operations",
                "reason": "reorg",
            })),
        )
        .await;
        let cr_id = cr["id"].as_str().unwrap().to_string();

        let (status, rejected) = request(
            &app,
            "POST",
            &format!("/change-requests/{}/reject", cr_id),
            Some(json!({ "decided_by": "hr.lead" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rejected["status"], "rejected");

        let (_, emp) = request(&app, "GET", &format!("/register/{}", employee_id), None).await;
        assert_eq!(emp["department"], "Engineering");
    }

    #[tokio::test]
    async fn test_change_request_rejects_invalid_salary_value() {
        let (app, _, _db) = setup_test_app().await;

        let employee = register_employee(&app, "E2003", "3000").await;
        let employee_id = employee["id"].as_str().unwrap().to_string();

        let (status, _) = request(
            &app,
            "POST",
            "/change-requests",
            Some(json!({
                "employee_id": employee_id,
                "field": "base_salary",
                "new_value": "not a number",
                "reason": "typo",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_bonus_lifecycle() {
        let (app, _, _db) = setup_test_app().await;

        let employee = register_employee(&app, "E3001", "3000").await;
        let employee_id = employee["id"].as_str().unwrap().to_string();

        let (status, bonus) = request(
            &app,
            "POST",
            "/bonuses",
            Some(json!({
                "employee_id": employee_id,
                "amount": "750.50",
                "reason": "signing bonus",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(bonus["status"], "pending");
        let bonus_id = bonus["id"].as_str().unwrap().to_string();

        let (status, approved) = request(
            &app,
            "POST",
            &format!("/bonuses/{}/approve", bonus_id),
            Some(json!({ "decided_by": "finance.lead" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["status"], "approved");

        // approved -> rejected is not a legal edge
        let (status, body) = request(
            &app,
            "POST",
            &format!("/bonuses/{}/reject", bonus_id),
            Some(json!({ "decided_by": "finance.lead" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn test_decided_by_shares_the_name_length_bound() {
        let (app, _, _db) = setup_test_app().await;

        let employee = register_employee(&app, "E3005", "3000").await;
        let employee_id = employee["id"].as_str().unwrap().to_string();

        let (_, bonus) = request(
            &app,
            "POST",
            "/bonuses",
            Some(json!({
                "employee_id": employee_id,
                "amount": "100",
                "reason": "signing bonus",
            })),
        )
        .await;
        let bonus_id = bonus["id"].as_str().unwrap().to_string();

        // 81 chars is over the name-field bound.
        let (status, body) = request(
            &app,
            "POST",
            &format!("/bonuses/{}/approve", bonus_id),
            Some(json!({ "decided_by": "x".repeat(81) })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"]["field"], "decided_by");

        // Exactly 80 is accepted.
        let (status, _) = request(
            &app,
            "POST",
            &format!("/bonuses/{}/approve", bonus_id),
            Some(json!({ "decided_by": "x".repeat(80) })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bonus_rejects_zero_amount() {
        let (app, _, _db) = setup_test_app().await;

        let employee = register_employee(&app, "E3002", "3000").await;
        let employee_id = employee["id"].as_str().unwrap().to_string();

        let (status, _) = request(
            &app,
            "POST",
            "/bonuses",
            Some(json!({
                "employee_id": employee_id,
                "amount": "0",
                "reason": "nothing",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_employee_blocked_by_dependents() {
        let (app, _, _db) = setup_test_app().await;

        let employee = register_employee(&app, "E4001", "3000").await;
        let employee_id = employee["id"].as_str().unwrap().to_string();

        let (_, _) = request(
            &app,
            "POST",
            "/bonuses",
            Some(json!({
                "employee_id": employee_id,
                "amount": "100",
                "reason": "signing bonus",
            })),
        )
        .await;

        let (status, body) =
            request(&app, "DELETE", &format!("/register/{}", employee_id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_delete_unreferenced_employee() {
        let (app, _, _db) = setup_test_app().await;

        let employee = register_employee(&app, "E4002", "3000").await;
        let employee_id = employee["id"].as_str().unwrap().to_string();

        let (status, _) =
            request(&app, "DELETE", &format!("/register/{}", employee_id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = request(&app, "GET", &format!("/register/{}", employee_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
