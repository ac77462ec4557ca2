#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::tests::support::{register_employee, request, setup_test_app};

    async fn approve_bonus(app: &axum::Router, employee_id: &str, amount: &str) -> String {
        let (status, bonus) = request(
            app,
            "POST",
            "/bonuses",
            Some(json!({
                "employee_id": employee_id,
                "amount": amount,
                "reason": "signing bonus",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = bonus["id"].as_str().unwrap().to_string();
        let (status, _) = request(
            app,
            "POST",
            &format!("/bonuses/{}/approve", id),
            Some(json!({ "decided_by": "finance.lead" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        id
    }

    async fn create_initiation(app: &axum::Router, start: &str, end: &str) -> Value {
        let (status, body) = request(
            app,
            "POST",
            "/payroll/initiations",
            Some(json!({
                "period_start": start,
                "period_end": end,
                "initiated_by": "payroll.clerk",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "initiation failed: {}", body);
        body
    }

    #[tokio::test]
    async fn test_approved_initiation_executes_run() {
        let (app, _, _db) = setup_test_app().await;

        let emp_a = register_employee(&app, "P1001", "3000").await;
        let emp_b = register_employee(&app, "P1002", "4000").await;
        let emp_a_id = emp_a["id"].as_str().unwrap().to_string();
        approve_bonus(&app, &emp_a_id, "500").await;
        let _ = emp_b;

        let initiation = create_initiation(&app, "2026-01-01", "2026-01-31").await;
        assert_eq!(initiation["status"], "pending_review");
        let initiation_id = initiation["id"].as_str().unwrap().to_string();

        let (status, run) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/approve", initiation_id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "approval failed: {}", run);
        assert_eq!(run["employee_count"], 2);
        assert_eq!(run["gross_total"], "7500");
        assert_eq!(run["bonus_total"], "500");
        assert_eq!(run["refund_total"], "0");
        let run_id = run["id"].as_str().unwrap().to_string();

        // The initiation is settled.
        let (_, initiation) =
            request(&app, "GET", &format!("/payroll/initiations/{}", initiation_id), None).await;
        assert_eq!(initiation["status"], "approved");

        // One draft payslip per active employee.
        let (status, payslips) =
            request(&app, "GET", &format!("/payslips?run_id={}", run_id), None).await;
        assert_eq!(status, StatusCode::OK);
        let payslips = payslips.as_array().unwrap().clone();
        assert_eq!(payslips.len(), 2);
        assert!(payslips.iter().all(|p| p["status"] == "draft"));

        // The bonus was absorbed exactly once.
        let (_, bonuses) =
            request(&app, "GET", &format!("/bonuses?employee_id={}", emp_a_id), None).await;
        let bonus = &bonuses.as_array().unwrap()[0];
        assert_eq!(bonus["status"], "processed");
        assert_eq!(bonus["processed_in_run"], run_id.as_str());

        let slip_a = payslips.iter().find(|p| p["employee_id"] == emp_a_id.as_str()).unwrap();
        assert_eq!(slip_a["base_amount"], "3000");
        assert_eq!(slip_a["bonus_amount"], "500");
        assert_eq!(slip_a["gross_amount"], "3500");
    }

    #[tokio::test]
    async fn test_initiation_cannot_be_decided_twice() {
        let (app, _, _db) = setup_test_app().await;

        register_employee(&app, "P2001", "3000").await;
        let initiation = create_initiation(&app, "2026-02-01", "2026-02-28").await;
        let id = initiation["id"].as_str().unwrap().to_string();

        let (status, _) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/approve", id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/approve", id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn test_overlapping_period_is_blocked_after_approval() {
        let (app, _, _db) = setup_test_app().await;

        register_employee(&app, "P3001", "3000").await;
        let first = create_initiation(&app, "2026-03-01", "2026-03-31").await;
        let first_id = first["id"].as_str().unwrap().to_string();

        // Pending initiations do not block.
        let second = create_initiation(&app, "2026-03-15", "2026-04-14").await;
        let second_id = second["id"].as_str().unwrap().to_string();
        let (status, _) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/reject", second_id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/approve", first_id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        // Approved periods do.
        let (status, body) = request(
            &app,
            "POST",
            "/payroll/initiations",
            Some(json!({
                "period_start": "2026-03-15",
                "period_end": "2026-04-14",
                "initiated_by": "payroll.clerk",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT, "expected overlap conflict: {}", body);

        // Adjacent period is fine.
        create_initiation(&app, "2026-04-01", "2026-04-30").await;
    }

    #[tokio::test]
    async fn test_overlapping_pending_initiations_cannot_both_be_approved() {
        let (app, _, _db) = setup_test_app().await;

        register_employee(&app, "P3101", "5000").await;

        // Both pass the creation check while neither is approved yet.
        let first = create_initiation(&app, "2026-09-01", "2026-09-30").await;
        let second = create_initiation(&app, "2026-09-15", "2026-10-14").await;
        let first_id = first["id"].as_str().unwrap().to_string();
        let second_id = second["id"].as_str().unwrap().to_string();

        let (status, _) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/approve", first_id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        // The second approval would pay the same period twice.
        let (status, body) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/approve", second_id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT, "expected overlap conflict: {}", body);
        assert_eq!(body["error"]["code"], "CONFLICT");

        // No second run was executed and the second initiation stays pending.
        let (_, runs) = request(&app, "GET", "/payroll/runs", None).await;
        assert_eq!(runs.as_array().unwrap().len(), 1);
        let (_, second) =
            request(&app, "GET", &format!("/payroll/initiations/{}", second_id), None).await;
        assert_eq!(second["status"], "pending_review");

        // It can still be rejected afterwards.
        let (status, _) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/reject", second_id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_initiation_rejects_reversed_period() {
        let (app, _, _db) = setup_test_app().await;

        let (status, _) = request(
            &app,
            "POST",
            "/payroll/initiations",
            Some(json!({
                "period_start": "2026-05-31",
                "period_end": "2026-05-01",
                "initiated_by": "payroll.clerk",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_run_skips_non_active_employees() {
        let (app, _, _db) = setup_test_app().await;

        register_employee(&app, "P4001", "3000").await;
        let leaving = register_employee(&app, "P4002", "4000").await;
        let leaving_id = leaving["id"].as_str().unwrap().to_string();

        let (status, _) = request(
            &app,
            "POST",
            "/offboarding",
            Some(json!({
                "employee_id": leaving_id,
                "reason": "resignation",
                "exit_date": "2026-06-30",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let initiation = create_initiation(&app, "2026-06-01", "2026-06-30").await;
        let id = initiation["id"].as_str().unwrap().to_string();
        let (status, run) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/approve", id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(run["employee_count"], 1);
        assert_eq!(run["gross_total"], "3000");
    }

    #[tokio::test]
    async fn test_payslip_publish_and_pay() {
        let (app, _, _db) = setup_test_app().await;

        register_employee(&app, "P5001", "3000").await;
        let initiation = create_initiation(&app, "2026-07-01", "2026-07-31").await;
        let id = initiation["id"].as_str().unwrap().to_string();
        let (_, run) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/approve", id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        let run_id = run["id"].as_str().unwrap().to_string();

        let (_, payslips) =
            request(&app, "GET", &format!("/payslips?run_id={}", run_id), None).await;
        let payslip_id = payslips.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();

        // Paying a draft is not allowed.
        let (status, body) =
            request(&app, "POST", &format!("/payslips/{}/pay", payslip_id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

        let (status, published) =
            request(&app, "POST", &format!("/payslips/{}/publish", payslip_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(published["status"], "available");
        assert!(published["published_at"].is_string());

        let (status, paid) =
            request(&app, "POST", &format!("/payslips/{}/pay", payslip_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["status"], "paid");
        assert!(paid["paid_at"].is_string());

        // Publishing twice is refused.
        let (status, _) =
            request(&app, "POST", &format!("/payslips/{}/publish", payslip_id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_runs_are_listable() {
        let (app, _, _db) = setup_test_app().await;

        register_employee(&app, "P6001", "3000").await;
        let initiation = create_initiation(&app, "2026-08-01", "2026-08-31").await;
        let id = initiation["id"].as_str().unwrap().to_string();
        let (_, run) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/approve", id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        let run_id = run["id"].as_str().unwrap().to_string();

        let (status, runs) = request(&app, "GET", "/payroll/runs", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(runs.as_array().unwrap().len(), 1);

        let (status, fetched) =
            request(&app, "GET", &format!("/payroll/runs/{}", run_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["initiation_id"], id.as_str());
    }
}
