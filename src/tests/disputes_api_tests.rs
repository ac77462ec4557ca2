#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::tests::support::{register_employee, request, setup_test_app};

    /// Runs payroll for one employee and returns (employee_id, paid payslip id).
    async fn paid_payslip(app: &axum::Router, staff_no: &str, start: &str, end: &str) -> (String, String) {
        let employee = register_employee(app, staff_no, "3000").await;
        let employee_id = employee["id"].as_str().unwrap().to_string();

        let (status, initiation) = request(
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
        assert_eq!(status, StatusCode::CREATED);
        let initiation_id = initiation["id"].as_str().unwrap().to_string();

        let (status, run) = request(
            app,
            "POST",
            &format!("/payroll/initiations/{}/approve", initiation_id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let run_id = run["id"].as_str().unwrap().to_string();

        let (_, payslips) = request(app, "GET", &format!("/payslips?run_id={}", run_id), None).await;
        let payslip_id = payslips.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();

        let (status, _) = request(app, "POST", &format!("/payslips/{}/publish", payslip_id), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = request(app, "POST", &format!("/payslips/{}/pay", payslip_id), None).await;
        assert_eq!(status, StatusCode::OK);

        (employee_id, payslip_id)
    }

    async fn payslip_status(app: &axum::Router, id: &str) -> Value {
        let (status, body) = request(app, "GET", &format!("/payslips/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        body["status"].clone()
    }

    #[tokio::test]
    async fn test_payroll_dispute_full_chain() {
        let (app, _, _db) = setup_test_app().await;
        let (employee_id, payslip_id) = paid_payslip(&app, "D1001", "2026-01-01", "2026-01-31").await;

        let (status, dispute) = request(
            &app,
            "POST",
            "/disputes",
            Some(json!({
                "kind": "payroll_dispute",
                "employee_id": employee_id,
                "payslip_id": payslip_id,
                "amount": "150",
                "description": "overtime missing from January payslip",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "dispute failed: {}", dispute);
        assert_eq!(dispute["status"], "submitted");
        let dispute_id = dispute["id"].as_str().unwrap().to_string();
        assert_eq!(payslip_status(&app, &payslip_id).await, "disputed");

        // Manager cannot decide before the specialist.
        let (status, _) = request(
            &app,
            "POST",
            &format!("/disputes/{}/approve-manager", dispute_id),
            Some(json!({ "decided_by": "hr.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = request(
            &app,
            "POST",
            &format!("/disputes/{}/approve-specialist", dispute_id),
            Some(json!({ "decided_by": "payroll.specialist" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "approved_by_specialist");
        assert_eq!(body["specialist_decided_by"], "payroll.specialist");

        let (status, body) = request(
            &app,
            "POST",
            &format!("/disputes/{}/approve-manager", dispute_id),
            Some(json!({ "decided_by": "hr.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "approved_by_manager");
        assert_eq!(payslip_status(&app, &payslip_id).await, "refund_scheduled");

        // The payout is scheduled as a pending refund.
        let (_, refunds) =
            request(&app, "GET", &format!("/refunds?employee_id={}", employee_id), None).await;
        let refunds = refunds.as_array().unwrap();
        assert_eq!(refunds.len(), 1);
        assert_eq!(refunds[0]["status"], "pending_inclusion");
        assert_eq!(refunds[0]["amount"], "150");
        assert_eq!(refunds[0]["payslip_id"], payslip_id.as_str());
        assert_eq!(refunds[0]["dispute_id"], dispute_id.as_str());

        let (status, closed) =
            request(&app, "POST", &format!("/disputes/{}/close", dispute_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(closed["status"], "closed");
        assert!(closed["closed_at"].is_string());
    }

    #[tokio::test]
    async fn test_rejected_payroll_dispute_reverts_payslip() {
        let (app, _, _db) = setup_test_app().await;
        let (employee_id, payslip_id) = paid_payslip(&app, "D2001", "2026-02-01", "2026-02-28").await;

        let (_, dispute) = request(
            &app,
            "POST",
            "/disputes",
            Some(json!({
                "kind": "payroll_dispute",
                "employee_id": employee_id,
                "payslip_id": payslip_id,
                "amount": "80",
                "description": "wrong tax bracket",
            })),
        )
        .await;
        let dispute_id = dispute["id"].as_str().unwrap().to_string();
        assert_eq!(payslip_status(&app, &payslip_id).await, "disputed");

        let (status, rejected) = request(
            &app,
            "POST",
            &format!("/disputes/{}/reject", dispute_id),
            Some(json!({ "decided_by": "payroll.specialist" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rejected["status"], "rejected");
        assert_eq!(payslip_status(&app, &payslip_id).await, "paid");

        // No refund was created.
        let (_, refunds) =
            request(&app, "GET", &format!("/refunds?employee_id={}", employee_id), None).await;
        assert!(refunds.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payroll_dispute_requires_paid_payslip() {
        let (app, _, _db) = setup_test_app().await;

        let employee = register_employee(&app, "D3001", "3000").await;
        let employee_id = employee["id"].as_str().unwrap().to_string();

        let (status, initiation) = request(
            &app,
            "POST",
            "/payroll/initiations",
            Some(json!({
                "period_start": "2026-03-01",
                "period_end": "2026-03-31",
                "initiated_by": "payroll.clerk",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let initiation_id = initiation["id"].as_str().unwrap().to_string();
        let (_, run) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/approve", initiation_id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        let run_id = run["id"].as_str().unwrap().to_string();
        let (_, payslips) = request(&app, "GET", &format!("/payslips?run_id={}", run_id), None).await;
        let draft_payslip = payslips.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();

        // Draft payslips cannot be disputed.
        let (status, body) = request(
            &app,
            "POST",
            "/disputes",
            Some(json!({
                "kind": "payroll_dispute",
                "employee_id": employee_id,
                "payslip_id": draft_payslip,
                "amount": "50",
                "description": "premature dispute",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
    }

    #[tokio::test]
    async fn test_expense_claim_payout_without_payslip() {
        let (app, _, _db) = setup_test_app().await;

        let employee = register_employee(&app, "D4001", "3000").await;
        let employee_id = employee["id"].as_str().unwrap().to_string();

        // Expense claims never carry a payslip.
        let (status, _) = request(
            &app,
            "POST",
            "/disputes",
            Some(json!({
                "kind": "expense_claim",
                "employee_id": employee_id,
                "payslip_id": "00000000-0000-0000-0000-000000000001",
                "amount": "200",
                "description": "travel costs",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, claim) = request(
            &app,
            "POST",
            "/disputes",
            Some(json!({
                "kind": "expense_claim",
                "employee_id": employee_id,
                "amount": "200",
                "description": "travel costs for customer visit",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let claim_id = claim["id"].as_str().unwrap().to_string();

        let (status, _) = request(
            &app,
            "POST",
            &format!("/disputes/{}/approve-specialist", claim_id),
            Some(json!({ "decided_by": "finance.specialist" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = request(
            &app,
            "POST",
            &format!("/disputes/{}/approve-manager", claim_id),
            Some(json!({ "decided_by": "finance.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, refunds) =
            request(&app, "GET", &format!("/refunds?employee_id={}", employee_id), None).await;
        let refunds = refunds.as_array().unwrap();
        assert_eq!(refunds.len(), 1);
        assert!(refunds[0]["payslip_id"].is_null());
        assert_eq!(refunds[0]["status"], "pending_inclusion");
    }

    #[tokio::test]
    async fn test_refund_flows_into_next_run() {
        let (app, _, _db) = setup_test_app().await;

        let employee = register_employee(&app, "D5001", "3000").await;
        let employee_id = employee["id"].as_str().unwrap().to_string();

        let (_, claim) = request(
            &app,
            "POST",
            "/disputes",
            Some(json!({
                "kind": "expense_claim",
                "employee_id": employee_id,
                "amount": "120.50",
                "description": "conference travel",
            })),
        )
        .await;
        let claim_id = claim["id"].as_str().unwrap().to_string();
        for step in ["approve-specialist", "approve-manager"] {
            let (status, _) = request(
                &app,
                "POST",
                &format!("/disputes/{}/{}", claim_id, step),
                Some(json!({ "decided_by": "finance" })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, initiation) = request(
            &app,
            "POST",
            "/payroll/initiations",
            Some(json!({
                "period_start": "2026-05-01",
                "period_end": "2026-05-31",
                "initiated_by": "payroll.clerk",
            })),
        )
        .await;
        let initiation_id = initiation["id"].as_str().unwrap().to_string();
        let (status, run) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/approve", initiation_id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(run["refund_total"], "120.50");
        assert_eq!(run["gross_total"], "3120.50");
        let run_id = run["id"].as_str().unwrap().to_string();

        let (_, refunds) =
            request(&app, "GET", &format!("/refunds?employee_id={}", employee_id), None).await;
        let refund = &refunds.as_array().unwrap()[0];
        assert_eq!(refund["status"], "included_in_payroll");
        assert_eq!(refund["included_in_run"], run_id.as_str());

        // Included refunds can no longer be cancelled.
        let refund_id = refund["id"].as_str().unwrap();
        let (status, _) =
            request(&app, "POST", &format!("/refunds/{}/cancel", refund_id), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_cancelled_refund_stays_out_of_payroll() {
        let (app, _, _db) = setup_test_app().await;

        let employee = register_employee(&app, "D6001", "3000").await;
        let employee_id = employee["id"].as_str().unwrap().to_string();

        let (_, claim) = request(
            &app,
            "POST",
            "/disputes",
            Some(json!({
                "kind": "expense_claim",
                "employee_id": employee_id,
                "amount": "99",
                "description": "duplicate expense submission",
            })),
        )
        .await;
        let claim_id = claim["id"].as_str().unwrap().to_string();
        for step in ["approve-specialist", "approve-manager"] {
            let (_, _) = request(
                &app,
                "POST",
                &format!("/disputes/{}/{}", claim_id, step),
                Some(json!({ "decided_by": "finance" })),
            )
            .await;
        }

        let (_, refunds) =
            request(&app, "GET", &format!("/refunds?employee_id={}", employee_id), None).await;
        let refund_id = refunds.as_array().unwrap()[0]["id"].as_str().unwrap().to_string();

        let (status, cancelled) =
            request(&app, "POST", &format!("/refunds/{}/cancel", refund_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["status"], "cancelled");

        let (_, initiation) = request(
            &app,
            "POST",
            "/payroll/initiations",
            Some(json!({
                "period_start": "2026-06-01",
                "period_end": "2026-06-30",
                "initiated_by": "payroll.clerk",
            })),
        )
        .await;
        let initiation_id = initiation["id"].as_str().unwrap().to_string();
        let (_, run) = request(
            &app,
            "POST",
            &format!("/payroll/initiations/{}/approve", initiation_id),
            Some(json!({ "decided_by": "payroll.manager" })),
        )
        .await;
        assert_eq!(run["refund_total"], "0");
        assert_eq!(run["gross_total"], "3000");
    }
}
