#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn_with_state;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::tests::support::{register_employee, request, setup_test_app};

    #[tokio::test]
    async fn test_healthz() {
        let (app, _, _db) = setup_test_app().await;
        let (status, _) = request(&app, "GET", "/healthz", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readyz_with_live_database() {
        let (app, _, _db) = setup_test_app().await;
        let (status, _) = request(&app, "GET", "/readyz", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_version_reports_package_metadata() {
        let (app, _, _db) = setup_test_app().await;
        let (status, body) = request(&app, "GET", "/version", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_metrics_track_created_records() {
        let (app, _, _db) = setup_test_app().await;

        let (_, before) = request(&app, "GET", "/metrics", None).await;
        assert_eq!(before["records_created"], 0);

        register_employee(&app, "M1001", "3000").await;

        let (_, after) = request(&app, "GET", "/metrics", None).await;
        assert_eq!(after["records_created"], 1);
    }

    #[tokio::test]
    async fn test_prometheus_exposition() {
        let (app, _, _db) = setup_test_app().await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/metrics/prometheus").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("lohnwerk_records_created"));
        assert!(text.contains("lohnwerk_payroll_runs_executed"));
        assert!(text.contains("# TYPE lohnwerk_uptime_seconds gauge"));
    }

    #[tokio::test]
    async fn test_security_headers_present() {
        let (app, state, _db) = setup_test_app().await;
        let app = app.layer(from_fn_with_state(
            state.config.clone(),
            crate::middleware::security_headers::security_headers_middleware,
        ));

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert!(headers.contains_key("x-content-type-options"));
        assert!(headers.contains_key("x-frame-options"));
        assert!(headers.contains_key("referrer-policy"));
        assert!(headers.contains_key("permissions-policy"));
    }
}
