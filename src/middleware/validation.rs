use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;

use crate::config::PayrollConfig;
use crate::error::{AppError, AppResult};

/// An Axum middleware that validates incoming requests for common hygiene
/// issues before they reach a handler: null bytes in the URI, suspicious
/// user agents (logged only) and oversized bodies.
pub async fn validate_request_middleware(req: Request, next: Next) -> Response {
    if req.uri().path().contains('\0') {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": "INVALID_PATH",
                    "message": "Null byte detected in request path",
                },
                "status": 400,
            })),
        )
            .into_response();
    }

    if let Some(user_agent) = req.headers().get("user-agent") {
        if let Ok(ua_str) = user_agent.to_str() {
            if is_suspicious_user_agent(ua_str) {
                tracing::warn!("Suspicious user agent detected: {}", ua_str);
            }
        }
    }

    // Early rejection on declared content length; redundant with
    // DefaultBodyLimit but avoids reading the body at all.
    if matches!(req.method(), &axum::http::Method::POST | &axum::http::Method::PUT) {
        if let Some(content_length) = req.headers().get("content-length") {
            if let Ok(length_str) = content_length.to_str() {
                if let Ok(length) = length_str.parse::<usize>() {
                    let max_body_size = std::env::var("LOHNWERK_MAX_BODY_SIZE")
                        .ok()
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(1024 * 1024)
                        .clamp(64 * 1024, 16 * 1024 * 1024);
                    if length > max_body_size {
                        return (
                            StatusCode::PAYLOAD_TOO_LARGE,
                            Json(json!({
                                "error": {
                                    "code": "PAYLOAD_TOO_LARGE",
                                    "message": format!("Request body exceeds maximum size of {} bytes", max_body_size),
                                },
                                "status": 413,
                            })),
                        )
                            .into_response();
                    }
                }
            }
        }
    }

    next.run(req).await
}

/// Check for suspicious user agents (simple heuristic)
fn is_suspicious_user_agent(ua: &str) -> bool {
    let ua_lower = ua.to_lowercase();
    ua_lower.contains("scanner")
        || ua_lower.contains("nikto")
        || ua_lower.contains("sqlmap")
        || ua_lower.contains("havij")
        || ua_lower.contains("acunetix")
}

// ---------------------- Field validators ----------------------
//
// The original DTO layer declared these constraints as decorators; here
// each create/update handler calls them explicitly before any DB statement.

pub const MAX_NAME_LEN: usize = 80;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_TEXT_LEN: usize = 2000;

/// Required short string: non-empty after trimming, at most `max` characters.
pub fn validate_name(field: &str, value: &str, max: usize) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    if trimmed.chars().count() > max {
        return Err(AppError::ValidationError {
            field: field.to_string(),
            message: format!("must be at most {} characters", max),
        });
    }
    if trimmed.contains('\0') {
        return Err(AppError::ValidationError {
            field: field.to_string(),
            message: "contains null characters".to_string(),
        });
    }
    Ok(())
}

/// Minimal email shape check: length bound plus a single `@` with non-empty
/// sides. Anything stricter belongs to a confirmation mail, not a regex.
pub fn validate_email(value: &str) -> AppResult<()> {
    validate_name("email", value, MAX_EMAIL_LEN)?;
    let mut parts = value.trim().splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AppError::ValidationError {
            field: "email".to_string(),
            message: "is not a valid email address".to_string(),
        });
    }
    Ok(())
}

/// Free-text field: required, bounded by `MAX_TEXT_LEN`.
pub fn validate_text(field: &str, value: &str) -> AppResult<()> {
    validate_name(field, value, MAX_TEXT_LEN)
}

/// Monetary amount: within `[0, max]`, or `(0, max]` when
/// `require_positive` is set, and at most two decimal places.
pub fn validate_amount(field: &str, value: Decimal, cfg: &PayrollConfig, require_positive: bool) -> AppResult<()> {
    if value < Decimal::ZERO {
        return Err(AppError::ValidationError {
            field: field.to_string(),
            message: "must not be negative".to_string(),
        });
    }
    if require_positive && value == Decimal::ZERO {
        return Err(AppError::ValidationError {
            field: field.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    if value > cfg.max_amount_decimal() {
        return Err(AppError::ValidationError {
            field: field.to_string(),
            message: format!("must be at most {}", cfg.max_amount),
        });
    }
    if value.scale() > 2 {
        return Err(AppError::ValidationError {
            field: field.to_string(),
            message: "must have at most two decimal places".to_string(),
        });
    }
    Ok(())
}

/// Date range check: `start <= end`.
pub fn validate_date_order(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if start > end {
        return Err(AppError::ValidationError {
            field: "period".to_string(),
            message: format!("start date {} is after end date {}", start, end),
        });
    }
    Ok(())
}

/// Clamps list pagination parameters to the configured bounds.
pub fn page_params(limit: Option<i64>, offset: Option<i64>, cfg: &PayrollConfig) -> (i64, i64) {
    let limit = limit.unwrap_or(cfg.default_page_size).clamp(1, cfg.max_page_size);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn payroll_cfg() -> PayrollConfig {
        PayrollConfig {
            currency: "EUR".to_string(),
            default_page_size: 100,
            max_page_size: 500,
            max_amount: "1000000000".to_string(),
        }
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert!(validate_name("first_name", "Ada", MAX_NAME_LEN).is_ok());
        assert!(validate_name("first_name", "   ", MAX_NAME_LEN).is_err());
        assert!(validate_name("first_name", &"x".repeat(81), MAX_NAME_LEN).is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada@localhost").is_err());
    }

    #[test]
    fn amounts_respect_bounds_and_scale() {
        let cfg = payroll_cfg();
        assert!(validate_amount("amount", Decimal::from_str("4200.50").unwrap(), &cfg, true).is_ok());
        assert!(validate_amount("amount", Decimal::ZERO, &cfg, true).is_err());
        assert!(validate_amount("amount", Decimal::ZERO, &cfg, false).is_ok());
        assert!(validate_amount("amount", Decimal::from_str("-1").unwrap(), &cfg, false).is_err());
        assert!(validate_amount("amount", Decimal::from_str("0.001").unwrap(), &cfg, true).is_err());
        assert!(validate_amount("amount", Decimal::from_str("1000000001").unwrap(), &cfg, true).is_err());
    }

    #[test]
    fn pagination_clamps() {
        let cfg = payroll_cfg();
        assert_eq!(page_params(None, None, &cfg), (100, 0));
        assert_eq!(page_params(Some(9999), Some(-5), &cfg), (500, 0));
        assert_eq!(page_params(Some(0), Some(20), &cfg), (1, 20));
    }
}
