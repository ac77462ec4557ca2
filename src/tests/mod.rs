//! Integration and unit tests for the Lohnwerk application.
//!
//! All HTTP tests run against the real router backed by a temporary SQLite
//! database, via `tower::ServiceExt::oneshot`.

pub mod support;

pub mod api_tests;
pub mod config_tests;
pub mod disputes_api_tests;
pub mod error_tests;
pub mod health_api_tests;
pub mod payroll_api_tests;
