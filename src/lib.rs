//! # Lohnwerk Backend Library
//!
//! Core library for Lohnwerk, an HR / payroll line-of-business backend:
//! employee records, payroll initiation and execution, signing bonuses,
//! expense claims and payroll disputes, refunds, payslips, leave requests,
//! performance appraisals and offboarding checklists.
//!
//! ## Architecture
//!
//! The application is built using:
//! - **Axum**: Modern web framework for HTTP server and routing
//! - **SQLx**: Asynchronous database operations with SQLite
//! - **Tokio**: Async runtime for concurrent operations
//! - **Serde**: Serialization/deserialization for JSON APIs
//! - **rust_decimal**: Exact decimal arithmetic for monetary amounts
//!
//! ## Core Components
//!
//! - [`config`]: Application configuration management
//! - [`db`]: Database schema initialization and migrations
//! - [`error`]: Centralized error handling and HTTP error responses
//! - [`metrics`]: Application usage metrics
//! - [`middleware`]: HTTP middleware for security, rate limiting, and validation
//! - [`models`]: Business entities and their status state machines
//! - [`routes`]: HTTP API endpoint handlers
//! - [`state`]: Shared application state
//! - [`types`]: Data transfer objects and shared type definitions
//!
//! Every status-bearing record is mutated exclusively through the transition
//! functions on its status enum; a disallowed transition surfaces as
//! `409 Conflict` at the HTTP layer and never touches the database.

pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod router;
pub mod routes;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
