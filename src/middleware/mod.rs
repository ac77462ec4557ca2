//! Middleware components for HTTP request processing.
//!
//! Cross-cutting concerns layered onto the router: client identification,
//! rate limiting, request hygiene checks and security headers. Field-level
//! validation helpers used by the route handlers also live here, next to
//! the request-level checks they complement.

pub mod ip;
pub mod rate_limit;
pub mod security_headers;
pub mod validation;

pub use rate_limit::EndpointRateLimiter;
