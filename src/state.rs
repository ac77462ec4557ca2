use std::sync::Arc;

use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::middleware::EndpointRateLimiter;

/// The shared application state.
///
/// Cloneable and thread-safe for use with Axum's request extraction. Each
/// request gets its own clone; the interesting members are behind `Arc`s or
/// are pools/atomics already.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: sqlx::SqlitePool,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Operation counters exposed via the metrics endpoints.
    pub metrics: Metrics,
    /// Per-endpoint rate limiter for the write-heavy endpoints.
    pub rate_limiter: EndpointRateLimiter,
}

impl AppState {
    /// Creates a new `AppState` with initialized components.
    ///
    /// Endpoint rate limits guard the two endpoints that create expensive
    /// follow-up work: employee registration and payroll initiation. All
    /// other endpoints fall under the global limiter only.
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        let rate_limiter = EndpointRateLimiter::new().with_limits(vec![
            ("/register", 60, 60),            // 60 registrations per minute
            ("/payroll/initiations", 30, 60), // 30 initiations per minute
        ]);

        Self { db, config: Arc::new(config), metrics: Metrics::new(), rate_limiter }
    }
}
