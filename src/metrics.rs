use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Usage metrics for monitoring
#[derive(Clone)]
pub struct Metrics {
    pub records_created: Arc<AtomicU64>,
    pub approvals: Arc<AtomicUsize>,
    pub rejections: Arc<AtomicUsize>,
    pub payroll_runs_executed: Arc<AtomicUsize>,
    pub payslips_issued: Arc<AtomicU64>,
    pub bonuses_processed: Arc<AtomicU64>,
    pub refunds_included: Arc<AtomicU64>,
    pub validation_failures: Arc<AtomicUsize>,
    pub start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            records_created: Arc::new(AtomicU64::new(0)),
            approvals: Arc::new(AtomicUsize::new(0)),
            rejections: Arc::new(AtomicUsize::new(0)),
            payroll_runs_executed: Arc::new(AtomicUsize::new(0)),
            payslips_issued: Arc::new(AtomicU64::new(0)),
            bonuses_processed: Arc::new(AtomicU64::new(0)),
            refunds_included: Arc::new(AtomicU64::new(0)),
            validation_failures: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn inc_records_created(&self) {
        self.records_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_approvals(&self) {
        self.approvals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_rejections(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_payroll_runs(&self) {
        self.payroll_runs_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_payslips(&self, count: u64) {
        self.payslips_issued.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_bonuses_processed(&self, count: u64) {
        self.bonuses_processed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_refunds_included(&self, count: u64) {
        self.refunds_included.fetch_add(count, Ordering::Relaxed);
    }

    pub fn inc_validation_failures(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_created: self.records_created.load(Ordering::Relaxed),
            approvals: self.approvals.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            payroll_runs_executed: self.payroll_runs_executed.load(Ordering::Relaxed),
            payslips_issued: self.payslips_issued.load(Ordering::Relaxed),
            bonuses_processed: self.bonuses_processed.load(Ordering::Relaxed),
            refunds_included: self.refunds_included.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub struct MetricsSnapshot {
    pub records_created: u64,
    pub approvals: usize,
    pub rejections: usize,
    pub payroll_runs_executed: usize,
    pub payslips_issued: u64,
    pub bonuses_processed: u64,
    pub refunds_included: u64,
    pub validation_failures: usize,
    pub uptime_seconds: u64,
}
