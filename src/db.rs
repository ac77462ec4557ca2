use sqlx::SqlitePool;

/// Initializes the database schema. Safe to call on every startup: tables
/// and indexes are created idempotently and column additions tolerate
/// already-migrated databases.
pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    // Pragmas for better durability/performance
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }
    // Foreign keys are critical - fail if this doesn't work
    sqlx::query("PRAGMA foreign_keys=ON;").execute(pool).await?;
    if let Err(e) = sqlx::query("PRAGMA busy_timeout=10000;").execute(pool).await {
        tracing::warn!("Failed to set busy_timeout: {}", e);
    }

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS employees (
            id TEXT PRIMARY KEY,
            staff_no TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            department TEXT NOT NULL,
            position TEXT NOT NULL,
            base_salary TEXT NOT NULL,
            hire_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            updated_at TEXT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS change_requests (
            id TEXT PRIMARY KEY,
            employee_id TEXT NOT NULL,
            field TEXT NOT NULL,
            new_value TEXT NOT NULL,
            reason TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            decided_by TEXT NULL,
            decided_at TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(employee_id) REFERENCES employees(id)
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS payroll_initiations (
            id TEXT PRIMARY KEY,
            period_start TEXT NOT NULL,
            period_end TEXT NOT NULL,
            initiated_by TEXT NOT NULL,
            notes TEXT NULL,
            status TEXT NOT NULL DEFAULT 'pending_review',
            decided_by TEXT NULL,
            decided_at TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS payroll_runs (
            id TEXT PRIMARY KEY,
            initiation_id TEXT NOT NULL UNIQUE,
            executed_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            employee_count INTEGER NOT NULL,
            gross_total TEXT NOT NULL,
            bonus_total TEXT NOT NULL,
            refund_total TEXT NOT NULL,
            net_total TEXT NOT NULL,
            FOREIGN KEY(initiation_id) REFERENCES payroll_initiations(id)
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS signing_bonuses (
            id TEXT PRIMARY KEY,
            employee_id TEXT NOT NULL,
            amount TEXT NOT NULL,
            reason TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            decided_by TEXT NULL,
            decided_at TEXT NULL,
            processed_in_run TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(employee_id) REFERENCES employees(id),
            FOREIGN KEY(processed_in_run) REFERENCES payroll_runs(id)
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS payslips (
            id TEXT PRIMARY KEY,
            run_id TEXT NOT NULL,
            employee_id TEXT NOT NULL,
            period_start TEXT NOT NULL,
            period_end TEXT NOT NULL,
            base_amount TEXT NOT NULL,
            bonus_amount TEXT NOT NULL,
            refund_amount TEXT NOT NULL,
            gross_amount TEXT NOT NULL,
            net_amount TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'draft',
            published_at TEXT NULL,
            paid_at TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(run_id) REFERENCES payroll_runs(id),
            FOREIGN KEY(employee_id) REFERENCES employees(id)
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS disputes (
            id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            employee_id TEXT NOT NULL,
            payslip_id TEXT NULL,
            amount TEXT NOT NULL,
            description TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'submitted',
            specialist_decided_by TEXT NULL,
            specialist_decided_at TEXT NULL,
            manager_decided_by TEXT NULL,
            manager_decided_at TEXT NULL,
            closed_at TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(employee_id) REFERENCES employees(id),
            FOREIGN KEY(payslip_id) REFERENCES payslips(id)
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS refunds (
            id TEXT PRIMARY KEY,
            employee_id TEXT NOT NULL,
            payslip_id TEXT NULL,
            dispute_id TEXT NULL,
            amount TEXT NOT NULL,
            reason TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending_inclusion',
            included_in_run TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(employee_id) REFERENCES employees(id),
            FOREIGN KEY(payslip_id) REFERENCES payslips(id),
            FOREIGN KEY(dispute_id) REFERENCES disputes(id),
            FOREIGN KEY(included_in_run) REFERENCES payroll_runs(id)
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS leave_requests (
            id TEXT PRIMARY KEY,
            employee_id TEXT NOT NULL,
            leave_type TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            reason TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            decided_by TEXT NULL,
            decided_at TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(employee_id) REFERENCES employees(id)
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS appraisals (
            id TEXT PRIMARY KEY,
            employee_id TEXT NOT NULL,
            period TEXT NOT NULL,
            reviewer TEXT NOT NULL,
            performance INTEGER NOT NULL,
            teamwork INTEGER NOT NULL,
            reliability INTEGER NOT NULL,
            overall TEXT NOT NULL,
            comments TEXT NULL,
            status TEXT NOT NULL DEFAULT 'draft',
            submitted_at TEXT NULL,
            acknowledged_at TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(employee_id) REFERENCES employees(id)
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS offboarding_checklists (
            id TEXT PRIMARY KEY,
            employee_id TEXT NOT NULL,
            reason TEXT NOT NULL,
            exit_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'in_progress',
            completed_at TEXT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(employee_id) REFERENCES employees(id)
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS offboarding_tasks (
            id TEXT PRIMARY KEY,
            checklist_id TEXT NOT NULL,
            task_key TEXT NOT NULL,
            label TEXT NOT NULL,
            position INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'open',
            completed_by TEXT NULL,
            completed_at TEXT NULL,
            FOREIGN KEY(checklist_id) REFERENCES offboarding_checklists(id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    // Additive migrations for databases created before these columns existed
    for (table, column, ddl) in [
        ("employees", "updated_at", "ALTER TABLE employees ADD COLUMN updated_at TEXT NULL"),
        ("payroll_initiations", "notes", "ALTER TABLE payroll_initiations ADD COLUMN notes TEXT NULL"),
        ("disputes", "closed_at", "ALTER TABLE disputes ADD COLUMN closed_at TEXT NULL"),
    ] {
        if let Err(e) = sqlx::query(ddl).execute(pool).await {
            match &e {
                sqlx::Error::Database(db_err) => {
                    let msg = db_err.message().to_lowercase();
                    if !msg.contains("duplicate") && !msg.contains("already exists") {
                        tracing::error!("Failed to add {} column to {}: {}", column, table, e);
                        return Err(anyhow::anyhow!("Migration failed: {}", e));
                    }
                }
                _ => {
                    tracing::error!("Unexpected error adding {} to {}: {}", column, table, e);
                    return Err(anyhow::anyhow!("Migration failed: {}", e));
                }
            }
        }
    }

    let indexes = [
        ("idx_employees_status", "CREATE INDEX IF NOT EXISTS idx_employees_status ON employees(status)"),
        ("idx_change_requests_employee", "CREATE INDEX IF NOT EXISTS idx_change_requests_employee ON change_requests(employee_id, status)"),
        ("idx_bonuses_employee_status", "CREATE INDEX IF NOT EXISTS idx_bonuses_employee_status ON signing_bonuses(employee_id, status)"),
        ("idx_initiations_status", "CREATE INDEX IF NOT EXISTS idx_initiations_status ON payroll_initiations(status, created_at DESC)"),
        ("idx_payslips_employee", "CREATE INDEX IF NOT EXISTS idx_payslips_employee ON payslips(employee_id, status)"),
        ("idx_payslips_run", "CREATE INDEX IF NOT EXISTS idx_payslips_run ON payslips(run_id)"),
        ("idx_disputes_employee", "CREATE INDEX IF NOT EXISTS idx_disputes_employee ON disputes(employee_id, status)"),
        ("idx_refunds_employee_status", "CREATE INDEX IF NOT EXISTS idx_refunds_employee_status ON refunds(employee_id, status)"),
        ("idx_leave_employee_status", "CREATE INDEX IF NOT EXISTS idx_leave_employee_status ON leave_requests(employee_id, status)"),
        ("idx_appraisals_employee", "CREATE INDEX IF NOT EXISTS idx_appraisals_employee ON appraisals(employee_id, period)"),
        ("idx_offboarding_employee", "CREATE INDEX IF NOT EXISTS idx_offboarding_employee ON offboarding_checklists(employee_id, status)"),
        ("idx_offboarding_tasks_checklist", "CREATE INDEX IF NOT EXISTS idx_offboarding_tasks_checklist ON offboarding_tasks(checklist_id, position)"),
    ];

    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            match &e {
                sqlx::Error::Database(db_err) => {
                    let msg = db_err.message().to_lowercase();
                    if msg.contains("already exists") || msg.contains("duplicate") {
                        tracing::debug!("Index {} already exists, skipping", name);
                    } else {
                        tracing::warn!("Failed to create index {}: {}", name, e);
                    }
                }
                _ => {
                    tracing::warn!("Failed to create index {}: {}", name, e);
                }
            }
        }
    }

    Ok(())
}
