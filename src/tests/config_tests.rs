#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use rust_decimal::Decimal;

    #[test]
    fn test_embedded_defaults_parse() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert!(cfg.server.port > 0);
        assert!(cfg.database.url.starts_with("sqlite:"));
    }

    #[test]
    fn test_default_payroll_settings() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.payroll.currency.len(), 3);
        assert!(cfg.payroll.currency.chars().all(|c| c.is_ascii_uppercase()));
        assert!(cfg.payroll.default_page_size > 0);
        assert!(cfg.payroll.max_page_size >= cfg.payroll.default_page_size);
        assert!(cfg.payroll.max_amount_decimal() > Decimal::ZERO);
    }

    #[test]
    fn test_default_offboarding_tasks_are_seeded() {
        let cfg = AppConfig::default();
        assert!(!cfg.offboarding.default_tasks.is_empty());
        // Keys must be usable as stable identifiers.
        for (key, label) in &cfg.offboarding.default_tasks {
            assert!(!key.trim().is_empty());
            assert!(!label.trim().is_empty());
            assert!(!key.contains(' '));
        }
    }

    #[test]
    fn test_sqlite_parent_dir_helper() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("lohnwerk.db");
        let url = format!("sqlite://{}", db_path.display());
        crate::config::ensure_sqlite_parent_dir(&url).unwrap();
        assert!(db_path.parent().unwrap().is_dir());
    }
}
