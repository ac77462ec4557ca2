use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayrollConfig {
    /// ISO 4217 currency code used for all amounts in responses.
    pub currency: String,
    pub default_page_size: i64,
    pub max_page_size: i64,
    /// Upper bound accepted for any single monetary field, as a decimal string.
    pub max_amount: String,
}

impl PayrollConfig {
    /// Parsed form of `max_amount`. Validated at load time, so this cannot
    /// fail after `load()` has succeeded.
    pub fn max_amount_decimal(&self) -> Decimal {
        Decimal::from_str(&self.max_amount).unwrap_or(Decimal::MAX)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OffboardingConfig {
    /// (task_key, human-readable label) pairs seeded into new checklists.
    pub default_tasks: Vec<(String, String)>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub payroll: PayrollConfig,
    pub offboarding: OffboardingConfig,
    pub security: Option<SecurityConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: lohnwerk.toml (in CWD)
        .add_source(::config::File::with_name("lohnwerk").required(false));

    if let Ok(custom_path) = std::env::var("LOHNWERK_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("LOHNWERK").separator("__"));

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    // Payroll
    if cfg.payroll.currency.len() != 3 || !cfg.payroll.currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(anyhow::anyhow!("payroll.currency must be a 3-letter ISO code, got '{}'", cfg.payroll.currency));
    }
    if cfg.payroll.default_page_size <= 0 {
        return Err(anyhow::anyhow!("payroll.default_page_size must be > 0"));
    }
    if cfg.payroll.max_page_size < cfg.payroll.default_page_size {
        return Err(anyhow::anyhow!("payroll.max_page_size must be >= default_page_size"));
    }
    match Decimal::from_str(&cfg.payroll.max_amount) {
        Ok(d) if d > Decimal::ZERO => {}
        Ok(_) => return Err(anyhow::anyhow!("payroll.max_amount must be > 0")),
        Err(e) => return Err(anyhow::anyhow!("payroll.max_amount is not a decimal: {}", e)),
    }

    // Offboarding
    if cfg.offboarding.default_tasks.is_empty() {
        return Err(anyhow::anyhow!("offboarding.default_tasks must not be empty"));
    }
    for (key, label) in &cfg.offboarding.default_tasks {
        if key.is_empty() || label.is_empty() {
            return Err(anyhow::anyhow!("offboarding.default_tasks entries must be non-empty"));
        }
    }

    Ok(())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    if let Some(path) = url.strip_prefix("sqlite://") {
        let p = Path::new(path);
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
