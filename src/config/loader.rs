//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{Environment, PayeSyncConfig, StoreTarget};
use super::secret::secret_string;
use crate::domain::errors::PayeError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into [`PayeSyncConfig`]
/// 4. Applies environment variable overrides (`PAYE_SYNC_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`PayeError::Configuration`] if the file cannot be read or parsed,
/// a referenced environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use paye_sync::config::loader::load_config;
///
/// let config = load_config("paye-sync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PayeSyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PayeError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PayeError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: PayeSyncConfig = toml::from_str(&contents)
        .map_err(|e| PayeError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PayeError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static regex"))
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched. All missing variables are reported
/// in one error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PayeError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        PayeError::Configuration(format!("Invalid value '{}' for {}", value, name))
    })
}

/// Applies environment variable overrides using the `PAYE_SYNC_` prefix
///
/// Variables follow the pattern `PAYE_SYNC_<SECTION>_<KEY>`, for example
/// `PAYE_SYNC_REVENUE_BASE_URL` or `PAYE_SYNC_TRANSFER_PASSWORD`.
fn apply_env_overrides(config: &mut PayeSyncConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    if let Some(val) = var("PAYE_SYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("PAYE_SYNC_ENVIRONMENT") {
        config.environment = match val.as_str() {
            "test" => Environment::Test,
            "production" => Environment::Production,
            other => {
                return Err(PayeError::Configuration(format!(
                    "Invalid value '{}' for PAYE_SYNC_ENVIRONMENT",
                    other
                )))
            }
        };
    }
    if let Some(val) = var("PAYE_SYNC_STORE_TARGET") {
        config.store_target = match val.as_str() {
            "postgresql" => StoreTarget::PostgreSQL,
            "memory" => StoreTarget::Memory,
            other => {
                return Err(PayeError::Configuration(format!(
                    "Invalid value '{}' for PAYE_SYNC_STORE_TARGET",
                    other
                )))
            }
        };
    }

    // Revenue overrides
    if let Some(val) = var("PAYE_SYNC_REVENUE_BASE_URL") {
        config.revenue.base_url = val;
    }
    if let Some(val) = var("PAYE_SYNC_REVENUE_API_PATH") {
        config.revenue.api_path = val;
    }
    if let Some(val) = var("PAYE_SYNC_REVENUE_SIGNATURE_ALGORITHM") {
        config.revenue.signature_algorithm =
            parse_override("PAYE_SYNC_REVENUE_SIGNATURE_ALGORITHM", &val)?;
    }
    if let Some(val) = var("PAYE_SYNC_REVENUE_TIMEOUT_SECONDS") {
        config.revenue.timeout_seconds = parse_override("PAYE_SYNC_REVENUE_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("PAYE_SYNC_REVENUE_TLS_VERIFY") {
        config.revenue.tls_verify = parse_override("PAYE_SYNC_REVENUE_TLS_VERIFY", &val)?;
    }
    if let Some(val) = var("PAYE_SYNC_REVENUE_ACTIVE_CERTIFICATE") {
        config.revenue.active_certificate =
            parse_override("PAYE_SYNC_REVENUE_ACTIVE_CERTIFICATE", &val)?;
    }

    // PostgreSQL overrides (only if configured)
    if let Some(ref mut pg) = config.postgresql {
        if let Some(val) = var("PAYE_SYNC_POSTGRESQL_CONNECTION_STRING") {
            pg.connection_string = secret_string(val);
        }
        if let Some(val) = var("PAYE_SYNC_POSTGRESQL_MAX_CONNECTIONS") {
            pg.max_connections = parse_override("PAYE_SYNC_POSTGRESQL_MAX_CONNECTIONS", &val)?;
        }
        if let Some(val) = var("PAYE_SYNC_POSTGRESQL_SSL_MODE") {
            pg.ssl_mode = val;
        }
    }

    // Sync overrides
    if let Some(val) = var("PAYE_SYNC_SYNC_STAGING_DIR") {
        config.sync.staging_dir = val.into();
    }
    if let Some(val) = var("PAYE_SYNC_SYNC_LOCK_FILE") {
        config.sync.lock_file = val.into();
    }
    if let Some(val) = var("PAYE_SYNC_SYNC_FETCH_TIMEOUT_SECONDS") {
        config.sync.fetch_timeout_seconds =
            parse_override("PAYE_SYNC_SYNC_FETCH_TIMEOUT_SECONDS", &val)?;
    }

    // Transfer overrides
    if let Some(val) = var("PAYE_SYNC_TRANSFER_HOST") {
        config.transfer.host = val;
    }
    if let Some(val) = var("PAYE_SYNC_TRANSFER_PORT") {
        config.transfer.port = parse_override("PAYE_SYNC_TRANSFER_PORT", &val)?;
    }
    if let Some(val) = var("PAYE_SYNC_TRANSFER_USERNAME") {
        config.transfer.username = val;
    }
    if let Some(val) = var("PAYE_SYNC_TRANSFER_PASSWORD") {
        config.transfer.password = secret_string(val);
    }
    if let Some(val) = var("PAYE_SYNC_TRANSFER_REMOTE_DIRECTORY") {
        config.transfer.remote_directory = val;
    }

    // Logging overrides
    if let Some(val) = var("PAYE_SYNC_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("PAYE_SYNC_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("PAYE_SYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
