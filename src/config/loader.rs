//! Configuration loading from TOML files and the environment
//!
//! The CLI reads a TOML file; the Lambda functions have no file and are
//! configured purely through environment variables. Both paths end with the
//! same overrides and the same validation.

use super::schema::PipelineConfig;
use super::secret::secret_string;
use crate::domain::errors::PipelineError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// 1. Reads the file
/// 2. Substitutes `${VAR}` placeholders from the environment
/// 3. Parses the TOML into [`PipelineConfig`]
/// 4. Applies environment variable overrides
/// 5. Validates the result
///
/// # Errors
///
/// Returns [`PipelineError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, or validation fails.
pub fn load_config(path: impl AsRef<Path>) -> Result<PipelineConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PipelineError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PipelineError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: PipelineConfig = toml::from_str(&contents)?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PipelineError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

impl PipelineConfig {
    /// Builds configuration from environment variables only
    ///
    /// Starts from defaults and applies the same overrides as [`load_config`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if a variable cannot be parsed
    /// or the resulting configuration is invalid.
    pub fn from_env() -> Result<Self> {
        let mut config = PipelineConfig::default();
        apply_env_overrides(&mut config)?;
        config.validate().map_err(|e| {
            PipelineError::Configuration(format!("Configuration validation failed: {e}"))
        })?;
        Ok(config)
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
    })
}

/// Substitutes environment variables written as `${VAR_NAME}`
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set.
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

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PipelineError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        PipelineError::Configuration(format!("Invalid value for {name} ('{value}'): {e}"))
    })
}

/// Applies environment variable overrides
///
/// The short names (`DB_TYPE`, `DATA_BUCKET`, ...) are the ones the deployed
/// functions are provisioned with. Everything else uses the
/// `REPORT_PIPELINE_<SECTION>_<KEY>` pattern.
fn apply_env_overrides(config: &mut PipelineConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

    // Application
    if let Some(val) = var("LOG_LEVEL").or_else(|| var("REPORT_PIPELINE_LOG_LEVEL")) {
        config.application.log_level = val.to_lowercase();
    }

    // Database
    if let Some(val) = var("DB_TYPE") {
        config.database.kind = parse_env("DB_TYPE", &val)?;
    }
    if let Some(val) = var("DB_HOST") {
        config.database.host = val;
    }
    if let Some(val) = var("DB_PORT") {
        config.database.port = Some(parse_env("DB_PORT", &val)?);
    }
    if let Some(val) = var("DB_NAME") {
        config.database.name = val;
    }
    if let Some(val) = var("DB_USER") {
        config.database.user = val;
    }
    if let Some(val) = var("DB_PASSWORD") {
        config.database.password = Some(secret_string(val));
    }
    if let Some(val) = var("REPORT_PIPELINE_DATABASE_MAX_CONNECTIONS") {
        config.database.max_connections =
            parse_env("REPORT_PIPELINE_DATABASE_MAX_CONNECTIONS", &val)?;
    }
    if let Some(val) = var("REPORT_PIPELINE_DATABASE_STATEMENT_TIMEOUT_SECONDS") {
        config.database.statement_timeout_seconds =
            parse_env("REPORT_PIPELINE_DATABASE_STATEMENT_TIMEOUT_SECONDS", &val)?;
    }

    // Data lake
    if let Some(val) = var("DATA_LAKE_TYPE") {
        config.data_lake.kind = parse_env("DATA_LAKE_TYPE", &val)?;
    }

    // Storage and queue
    if let Some(val) = var("DATA_BUCKET") {
        config.storage.bucket = val;
    }
    if let Some(val) = var("REPORT_PIPELINE_STORAGE_EXPORT_PREFIX") {
        config.storage.export_prefix = val;
    }
    if let Some(val) = var("EXPORT_QUEUE_URL") {
        config.queue.export_queue_url = val;
    }

    // CSV
    if let Some(val) = var("REPORT_PIPELINE_CSV_RANDOM_SUFFIX") {
        config.csv.random_suffix = parse_env("REPORT_PIPELINE_CSV_RANDOM_SUFFIX", &val)?;
    }

    // Logging
    if let Some(val) = var("REPORT_PIPELINE_LOGGING_JSON") {
        config.logging.json = parse_env("REPORT_PIPELINE_LOGGING_JSON", &val)?;
    } else if var("AWS_LAMBDA_FUNCTION_NAME").is_some() {
        config.logging.json = true;
    }
    if let Some(val) = var("REPORT_PIPELINE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("REPORT_PIPELINE_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("REPORT_PIPELINE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_substitute_env_vars() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var("RP_TEST_SUBST_VAR", "test_value");
        let result = substitute_env_vars("password = \"${RP_TEST_SUBST_VAR}\"").unwrap();
        assert_eq!(result, "password = \"test_value\"\n");
        std::env::remove_var("RP_TEST_SUBST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::remove_var("RP_TEST_MISSING_VAR");
        let err = substitute_env_vars("password = \"${RP_TEST_MISSING_VAR}\"").unwrap_err();
        assert!(err.to_string().contains("RP_TEST_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# password = \"${RP_TEST_NEVER_SET}\"";
        assert_eq!(substitute_env_vars(input).unwrap(), format!("{input}\n"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent-report-pipeline.toml");
        assert!(matches!(result, Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_load_config_valid() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let toml_content = r#"
[database]
kind = "mssql"
host = "db.internal"
name = "reports"
user = "etl"

[storage]
bucket = "report-data"

[queue]
export_queue_url = "https://sqs.us-east-1.amazonaws.com/123/export"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.effective_port(), 1433);
        assert_eq!(config.storage.export_prefix, "exports");
    }

    #[test]
    fn test_parse_env_reports_variable_name() {
        let err = parse_env::<u16>("DB_PORT", "not-a-port").unwrap_err();
        assert!(err.to_string().contains("DB_PORT"));
    }
}
