//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::join_path;
use crate::utils::media::BinaryTypes;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Function host and adapter settings
    #[serde(default)]
    pub function: FunctionConfig,

    /// Environment variables reported in failure envelopes
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let function = &self.function;
        if function.platform.trim().is_empty() {
            return Err(AppError::config("function.platform is empty"));
        }
        validate_prefix("function.mount_prefix", &function.mount_prefix)?;
        validate_prefix("function.api_prefix", &function.api_prefix)?;
        if function.max_response_bytes == 0 {
            return Err(AppError::config("function.max_response_bytes must be > 0"));
        }
        BinaryTypes::parse(&function.binary_content_types)?;

        if self.diagnostics.database_url_var.trim().is_empty() {
            return Err(AppError::config("diagnostics.database_url_var is empty"));
        }
        if self.diagnostics.supabase_vars.iter().any(|v| v.trim().is_empty()) {
            return Err(AppError::config(
                "diagnostics.supabase_vars contains an empty name",
            ));
        }
        Ok(())
    }

    /// Path of the health-check route as seen by the application.
    pub fn health_path(&self) -> String {
        join_path(&self.function.api_prefix, "/health")
    }
}

/// Prefixes are absolute and carry no trailing slash, so they can be joined
/// with route suffixes directly.
fn validate_prefix(field: &str, prefix: &str) -> Result<()> {
    if !prefix.starts_with('/') {
        return Err(AppError::config(format!(
            "{field} must start with '/': {prefix:?}"
        )));
    }
    if prefix.len() > 1 && prefix.ends_with('/') {
        return Err(AppError::config(format!(
            "{field} must not end with '/': {prefix:?}"
        )));
    }
    Ok(())
}

/// Function host and adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionConfig {
    /// Deployment platform identifier reported by the health route
    #[serde(default = "defaults::platform")]
    pub platform: String,

    /// Path segment the host adds in front of forwarded requests
    #[serde(default = "defaults::mount_prefix")]
    pub mount_prefix: String,

    /// Logical prefix of the application's own routes
    #[serde(default = "defaults::api_prefix")]
    pub api_prefix: String,

    /// Content types passed through as raw bytes
    #[serde(default = "defaults::binary_content_types")]
    pub binary_content_types: Vec<String>,

    /// Upper bound on a collected response body
    #[serde(default = "defaults::max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            platform: defaults::platform(),
            mount_prefix: defaults::mount_prefix(),
            api_prefix: defaults::api_prefix(),
            binary_content_types: defaults::binary_content_types(),
            max_response_bytes: defaults::max_response_bytes(),
        }
    }
}

/// Names of the environment variables checked for presence on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Database connection string variable
    #[serde(default = "defaults::database_url_var")]
    pub database_url_var: String,

    /// Credential variables that must all be set for `hasSupabase`
    #[serde(default = "defaults::supabase_vars")]
    pub supabase_vars: Vec<String>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            database_url_var: defaults::database_url_var(),
            supabase_vars: defaults::supabase_vars(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Function defaults
    pub fn platform() -> String {
        "netlify".into()
    }
    pub fn mount_prefix() -> String {
        "/.netlify/functions".into()
    }
    pub fn api_prefix() -> String {
        "/api".into()
    }
    pub fn binary_content_types() -> Vec<String> {
        vec![
            "multipart/form-data".into(),
            "application/octet-stream".into(),
            "image/*".into(),
        ]
    }
    pub fn max_response_bytes() -> usize {
        6 * 1024 * 1024
    }

    // Diagnostics defaults
    pub fn database_url_var() -> String {
        "DATABASE_URL".into()
    }
    pub fn supabase_vars() -> Vec<String> {
        vec!["SUPABASE_URL".into(), "SUPABASE_SERVICE_ROLE_KEY".into()]
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.health_path(), "/api/health");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [function]
            platform = "lambda"
            "#,
        )
        .unwrap();
        assert_eq!(config.function.platform, "lambda");
        assert_eq!(config.function.mount_prefix, "/.netlify/functions");
        assert_eq!(config.diagnostics.database_url_var, "DATABASE_URL");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_relative_prefix() {
        let mut config = Config::default();
        config.function.mount_prefix = ".netlify/functions".into();
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), "config");
        assert!(err.detail().contains("mount_prefix"));
    }

    #[test]
    fn test_validate_rejects_trailing_slash() {
        let mut config = Config::default();
        config.function.api_prefix = "/api/".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_binary_type() {
        let mut config = Config::default();
        config.function.binary_content_types = vec!["octet-stream".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut config = Config::default();
        config.function.max_response_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[function]\nplatform = \"vercel\"\napi_prefix = \"/v1\"\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.function.platform, "vercel");
        assert_eq!(config.health_path(), "/v1/health");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml"));
        assert_eq!(config.function.platform, "netlify");
    }
}
