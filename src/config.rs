// src/config.rs

//! Configuration loading utilities.
//!
//! The function host gives us nothing but environment variables, so the
//! runtime configuration is a TOML file (optional) with environment
//! overrides applied on top.
//!
//! ## Environment Variables
//!
//! - `FUNCTION_CONFIG`: Path to the TOML file (default: `function.toml`)
//! - `DEPLOY_PLATFORM`: Platform identifier reported by the health route
//! - `FUNCTION_MOUNT_PREFIX`: Prefix the host adds in front of forwarded paths
//! - `API_PREFIX`: Logical prefix of the application routes
//! - `MAX_RESPONSE_BYTES`: Response body size limit

use std::path::{Path, PathBuf};

use crate::models::Config;
use crate::utils::{EnvLookup, process_env};

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "function.toml";

/// Resolve the config file path from `FUNCTION_CONFIG`.
pub fn config_path(env: &EnvLookup) -> PathBuf {
    env("FUNCTION_CONFIG")
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Load configuration from the file (if it exists) and apply overrides from
/// the process environment.
pub fn load_from_env() -> Config {
    load_with(&process_env())
}

/// Same as [`load_from_env`] with an explicit lookup.
pub fn load_with(env: &EnvLookup) -> Config {
    let path = config_path(env);
    let mut config = load_file_or_default(&path);
    apply_overrides(&mut config, env);
    config
}

/// A missing file is normal on function hosts; only a file that exists but
/// fails to parse is worth a warning.
fn load_file_or_default(path: &Path) -> Config {
    if path.exists() {
        Config::load_or_default(path)
    } else {
        log::debug!("No config file at {:?}, using defaults", path);
        Config::default()
    }
}

/// Apply environment overrides to a loaded configuration.
pub fn apply_overrides(config: &mut Config, env: &EnvLookup) {
    if let Some(platform) = env("DEPLOY_PLATFORM").filter(|v| !v.is_empty()) {
        config.function.platform = platform;
    }

    if let Some(prefix) = env("FUNCTION_MOUNT_PREFIX").filter(|v| !v.is_empty()) {
        config.function.mount_prefix = prefix;
    }

    if let Some(prefix) = env("API_PREFIX").filter(|v| !v.is_empty()) {
        config.function.api_prefix = prefix;
    }

    if let Some(limit) = env("MAX_RESPONSE_BYTES") {
        match limit.parse() {
            Ok(bytes) => config.function.max_response_bytes = bytes,
            Err(_) => log::warn!("Ignoring invalid MAX_RESPONSE_BYTES: {:?}", limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::utils::fixed_env;

    #[test]
    fn test_defaults_without_env() {
        let env = fixed_env(Vec::<(String, String)>::new());
        assert_eq!(config_path(&env), PathBuf::from("function.toml"));

        let mut config = Config::default();
        apply_overrides(&mut config, &env);
        assert_eq!(config.function.platform, "netlify");
    }

    #[test]
    fn test_env_overrides() {
        let env = fixed_env([
            ("DEPLOY_PLATFORM", "aws-lambda"),
            ("API_PREFIX", "/v2"),
            ("MAX_RESPONSE_BYTES", "1024"),
        ]);
        let mut config = Config::default();
        apply_overrides(&mut config, &env);

        assert_eq!(config.function.platform, "aws-lambda");
        assert_eq!(config.function.api_prefix, "/v2");
        assert_eq!(config.function.mount_prefix, "/.netlify/functions");
        assert_eq!(config.function.max_response_bytes, 1024);
    }

    #[test]
    fn test_invalid_limit_is_ignored() {
        let env = fixed_env([("MAX_RESPONSE_BYTES", "lots")]);
        let mut config = Config::default();
        apply_overrides(&mut config, &env);
        assert_eq!(config.function.max_response_bytes, 6 * 1024 * 1024);
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[function]\nplatform = \"from-file\"\napi_prefix = \"/rest\"").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let env = fixed_env([("FUNCTION_CONFIG", path.as_str()), ("DEPLOY_PLATFORM", "from-env")]);
        let config = load_with(&env);

        assert_eq!(config.function.platform, "from-env");
        assert_eq!(config.function.api_prefix, "/rest");
    }
}
