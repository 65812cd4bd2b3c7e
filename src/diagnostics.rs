// src/diagnostics.rs

//! Environment presence checks reported when the function cannot serve.
//!
//! Only presence is ever reported, never values.

use serde::Serialize;

use crate::error::AppError;
use crate::models::{DiagnosticsConfig, FailureEnvelope, REASON_INIT_FAILED};
use crate::utils::{EnvLookup, is_present};

/// Which of the watched variables are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvPresence {
    pub has_database_url: bool,
    /// True only when every credential variable is set
    pub has_supabase: bool,
}

impl EnvPresence {
    pub fn probe(config: &DiagnosticsConfig, env: &EnvLookup) -> Self {
        let has_supabase = !config.supabase_vars.is_empty()
            && config.supabase_vars.iter().all(|name| is_present(env, name));
        Self {
            has_database_url: is_present(env, &config.database_url_var),
            has_supabase,
        }
    }
}

/// Failure envelope for an error that escaped adapter building or delegation.
pub fn failure_envelope(err: &AppError, path: Option<&str>, presence: EnvPresence) -> FailureEnvelope {
    FailureEnvelope {
        ok: false,
        reason: REASON_INIT_FAILED.to_string(),
        kind: err.kind().to_string(),
        message: err.detail(),
        path: path.map(str::to_string),
        has_database_url: presence.has_database_url,
        has_supabase: presence.has_supabase,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fixed_env;

    #[test]
    fn test_probe_requires_both_credentials() {
        let config = DiagnosticsConfig::default();

        let env = fixed_env([("DATABASE_URL", "postgres://x"), ("SUPABASE_URL", "https://x")]);
        let presence = EnvPresence::probe(&config, &env);
        assert!(presence.has_database_url);
        assert!(!presence.has_supabase);

        let env = fixed_env([
            ("SUPABASE_URL", "https://x"),
            ("SUPABASE_SERVICE_ROLE_KEY", "key"),
        ]);
        let presence = EnvPresence::probe(&config, &env);
        assert!(!presence.has_database_url);
        assert!(presence.has_supabase);
    }

    #[test]
    fn test_empty_credential_list_is_absent() {
        let config = DiagnosticsConfig {
            supabase_vars: Vec::new(),
            ..Default::default()
        };
        let env = fixed_env([("SUPABASE_URL", "https://x")]);
        assert!(!EnvPresence::probe(&config, &env).has_supabase);
    }

    #[test]
    fn test_envelope_from_error() {
        let err = AppError::config("function.mount_prefix must start with '/'");
        let presence = EnvPresence {
            has_database_url: true,
            has_supabase: false,
        };
        let envelope = failure_envelope(&err, Some("/api/health"), presence);
        assert!(!envelope.ok);
        assert_eq!(envelope.reason, "init_failed");
        assert_eq!(envelope.kind, "config");
        assert_eq!(envelope.message, "function.mount_prefix must start with '/'");
        assert_eq!(envelope.path.as_deref(), Some("/api/health"));
        assert!(envelope.has_database_url);
    }
}
