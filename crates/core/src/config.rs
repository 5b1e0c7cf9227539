//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the services. Request
//! handling never reads environment variables. The `*_from_env_value` helpers take the raw
//! optional string so the binaries decide where values come from.

use crate::constants::DEFAULT_SESSION_TTL_MINUTES;
use crate::{VaxError, VaxResult};
use chrono::Duration;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: Option<PathBuf>,
    session_ttl: Duration,
    seed_catalog: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Directory of the YAML store; `None` selects the in-memory store
    /// * `session_ttl` - Lifetime of a login session
    /// * `seed_catalog` - Whether to load the national schedule into an empty catalog
    ///
    /// # Errors
    ///
    /// Returns `VaxError::InvalidInput` if `session_ttl` is not positive.
    pub fn new(
        data_dir: Option<PathBuf>,
        session_ttl: Duration,
        seed_catalog: bool,
    ) -> VaxResult<Self> {
        if session_ttl <= Duration::zero() {
            return Err(VaxError::InvalidInput(
                "session lifetime must be positive".into(),
            ));
        }

        Ok(Self {
            data_dir,
            session_ttl,
            seed_catalog,
        })
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub fn seed_catalog(&self) -> bool {
        self.seed_catalog
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            session_ttl: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            seed_catalog: false,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the data directory. Missing or blank values select the in-memory store.
pub fn data_dir_from_env_value(value: Option<String>) -> Option<PathBuf> {
    non_blank(value).map(PathBuf::from)
}

/// Parse the session lifetime in minutes, defaulting to [`DEFAULT_SESSION_TTL_MINUTES`].
///
/// # Errors
///
/// Returns `VaxError::InvalidInput` if the value is not a positive integer.
pub fn session_ttl_from_env_value(value: Option<String>) -> VaxResult<Duration> {
    let Some(raw) = non_blank(value) else {
        return Ok(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES));
    };

    match raw.parse::<i64>().ok().filter(|m| *m > 0).and_then(Duration::try_minutes) {
        Some(ttl) => Ok(ttl),
        None => Err(VaxError::InvalidInput(format!(
            "session lifetime must be a positive number of minutes, got {raw:?}"
        ))),
    }
}

/// Parse a boolean switch. Missing or blank values are `false`.
///
/// # Errors
///
/// Returns `VaxError::InvalidInput` for anything other than the usual true/false spellings.
pub fn flag_from_env_value(value: Option<String>) -> VaxResult<bool> {
    let Some(raw) = non_blank(value) else {
        return Ok(false);
    };

    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(VaxError::InvalidInput(format!(
            "expected a boolean flag, got {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_data_dir_selects_memory() {
        assert_eq!(data_dir_from_env_value(None), None);
        assert_eq!(data_dir_from_env_value(Some("   ".into())), None);
        assert_eq!(
            data_dir_from_env_value(Some(" /srv/vax ".into())),
            Some(PathBuf::from("/srv/vax"))
        );
    }

    #[test]
    fn test_session_ttl_parsing() {
        assert_eq!(
            session_ttl_from_env_value(None).expect("default should parse"),
            Duration::minutes(DEFAULT_SESSION_TTL_MINUTES)
        );
        assert_eq!(
            session_ttl_from_env_value(Some("90".into())).expect("90 should parse"),
            Duration::minutes(90)
        );
        assert!(session_ttl_from_env_value(Some("0".into())).is_err());
        assert!(session_ttl_from_env_value(Some("soon".into())).is_err());
    }

    #[test]
    fn test_flag_parsing() {
        assert!(!flag_from_env_value(None).unwrap());
        assert!(flag_from_env_value(Some("Yes".into())).unwrap());
        assert!(!flag_from_env_value(Some("off".into())).unwrap());
        assert!(flag_from_env_value(Some("maybe".into())).is_err());
    }

    #[test]
    fn test_config_rejects_non_positive_ttl() {
        let err = CoreConfig::new(None, Duration::zero(), false)
            .expect_err("zero ttl should be rejected");
        assert!(matches!(err, VaxError::InvalidInput(_)));
    }
}
