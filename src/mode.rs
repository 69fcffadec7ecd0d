//! Build mode selection.
//!
//! Two process-wide switches control how Cython modules are built:
//! - `CYTHONIZE` - build from `.pyx` sources (requires Cython) instead of
//!   pre-generated C/C++ sources shipped with the package;
//! - `PROFILE_CYTHON` - enable Cython profiling instrumentation.
//!
//! Environment values override the caller-supplied default, so packages
//! that distribute generated C files can still regenerate them with
//! `CYTHONIZE=1`.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Environment variable selecting transpile mode.
pub const CYTHONIZE_ENV: &str = "CYTHONIZE";

/// Environment variable selecting profiling instrumentation.
pub const PROFILE_ENV: &str = "PROFILE_CYTHON";

/// Resolved build mode for one configuration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMode {
    /// Build from `.pyx` sources (true) or pre-generated native sources.
    pub cythonize: bool,

    /// Enable the Cython `profile` directive.
    pub profile: bool,
}

impl BuildMode {
    /// Create a mode with profiling off.
    pub fn new(cythonize: bool) -> Self {
        BuildMode {
            cythonize,
            profile: false,
        }
    }

    /// Resolve the mode from the environment, layered over *default_cythonize*.
    ///
    /// Profiling defaults to off and can only be enabled via the
    /// environment.
    pub fn from_env(default_cythonize: bool) -> Result<Self> {
        Ok(BuildMode {
            cythonize: bool_from_env(CYTHONIZE_ENV, default_cythonize)?,
            profile: bool_from_env(PROFILE_ENV, false)?,
        })
    }
}

impl Default for BuildMode {
    fn default() -> Self {
        BuildMode::new(true)
    }
}

/// Read a boolean switch from the environment, falling back to *default*
/// when the variable is unset.
fn bool_from_env(variable: &str, default: bool) -> Result<bool> {
    match std::env::var(variable) {
        Ok(value) => parse_bool(variable, &value),
        Err(_) => Ok(default),
    }
}

/// Parse a boolean token, case-insensitively.
///
/// Accepted: `1`, `on`, `true`, `yes` / `0`, `off`, `false`, `no`.
/// Anything else is a configuration error, not a silent default.
fn parse_bool(variable: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Ok(true),
        "0" | "off" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::Environment {
            variable: variable.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_parse_bool_tokens() {
        for token in ["1", "on", "true", "yes", "YES", "On", "TRUE"] {
            assert!(parse_bool("CYTHONIZE", token).unwrap(), "{}", token);
        }
        for token in ["0", "off", "false", "no", "OFF", "No", "FALSE"] {
            assert!(!parse_bool("CYTHONIZE", token).unwrap(), "{}", token);
        }
    }

    #[test]
    fn test_parse_bool_rejects_unknown_token() {
        let err = parse_bool("PROFILE_CYTHON", "maybe").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Environment { ref variable, ref value }
                if variable == "PROFILE_CYTHON" && value == "maybe"
        ));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults_when_unset() {
        std::env::remove_var(CYTHONIZE_ENV);
        std::env::remove_var(PROFILE_ENV);

        let mode = BuildMode::from_env(true).unwrap();
        assert!(mode.cythonize);
        assert!(!mode.profile);

        let mode = BuildMode::from_env(false).unwrap();
        assert!(!mode.cythonize);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides_default() {
        std::env::set_var(CYTHONIZE_ENV, "0");
        std::env::set_var(PROFILE_ENV, "yes");

        let mode = BuildMode::from_env(true).unwrap();
        assert!(!mode.cythonize);
        assert!(mode.profile);

        std::env::remove_var(CYTHONIZE_ENV);
        std::env::remove_var(PROFILE_ENV);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_value() {
        std::env::set_var(CYTHONIZE_ENV, "maybe");
        let err = BuildMode::from_env(true).unwrap_err();
        assert!(matches!(err, ConfigError::Environment { .. }));
        std::env::remove_var(CYTHONIZE_ENV);
    }
}
