//! Error types for configuration expansion.
//!
//! Expansion is all-or-nothing: any error aborts the whole pass. A module
//! that silently fails to build is a worse failure mode than a loud
//! configuration error, so there is no partial-success path here.

use miette::Diagnostic;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while expanding a setup.cfg-style configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The configuration file itself is malformed.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(pyxcfg::config::format))]
    Format { message: String },

    /// An `eval(...)` value could not be resolved.
    #[error("failed to evaluate `eval({name})`: {message}")]
    #[diagnostic(
        code(pyxcfg::config::expression),
        help("register a provider for `{name}` on the expander before expanding")
    )]
    Expression { name: String, message: String },

    /// The external package-metadata tool failed or could not be launched.
    #[error("pkg-config failed for packages [{}]", packages.join(", "))]
    #[diagnostic(code(pyxcfg::pkgconfig::tool))]
    ExternalTool {
        packages: Vec<String>,
        #[source]
        source: anyhow::Error,
    },

    /// A boolean environment override held an unrecognized token.
    #[error("invalid boolean value {value:?} for environment variable {variable}")]
    #[diagnostic(
        code(pyxcfg::env::boolean),
        help("accepted values: 1, on, true, yes, 0, off, false, no")
    )]
    Environment { variable: String, value: String },
}

impl ConfigError {
    /// Format error with no line information.
    pub fn format(message: impl Into<String>) -> Self {
        ConfigError::Format {
            message: message.into(),
        }
    }

    /// Format error pinned to a 1-based line of the configuration text.
    pub fn format_at(message: impl Into<String>, line: usize) -> Self {
        ConfigError::Format {
            message: format!("line {}: {}", line, message.into()),
        }
    }
}
