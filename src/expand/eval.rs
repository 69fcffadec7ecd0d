//! `eval(...)` value resolution.
//!
//! Configuration values of the form `eval(<name>)` stand for build-time
//! discoverable values, typically include directories of installed
//! packages (`include_dirs = eval(numpy_include)`). Names resolve against
//! an explicit registry of zero-argument providers the embedding
//! application populates; nothing outside the registry can run. This is a
//! deliberately narrow trust boundary: configuration authors pick from
//! what the driver registered, they do not get an interpreter.

use std::collections::HashMap;

use crate::error::{ConfigError, Result};

type Provider = Box<dyn Fn() -> anyhow::Result<Vec<String>>>;

/// Registry of named value providers for `eval(...)` expressions.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Provider>,
}

impl ProviderRegistry {
    /// Create an empty registry. Any `eval(...)` value fails until a
    /// provider with that name is registered.
    pub fn new() -> Self {
        ProviderRegistry {
            providers: HashMap::new(),
        }
    }

    /// Register a provider function. The returned strings are spliced into
    /// the enclosing list in order.
    pub fn register<F>(&mut self, name: impl Into<String>, provider: F)
    where
        F: Fn() -> anyhow::Result<Vec<String>> + 'static,
    {
        self.providers.insert(name.into(), Box::new(provider));
    }

    /// Register a provider yielding a single fixed string.
    pub fn register_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        self.register(name, move || Ok(vec![value.clone()]));
    }

    /// Resolve one list of raw values: `eval(<name>)` entries are replaced
    /// by their provider's output (flattened), everything else passes
    /// through literally.
    pub fn eval_list(&self, values: &[String]) -> Result<Vec<String>> {
        let mut resolved = Vec::with_capacity(values.len());
        for value in values {
            match parse_eval(value) {
                Some(name) => resolved.extend(self.invoke(name)?),
                None => resolved.push(value.clone()),
            }
        }
        Ok(resolved)
    }

    fn invoke(&self, name: &str) -> Result<Vec<String>> {
        let provider = self
            .providers
            .get(name)
            .ok_or_else(|| ConfigError::Expression {
                name: name.to_string(),
                message: "no provider registered under this name".to_string(),
            })?;
        provider().map_err(|e| ConfigError::Expression {
            name: name.to_string(),
            message: e.to_string(),
        })
    }
}

/// Return the provider name when *value* is syntactically `eval(<name>)`.
fn parse_eval(value: &str) -> Option<&str> {
    value
        .strip_prefix("eval(")
        .and_then(|rest| rest.strip_suffix(')'))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_literals_pass_through() {
        let registry = ProviderRegistry::new();
        let out = registry
            .eval_list(&values(&["/usr/include", "eval-not-wrapped"]))
            .unwrap();
        assert_eq!(out, vec!["/usr/include", "eval-not-wrapped"]);
    }

    #[test]
    fn test_provider_value_is_substituted() {
        let mut registry = ProviderRegistry::new();
        registry.register_value("numpy_include", "/opt/numpy/include");

        let out = registry
            .eval_list(&values(&["eval(numpy_include)", "/usr/include"]))
            .unwrap();
        assert_eq!(out, vec!["/opt/numpy/include", "/usr/include"]);
    }

    #[test]
    fn test_provider_list_is_flattened() {
        let mut registry = ProviderRegistry::new();
        registry.register("sdk_includes", || {
            Ok(vec!["/sdk/a".to_string(), "/sdk/b".to_string()])
        });

        let out = registry.eval_list(&values(&["eval(sdk_includes)"])).unwrap();
        assert_eq!(out, vec!["/sdk/a", "/sdk/b"]);
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        let registry = ProviderRegistry::new();
        let err = registry.eval_list(&values(&["eval(nope)"])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Expression { ref name, .. } if name == "nope"
        ));
    }

    #[test]
    fn test_failing_provider_is_an_error() {
        let mut registry = ProviderRegistry::new();
        registry.register("broken", || anyhow::bail!("package not installed"));

        let err = registry.eval_list(&values(&["eval(broken)"])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Expression { ref message, .. } if message.contains("not installed")
        ));
    }

    #[test]
    fn test_name_is_trimmed() {
        let mut registry = ProviderRegistry::new();
        registry.register_value("x", "/x");
        let out = registry.eval_list(&values(&["eval( x )"])).unwrap();
        assert_eq!(out, vec!["/x"]);
    }
}
