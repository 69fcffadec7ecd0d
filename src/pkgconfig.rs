//! pkg-config integration.
//!
//! Externally-installed native libraries advertise their compiler and
//! linker flags through pkg-config. The resolver invokes the tool once per
//! module with `--cflags --libs`, parses the flag tokens, and splits them
//! into include directories, library directories, and library names.
//!
//! `PKG_CONFIG_PATH` is process-wide state. Extra search directories from
//! the configuration are installed for the duration of one query through
//! [`EnvGuard`], which restores the prior value on every exit path; two
//! expansion passes must never observe each other's search paths.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::util::process::ProcessBuilder;

/// The search-path environment variable read by pkg-config.
pub const PKG_CONFIG_PATH_ENV: &str = "PKG_CONFIG_PATH";

/// A pkg-config-style flag source.
///
/// The production implementation is [`PkgConfigCli`]; tests substitute a
/// stub returning a canned flag string.
pub trait PkgConfig {
    /// Return the combined `--cflags --libs` output for *packages*, as one
    /// whitespace-separated flag string.
    fn query(&self, packages: &[String]) -> anyhow::Result<String>;
}

/// Runs the real `pkg-config` binary.
#[derive(Debug, Clone)]
pub struct PkgConfigCli {
    program: PathBuf,
}

impl PkgConfigCli {
    pub fn new() -> Self {
        PkgConfigCli {
            program: PathBuf::from("pkg-config"),
        }
    }

    /// Use a specific pkg-config binary instead of the one on PATH.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        PkgConfigCli {
            program: program.into(),
        }
    }
}

impl Default for PkgConfigCli {
    fn default() -> Self {
        PkgConfigCli::new()
    }
}

impl PkgConfig for PkgConfigCli {
    fn query(&self, packages: &[String]) -> anyhow::Result<String> {
        ProcessBuilder::new(&self.program)
            .args(["--cflags", "--libs"])
            .args(packages)
            .exec_with_output()
    }
}

/// Flags reported by pkg-config, classified by prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFlags {
    /// `-I` entries, prefix stripped.
    pub include_dirs: Vec<String>,
    /// `-L` entries, prefix stripped.
    pub library_dirs: Vec<String>,
    /// `-l` entries, prefix stripped.
    pub libraries: Vec<String>,
}

/// Resolve flags for *packages*, searching *search_dirs* in addition to the
/// ambient `PKG_CONFIG_PATH`.
///
/// An empty package list returns empty flags without invoking the tool.
/// A tool failure is an [`ConfigError::ExternalTool`] error; the search
/// path is restored before it propagates.
pub fn resolve(
    runner: &dyn PkgConfig,
    packages: &[String],
    search_dirs: &[String],
) -> Result<ResolvedFlags> {
    if packages.is_empty() {
        return Ok(ResolvedFlags::default());
    }

    // Guard lives until after the query: restoration happens on the error
    // path too.
    let _guard = EnvGuard::extend_search_path(PKG_CONFIG_PATH_ENV, search_dirs);

    tracing::debug!(packages = ?packages, "querying pkg-config");
    let output = runner
        .query(packages)
        .map_err(|source| ConfigError::ExternalTool {
            packages: packages.to_vec(),
            source,
        })?;

    Ok(parse_flags(&output))
}

/// Split pkg-config output on whitespace and classify each token by its
/// two-character prefix. Unrecognized tokens (e.g. `-pthread`) are dropped.
fn parse_flags(output: &str) -> ResolvedFlags {
    let mut flags = ResolvedFlags::default();
    for token in output.split_whitespace() {
        if let Some(dir) = token.strip_prefix("-I") {
            flags.include_dirs.push(dir.to_string());
        } else if let Some(dir) = token.strip_prefix("-L") {
            flags.library_dirs.push(dir.to_string());
        } else if let Some(name) = token.strip_prefix("-l") {
            flags.libraries.push(name.to_string());
        }
    }
    flags
}

/// Scoped mutation of a search-path environment variable.
///
/// Captures the prior value on construction and restores it on drop,
/// removing the variable entirely when it was originally unset.
struct EnvGuard {
    name: &'static str,
    original: Option<OsString>,
}

impl EnvGuard {
    /// Append *dirs* to the path list held in *name* for the lifetime of
    /// the guard.
    fn extend_search_path(name: &'static str, dirs: &[String]) -> Self {
        let original = env::var_os(name);

        let mut entries: Vec<PathBuf> = original
            .as_deref()
            .map(|v| env::split_paths(v).collect())
            .unwrap_or_default();
        entries.extend(dirs.iter().map(PathBuf::from));

        if let Ok(joined) = env::join_paths(&entries) {
            env::set_var(name, joined);
        }

        EnvGuard { name, original }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.original.take() {
            Some(value) => env::set_var(self.name, value),
            None => env::remove_var(self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use serial_test::serial;

    use super::*;

    /// Stub responder recording whether it was invoked.
    struct StubPkgConfig {
        output: &'static str,
        fail: bool,
        calls: Cell<usize>,
        seen_path: Cell<Option<String>>,
    }

    impl StubPkgConfig {
        fn new(output: &'static str) -> Self {
            StubPkgConfig {
                output,
                fail: false,
                calls: Cell::new(0),
                seen_path: Cell::new(None),
            }
        }

        fn failing() -> Self {
            let mut stub = StubPkgConfig::new("");
            stub.fail = true;
            stub
        }
    }

    impl PkgConfig for StubPkgConfig {
        fn query(&self, _packages: &[String]) -> anyhow::Result<String> {
            self.calls.set(self.calls.get() + 1);
            self.seen_path.set(env::var(PKG_CONFIG_PATH_ENV).ok());
            if self.fail {
                anyhow::bail!("Package foo was not found in the pkg-config search path");
            }
            Ok(self.output.to_string())
        }
    }

    fn pkgs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags_classifies_prefixes() {
        let flags = parse_flags("-I/usr/include/foo -L/usr/lib/foo -lfoo -lbar -pthread");
        assert_eq!(flags.include_dirs, vec!["/usr/include/foo"]);
        assert_eq!(flags.library_dirs, vec!["/usr/lib/foo"]);
        assert_eq!(flags.libraries, vec!["foo", "bar"]);
    }

    #[test]
    #[serial]
    fn test_resolve_parses_and_restores_path() {
        env::set_var(PKG_CONFIG_PATH_ENV, "/original");
        let stub = StubPkgConfig::new("-I/usr/include/foo -L/usr/lib/foo -lfoo -lbar");

        let flags = resolve(&stub, &pkgs(&["foo"]), &[]).unwrap();
        assert_eq!(flags.include_dirs, vec!["/usr/include/foo"]);
        assert_eq!(flags.library_dirs, vec!["/usr/lib/foo"]);
        assert_eq!(flags.libraries, vec!["foo", "bar"]);

        assert_eq!(env::var(PKG_CONFIG_PATH_ENV).unwrap(), "/original");
        env::remove_var(PKG_CONFIG_PATH_ENV);
    }

    #[test]
    #[serial]
    fn test_resolve_extends_search_path_during_query() {
        env::set_var(PKG_CONFIG_PATH_ENV, "/original");
        let stub = StubPkgConfig::new("-lfoo");

        resolve(&stub, &pkgs(&["foo"]), &["/extra/pc".to_string()]).unwrap();

        let seen = stub.seen_path.take().unwrap();
        assert_eq!(seen, "/original:/extra/pc");
        assert_eq!(env::var(PKG_CONFIG_PATH_ENV).unwrap(), "/original");
        env::remove_var(PKG_CONFIG_PATH_ENV);
    }

    #[test]
    #[serial]
    fn test_resolve_restores_unset_variable_by_removing_it() {
        env::remove_var(PKG_CONFIG_PATH_ENV);
        let stub = StubPkgConfig::new("-lfoo");

        resolve(&stub, &pkgs(&["foo"]), &["/extra/pc".to_string()]).unwrap();

        assert_eq!(stub.seen_path.take().unwrap(), "/extra/pc");
        assert!(env::var_os(PKG_CONFIG_PATH_ENV).is_none());
    }

    #[test]
    #[serial]
    fn test_resolve_restores_path_on_failure() {
        env::set_var(PKG_CONFIG_PATH_ENV, "/original");
        let stub = StubPkgConfig::failing();

        let err = resolve(&stub, &pkgs(&["foo"]), &["/extra".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::ExternalTool { .. }));

        assert_eq!(env::var(PKG_CONFIG_PATH_ENV).unwrap(), "/original");
        env::remove_var(PKG_CONFIG_PATH_ENV);
    }

    #[test]
    #[serial]
    fn test_resolve_empty_packages_skips_tool() {
        let stub = StubPkgConfig::new("-lnever");

        let flags = resolve(&stub, &[], &["/extra".to_string()]).unwrap();
        assert_eq!(flags, ResolvedFlags::default());
        assert_eq!(stub.calls.get(), 0);
    }
}
