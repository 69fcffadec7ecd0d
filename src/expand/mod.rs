//! Configuration expansion.
//!
//! The [`Expander`] walks a parsed setup.cfg, resolves every
//! `[cython-module: NAME]` section against the shared `[cython-defaults]`
//! section, and produces the module-name -> [`ModuleDescriptor`] mapping
//! the build driver consumes. Expansion is a one-shot, single-threaded
//! batch: any failure in any module aborts the whole pass.

pub mod eval;
pub mod module;
pub mod sources;

use std::path::{Path, PathBuf};

use crate::config::{ConfigTree, SectionReader};
use crate::error::{ConfigError, Result};
use crate::mode::BuildMode;
use crate::pkgconfig::{PkgConfig, PkgConfigCli};

pub use eval::ProviderRegistry;
pub use module::{ModuleDescriptor, ModuleMap};
pub use sources::Language;

/// Reserved prefix of module section names; the trimmed remainder is the
/// dotted module name.
pub const MODULE_SECTION_PREFIX: &str = "cython-module:";

/// Reserved name of the shared defaults section.
pub const DEFAULTS_SECTION: &str = "cython-defaults";

/// Expands a declarative configuration into module descriptors.
///
/// Construction is cheap and infallible; all I/O happens in
/// [`Expander::expand`]. The pkg-config runner defaults to the real
/// `pkg-config` binary and can be substituted for tests or sandboxed
/// builds.
pub struct Expander {
    mode: BuildMode,
    base_dir: PathBuf,
    providers: ProviderRegistry,
    pkg_config: Box<dyn PkgConfig>,
    exclude_tags: Vec<String>,
}

impl Expander {
    /// Create an expander for *mode* with an empty provider registry and
    /// the real pkg-config runner.
    pub fn new(mode: BuildMode) -> Self {
        Expander {
            mode,
            base_dir: PathBuf::new(),
            providers: ProviderRegistry::new(),
            pkg_config: Box::new(PkgConfigCli::new()),
            exclude_tags: Vec::new(),
        }
    }

    /// Base directory against which relative include/library paths are
    /// made absolute. Defaults to empty, leaving relative paths as-is.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Substitute the pkg-config runner.
    pub fn with_pkg_config(mut self, runner: impl PkgConfig + 'static) -> Self {
        self.pkg_config = Box::new(runner);
        self
    }

    /// Skip any module whose `tags` list intersects *tags*.
    pub fn with_exclude_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Register a zero-argument value provider for `eval(<name>)` values.
    pub fn with_provider<F>(mut self, name: impl Into<String>, provider: F) -> Self
    where
        F: Fn() -> anyhow::Result<Vec<String>> + 'static,
    {
        self.providers.register(name, provider);
        self
    }

    /// Register a provider yielding a single fixed string.
    pub fn with_provider_value(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.providers.register_value(name, value);
        self
    }

    /// The mode this expander resolves for.
    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Expand configuration text into descriptors keyed by module name.
    ///
    /// The result is a name-keyed lookup; callers must not depend on
    /// cross-module ordering. Within one descriptor every list preserves
    /// source order.
    pub fn expand(&self, text: &str) -> Result<ModuleMap> {
        let tree = ConfigTree::parse(text)?;
        let defaults = tree.section(DEFAULTS_SECTION).map(|_| DEFAULTS_SECTION);
        let reader = SectionReader::new(&tree, defaults);

        let mut modules = ModuleMap::new();
        for section in tree.section_names() {
            let Some(rest) = section.strip_prefix(MODULE_SECTION_PREFIX) else {
                continue;
            };
            let name = rest.trim();
            tracing::debug!(module = name, "expanding cython module");

            let expanded = module::expand_module(
                &reader,
                section,
                self.mode,
                &self.base_dir,
                &self.providers,
                self.pkg_config.as_ref(),
                &self.exclude_tags,
            )?;
            if let Some(descriptor) = expanded {
                modules.insert(name.to_string(), descriptor);
            }
        }
        Ok(modules)
    }

    /// Expand a configuration file from disk.
    pub fn expand_file(&self, path: &Path) -> Result<ModuleMap> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::format(format!("failed to read {}: {}", path.display(), e))
        })?;
        self.expand(&text)
    }
}
