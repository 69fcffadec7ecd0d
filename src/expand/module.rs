//! Per-module expansion.
//!
//! One `[cython-module: NAME]` section resolves into one
//! [`ModuleDescriptor`]. Resolution order matters: the language feeds the
//! source rewrite, and pkg-config results are appended after the
//! file-declared entries so the file keeps link-line precedence.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SectionReader;
use crate::error::{ConfigError, Result};
use crate::expand::eval::ProviderRegistry;
use crate::expand::sources::{rewrite_sources, Language};
use crate::mode::BuildMode;
use crate::pkgconfig::{self, PkgConfig};
use crate::util::paths::absolutize;

/// Fully resolved build configuration for one extension module.
///
/// Never mutated after expansion; the driver adapter only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Implementation language; `None` leaves the choice to the host
    /// framework (which treats it as C).
    pub language: Option<Language>,

    /// Extra arguments passed to the compiler.
    pub extra_compile_args: Vec<String>,

    /// Source files, extensions already rewritten for the build mode.
    pub sources: Vec<String>,

    /// Include directories: file-declared first, then pkg-config results.
    pub include_dirs: Vec<String>,

    /// Library directories: file-declared first, then pkg-config results.
    pub library_dirs: Vec<String>,

    /// Libraries to link: file-declared first, then pkg-config results.
    pub libraries: Vec<String>,
}

/// Expand one module section.
///
/// Returns `Ok(None)` when the section's `tags` intersect *exclude_tags*;
/// an excluded module does not appear in the result at all. Any other
/// failure aborts the whole expansion.
#[allow(clippy::too_many_arguments)]
pub(crate) fn expand_module(
    reader: &SectionReader<'_>,
    section: &str,
    mode: BuildMode,
    base_dir: &Path,
    providers: &ProviderRegistry,
    pkg_config: &dyn PkgConfig,
    exclude_tags: &[String],
) -> Result<Option<ModuleDescriptor>> {
    let tags = reader.get_list(section, "tags");
    if tags.iter().any(|tag| exclude_tags.contains(tag)) {
        tracing::debug!(section, ?tags, "skipping module excluded by tags");
        return Ok(None);
    }

    let language = reader
        .get_option(section, "language")
        .map(Language::parse);
    let extra_compile_args = reader.get_list(section, "extra_compile_args");

    let raw_sources = reader.get_list(section, "sources");
    if raw_sources.is_empty() {
        return Err(ConfigError::format(format!(
            "section `{}` is missing required option `sources`",
            section
        )));
    }
    let sources = rewrite_sources(&raw_sources, language, mode.cythonize);

    let pc = pkgconfig::resolve(
        pkg_config,
        &reader.get_list(section, "pkg_config_packages"),
        &reader.get_list(section, "pkg_config_dirs"),
    )?;

    let evaluated = providers.eval_list(&reader.get_list(section, "include_dirs"))?;
    let mut include_dirs = absolutize(&evaluated, base_dir);
    include_dirs.extend(pc.include_dirs);

    let mut library_dirs = absolutize(&reader.get_list(section, "library_dirs"), base_dir);
    library_dirs.extend(pc.library_dirs);

    let mut libraries = reader.get_list(section, "libraries");
    libraries.extend(pc.libraries);

    Ok(Some(ModuleDescriptor {
        language,
        extra_compile_args,
        sources,
        include_dirs,
        library_dirs,
        libraries,
    }))
}

/// Descriptors keyed by dotted module name.
pub type ModuleMap = HashMap<String, ModuleDescriptor>;
