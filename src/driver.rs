//! Build-driver adaptation.
//!
//! Turns resolved [`ModuleDescriptor`]s into the extension specifications
//! the host packaging framework consumes, and picks the build step to
//! register with it. The plan itself performs no compilation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::expand::module::ModuleMap;
use crate::expand::sources::Language;
use crate::mode::BuildMode;
use crate::util::process::find_executable;

/// One compiled-extension specification for the host framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionSpec {
    /// Dotted module name.
    pub name: String,
    pub language: Option<Language>,
    pub sources: Vec<String>,
    pub include_dirs: Vec<String>,
    pub library_dirs: Vec<String>,
    pub libraries: Vec<String>,
    pub extra_compile_args: Vec<String>,
    /// Cython compiler directives (currently only `profile`).
    pub cython_directives: HashMap<String, bool>,
}

/// The build-step implementation to register with the host framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStep {
    /// Run Cython on `.pyx` sources, then compile the generated code.
    Cythonize,
    /// Compile pre-generated C/C++ sources directly.
    CompileOnly,
    /// Do nothing. Selected when cythonizing was requested but no Cython
    /// toolchain is installed, so that introspection-only operations
    /// (metadata queries, sdist listing) still work.
    Noop,
}

impl BuildStep {
    /// Select the step for *mode*, probing PATH for the Cython toolchain.
    pub fn select(mode: BuildMode) -> BuildStep {
        let cython_available =
            find_executable("cython").is_some() || find_executable("cythonize").is_some();
        BuildStep::select_with_toolchain(mode, cython_available)
    }

    fn select_with_toolchain(mode: BuildMode, cython_available: bool) -> BuildStep {
        if !mode.cythonize {
            BuildStep::CompileOnly
        } else if cython_available {
            BuildStep::Cythonize
        } else {
            tracing::warn!(
                "cythonize requested but no cython binary found; registering a no-op build step"
            );
            BuildStep::Noop
        }
    }
}

/// Everything the thin extension-builder driver needs: specs plus the
/// step to run them with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Extension specs, sorted by module name for stable output.
    pub extensions: Vec<ExtensionSpec>,
    pub step: BuildStep,
}

/// Adapt expanded descriptors into a build plan for *mode*.
///
/// Descriptor fields pass through unchanged; when profiling is enabled
/// every extension gets the Cython `profile` directive.
pub fn create_build_plan(modules: &ModuleMap, mode: BuildMode) -> BuildPlan {
    let mut extensions: Vec<ExtensionSpec> = modules
        .iter()
        .map(|(name, descriptor)| {
            let mut cython_directives = HashMap::new();
            if mode.profile {
                cython_directives.insert("profile".to_string(), true);
            }
            ExtensionSpec {
                name: name.clone(),
                language: descriptor.language,
                sources: descriptor.sources.clone(),
                include_dirs: descriptor.include_dirs.clone(),
                library_dirs: descriptor.library_dirs.clone(),
                libraries: descriptor.libraries.clone(),
                extra_compile_args: descriptor.extra_compile_args.clone(),
                cython_directives,
            }
        })
        .collect();
    extensions.sort_by(|a, b| a.name.cmp(&b.name));

    BuildPlan {
        extensions,
        step: BuildStep::select(mode),
    }
}
