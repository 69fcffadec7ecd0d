//! pyxcfg - declarative build configuration for Cython extension modules.
//!
//! Cython modules are described in an INI-style setup.cfg instead of
//! imperative build-script code, for example:
//!
//! ```ini
//! [cython-defaults]
//! extra_compile_args = -O2
//!
//! [cython-module: foo.bar]
//! sources = foo.pyx
//!           bar.cpp
//! include_dirs = eval(numpy_include)
//!                /usr/include/foo
//! language = c++
//! pkg_config_packages = openscenegraph-osg
//! ```
//!
//! An [`Expander`] resolves every module section against the shared
//! defaults, evaluates `eval(...)` values through registered providers,
//! queries pkg-config for externally-installed libraries, and rewrites
//! source extensions for the selected [`BuildMode`]. The resulting
//! descriptors are adapted into a [`driver::BuildPlan`] for the host
//! packaging framework.
//!
//! ```no_run
//! use pyxcfg::{BuildMode, Expander};
//!
//! # fn main() -> pyxcfg::Result<()> {
//! let mode = BuildMode::from_env(true)?;
//! let modules = Expander::new(mode)
//!     .with_base_dir("/path/to/package")
//!     .with_provider_value("numpy_include", "/opt/numpy/include")
//!     .expand_file("setup.cfg".as_ref())?;
//! let plan = pyxcfg::driver::create_build_plan(&modules, mode);
//! # let _ = plan;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod expand;
pub mod mode;
pub mod pkgconfig;
pub mod util;

pub use driver::{create_build_plan, BuildPlan, BuildStep, ExtensionSpec};
pub use error::{ConfigError, Result};
pub use expand::{
    Expander, Language, ModuleDescriptor, ModuleMap, ProviderRegistry, DEFAULTS_SECTION,
    MODULE_SECTION_PREFIX,
};
pub use mode::BuildMode;
pub use pkgconfig::{PkgConfig, PkgConfigCli};
