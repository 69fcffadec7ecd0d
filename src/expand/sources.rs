//! Source file extension rewriting.
//!
//! A module mixes at most a handful of `.pyx` files with plain C/C++
//! helpers. Which on-disk file a `.pyx` entry actually compiles from
//! depends on the build mode: the `.pyx` itself when cythonizing, or the
//! pre-generated `.c`/`.cpp` next to it otherwise. Non-`.pyx` entries are
//! never touched.

use serde::{Deserialize, Serialize};

/// Extension of Cython source files.
pub const PYX_EXT: &str = ".pyx";

/// Extension of pre-generated C sources.
pub const C_EXT: &str = ".c";

/// Extension of pre-generated C++ sources.
pub const CPP_EXT: &str = ".cpp";

/// Implementation language of the generated native code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C
    C,
    /// C++
    #[serde(rename = "c++", alias = "cpp", alias = "cxx")]
    Cxx,
}

impl Language {
    /// Parse a `language` option value. Anything other than `c` selects
    /// C++, mirroring how generated-source extensions are chosen.
    pub fn parse(value: &str) -> Language {
        if value.eq_ignore_ascii_case("c") {
            Language::C
        } else {
            Language::Cxx
        }
    }

    /// The language name as the host build framework spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
        }
    }
}

/// Compute the target extension for a module's `.pyx` entries.
///
/// When *language* is unset the generated code is assumed to be C++.
fn target_ext(language: Option<Language>, cythonize: bool) -> &'static str {
    if cythonize {
        PYX_EXT
    } else {
        match language {
            Some(Language::C) => C_EXT,
            _ => CPP_EXT,
        }
    }
}

/// Rewrite every `.pyx` entry in *sources* to the extension implied by
/// *language* and *cythonize*; all other entries pass through unchanged.
pub fn rewrite_sources(
    sources: &[String],
    language: Option<Language>,
    cythonize: bool,
) -> Vec<String> {
    let ext = target_ext(language, cythonize);
    sources
        .iter()
        .map(|source| match source.strip_suffix(PYX_EXT) {
            Some(stem) => format!("{}{}", stem, ext),
            None => source.clone(),
        })
        .collect()
}
