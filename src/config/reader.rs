//! Option lookup with defaults fallback.
//!
//! Every option is resolved through the same two-level chain: the module's
//! own section first, then the shared defaults section, then whatever
//! hard-coded fallback the caller supplies. A missing option is never an
//! error; silently defaulting is the normal case.

use crate::config::ini::ConfigTree;

/// Read-only accessor over a [`ConfigTree`] with a designated defaults
/// section.
#[derive(Debug, Clone, Copy)]
pub struct SectionReader<'a> {
    tree: &'a ConfigTree,
    defaults_section: Option<&'a str>,
}

impl<'a> SectionReader<'a> {
    /// Create a reader. *defaults_section* is the name of the shared
    /// defaults section, if the configuration has one.
    pub fn new(tree: &'a ConfigTree, defaults_section: Option<&'a str>) -> Self {
        SectionReader {
            tree,
            defaults_section,
        }
    }

    /// Look up *option* in *section*, falling back to the defaults section.
    /// Returns `None` when neither defines it.
    pub fn get_option(&self, section: &str, option: &str) -> Option<&'a str> {
        self.tree.get(section, option).or_else(|| {
            self.defaults_section
                .and_then(|defaults| self.tree.get(defaults, option))
        })
    }

    /// Look up *option* as a whitespace-separated list.
    ///
    /// Unset (in both the section and the defaults) means an empty list.
    /// Multi-line values split the same way as single-line ones; tokens keep
    /// their source order.
    pub fn get_list(&self, section: &str, option: &str) -> Vec<String> {
        self.get_option(section, option)
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
