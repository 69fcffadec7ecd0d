//! INI-style configuration parsing.
//!
//! setup.cfg follows the Python configparser dialect: `[section]` headers,
//! `key = value` (or `key: value`) options, `#`/`;` comments, and
//! indented continuation lines that extend the previous option's value.
//! That dialect, continuation lines included, is small enough to parse
//! directly here; the tree is immutable once parsed.
//!
//! Duplicate section or option names are rejected outright. The legacy
//! behavior of silently keeping the last occurrence made a mistyped
//! second `[cython-defaults]` section swallow the first one's options.

use std::collections::HashMap;

use crate::error::{ConfigError, Result};

/// Parsed configuration: section name -> option name -> raw value.
#[derive(Debug, Clone, Default)]
pub struct ConfigTree {
    sections: HashMap<String, HashMap<String, String>>,
}

impl ConfigTree {
    /// Parse configuration text into a tree.
    pub fn parse(text: &str) -> Result<Self> {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        // (section, option) of the last parsed key, for continuation lines
        let mut current_section: Option<String> = None;
        let mut current_option: Option<String> = None;

        for (idx, raw_line) in text.lines().enumerate() {
            let lineno = idx + 1;
            let line = raw_line.trim_end();

            if line.trim().is_empty() {
                continue;
            }
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Indented non-blank line continues the previous option value.
            if line.starts_with(|c: char| c.is_whitespace()) {
                let (section, option) = match (&current_section, &current_option) {
                    (Some(s), Some(o)) => (s, o),
                    _ => {
                        return Err(ConfigError::format_at(
                            "continuation line without a preceding option",
                            lineno,
                        ))
                    }
                };
                let value = sections
                    .get_mut(section)
                    .and_then(|opts| opts.get_mut(option))
                    .ok_or_else(|| {
                        ConfigError::format_at("continuation line without a preceding option", lineno)
                    })?;
                value.push('\n');
                value.push_str(trimmed);
                continue;
            }

            if let Some(name) = parse_section_header(line) {
                if sections.contains_key(name) {
                    return Err(ConfigError::format_at(
                        format!("duplicate section `{}`", name),
                        lineno,
                    ));
                }
                sections.insert(name.to_string(), HashMap::new());
                current_section = Some(name.to_string());
                current_option = None;
                continue;
            }

            let (option, value) = parse_option_line(line)
                .ok_or_else(|| ConfigError::format_at(format!("expected `key = value`, got {:?}", line), lineno))?;
            let section = current_section.as_ref().ok_or_else(|| {
                ConfigError::format_at(format!("option `{}` outside of any section", option), lineno)
            })?;

            let opts = sections.get_mut(section).unwrap();
            if opts.contains_key(option) {
                return Err(ConfigError::format_at(
                    format!("duplicate option `{}` in section `{}`", option, section),
                    lineno,
                ));
            }
            opts.insert(option.to_string(), value.to_string());
            current_option = Some(option.to_string());
        }

        Ok(ConfigTree { sections })
    }

    /// Look up a section by exact name.
    pub fn section(&self, name: &str) -> Option<&HashMap<String, String>> {
        self.sections.get(name)
    }

    /// Iterate over all section names, in no particular order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Look up a single raw option value.
    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|opts| opts.get(option))
            .map(String::as_str)
    }
}

fn parse_section_header(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('[')?;
    let name = rest.strip_suffix(']')?;
    Some(name.trim())
}

fn parse_option_line(line: &str) -> Option<(&str, &str)> {
    // The delimiter is whichever of `=` / `:` comes first.
    let pos = line.find(['=', ':'])?;
    let (key, rest) = line.split_at(pos);
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, rest[1..].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_and_options() {
        let tree = ConfigTree::parse(
            "[metadata]\nname = gpmf\n\n[cython-module: gpmf.parser]\nlanguage = c\n",
        )
        .unwrap();

        assert_eq!(tree.get("metadata", "name"), Some("gpmf"));
        assert_eq!(tree.get("cython-module: gpmf.parser", "language"), Some("c"));
        assert_eq!(tree.get("metadata", "missing"), None);
        assert_eq!(tree.get("missing", "name"), None);
    }

    #[test]
    fn test_parse_colon_delimiter_and_comments() {
        let tree = ConfigTree::parse(
            "# top comment\n[main]\n; another comment\nkey: value\nempty =\n",
        )
        .unwrap();

        assert_eq!(tree.get("main", "key"), Some("value"));
        assert_eq!(tree.get("main", "empty"), Some(""));
    }

    #[test]
    fn test_parse_continuation_lines() {
        let tree = ConfigTree::parse(
            "[cython-module: foo]\nsources = foo.pyx\n    helper.c\n    other.cpp\n",
        )
        .unwrap();

        assert_eq!(
            tree.get("cython-module: foo", "sources"),
            Some("foo.pyx\nhelper.c\nother.cpp")
        );
    }

    #[test]
    fn test_parse_rejects_duplicate_section() {
        let err = ConfigTree::parse("[cython-defaults]\n[cython-defaults]\n").unwrap_err();
        assert!(err.to_string().contains("duplicate section"));
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_rejects_duplicate_option() {
        let err = ConfigTree::parse("[a]\nx = 1\nx = 2\n").unwrap_err();
        assert!(err.to_string().contains("duplicate option"));
    }

    #[test]
    fn test_parse_rejects_orphan_lines() {
        assert!(ConfigTree::parse("key = value\n").is_err());
        assert!(ConfigTree::parse("[a]\n    dangling\n").is_err());
        assert!(ConfigTree::parse("[a]\nnot an option\n").is_err());
    }

    #[test]
    fn test_section_names() {
        let tree = ConfigTree::parse("[one]\n[two]\n").unwrap();
        let mut names: Vec<_> = tree.section_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["one", "two"]);
    }
}
