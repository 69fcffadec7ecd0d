//! Parsed configuration tree and option lookup.

pub mod ini;
pub mod reader;

pub use ini::ConfigTree;
pub use reader::SectionReader;
