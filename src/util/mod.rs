//! Shared utilities

pub mod paths;
pub mod process;

pub use paths::absolutize;
pub use process::ProcessBuilder;
