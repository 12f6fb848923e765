//! wac — web access checker frontend: arguments, URL source and reporting.

pub mod args;
pub mod config;
pub mod report;
pub mod source;

pub use args::Cli;
pub use config::scan_config;
pub use report::{JsonReporter, TextReporter};
pub use source::{SourceError, UrlInput};
