//! Command handlers
//!
//! Each handler builds its inputs from the parsed arguments, runs the
//! library and renders the result. The pure parts are exposed for tests.

pub mod check;
pub mod parse;

pub use check::{check, execute_check};
pub use parse::{execute_parse, parse};

use crate::commands::SpecInput;
use crate::config::ProjectConfig;
use crate::error::CliResult;
use pagespec::PageSpecReader;

/// Load the project config named by the arguments, or the defaults
pub fn project_config(input: &SpecInput) -> CliResult<ProjectConfig> {
    input
        .config
        .as_deref()
        .map_or_else(|| Ok(ProjectConfig::default()), ProjectConfig::load)
}

/// Build a reader from project settings, with command line properties on top
#[must_use]
pub fn build_reader(input: &SpecInput, project: &ProjectConfig) -> PageSpecReader {
    let mut properties = project.properties.clone();
    properties.extend(input.properties.iter().cloned());
    tracing::debug!(count = properties.len(), "spec properties");
    PageSpecReader::new()
        .with_config(project.reader.clone())
        .with_properties(properties)
}
