//! Pagespec CLI Library
//!
//! Command-line interface for compiling page specs and checking them
//! against page snapshots.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod output;

pub use commands::{CheckArgs, Cli, ColorArg, Commands, OutputFormat, ParseArgs, SpecInput};
pub use config::{CliConfig, ColorChoice, ProjectConfig, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{spec_outline, Renderer};
