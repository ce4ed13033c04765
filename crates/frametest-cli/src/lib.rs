//! Frametest CLI Library
//!
//! Command-line front end that runs the bundled demo fixtures against the
//! in-memory host and reports each run.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
pub mod demo;
mod error;
mod output;
mod runner;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, FormatArg, RunArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use demo::{demo_host, registry, FixtureEntry, LevelFixture, MenuFixture};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, ProgressReporter};
pub use runner::TestRunner;
