//! Swag Labs CLI library
//!
//! Command definitions, handlers and terminal output for the `swaglabs`
//! binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
mod logging;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, ListArgs, LogFormatArg, ReportArgs, TagArg, TargetArg,
    TestArgs,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::{env_filter, init_logging};
pub use output::{scenario_line, status_label, ProgressReporter, RunTally};
