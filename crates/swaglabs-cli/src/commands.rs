//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use swaglabs_e2e::{ScenarioKind, Target};

/// Swag Labs: end-to-end suite for the saucedemo storefront
#[derive(Parser, Debug)]
#[command(name = "swaglabs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (failures only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "compact", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenarios
    Test(TestArgs),

    /// List the scenario catalog
    List(ListArgs),

    /// Summarize a results directory
    Report(ReportArgs),

    /// Show the effective suite configuration
    Config(ConfigArgs),
}

/// Arguments for the test command
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// Run scenarios whose id or title contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Run scenarios with this tag (repeatable)
    #[arg(short, long = "tag", ignore_case = true)]
    pub tags: Vec<TagArg>,

    /// Drive the simulator or a real browser
    #[arg(long)]
    pub target: Option<TargetArg>,

    /// Parallel sessions (0 = available parallelism)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Re-runs of a failed scenario
    #[arg(short, long)]
    pub retries: Option<u32>,

    /// Skip remaining scenarios after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Storefront root URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Allure results directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Suite configuration file (default: swaglabs.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only scenarios with this tag (repeatable)
    #[arg(short, long = "tag", ignore_case = true)]
    pub tags: Vec<TagArg>,

    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the report command
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Results directory
    #[arg(short, long, default_value = "allure-results")]
    pub dir: PathBuf,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Suite configuration file (default: swaglabs.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Scenario tag argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagArg {
    /// Critical happy paths
    Smoke,
    /// Feature behavior
    Feature,
    /// Error handling and validation
    Negative,
    /// Access control
    Security,
}

impl From<TagArg> for ScenarioKind {
    fn from(arg: TagArg) -> Self {
        match arg {
            TagArg::Smoke => Self::Smoke,
            TagArg::Feature => Self::Feature,
            TagArg::Negative => Self::Negative,
            TagArg::Security => Self::Security,
        }
    }
}

/// Target argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetArg {
    /// In-memory storefront
    #[value(alias = "simulated")]
    Sim,
    /// Real Chromium against the deployed site
    Live,
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Sim => Self::Simulated,
            TargetArg::Live => Self::Live,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormatArg {
    /// Compact human-readable lines
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}
