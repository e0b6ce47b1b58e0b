//! Swag Labs CLI: runs the storefront end-to-end suite
//!
//! ## Usage
//!
//! ```bash
//! swaglabs test                          # Run every scenario on the simulator
//! swaglabs test --tag smoke --target live
//! swaglabs list --tag negative
//! swaglabs report --dir allure-results
//! ```

use clap::Parser;
use std::process::ExitCode;
use swaglabs_cli::{handlers, init_logging, Cli, CliConfig, CliResult, Commands, Verbosity};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    if let Err(e) = init_logging(&config) {
        eprintln!("Warning: {e}");
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &CliConfig) -> CliResult<()> {
    match command {
        Commands::Test(args) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let tally = runtime.block_on(handlers::execute_test(config, &args))?;
            handlers::ensure_passed(tally)
        }
        Commands::List(args) => handlers::execute_list(&args),
        Commands::Report(args) => handlers::execute_report(config, &args).map(|_| ()),
        Commands::Config(args) => handlers::execute_config(&args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
        .with_log_format(cli.log_format.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use swaglabs_cli::{ColorChoice, LogFormat};

    #[test]
    fn test_build_config_from_flags() {
        let cli = Cli::parse_from(["swaglabs", "-vv", "--color", "never", "--log-format", "json", "list"]);
        let config = build_config(&cli);
        assert_eq!(config.verbosity, Verbosity::Debug);
        assert_eq!(config.color, ColorChoice::Never);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        let cli = Cli::parse_from(["swaglabs", "-q", "-v", "list"]);
        assert_eq!(build_config(&cli).verbosity, Verbosity::Quiet);
    }
}
