//! Test command handler

use crate::commands::{TagArg, TestArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{ProgressReporter, RunTally};
use std::sync::Arc;
use swaglabs_e2e::{
    launcher_for, scenarios, AllureResultsWriter, Scenario, ScenarioFilter, ScenarioReport,
    SessionLauncher, SuiteConfig, SuiteRunner,
};
use tracing::info;

/// Suite configuration: file, then environment, then command-line flags
pub fn suite_config(args: &TestArgs) -> CliResult<SuiteConfig> {
    let mut suite = SuiteConfig::discover(args.config.as_deref())?.with_env()?;
    if let Some(target) = args.target {
        suite = suite.with_target(target.into());
    }
    if let Some(workers) = args.workers {
        suite = suite.with_workers(workers);
    }
    if let Some(retries) = args.retries {
        suite = suite.with_retries(retries);
    }
    if args.fail_fast {
        suite = suite.with_fail_fast(true);
    }
    if args.headed {
        suite = suite.headed();
    }
    if let Some(ref url) = args.base_url {
        suite = suite.with_base_url(url.clone());
    }
    if let Some(ref dir) = args.output {
        suite = suite.with_output_dir(dir.clone());
    }
    Ok(suite.validated()?)
}

/// Filter from the `--filter` text and `--tag` values
#[must_use]
pub fn scenario_filter(text: Option<&str>, tags: &[TagArg]) -> ScenarioFilter {
    let filter = tags
        .iter()
        .fold(ScenarioFilter::new(), |filter, tag| filter.with_kind((*tag).into()));
    match text {
        Some(text) => filter.with_text(text),
        None => filter,
    }
}

/// Scenarios selected by `args`; selecting nothing is an error
pub fn select_scenarios(args: &TestArgs) -> CliResult<Vec<Scenario>> {
    let selected = scenario_filter(args.filter.as_deref(), &args.tags).apply(scenarios::all());
    if selected.is_empty() {
        return Err(CliError::NothingSelected);
    }
    Ok(selected)
}

/// Execute the test command
pub async fn execute_test(config: &CliConfig, args: &TestArgs) -> CliResult<RunTally> {
    let suite = suite_config(args)?;
    let selected = select_scenarios(args)?;
    let data = Arc::new(suite.load_test_data()?);
    let launcher = launcher_for(&suite, &data)?;
    let writer = AllureResultsWriter::new(&suite.output_dir)?;
    let results_dir = writer.dir().to_path_buf();
    info!(
        mode = ?suite.target,
        launcher = launcher.name(),
        scenarios = selected.len(),
        "starting run"
    );

    let mut reporter =
        ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    reporter.start_progress(selected.len() as u64, launcher.name());
    let observer = reporter.clone();

    let runner = SuiteRunner::new(launcher, Arc::new(suite), data)
        .with_writer(writer)
        .with_observer(Arc::new(move |report: &ScenarioReport| {
            observer.scenario_finished(report);
        }));
    let report = runner.run(&selected).await;
    reporter.finish();

    let tally = RunTally::from(&report.summary());
    reporter.summary(tally, report.duration);
    reporter.info(&format!("Results written to {}", results_dir.display()));
    Ok(tally)
}

/// Turn a tally with failures into an error
pub fn ensure_passed(tally: RunTally) -> CliResult<()> {
    if tally.unsuccessful() == 0 {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            unsuccessful: tally.unsuccessful(),
            total: tally.total(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::TargetArg;
    use crate::config::{ColorChoice, Verbosity};
    use std::path::PathBuf;
    use swaglabs_e2e::{ScenarioKind, Target, SUMMARY_FILE};

    fn args() -> TestArgs {
        TestArgs {
            filter: None,
            tags: Vec::new(),
            target: None,
            workers: None,
            retries: None,
            fail_fast: false,
            headed: false,
            base_url: None,
            output: None,
            config: None,
        }
    }

    mod config_tests {
        use super::*;

        #[test]
        fn test_flags_override_config_file() {
            let dir = tempfile::tempdir().unwrap();
            let file = dir.path().join("suite.yaml");
            std::fs::write(&file, "workers: 8\nretries: 0\nbase_url: https://staging.example\n")
                .unwrap();
            let suite = suite_config(&TestArgs {
                config: Some(file),
                workers: Some(3),
                retries: Some(1),
                fail_fast: true,
                headed: true,
                target: Some(TargetArg::Sim),
                output: Some(PathBuf::from("out")),
                ..args()
            })
            .unwrap();
            assert_eq!(suite.workers, 3);
            assert_eq!(suite.retries, 1);
            assert!(suite.fail_fast);
            assert!(!suite.browser.headless);
            assert_eq!(suite.target, Target::Simulated);
            assert_eq!(suite.output_dir, PathBuf::from("out"));
            assert_eq!(suite.base_url, "https://staging.example/");
        }

        #[test]
        fn test_bad_base_url_is_rejected() {
            let err = suite_config(&TestArgs {
                base_url: Some("saucedemo.com".into()),
                ..args()
            })
            .unwrap_err();
            assert!(matches!(err, CliError::E2e(_)));
        }

        #[test]
        fn test_missing_config_file_is_an_error() {
            let err = suite_config(&TestArgs {
                config: Some(PathBuf::from("/nonexistent/swaglabs.yaml")),
                ..args()
            })
            .unwrap_err();
            assert!(err.to_string().contains("cannot read"));
        }
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn test_filter_combines_text_and_tags() {
            let filter = scenario_filter(Some("login"), &[TagArg::Negative, TagArg::Security]);
            assert_eq!(filter.text.as_deref(), Some("login"));
            assert_eq!(filter.kinds, vec![ScenarioKind::Negative, ScenarioKind::Security]);
        }

        #[test]
        fn test_select_by_id() {
            let selected = select_scenarios(&TestArgs {
                filter: Some("TC-CHECKOUT-001".into()),
                ..args()
            })
            .unwrap();
            assert_eq!(selected.len(), 1);
            assert_eq!(selected[0].id, "TC-CHECKOUT-001");
        }

        #[test]
        fn test_empty_selection_is_an_error() {
            let err = select_scenarios(&TestArgs {
                filter: Some("TC-NOPE".into()),
                ..args()
            })
            .unwrap_err();
            assert!(matches!(err, CliError::NothingSelected));
        }
    }

    mod execution_tests {
        use super::*;

        #[tokio::test]
        async fn test_simulated_run_writes_results() {
            let dir = tempfile::tempdir().unwrap();
            let config = CliConfig::new()
                .with_verbosity(Verbosity::Quiet)
                .with_color(ColorChoice::Never);
            let tally = execute_test(
                &config,
                &TestArgs {
                    filter: Some("TC-LOGIN-00".into()),
                    tags: vec![TagArg::Negative],
                    target: Some(TargetArg::Sim),
                    output: Some(dir.path().to_path_buf()),
                    ..args()
                },
            )
            .await
            .unwrap();

            assert!(tally.total() >= 3);
            assert_eq!(tally.passed, tally.total());
            assert!(ensure_passed(tally).is_ok());
            assert!(dir.path().join(SUMMARY_FILE).exists());
            let results = AllureResultsWriter::read_results(dir.path()).unwrap();
            assert_eq!(results.len(), tally.total());
        }

        #[test]
        fn test_failures_become_an_error() {
            let tally = RunTally {
                passed: 3,
                failed: 1,
                broken: 1,
                skipped: 0,
            };
            let err = ensure_passed(tally).unwrap_err();
            assert!(err.to_string().contains("2 of 5"));
        }
    }
}
