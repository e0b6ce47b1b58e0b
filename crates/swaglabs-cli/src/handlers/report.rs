//! Report command handler

use crate::commands::ReportArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{ProgressReporter, RunTally};
use std::path::Path;
use std::time::Duration;
use swaglabs_e2e::{AllureResultsWriter, ScenarioReport};

/// Result files in `dir`, in id order
pub fn load_results(dir: &Path) -> CliResult<Vec<ScenarioReport>> {
    if !dir.is_dir() {
        return Err(CliError::report(dir, "not a results directory"));
    }
    let results = AllureResultsWriter::read_results(dir)?;
    if results.is_empty() {
        return Err(CliError::report(dir, "no scenario results"));
    }
    Ok(results)
}

/// Sum of scenario wall times
#[must_use]
pub fn total_duration(results: &[ScenarioReport]) -> Duration {
    results.iter().map(ScenarioReport::duration).sum()
}

/// Execute the report command
pub fn execute_report(config: &CliConfig, args: &ReportArgs) -> CliResult<RunTally> {
    let results = load_results(&args.dir)?;
    let reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    reporter.header(&format!("Results in {}", args.dir.display()));
    for result in &results {
        reporter.scenario_finished(result);
    }
    let tally = RunTally::from_reports(&results);
    reporter.summary(tally, total_duration(&results));
    Ok(tally)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};
    use std::path::PathBuf;
    use swaglabs_e2e::{ScenarioHeader, ScenarioRecorder, TestStatus};

    fn write_result(writer: &AllureResultsWriter, id: &str, status: TestStatus) {
        let header = ScenarioHeader {
            id: id.into(),
            title: format!("{id}: scenario"),
            suite: "Checkout Tests".into(),
            kind: "Negative".into(),
            description: String::new(),
        };
        let report = ScenarioRecorder::new(header).finish(status, None);
        writer.write_scenario(&report).unwrap();
    }

    #[test]
    fn test_missing_directory() {
        let err = load_results(Path::new("/nonexistent/allure-results")).unwrap_err();
        assert!(matches!(err, CliError::Report { .. }));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_results(dir.path()).unwrap_err();
        assert!(err.to_string().contains("no scenario results"));
    }

    #[test]
    fn test_tally_of_written_results() {
        let dir = tempfile::tempdir().unwrap();
        let writer = AllureResultsWriter::new(dir.path()).unwrap();
        write_result(&writer, "TC-CHECKOUT-002", TestStatus::Passed);
        write_result(&writer, "TC-CHECKOUT-003", TestStatus::Failed);
        write_result(&writer, "TC-CHECKOUT-004", TestStatus::Broken);

        let config = CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never);
        let tally = execute_report(
            &config,
            &ReportArgs {
                dir: PathBuf::from(dir.path()),
            },
        )
        .unwrap();
        assert_eq!(tally.passed, 1);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.broken, 1);
    }
}
