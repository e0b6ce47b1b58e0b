//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use swaglabs_e2e::{ScenarioReport, SuiteSummary, TestStatus};

/// Outcome counts of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunTally {
    /// Passed scenarios
    pub passed: usize,
    /// Assertion failures
    pub failed: usize,
    /// Harness errors
    pub broken: usize,
    /// Not run
    pub skipped: usize,
}

impl RunTally {
    /// Count the statuses of `reports`
    #[must_use]
    pub fn from_reports(reports: &[ScenarioReport]) -> Self {
        reports.iter().fold(Self::default(), |mut tally, report| {
            match report.status {
                TestStatus::Passed => tally.passed += 1,
                TestStatus::Failed => tally.failed += 1,
                TestStatus::Broken => tally.broken += 1,
                TestStatus::Skipped => tally.skipped += 1,
            }
            tally
        })
    }

    /// Every counted scenario
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.failed + self.broken + self.skipped
    }

    /// Failed plus broken
    #[must_use]
    pub const fn unsuccessful(&self) -> usize {
        self.failed + self.broken
    }
}

impl From<&SuiteSummary> for RunTally {
    fn from(summary: &SuiteSummary) -> Self {
        Self {
            passed: summary.passed,
            failed: summary.failed,
            broken: summary.broken,
            skipped: summary.skipped,
        }
    }
}

/// Status tag for a result line
#[must_use]
pub fn status_label(status: TestStatus, use_color: bool) -> String {
    let (text, style) = match status {
        TestStatus::Passed => ("PASS", Style::new().green().bold()),
        TestStatus::Failed => ("FAIL", Style::new().red().bold()),
        TestStatus::Broken => ("BROKEN", Style::new().magenta().bold()),
        TestStatus::Skipped => ("SKIP", Style::new().yellow()),
    };
    if use_color {
        style.apply_to(text).to_string()
    } else {
        text.to_string()
    }
}

/// One result line, plus the failure message indented below it
#[must_use]
pub fn scenario_line(report: &ScenarioReport, use_color: bool) -> String {
    let mut line = format!(
        "{} {} ({:.2}s)",
        status_label(report.status, use_color),
        report.name,
        report.duration().as_secs_f64()
    );
    if report.attempts() > 1 {
        line.push_str(&format!(" [attempt {}]", report.attempts()));
    }
    if let (false, Some(message)) = (report.status.is_passed(), &report.status_details.message) {
        line.push_str(&format!("\n    {message}"));
    }
    line
}

/// Progress reporter for scenario execution
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Record a finished scenario
    pub fn scenario_finished(&self, report: &ScenarioReport) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
        if self.quiet && !report.status.is_failed() {
            return;
        }
        self.emit(&scenario_line(report, self.use_color));
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        self.emit(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        self.emit("");
        self.emit(&styled);
    }

    /// Print the run summary
    pub fn summary(&self, tally: RunTally, duration: Duration) {
        if self.quiet && tally.unsuccessful() == 0 {
            return;
        }

        self.emit("");
        let duration_secs = duration.as_secs_f64();
        let total = tally.total();
        let RunTally {
            passed,
            failed,
            broken,
            skipped,
        } = tally;

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let status = if tally.unsuccessful() > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };
            self.emit(&format!(
                "{status} {total} scenarios in {duration_secs:.2}s ({} passed, {} failed, {} broken, {} skipped)",
                passed_style.apply_to(passed),
                failed_style.apply_to(failed),
                failed_style.apply_to(broken),
                Style::new().yellow().apply_to(skipped)
            ));
        } else {
            let status = if tally.unsuccessful() > 0 { "FAILED" } else { "PASSED" };
            self.emit(&format!(
                "{status} {total} scenarios in {duration_secs:.2}s ({passed} passed, {failed} failed, {broken} broken, {skipped} skipped)"
            ));
        }
    }

    fn emit(&self, line: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.suspend(|| {
                let _ = self.term.write_line(line);
            }),
            None => {
                let _ = self.term.write_line(line);
            }
        }
    }
}
