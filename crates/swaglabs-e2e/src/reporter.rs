//! Scenario reporting.
//!
//! A [`ScenarioRecorder`] collects steps and attachments while a scenario
//! runs; the finished [`ScenarioReport`] is written in the Allure results
//! format (`<uuid>-result.json` plus `<uuid>-attachment.<ext>` files) by
//! [`AllureResultsWriter`]. Rendering the HTML report is left to Allure.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::result::{E2eError, E2eResult};

/// Scenario or step outcome, in Allure's vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Every check held
    Passed,
    /// An assertion did not hold
    Failed,
    /// The harness could not observe the page (timeout, driver error, panic)
    Broken,
    /// Not run
    Skipped,
}

impl TestStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if status counts as a failure
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed | Self::Broken)
    }

    /// Status for a scenario that ended with `error`
    #[must_use]
    pub const fn from_error(error: &E2eError) -> Self {
        if error.is_assertion() {
            Self::Failed
        } else {
            Self::Broken
        }
    }
}

/// A file attached to a scenario or step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Display name
    pub name: String,
    /// File name inside the results directory
    pub source: String,
    /// MIME type
    #[serde(rename = "type")]
    pub mime: String,
    /// Content, written next to the result file
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Attachment {
    /// New attachment with a unique file name
    #[must_use]
    pub fn new(name: impl Into<String>, mime: impl Into<String>, data: Vec<u8>) -> Self {
        let mime = mime.into();
        let extension = match mime.as_str() {
            "image/png" => "png",
            "application/json" => "json",
            "text/html" => "html",
            _ => "txt",
        };
        Self {
            name: name.into(),
            source: format!("{}-attachment.{extension}", Uuid::new_v4()),
            mime,
            data,
        }
    }

    /// PNG screenshot attachment
    #[must_use]
    pub fn png(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self::new(name, "image/png", data)
    }
}

/// Key/value label (suite, tag, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name
    pub name: String,
    /// Label value
    pub value: String,
}

impl Label {
    /// Create a label
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Failure details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDetails {
    /// Error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One named step of a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// Step name
    pub name: String,
    /// Outcome
    pub status: TestStatus,
    /// Failure details
    pub status_details: StatusDetails,
    /// Always `finished` once recorded
    pub stage: String,
    /// Start, epoch milliseconds
    pub start: i64,
    /// Stop, epoch milliseconds
    pub stop: i64,
    /// Files attached while the step ran
    pub attachments: Vec<Attachment>,
    /// Nested steps
    #[serde(default)]
    pub steps: Vec<StepRecord>,
}

/// Finished scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    /// Unique id of this run
    pub uuid: Uuid,
    /// Stable id across runs (the scenario id, e.g. `TC-LOGIN-001`)
    pub history_id: String,
    /// Scenario title
    pub name: String,
    /// `suite: title`
    pub full_name: String,
    /// Annotation description
    pub description: String,
    /// Outcome
    pub status: TestStatus,
    /// Failure details
    pub status_details: StatusDetails,
    /// Always `finished`
    pub stage: String,
    /// Start, epoch milliseconds
    pub start: i64,
    /// Stop, epoch milliseconds
    pub stop: i64,
    /// Suite/tag labels
    pub labels: Vec<Label>,
    /// Steps in execution order
    pub steps: Vec<StepRecord>,
    /// Scenario-level attachments
    pub attachments: Vec<Attachment>,
}

impl ScenarioReport {
    /// Report for a scenario that never ran
    #[must_use]
    pub fn skipped(header: ScenarioHeader, reason: impl Into<String>) -> Self {
        let now = Utc::now().timestamp_millis();
        let mut recorder = ScenarioRecorder::new(header);
        recorder.started = now;
        recorder.finish(TestStatus::Skipped, Some(reason.into()))
    }

    /// Scenario id (`TC-...`)
    #[must_use]
    pub fn id(&self) -> &str {
        &self.history_id
    }

    /// Wall time between start and stop
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::try_from(self.stop - self.start).unwrap_or(0))
    }

    /// Value of the first label with `name`
    #[must_use]
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }

    /// Every attachment, scenario-level and per step at any depth
    #[must_use]
    pub fn all_attachments(&self) -> Vec<&Attachment> {
        fn collect<'a>(steps: &'a [StepRecord], out: &mut Vec<&'a Attachment>) {
            for step in steps {
                out.extend(step.attachments.iter());
                collect(&step.steps, out);
            }
        }
        let mut out: Vec<&Attachment> = self.attachments.iter().collect();
        collect(&self.steps, &mut out);
        out
    }

    /// Attempts used (1 unless retried)
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.label("attempts")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1)
    }
}

/// Static description of the scenario a recorder belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioHeader {
    /// Scenario id
    pub id: String,
    /// Title
    pub title: String,
    /// Suite name
    pub suite: String,
    /// Annotation type (Smoke, Negative, ...)
    pub kind: String,
    /// Annotation description
    pub description: String,
}

/// Collects steps and attachments while a scenario runs
#[derive(Debug)]
pub struct ScenarioRecorder {
    header: ScenarioHeader,
    started: i64,
    steps: Vec<StepRecord>,
    open_steps: Vec<StepRecord>,
    attachments: Vec<Attachment>,
    attempts: u32,
}

impl ScenarioRecorder {
    /// Start recording now
    #[must_use]
    pub fn new(header: ScenarioHeader) -> Self {
        Self {
            header,
            started: Utc::now().timestamp_millis(),
            steps: Vec::new(),
            open_steps: Vec::new(),
            attachments: Vec::new(),
            attempts: 1,
        }
    }

    /// Header
    #[must_use]
    pub const fn header(&self) -> &ScenarioHeader {
        &self.header
    }

    /// Record which attempt this is
    pub fn set_attempts(&mut self, attempts: u32) {
        self.attempts = attempts;
    }

    /// Open a step; attachments and inner steps go to it until it ends
    pub fn begin_step(&mut self, name: impl Into<String>) {
        self.open_steps.push(StepRecord {
            name: name.into(),
            status: TestStatus::Passed,
            status_details: StatusDetails::default(),
            stage: "running".into(),
            start: Utc::now().timestamp_millis(),
            stop: 0,
            attachments: Vec::new(),
            steps: Vec::new(),
        });
    }

    /// Close the innermost open step
    pub fn end_step(&mut self, status: TestStatus, message: Option<String>) {
        let Some(mut step) = self.open_steps.pop() else {
            return;
        };
        step.status = status;
        step.status_details.message = message;
        step.stage = "finished".into();
        step.stop = Utc::now().timestamp_millis();
        match self.open_steps.last_mut() {
            Some(parent) => parent.steps.push(step),
            None => self.steps.push(step),
        }
    }

    /// Attach to the innermost open step, or to the scenario when none is open
    pub fn attach(&mut self, attachment: Attachment) {
        match self.open_steps.last_mut() {
            Some(step) => step.attachments.push(attachment),
            None => self.attachments.push(attachment),
        }
    }

    /// Names of the steps recorded so far
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Seal into a report
    #[must_use]
    pub fn finish(mut self, status: TestStatus, message: Option<String>) -> ScenarioReport {
        while !self.open_steps.is_empty() {
            self.end_step(TestStatus::Broken, Some("step did not complete".into()));
        }
        let header = self.header;
        ScenarioReport {
            uuid: Uuid::new_v4(),
            history_id: header.id.clone(),
            full_name: format!("{}: {}", header.suite, header.title),
            name: header.title,
            description: header.description,
            status,
            status_details: StatusDetails { message },
            stage: "finished".into(),
            start: self.started,
            stop: Utc::now().timestamp_millis(),
            labels: vec![
                Label::new("suite", header.suite),
                Label::new("tag", header.kind),
                Label::new("testId", header.id),
                Label::new("attempts", self.attempts.to_string()),
                Label::new("framework", "swaglabs-e2e"),
            ],
            steps: self.steps,
            attachments: self.attachments,
        }
    }
}

/// All scenario reports of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall time of the whole run
    pub duration: Duration,
    /// Scenario reports, in catalog order
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    fn count(&self, status: TestStatus) -> usize {
        self.scenarios.iter().filter(|s| s.status == status).count()
    }

    /// Passed count
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(TestStatus::Passed)
    }

    /// Failed count (assertion failures)
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(TestStatus::Failed)
    }

    /// Broken count (harness errors)
    #[must_use]
    pub fn broken(&self) -> usize {
        self.count(TestStatus::Broken)
    }

    /// Skipped count
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(TestStatus::Skipped)
    }

    /// True when nothing failed or broke
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.scenarios.iter().all(|s| !s.status.is_failed())
    }

    /// Scenarios that failed or broke
    pub fn failures(&self) -> impl Iterator<Item = &ScenarioReport> {
        self.scenarios.iter().filter(|s| s.status.is_failed())
    }

    /// Condensed summary
    #[must_use]
    pub fn summary(&self) -> SuiteSummary {
        SuiteSummary {
            started_at: self.started_at,
            duration_ms: self.duration.as_millis() as u64,
            total: self.scenarios.len(),
            passed: self.passed(),
            failed: self.failed(),
            broken: self.broken(),
            skipped: self.skipped(),
            failures: self
                .failures()
                .map(|s| FailureSummary {
                    id: s.id().to_string(),
                    title: s.name.clone(),
                    status: s.status,
                    message: s.status_details.message.clone().unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Condensed outcome of a run (`summary.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub broken: usize,
    pub skipped: usize,
    pub failures: Vec<FailureSummary>,
}

/// One failed scenario in a [`SuiteSummary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSummary {
    pub id: String,
    pub title: String,
    pub status: TestStatus,
    pub message: String,
}

/// File name of the run summary
pub const SUMMARY_FILE: &str = "summary.json";

/// Writes Allure-compatible result files
#[derive(Debug, Clone)]
pub struct AllureResultsWriter {
    dir: PathBuf,
}

impl AllureResultsWriter {
    /// Writer for `dir`, created if missing
    pub fn new(dir: impl Into<PathBuf>) -> E2eResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Results directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a scenario's attachments and result file
    pub fn write_scenario(&self, report: &ScenarioReport) -> E2eResult<PathBuf> {
        for attachment in report.all_attachments() {
            std::fs::write(self.dir.join(&attachment.source), &attachment.data)?;
        }
        let path = self.dir.join(format!("{}-result.json", report.uuid));
        std::fs::write(&path, serde_json::to_vec_pretty(report)?)?;
        debug!(path = %path.display(), scenario = report.id(), "wrote result");
        Ok(path)
    }

    /// Write `summary.json`
    pub fn write_summary(&self, suite: &SuiteReport) -> E2eResult<PathBuf> {
        let path = self.dir.join(SUMMARY_FILE);
        std::fs::write(&path, serde_json::to_vec_pretty(&suite.summary())?)?;
        Ok(path)
    }

    /// Read every `*-result.json` in `dir`
    pub fn read_results(dir: impl AsRef<Path>) -> E2eResult<Vec<ScenarioReport>> {
        let mut results = Vec::new();
        for entry in std::fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            let is_result = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with("-result.json"));
            if is_result {
                let bytes = std::fs::read(&path)?;
                results.push(serde_json::from_slice(&bytes)?);
            }
        }
        results.sort_by(|a: &ScenarioReport, b| a.history_id.cmp(&b.history_id));
        Ok(results)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn header(id: &str) -> ScenarioHeader {
        ScenarioHeader {
            id: id.into(),
            title: "Successful login with valid credentials".into(),
            suite: "Login Tests".into(),
            kind: "Smoke".into(),
            description: "Verify that a user can login".into(),
        }
    }

    mod test_status_tests {
        use super::*;

        #[test]
        fn test_status_mapping_from_error() {
            let failed = E2eError::assertion("badge", 2, 1);
            let broken = E2eError::LocatorTimeout {
                selector: "#x".into(),
                waited_ms: 1,
            };
            assert_eq!(TestStatus::from_error(&failed), TestStatus::Failed);
            assert_eq!(TestStatus::from_error(&broken), TestStatus::Broken);
            assert!(TestStatus::Broken.is_failed());
            assert!(!TestStatus::Skipped.is_failed());
        }

        #[test]
        fn test_status_serializes_lowercase() {
            assert_eq!(serde_json::to_string(&TestStatus::Broken).unwrap(), "\"broken\"");
        }
    }

    mod recorder_tests {
        use super::*;

        #[test]
        fn test_attachments_follow_open_step() {
            let mut recorder = ScenarioRecorder::new(header("TC-LOGIN-001"));
            recorder.attach(Attachment::png("Login Page", vec![1]));
            recorder.begin_step("Enter credentials");
            recorder.attach(Attachment::png("Inventory Page", vec![2]));
            recorder.end_step(TestStatus::Passed, None);
            let report = recorder.finish(TestStatus::Passed, None);

            assert_eq!(report.attachments.len(), 1);
            assert_eq!(report.steps.len(), 1);
            assert_eq!(report.steps[0].attachments[0].name, "Inventory Page");
            assert_eq!(report.all_attachments().len(), 2);
            assert_eq!(report.label("suite"), Some("Login Tests"));
            assert_eq!(report.id(), "TC-LOGIN-001");
        }

        #[test]
        fn test_unfinished_step_is_marked_broken() {
            let mut recorder = ScenarioRecorder::new(header("TC-CART-001"));
            recorder.begin_step("Open cart");
            let report = recorder.finish(TestStatus::Broken, Some("boom".into()));
            assert_eq!(report.steps[0].status, TestStatus::Broken);
            assert_eq!(report.status_details.message.as_deref(), Some("boom"));
        }

        #[test]
        fn test_nested_steps() {
            let mut recorder = ScenarioRecorder::new(header("TC-CHECKOUT-002"));
            recorder.begin_step("Complete checkout");
            recorder.begin_step("Fill information");
            recorder.attach(Attachment::png("Form", vec![]));
            recorder.end_step(TestStatus::Passed, None);
            recorder.end_step(TestStatus::Passed, None);
            let report = recorder.finish(TestStatus::Passed, None);
            assert_eq!(report.steps.len(), 1);
            assert_eq!(report.steps[0].steps[0].name, "Fill information");
            assert_eq!(report.all_attachments().len(), 1);
        }

        #[test]
        fn test_attempts_label() {
            let mut recorder = ScenarioRecorder::new(header("TC-INV-001"));
            recorder.set_attempts(3);
            assert_eq!(recorder.finish(TestStatus::Passed, None).attempts(), 3);
        }

        #[test]
        fn test_attachment_file_name_by_mime() {
            let png = Attachment::png("shot", vec![]);
            assert!(png.source.ends_with("-attachment.png"));
            let text = Attachment::new("log", "text/plain", vec![]);
            assert!(text.source.ends_with(".txt"));
        }
    }

    mod writer_tests {
        use super::*;

        fn suite() -> SuiteReport {
            let mut ok = ScenarioRecorder::new(header("TC-LOGIN-001"));
            ok.attach(Attachment::png("Login Page", b"\x89PNG".to_vec()));
            let failed = ScenarioRecorder::new(header("TC-LOGIN-002"));
            SuiteReport {
                started_at: Utc::now(),
                duration: Duration::from_millis(1200),
                scenarios: vec![
                    ok.finish(TestStatus::Passed, None),
                    failed.finish(TestStatus::Failed, Some("wrong banner".into())),
                    ScenarioReport::skipped(header("TC-LOGIN-003"), "fail-fast"),
                ],
            }
        }

        #[test]
        fn test_write_and_read_back() {
            let dir = tempfile::tempdir().unwrap();
            let writer = AllureResultsWriter::new(dir.path().join("allure-results")).unwrap();
            let suite = suite();
            for scenario in &suite.scenarios {
                writer.write_scenario(scenario).unwrap();
            }
            let attachment = &suite.scenarios[0].attachments[0];
            assert!(writer.dir().join(&attachment.source).exists());

            let back = AllureResultsWriter::read_results(writer.dir()).unwrap();
            assert_eq!(back.len(), 3);
            assert_eq!(back[1].status, TestStatus::Failed);
            assert!(back[0].attachments[0].data.is_empty());
        }

        #[test]
        fn test_result_json_uses_allure_field_names() {
            let report = suite().scenarios.remove(0);
            let json: serde_json::Value = serde_json::to_value(&report).unwrap();
            assert!(json.get("historyId").is_some());
            assert!(json.get("fullName").is_some());
            assert_eq!(json["stage"], "finished");
            assert_eq!(json["attachments"][0]["type"], "image/png");
        }

        #[test]
        fn test_summary_counts() {
            let dir = tempfile::tempdir().unwrap();
            let writer = AllureResultsWriter::new(dir.path()).unwrap();
            let suite = suite();
            let path = writer.write_summary(&suite).unwrap();
            let summary: SuiteSummary = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
            assert_eq!(summary.total, 3);
            assert_eq!(summary.passed, 1);
            assert_eq!(summary.failed, 1);
            assert_eq!(summary.skipped, 1);
            assert_eq!(summary.failures[0].id, "TC-LOGIN-002");
            assert!(!suite.all_passed());
        }
    }
}
