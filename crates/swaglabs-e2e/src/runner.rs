//! Suite runner.
//!
//! Every attempt of every scenario gets a fresh session from the launcher.
//! Up to `workers` scenarios are in flight at once; inside a scenario all
//! calls are sequential. The session is closed on every exit path,
//! including a panicking body.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::config::{SuiteConfig, Target};
use crate::data::TestData;
use crate::driver::SessionLauncher;
use crate::reporter::{
    AllureResultsWriter, ScenarioRecorder, ScenarioReport, SuiteReport, TestStatus,
};
use crate::result::{E2eError, E2eResult};
use crate::scenarios::Scenario;
use crate::session::Session;
use crate::sim::{SimLauncher, SimOptions};

/// Callback invoked once per finished scenario
pub type ScenarioObserver = Arc<dyn Fn(&ScenarioReport) + Send + Sync>;

/// Launcher matching the configured target
pub fn launcher_for(config: &SuiteConfig, data: &TestData) -> E2eResult<Arc<dyn SessionLauncher>> {
    match config.target {
        Target::Simulated => Ok(Arc::new(SimLauncher::new(
            SimOptions::new(config.base_url.clone(), data)
                .with_viewport(config.browser.viewport_width, config.browser.viewport_height),
        ))),
        #[cfg(feature = "browser")]
        Target::Live => Ok(Arc::new(crate::browser::CdpLauncher::new(config.browser.clone()))),
        #[cfg(not(feature = "browser"))]
        Target::Live => Err(E2eError::config(
            "the live target needs the `browser` feature (cargo build --features browser)",
        )),
    }
}

/// Runs scenarios and collects their reports
pub struct SuiteRunner {
    launcher: Arc<dyn SessionLauncher>,
    config: Arc<SuiteConfig>,
    data: Arc<TestData>,
    writer: Option<AllureResultsWriter>,
    observer: Option<ScenarioObserver>,
}

impl fmt::Debug for SuiteRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteRunner")
            .field("launcher", &self.launcher.name())
            .field("workers", &self.config.effective_workers())
            .field("retries", &self.config.retries)
            .field("writer", &self.writer)
            .finish_non_exhaustive()
    }
}

impl SuiteRunner {
    /// Runner over `launcher`
    #[must_use]
    pub fn new(
        launcher: Arc<dyn SessionLauncher>,
        config: Arc<SuiteConfig>,
        data: Arc<TestData>,
    ) -> Self {
        Self {
            launcher,
            config,
            data,
            writer: None,
            observer: None,
        }
    }

    /// Write each report as it finishes
    #[must_use]
    pub fn with_writer(mut self, writer: AllureResultsWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Be told about each finished scenario
    #[must_use]
    pub fn with_observer(mut self, observer: ScenarioObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run `scenarios`; reports come back in the given order
    pub async fn run(&self, scenarios: &[Scenario]) -> SuiteReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        let workers = self.config.effective_workers().max(1);
        let stop = AtomicBool::new(false);
        info!(
            scenarios = scenarios.len(),
            workers,
            launcher = self.launcher.name(),
            "starting suite"
        );

        let stop = &stop;
        let mut reports: Vec<(usize, ScenarioReport)> = stream::iter(scenarios.iter().enumerate())
            .map(|(index, scenario)| async move { (index, self.run_scenario(scenario, stop).await) })
            .buffer_unordered(workers)
            .collect()
            .await;
        reports.sort_by_key(|(index, _)| *index);

        let suite = SuiteReport {
            started_at,
            duration: clock.elapsed(),
            scenarios: reports.into_iter().map(|(_, report)| report).collect(),
        };
        if let Some(writer) = &self.writer {
            if let Err(e) = writer.write_summary(&suite) {
                warn!(error = %e, "could not write suite summary");
            }
        }
        info!(
            passed = suite.passed(),
            failed = suite.failed(),
            broken = suite.broken(),
            skipped = suite.skipped(),
            elapsed_ms = suite.duration.as_millis() as u64,
            "suite finished"
        );
        suite
    }

    async fn run_scenario(&self, scenario: &Scenario, stop: &AtomicBool) -> ScenarioReport {
        let report = if stop.load(Ordering::SeqCst) {
            ScenarioReport::skipped(scenario.header(), "not started: an earlier scenario failed")
        } else {
            self.run_with_retries(scenario, stop).await
        };
        if report.status.is_failed() && self.config.fail_fast {
            stop.store(true, Ordering::SeqCst);
        }
        if let Some(writer) = &self.writer {
            if let Err(e) = writer.write_scenario(&report) {
                warn!(scenario = scenario.id, error = %e, "could not write result");
            }
        }
        if let Some(observer) = &self.observer {
            observer(&report);
        }
        report
    }

    async fn run_with_retries(&self, scenario: &Scenario, stop: &AtomicBool) -> ScenarioReport {
        let max_attempts = self.config.retries.saturating_add(1);
        let mut attempt = 1;
        loop {
            info!(scenario = scenario.id, attempt, "running {}", scenario.full_title());
            let report = self.attempt(scenario, attempt).await;
            let retry = report.status.is_failed()
                && attempt < max_attempts
                && !stop.load(Ordering::SeqCst);
            if !retry {
                info!(
                    scenario = scenario.id,
                    status = ?report.status,
                    elapsed_ms = report.duration().as_millis() as u64,
                    "finished"
                );
                return report;
            }
            warn!(
                scenario = scenario.id,
                attempt,
                reason = report.status_details.message.as_deref().unwrap_or_default(),
                "retrying on a fresh session"
            );
            attempt += 1;
        }
    }

    async fn attempt(&self, scenario: &Scenario, attempt: u32) -> ScenarioReport {
        let driver = match self.launcher.launch().await {
            Ok(driver) => driver,
            Err(e) => {
                let mut recorder = ScenarioRecorder::new(scenario.header());
                recorder.set_attempts(attempt);
                return recorder.finish(TestStatus::Broken, Some(e.to_string()));
            }
        };
        let session = Session::new(
            driver,
            Arc::clone(&self.config),
            Arc::clone(&self.data),
            scenario.header(),
        );
        session.set_attempt(attempt);

        let outcome = AssertUnwindSafe(execute(scenario, &session))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| {
                Err(E2eError::Panicked {
                    message: panic_message(payload.as_ref()),
                })
            });

        if outcome.is_err() && self.config.screenshot_on_failure {
            if let Err(e) = session.attach_screenshot("Failure").await {
                debug!(scenario = scenario.id, error = %e, "no failure screenshot");
            }
        }
        if let Err(e) = session.close().await {
            warn!(scenario = scenario.id, error = %e, "session did not close cleanly");
        }

        match outcome {
            Ok(()) => session.into_report(TestStatus::Passed, None),
            Err(e) => session.into_report(TestStatus::from_error(&e), Some(e.to_string())),
        }
    }
}

async fn execute(scenario: &Scenario, session: &Session) -> E2eResult<()> {
    scenario.preset.apply(session).await?;
    (scenario.body)(session).await
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic with a non-string payload".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Timeouts;
    use crate::fixture::Preset;
    use crate::scenarios::ScenarioKind;
    use async_trait::async_trait;
    use futures::future::BoxFuture;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::Duration;

    fn config() -> SuiteConfig {
        SuiteConfig::default()
            .with_workers(1)
            .with_timeouts(Timeouts {
                action_ms: 300,
                expect_ms: 300,
                navigation_ms: 1_000,
                poll_ms: 5,
            })
    }

    fn runner(config: SuiteConfig) -> SuiteRunner {
        let data = TestData::embedded().unwrap();
        let launcher = SimLauncher::new(
            SimOptions::new(config.base_url.clone(), &data).with_glitch_delay(Duration::ZERO),
        );
        SuiteRunner::new(Arc::new(launcher), Arc::new(config), Arc::new(data))
    }

    const fn scenario(id: &'static str, body: crate::scenarios::ScenarioBody) -> Scenario {
        Scenario {
            id,
            title: "unit",
            suite: "Runner",
            kind: ScenarioKind::Feature,
            description: "",
            preset: Preset::LoggedIn,
            body,
        }
    }

    fn passes(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
        async move { session.pages().inventory.verify_product_count(6).await }.boxed()
    }

    fn fails(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
        async move { session.pages().inventory.verify_product_count(7).await }.boxed()
    }

    fn breaks(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
        async move { session.goto("/missing.html").await }.boxed()
    }

    fn panics(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
        async move {
            if session.data().products.is_empty() {
                return Ok(());
            }
            panic!("boom")
        }
        .boxed()
    }

    static FLAKY_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn flaky(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
        async move {
            if FLAKY_CALLS.fetch_add(1, Ordering::SeqCst) == 0 {
                session.pages().inventory.verify_product_count(0).await
            } else {
                Ok(())
            }
        }
        .boxed()
    }

    mod status_tests {
        use super::*;

        #[tokio::test]
        async fn test_status_mapping() {
            let report = runner(config())
                .run(&[
                    scenario("TC-PASS", passes),
                    scenario("TC-FAIL", fails),
                    scenario("TC-BROKEN", breaks),
                    scenario("TC-PANIC", panics),
                ])
                .await;
            let statuses: Vec<_> = report.scenarios.iter().map(|s| s.status).collect();
            assert_eq!(
                statuses,
                vec![
                    TestStatus::Passed,
                    TestStatus::Failed,
                    TestStatus::Broken,
                    TestStatus::Broken
                ]
            );
            let panic = &report.scenarios[3];
            assert!(panic.status_details.message.as_deref().unwrap().contains("boom"));
            assert!(!report.all_passed());
        }

        #[tokio::test]
        async fn test_failure_attaches_screenshot() {
            let report = runner(config()).run(&[scenario("TC-FAIL", fails)]).await;
            let names: Vec<_> = report.scenarios[0]
                .all_attachments()
                .iter()
                .map(|a| a.name.clone())
                .collect();
            assert!(names.contains(&"Failure".to_string()));
        }

        #[tokio::test]
        async fn test_preset_failure_is_broken() {
            let mut config = config();
            config.base_url = "https://www.saucedemo.com/nested/".into();
            let data = TestData::embedded().unwrap();
            let launcher = SimLauncher::new(SimOptions::new("https://www.saucedemo.com/", &data));
            let runner = SuiteRunner::new(Arc::new(launcher), Arc::new(config), Arc::new(data));
            let report = runner.run(&[scenario("TC-PRESET", passes)]).await;
            assert_eq!(report.scenarios[0].status, TestStatus::Broken);
            assert!(report.scenarios[0]
                .status_details
                .message
                .as_deref()
                .unwrap()
                .contains("loggedInPage"));
        }
    }

    mod policy_tests {
        use super::*;

        #[tokio::test]
        async fn test_retry_uses_fresh_session() {
            FLAKY_CALLS.store(0, Ordering::SeqCst);
            let report = runner(config().with_retries(1))
                .run(&[scenario("TC-FLAKY", flaky)])
                .await;
            assert_eq!(report.scenarios[0].status, TestStatus::Passed);
            assert_eq!(report.scenarios[0].attempts(), 2);
        }

        #[tokio::test]
        async fn test_fail_fast_skips_the_rest() {
            let report = runner(config().with_fail_fast(true))
                .run(&[
                    scenario("TC-FAIL", fails),
                    scenario("TC-PASS-1", passes),
                    scenario("TC-PASS-2", passes),
                ])
                .await;
            assert_eq!(report.scenarios[0].status, TestStatus::Failed);
            assert_eq!(report.skipped(), 2);
        }

        #[tokio::test]
        async fn test_parallel_run_keeps_catalog_order() {
            let ids = ["TC-A", "TC-B", "TC-C", "TC-D"];
            let scenarios = ids.map(|id| scenario(id, passes));
            let report = runner(config().with_workers(4)).run(&scenarios).await;
            let got: Vec<_> = report.scenarios.iter().map(|s| s.id().to_string()).collect();
            assert_eq!(got, ids);
            assert_eq!(report.passed(), 4);
        }
    }

    mod output_tests {
        use super::*;

        #[tokio::test]
        async fn test_writer_and_observer_see_every_scenario() {
            let dir = tempfile::tempdir().unwrap();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&seen);
            let runner = runner(config())
                .with_writer(AllureResultsWriter::new(dir.path()).unwrap())
                .with_observer(Arc::new(move |report: &ScenarioReport| {
                    sink.lock().unwrap().push(report.id().to_string());
                }));
            runner
                .run(&[scenario("TC-PASS", passes), scenario("TC-FAIL", fails)])
                .await;
            assert_eq!(seen.lock().unwrap().len(), 2);
            let written = AllureResultsWriter::read_results(dir.path()).unwrap();
            assert_eq!(written.len(), 2);
            assert!(dir.path().join(crate::reporter::SUMMARY_FILE).exists());
        }
    }

    mod launch_tests {
        use super::*;
        use crate::driver::DriverHandle;

        struct NoBrowser;

        #[async_trait]
        impl SessionLauncher for NoBrowser {
            fn name(&self) -> &str {
                "none"
            }

            async fn launch(&self) -> E2eResult<DriverHandle> {
                Err(E2eError::BrowserLaunch {
                    message: "chromium not found".into(),
                })
            }
        }

        #[tokio::test]
        async fn test_launch_failure_is_broken() {
            let runner = SuiteRunner::new(
                Arc::new(NoBrowser),
                Arc::new(config()),
                Arc::new(TestData::embedded().unwrap()),
            );
            let report = runner.run(&[scenario("TC-PASS", passes)]).await;
            assert_eq!(report.scenarios[0].status, TestStatus::Broken);
        }

        #[test]
        fn test_launcher_for_simulated_target() {
            let config = config();
            let launcher = launcher_for(&config, &TestData::embedded().unwrap()).unwrap();
            assert_eq!(launcher.name(), "simulated");
        }

        #[cfg(not(feature = "browser"))]
        #[test]
        fn test_live_target_needs_browser_feature() {
            let config = config().with_target(Target::Live);
            let err = launcher_for(&config, &TestData::embedded().unwrap()).err().unwrap();
            assert!(matches!(err, E2eError::Config { .. }));
        }
    }
}
