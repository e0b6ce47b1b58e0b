//! One scenario's browser session.
//!
//! A [`Session`] owns the driver for a single scenario together with the
//! suite configuration, the shared test data and the report recorder.
//! Page objects borrow it; nothing in it outlives the scenario.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info_span, Instrument};

use crate::assertion::{expect, expect_page, LocatorAssertion};
use crate::config::SuiteConfig;
use crate::data::TestData;
use crate::driver::DriverHandle;
use crate::locator::{Locator, Selector};
use crate::pages::Pages;
use crate::reporter::{Attachment, ScenarioHeader, ScenarioRecorder, ScenarioReport, TestStatus};
use crate::result::{E2eError, E2eResult};
use crate::wait::{poll_until, LoadState, UrlPattern, WaitOptions};

/// Browser session bound to one scenario
pub struct Session {
    driver: DriverHandle,
    config: Arc<SuiteConfig>,
    data: Arc<TestData>,
    recorder: Mutex<ScenarioRecorder>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.config.base_url)
            .field("scenario", &self.recorder().header().id)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Bind a freshly launched driver to a scenario
    #[must_use]
    pub fn new(
        driver: DriverHandle,
        config: Arc<SuiteConfig>,
        data: Arc<TestData>,
        header: ScenarioHeader,
    ) -> Self {
        Self {
            driver,
            config,
            data,
            recorder: Mutex::new(ScenarioRecorder::new(header)),
        }
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &DriverHandle {
        &self.driver
    }

    /// Suite configuration
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Shared test data
    #[must_use]
    pub fn data(&self) -> &TestData {
        &self.data
    }

    /// Page objects bound to this session
    #[must_use]
    pub const fn pages(&self) -> Pages<'_> {
        Pages::new(self)
    }

    /// Locator with the configured auto-wait
    #[must_use]
    pub fn locator(&self, selector: Selector) -> Locator {
        Locator::new(Arc::clone(&self.driver), selector).with_options(self.config.locator_options())
    }

    /// Locator for a CSS selector
    #[must_use]
    pub fn css(&self, selector: &str) -> Locator {
        self.locator(Selector::css(selector))
    }

    /// Locator for a `data-test` id
    #[must_use]
    pub fn test_id(&self, id: &str) -> Locator {
        self.locator(Selector::test_id(id))
    }

    /// Retrying assertion with the configured expect timeout
    #[must_use]
    pub fn expect(&self, locator: &Locator) -> LocatorAssertion {
        expect(locator).with_config(self.config.retry_config())
    }

    /// Retrying assertion that the URL matches `pattern`
    pub async fn expect_url(&self, pattern: &UrlPattern) -> E2eResult<()> {
        expect_page(&self.driver)
            .with_config(self.config.retry_config())
            .to_have_url(pattern)
            .await
    }

    /// Exact URL of a path below `base_url`
    #[must_use]
    pub fn url_of(&self, path: &str) -> UrlPattern {
        UrlPattern::exact(self.config.resolve_url(path))
    }

    /// Navigate to a path relative to `base_url`, or to an absolute URL
    pub async fn goto(&self, path: &str) -> E2eResult<()> {
        let url = self.config.resolve_url(path);
        debug!(url = %url, "goto");
        let budget = self.navigation_timeout();
        tokio::time::timeout(budget, self.driver.goto(&url))
            .await
            .map_err(|_| E2eError::Timeout {
                what: format!("navigation to {url}"),
                ms: budget.as_millis() as u64,
            })?
    }

    /// Wait until the page reached `state`
    pub async fn wait_for_load_state(&self, state: LoadState) -> E2eResult<()> {
        let budget = self.navigation_timeout();
        tokio::time::timeout(budget, self.driver.wait_for_load_state(state))
            .await
            .map_err(|_| E2eError::Timeout {
                what: format!("load state '{state}'"),
                ms: budget.as_millis() as u64,
            })?
    }

    /// Wait until the URL matches `pattern`
    pub async fn wait_for_url(&self, pattern: &UrlPattern) -> E2eResult<()> {
        let options = WaitOptions::new()
            .with_timeout(self.config.timeouts.navigation_ms)
            .with_poll_interval(self.config.timeouts.poll_ms);
        let driver = &self.driver;
        let outcome = poll_until(options, || async move {
            let url = driver.current_url().await?;
            Ok::<_, E2eError>(if pattern.matches(&url) { Ok(()) } else { Err(url) })
        })
        .await?;
        outcome.map_err(|expired| E2eError::Timeout {
            what: format!(
                "URL matching {pattern} (last: {})",
                expired.last.unwrap_or_default()
            ),
            ms: expired.waited.as_millis() as u64,
        })
    }

    /// Current URL
    pub async fn url(&self) -> E2eResult<String> {
        self.driver.current_url().await
    }

    /// Run `body` as a named report step
    pub async fn step<T, F>(&self, name: &str, body: F) -> E2eResult<T>
    where
        F: Future<Output = E2eResult<T>>,
    {
        self.recorder().begin_step(name);
        let result = body.instrument(info_span!("step", name)).await;
        let (status, message) = match &result {
            Ok(_) => (TestStatus::Passed, None),
            Err(e) => (TestStatus::from_error(e), Some(e.to_string())),
        };
        self.recorder().end_step(status, message);
        result
    }

    /// Attach arbitrary bytes to the current step
    pub fn attach(&self, name: &str, mime: &str, data: Vec<u8>) {
        self.recorder().attach(Attachment::new(name, mime, data));
    }

    /// Capture the viewport and attach it under `label`
    pub async fn attach_screenshot(&self, label: &str) -> E2eResult<()> {
        let png = self.driver.screenshot().await?;
        debug!(label, bytes = png.len(), "screenshot");
        self.recorder().attach(Attachment::png(label, png));
        Ok(())
    }

    /// Record which attempt this session serves
    pub fn set_attempt(&self, attempt: u32) {
        self.recorder().set_attempts(attempt);
    }

    /// Names of completed top-level steps
    #[must_use]
    pub fn step_names(&self) -> Vec<String> {
        self.recorder()
            .step_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Close the driver
    pub async fn close(&self) -> E2eResult<()> {
        self.driver.close().await
    }

    /// Seal the recorder into a report
    #[must_use]
    pub fn into_report(self, status: TestStatus, message: Option<String>) -> ScenarioReport {
        self.recorder
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .finish(status, message)
    }

    fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeouts.navigation_ms)
    }

    fn recorder(&self) -> MutexGuard<'_, ScenarioRecorder> {
        self.recorder.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::sim::{SimOptions, SimulatedStorefront};

    pub(crate) fn header(id: &str) -> ScenarioHeader {
        ScenarioHeader {
            id: id.into(),
            title: "unit".into(),
            suite: "Unit".into(),
            kind: "Feature".into(),
            description: String::new(),
        }
    }

    /// Session on a fresh simulated storefront with short timeouts
    #[allow(clippy::expect_used)]
    pub(crate) fn sim_session() -> Session {
        let data = TestData::embedded().expect("embedded test data");
        let config = SuiteConfig::default().with_timeouts(crate::config::Timeouts {
            action_ms: 300,
            expect_ms: 300,
            navigation_ms: 1_000,
            poll_ms: 5,
        });
        let store = SimulatedStorefront::new(
            SimOptions::new(config.base_url.clone(), &data).with_glitch_delay(Duration::ZERO),
        );
        Session::new(Arc::new(store), Arc::new(config), Arc::new(data), header("TC-UNIT"))
    }
}
