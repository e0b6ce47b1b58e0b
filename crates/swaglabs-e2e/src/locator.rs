//! Locator abstraction for element selection and interaction.
//!
//! Locators are strict and auto-wait:
//!
//! - **Auto-Waiting**: actions wait until the target exists and is visible
//! - **Strict Selection**: an unindexed action fails if several elements match
//! - **Late Binding**: nothing is resolved until an operation runs, so a
//!   locator created before a page change still targets the new DOM

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::driver::DriverHandle;
use crate::result::{E2eError, E2eResult};
use crate::wait::{poll_until, WaitOptions};

/// Default timeout for auto-waiting (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval for auto-waiting (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Attribute the storefront uses for stable test hooks
pub const TEST_ID_ATTRIBUTE: &str = "data-test";

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS selector (e.g., `.inventory_item button`)
    Css(String),
    /// Test ID selector (`data-test` attribute)
    TestId(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// The selector as plain CSS
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Css(css) => css.clone(),
            Self::TestId(id) => format!("[{TEST_ID_ATTRIBUTE}=\"{id}\"]"),
        }
    }

    /// JavaScript expression evaluating to the `NodeList` of matches
    #[must_use]
    pub fn to_query_all(&self) -> String {
        let literal = serde_json::Value::String(self.to_css()).to_string();
        format!("document.querySelectorAll({literal})")
    }

    /// JavaScript expression evaluating to the `index`-th match or `undefined`
    #[must_use]
    pub fn to_query_nth(&self, index: usize) -> String {
        format!("{}[{index}]", self.to_query_all())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Which of the matching elements a locator addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Nth {
    /// Exactly one element must match (strict)
    #[default]
    Only,
    /// First match
    First,
    /// Last match
    Last,
    /// 0-based match index
    Index(usize),
}

impl Nth {
    /// Resolve against the current match count
    #[must_use]
    pub const fn pick(self, count: usize) -> Option<usize> {
        match self {
            Self::Only | Self::First => {
                if count > 0 {
                    Some(0)
                } else {
                    None
                }
            }
            Self::Last => count.checked_sub(1),
            Self::Index(i) => {
                if i < count {
                    Some(i)
                } else {
                    None
                }
            }
        }
    }
}

/// Locator options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorOptions {
    /// Auto-wait timeout
    pub timeout: Duration,
    /// Poll interval while waiting
    pub poll_interval: Duration,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl LocatorOptions {
    fn wait_options(self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.timeout.as_millis() as u64)
            .with_poll_interval(self.poll_interval.as_millis() as u64)
    }
}

/// A lazily-resolved handle to element(s) on the session's page
#[derive(Clone)]
pub struct Locator {
    driver: DriverHandle,
    selector: Selector,
    nth: Nth,
    options: LocatorOptions,
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locator")
            .field("selector", &self.selector)
            .field("nth", &self.nth)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Locator {
    /// Create a locator bound to a driver
    #[must_use]
    pub fn new(driver: DriverHandle, selector: Selector) -> Self {
        Self {
            driver,
            selector,
            nth: Nth::Only,
            options: LocatorOptions::default(),
        }
    }

    /// Address the `index`-th match (0-based)
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        self.with_nth(Nth::Index(index))
    }

    /// Address the first match
    #[must_use]
    pub fn first(&self) -> Self {
        self.with_nth(Nth::First)
    }

    /// Address the last match
    #[must_use]
    pub fn last(&self) -> Self {
        self.with_nth(Nth::Last)
    }

    fn with_nth(&self, nth: Nth) -> Self {
        Self {
            nth,
            ..self.clone()
        }
    }

    /// Set auto-wait timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Replace all options
    #[must_use]
    pub const fn with_options(mut self, options: LocatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Human-readable description used in errors and logs
    #[must_use]
    pub fn description(&self) -> String {
        match self.nth {
            Nth::Only => self.selector.to_css(),
            Nth::First => format!("{} >> nth=0", self.selector),
            Nth::Last => format!("{} >> nth=-1", self.selector),
            Nth::Index(i) => format!("{} >> nth={i}", self.selector),
        }
    }

    /// Number of matching elements right now
    pub async fn count(&self) -> E2eResult<usize> {
        self.driver.count(&self.selector).await
    }

    /// Whether the addressed element is visible right now (no waiting)
    pub async fn is_visible(&self) -> E2eResult<bool> {
        let count = self.driver.count(&self.selector).await?;
        match self.nth.pick(count) {
            Some(index) => self.driver.is_visible(&self.selector, index).await,
            None => Ok(false),
        }
    }

    /// Text of every match in document order (no waiting)
    pub async fn all_text_contents(&self) -> E2eResult<Vec<String>> {
        self.driver.all_text_contents(&self.selector).await
    }

    /// Text of the addressed element right now, `None` when absent (no waiting)
    pub async fn peek_text(&self) -> E2eResult<Option<String>> {
        let count = self.driver.count(&self.selector).await?;
        self.check_strict(count)?;
        match self.nth.pick(count) {
            Some(index) => self.driver.text_content(&self.selector, index).await,
            None => Ok(None),
        }
    }

    /// Text content of the addressed element, waiting for it to be attached
    pub async fn text_content(&self) -> E2eResult<String> {
        let index = self.wait_for_target(false).await?;
        Ok(self
            .driver
            .text_content(&self.selector, index)
            .await?
            .unwrap_or_default())
    }

    /// Click, waiting for the element to be visible
    pub async fn click(&self) -> E2eResult<()> {
        let index = self.wait_for_target(true).await?;
        debug!(locator = %self.description(), "click");
        self.driver.click(&self.selector, index).await
    }

    /// Fill an input, waiting for it to be visible
    pub async fn fill(&self, text: &str) -> E2eResult<()> {
        let index = self.wait_for_target(true).await?;
        debug!(locator = %self.description(), len = text.len(), "fill");
        self.driver.fill(&self.selector, index, text).await
    }

    /// Select an option by value, waiting for the `<select>` to be visible
    pub async fn select_option(&self, value: &str) -> E2eResult<()> {
        let index = self.wait_for_target(true).await?;
        debug!(locator = %self.description(), value, "select_option");
        self.driver.select_option(&self.selector, index, value).await
    }

    async fn wait_for_target(&self, require_visible: bool) -> E2eResult<usize> {
        let outcome = poll_until(self.options.wait_options(), || {
            self.probe_target(require_visible)
        })
        .await?;

        outcome.map_err(|expired| E2eError::LocatorTimeout {
            selector: self.description(),
            waited_ms: expired.waited.as_millis() as u64,
        })
    }

    async fn probe_target(&self, require_visible: bool) -> E2eResult<Result<usize, ()>> {
        let count = self.driver.count(&self.selector).await?;
        self.check_strict(count)?;
        let Some(index) = self.nth.pick(count) else {
            return Ok(Err(()));
        };
        if require_visible && !self.driver.is_visible(&self.selector, index).await? {
            return Ok(Err(()));
        }
        Ok(Ok(index))
    }

    fn check_strict(&self, count: usize) -> E2eResult<()> {
        if self.nth == Nth::Only && count > 1 {
            return Err(E2eError::StrictModeViolation {
                selector: self.selector.to_css(),
                count,
            });
        }
        Ok(())
    }
}
