//! Assertions for test validation.
//!
//! Web-first assertions re-check the page until the expectation holds or
//! the retry budget runs out, so a check made right after a click does not
//! race the re-render. Plain value checks (`ensure_*`) fail immediately.

use std::fmt::{Debug, Display};
use std::time::Duration;

use tracing::trace;

use crate::driver::DriverHandle;
use crate::locator::Locator;
use crate::result::{E2eError, E2eResult};
use crate::wait::{poll_until, UrlPattern, WaitOptions};

/// Shown as the observed value when the element is not in the DOM
const ABSENT: &str = "<absent>";

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total timeout duration
    pub timeout: Duration,
    /// Interval between retry attempts
    pub poll_interval: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with timeout
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: Duration::from_millis(100),
        }
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Create a fast config (short timeout, fast polling)
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            timeout: Duration::from_millis(500),
            poll_interval: Duration::from_millis(50),
        }
    }

    fn wait_options(self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.timeout.as_millis() as u64)
            .with_poll_interval(self.poll_interval.as_millis() as u64)
    }
}

/// Start a retrying assertion on a locator
#[must_use]
pub fn expect(locator: &Locator) -> LocatorAssertion {
    LocatorAssertion {
        locator: locator.clone(),
        config: RetryConfig::default(),
    }
}

/// Start a retrying assertion on the page's URL
#[must_use]
pub fn expect_page(driver: &DriverHandle) -> PageAssertion {
    PageAssertion {
        driver: DriverHandle::clone(driver),
        config: RetryConfig::default(),
    }
}

/// Collapse runs of whitespace and trim, as rendered text reads
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Retrying assertions against one locator
#[derive(Debug, Clone)]
pub struct LocatorAssertion {
    locator: Locator,
    config: RetryConfig,
}

impl LocatorAssertion {
    /// Set the timeout duration
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the full config
    #[must_use]
    pub const fn with_config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    /// Element text equals `expected` (whitespace-normalized)
    pub async fn to_have_text(&self, expected: &str) -> E2eResult<()> {
        let expected = normalize_whitespace(expected);
        self.retry("to have text", &expected, |text| {
            text.is_some_and(|t| normalize_whitespace(t) == expected)
        })
        .await
    }

    /// Element text contains `fragment`
    pub async fn to_contain_text(&self, fragment: &str) -> E2eResult<()> {
        self.retry("to contain text", fragment, |text| {
            text.is_some_and(|t| t.contains(fragment))
        })
        .await
    }

    /// Element is attached and visible
    pub async fn to_be_visible(&self) -> E2eResult<()> {
        self.check_state(true).await
    }

    /// Element is absent or hidden
    pub async fn to_be_hidden(&self) -> E2eResult<()> {
        self.check_state(false).await
    }

    /// Exactly `expected` elements match the selector
    pub async fn to_have_count(&self, expected: usize) -> E2eResult<()> {
        let locator = &self.locator;
        let outcome = poll_until(self.config.wait_options(), || async move {
            let count = locator.count().await?;
            Ok::<_, E2eError>(if count == expected { Ok(()) } else { Err(count) })
        })
        .await?;
        outcome.map_err(|expired| {
            E2eError::assertion(
                format!("{} to have count", self.locator.description()),
                expected,
                expired.last.map_or_else(|| ABSENT.to_string(), |c| c.to_string()),
            )
        })
    }

    async fn check_state(&self, visible: bool) -> E2eResult<()> {
        let locator = &self.locator;
        let outcome = poll_until(self.config.wait_options(), || async move {
            let now = locator.is_visible().await?;
            Ok::<_, E2eError>(if now == visible { Ok(()) } else { Err(now) })
        })
        .await?;
        outcome.map_err(|_| {
            let (expected, actual) = if visible {
                ("visible", "hidden")
            } else {
                ("hidden", "visible")
            };
            E2eError::assertion(
                format!("{} to be {expected}", self.locator.description()),
                expected,
                actual,
            )
        })
    }

    async fn retry(
        &self,
        what: &str,
        expected: &str,
        holds: impl Fn(Option<&str>) -> bool,
    ) -> E2eResult<()> {
        let (locator, holds) = (&self.locator, &holds);
        let outcome = poll_until(self.config.wait_options(), || async move {
            let text = locator.peek_text().await?;
            trace!(locator = %locator.description(), ?text, "assert {what}");
            Ok::<_, E2eError>(if holds(text.as_deref()) { Ok(()) } else { Err(text) })
        })
        .await?;
        outcome.map_err(|expired| {
            let actual = expired
                .last
                .flatten()
                .map_or_else(|| ABSENT.to_string(), |t| format!("'{}'", normalize_whitespace(&t)));
            E2eError::assertion(
                format!("{} {what}", self.locator.description()),
                format!("'{expected}'"),
                actual,
            )
        })
    }
}

/// Retrying assertions against the current page
#[derive(Clone)]
pub struct PageAssertion {
    driver: DriverHandle,
    config: RetryConfig,
}

impl Debug for PageAssertion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageAssertion")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PageAssertion {
    /// Set the timeout duration
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the full config
    #[must_use]
    pub const fn with_config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    /// Current URL matches `pattern`
    pub async fn to_have_url(&self, pattern: &UrlPattern) -> E2eResult<()> {
        let driver = &self.driver;
        let outcome = poll_until(self.config.wait_options(), || async move {
            let url = driver.current_url().await?;
            Ok::<_, E2eError>(if pattern.matches(&url) { Ok(()) } else { Err(url) })
        })
        .await?;
        outcome.map_err(|expired| {
            E2eError::assertion(
                "page to have URL",
                pattern,
                expired.last.unwrap_or_default(),
            )
        })
    }
}

/// Fail unless `expected == actual`
pub fn ensure_eq<T: PartialEq + Display>(what: &str, expected: T, actual: T) -> E2eResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(E2eError::assertion(what, expected, actual))
    }
}

/// Fail unless two sequences are equal
pub fn ensure_seq_eq<T: PartialEq + Debug>(what: &str, expected: &[T], actual: &[T]) -> E2eResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(E2eError::assertion(
            what,
            format!("{expected:?}"),
            format!("{actual:?}"),
        ))
    }
}

/// Fail unless `condition` holds
pub fn ensure(condition: bool, what: &str) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::assertion(what, true, false))
    }
}

/// Fail unless `haystack` contains `needle`
pub fn ensure_contains(what: &str, haystack: &str, needle: &str) -> E2eResult<()> {
    if haystack.contains(needle) {
        Ok(())
    } else {
        Err(E2eError::assertion(
            what,
            format!("text containing '{needle}'"),
            format!("'{haystack}'"),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::PageNavigator;
    use crate::locator::Selector;
    use crate::sim::SimulatedStorefront;
    use std::sync::Arc;

    async fn login_screen() -> DriverHandle {
        let store = SimulatedStorefront::with_defaults();
        store.goto_base().await.unwrap();
        Arc::new(store)
    }

    mod value_tests {
        use super::*;

        #[test]
        fn test_ensure_eq_reports_both_sides() {
            assert!(ensure_eq("count", 6, 6).is_ok());
            let err = ensure_eq("count", 6, 5).unwrap_err();
            assert!(err.is_assertion());
            assert!(err.to_string().contains("expected 6, got 5"));
        }

        #[test]
        fn test_ensure_seq_eq() {
            assert!(ensure_seq_eq("names", &["a", "b"], &["a", "b"]).is_ok());
            assert!(ensure_seq_eq("names", &["a", "b"], &["b", "a"]).is_err());
        }

        #[test]
        fn test_ensure_contains() {
            assert!(ensure_contains("banner", "Epic sadface: locked out", "locked out").is_ok());
            assert!(ensure_contains("banner", "", "locked out").is_err());
            assert!(ensure(false, "menu open").unwrap_err().is_assertion());
        }

        #[test]
        fn test_normalize_whitespace() {
            assert_eq!(normalize_whitespace("  Thank you \n for your order! "), "Thank you for your order!");
        }
    }

    mod locator_assertion_tests {
        use super::*;

        #[tokio::test]
        async fn test_to_be_visible_and_hidden() {
            let driver = login_screen().await;
            let button = Locator::new(driver.clone(), Selector::test_id("login-button"));
            expect(&button).to_be_visible().await.unwrap();
            let error = Locator::new(driver, Selector::css("h3[data-test=\"error\"]"));
            expect(&error).to_be_hidden().await.unwrap();
        }

        #[tokio::test]
        async fn test_to_have_text_failure_is_assertion_with_observed_text() {
            let driver = login_screen().await;
            let button = Locator::new(driver.clone(), Selector::test_id("login-button"));
            button.click().await.unwrap();
            let error = Locator::new(driver, Selector::css("h3[data-test=\"error\"]"));
            expect(&error)
                .to_contain_text("Username is required")
                .await
                .unwrap();
            let err = expect(&error)
                .with_config(RetryConfig::fast())
                .to_have_text("Something else")
                .await
                .unwrap_err();
            assert!(err.is_assertion());
            assert!(err.to_string().contains("Username is required"));
        }

        #[tokio::test]
        async fn test_to_have_count_reports_last_count() {
            let driver = login_screen().await;
            let inputs = Locator::new(driver, Selector::css("input"));
            expect(&inputs).to_have_count(3).await.unwrap();
            let err = expect(&inputs)
                .with_timeout(Duration::from_millis(100))
                .to_have_count(2)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("got 3"));
        }

        #[tokio::test]
        async fn test_strict_violation_is_not_swallowed() {
            let driver = login_screen().await;
            let inputs = Locator::new(driver, Selector::css("input"));
            let err = expect(&inputs).to_have_text("x").await.unwrap_err();
            assert!(matches!(err, E2eError::StrictModeViolation { .. }));
        }
    }

    mod page_assertion_tests {
        use super::*;

        #[tokio::test]
        async fn test_to_have_url() {
            let driver = login_screen().await;
            expect_page(&driver)
                .to_have_url(&UrlPattern::exact("https://www.saucedemo.com/"))
                .await
                .unwrap();
            driver.goto("https://www.saucedemo.com/cart.html").await.unwrap();
            let err = expect_page(&driver)
                .with_timeout(Duration::from_millis(100))
                .to_have_url(&UrlPattern::glob("**/cart.html"))
                .await
                .unwrap_err();
            assert!(err.is_assertion());
        }
    }
}
