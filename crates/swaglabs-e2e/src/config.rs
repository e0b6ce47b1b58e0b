//! Suite configuration.
//!
//! Loaded from `swaglabs.yaml` when present, then adjusted by environment
//! variables; command-line flags are applied last by the CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assertion::RetryConfig;
use crate::data::TestData;
use crate::locator::LocatorOptions;
use crate::result::{E2eError, E2eResult};

/// Default config file name
pub const CONFIG_FILE: &str = "swaglabs.yaml";

/// Live storefront
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/";

/// Retries used when `CI` is set
pub const CI_RETRIES: u32 = 2;

/// What the suite drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// A real Chromium against the deployed storefront
    Live,
    /// The in-memory storefront
    #[default]
    Simulated,
}

impl std::str::FromStr for Target {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "sim" | "simulated" => Ok(Self::Simulated),
            other => Err(E2eError::config(format!("unknown target '{other}' (expected live or sim)"))),
        }
    }
}

/// Timeouts, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Locator auto-wait
    pub action_ms: u64,
    /// Retrying assertions
    pub expect_ms: u64,
    /// Navigation and load-state waits
    pub navigation_ms: u64,
    /// Poll interval for all waits
    pub poll_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            action_ms: crate::locator::DEFAULT_TIMEOUT_MS,
            expect_ms: 5_000,
            navigation_ms: crate::wait::DEFAULT_WAIT_TIMEOUT_MS,
            poll_ms: crate::locator::DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// Browser launch settings (live target)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a visible window
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Chromium executable; auto-detected when unset
    pub chromium_path: Option<PathBuf>,
    /// Keep the Chromium sandbox (disable inside containers)
    pub sandbox: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
        }
    }
}

/// Suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Storefront root; relative paths resolve against it
    pub base_url: String,
    /// Live browser or simulator
    pub target: Target,
    /// Parallel sessions (0 = available parallelism)
    pub workers: usize,
    /// Re-runs of a failed scenario
    pub retries: u32,
    /// Skip remaining scenarios after the first failure
    pub fail_fast: bool,
    /// Timeouts
    pub timeouts: Timeouts,
    /// Browser settings
    pub browser: BrowserSettings,
    /// Attach a screenshot when a scenario fails
    pub screenshot_on_failure: bool,
    /// Allure results directory
    pub output_dir: PathBuf,
    /// Directory with `credentials.yaml` / `products.yaml`; embedded data when unset
    pub test_data: Option<PathBuf>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            target: Target::default(),
            workers: 0,
            retries: 0,
            fail_fast: false,
            timeouts: Timeouts::default(),
            browser: BrowserSettings::default(),
            screenshot_on_failure: true,
            output_dir: PathBuf::from("allure-results"),
            test_data: None,
        }
    }
}

impl SuiteConfig {
    /// Parse YAML
    pub fn from_yaml(source: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml_ng::from_str(source)?;
        config.validated()
    }

    /// Load from a file
    pub fn load(path: impl AsRef<Path>) -> E2eResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            E2eError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded suite config");
        Self::from_yaml(&source)
    }

    /// Load `path` if given, else `swaglabs.yaml` if present, else defaults
    pub fn discover(path: Option<&Path>) -> E2eResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Apply `SWAGLABS_BASE_URL`, `SWAGLABS_WORKERS` and `CI`
    pub fn with_env(self) -> E2eResult<Self> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides read through `var`
    pub fn with_env_from(mut self, var: impl Fn(&str) -> Option<String>) -> E2eResult<Self> {
        if var("CI").is_some_and(|v| !v.is_empty() && v != "false" && v != "0") {
            self.retries = CI_RETRIES;
            self.workers = 1;
        }
        if let Some(url) = var("SWAGLABS_BASE_URL") {
            self.base_url = url;
        }
        if let Some(workers) = var("SWAGLABS_WORKERS") {
            self.workers = workers
                .parse()
                .map_err(|_| E2eError::config(format!("SWAGLABS_WORKERS must be a number, got '{workers}'")))?;
        }
        self.validated()
    }

    /// Check invariants and normalize the base URL to end with `/`
    pub fn validated(mut self) -> E2eResult<Self> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        if self.timeouts.poll_ms == 0 {
            return Err(E2eError::config("timeouts.poll_ms must be positive"));
        }
        if self.browser.viewport_width == 0 || self.browser.viewport_height == 0 {
            return Err(E2eError::config("viewport must be non-empty"));
        }
        Ok(self)
    }

    /// Resolve a path against `base_url`; absolute URLs pass through
    #[must_use]
    pub fn resolve_url(&self, path: &str) -> String {
        if path.contains("://") || path.starts_with("about:") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// Worker count with `0` resolved to available parallelism
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        } else {
            self.workers
        }
    }

    /// Locator options from the timeouts
    #[must_use]
    pub const fn locator_options(&self) -> LocatorOptions {
        LocatorOptions {
            timeout: Duration::from_millis(self.timeouts.action_ms),
            poll_interval: Duration::from_millis(self.timeouts.poll_ms),
        }
    }

    /// Retry budget for web-first assertions
    #[must_use]
    pub const fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(Duration::from_millis(self.timeouts.expect_ms))
            .with_poll_interval(Duration::from_millis(self.timeouts.poll_ms))
    }

    /// Test data from `test_data`, or the embedded catalog
    pub fn load_test_data(&self) -> E2eResult<TestData> {
        match &self.test_data {
            Some(dir) => TestData::load(dir),
            None => TestData::embedded(),
        }
    }

    // Builder-style overrides used by the CLI

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the target
    #[must_use]
    pub const fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Set worker count
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set retries
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set fail-fast
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set the output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set timeouts
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Show the browser window
    #[must_use]
    pub const fn headed(mut self) -> Self {
        self.browser.headless = false;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = SuiteConfig::default();
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.target, Target::Simulated);
            assert_eq!(config.timeouts.action_ms, 5000);
            assert!(config.screenshot_on_failure);
        }

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = SuiteConfig::from_yaml(
                "base_url: http://localhost:3000\ntarget: live\ntimeouts:\n  action_ms: 100\n",
            )
            .unwrap();
            assert_eq!(config.base_url, "http://localhost:3000/");
            assert_eq!(config.target, Target::Live);
            assert_eq!(config.timeouts.action_ms, 100);
            assert_eq!(config.timeouts.poll_ms, 50);
            assert!(config.browser.headless);
        }

        #[test]
        fn test_rejects_non_http_base_url() {
            assert!(matches!(
                SuiteConfig::from_yaml("base_url: saucedemo.com"),
                Err(E2eError::Config { .. })
            ));
        }

        #[test]
        fn test_load_reads_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join(CONFIG_FILE);
            std::fs::write(&path, "workers: 3\nfail_fast: true\n").unwrap();
            let config = SuiteConfig::load(&path).unwrap();
            assert_eq!(config.workers, 3);
            assert!(config.fail_fast);
            assert!(SuiteConfig::load(dir.path().join("missing.yaml")).is_err());
        }

        #[test]
        fn test_target_from_str() {
            assert_eq!("sim".parse::<Target>().unwrap(), Target::Simulated);
            assert_eq!("LIVE".parse::<Target>().unwrap(), Target::Live);
            assert!("firefox".parse::<Target>().is_err());
        }
    }

    mod env_tests {
        use super::*;

        #[test]
        fn test_ci_profile() {
            let config = SuiteConfig::default().with_env_from(env(&[("CI", "true")])).unwrap();
            assert_eq!(config.retries, CI_RETRIES);
            assert_eq!(config.workers, 1);
        }

        #[test]
        fn test_explicit_workers_beat_ci() {
            let config = SuiteConfig::default()
                .with_env_from(env(&[("CI", "1"), ("SWAGLABS_WORKERS", "4")]))
                .unwrap();
            assert_eq!(config.workers, 4);
        }

        #[test]
        fn test_bad_worker_count() {
            assert!(SuiteConfig::default()
                .with_env_from(env(&[("SWAGLABS_WORKERS", "many")]))
                .is_err());
        }

        #[test]
        fn test_base_url_override() {
            let config = SuiteConfig::default()
                .with_env_from(env(&[("SWAGLABS_BASE_URL", "http://127.0.0.1:8080")]))
                .unwrap();
            assert_eq!(config.resolve_url("/cart.html"), "http://127.0.0.1:8080/cart.html");
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_resolve_relative_and_absolute() {
            let config = SuiteConfig::default();
            assert_eq!(config.resolve_url("/"), DEFAULT_BASE_URL);
            assert_eq!(
                config.resolve_url("inventory.html"),
                "https://www.saucedemo.com/inventory.html"
            );
            assert_eq!(
                config.resolve_url("https://saucelabs.com/"),
                "https://saucelabs.com/"
            );
        }

        #[test]
        fn test_effective_workers() {
            assert_eq!(SuiteConfig::default().with_workers(2).effective_workers(), 2);
            assert!(SuiteConfig::default().effective_workers() >= 1);
        }
    }
}
