//! Wait mechanisms.
//!
//! Polling primitives shared by locators, URL waits and retrying assertions,
//! plus the URL patterns accepted by [`crate::Session::wait_for_url`].

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use regex::Regex;

use crate::result::{E2eError, E2eResult};

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// `load` event fired
    #[default]
    Load,
    /// `DOMContentLoaded` fired
    DomContentLoaded,
}

impl LoadState {
    /// The `document.readyState` values that satisfy this state
    #[must_use]
    pub const fn ready_states(&self) -> &'static [&'static str] {
        match self {
            Self::Load => &["complete"],
            Self::DomContentLoaded => &["interactive", "complete"],
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::DomContentLoaded => write!(f, "domcontentloaded"),
        }
    }
}

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Outcome of [`poll_until`] when the condition never held.
#[derive(Debug)]
pub struct PollExpired<L> {
    /// Last value observed by the probe
    pub last: L,
    /// Time spent polling
    pub waited: Duration,
}

/// Re-run `probe` until it yields `Ok(Ok(_))`, an error, or the timeout expires.
///
/// The probe runs at least once. `Ok(Err(observed))` means "not yet"; the last
/// observation is handed back so callers can report what the page showed.
pub async fn poll_until<T, L, F, Fut>(
    options: WaitOptions,
    mut probe: F,
) -> E2eResult<Result<T, PollExpired<Option<L>>>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<Result<T, L>>>,
{
    let start = Instant::now();
    let mut last = None;
    loop {
        match probe().await? {
            Ok(value) => return Ok(Ok(value)),
            Err(observed) => last = Some(observed),
        }
        let waited = start.elapsed();
        if waited >= options.timeout() {
            return Ok(Err(PollExpired { last, waited }));
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// URL matcher for navigation waits and URL assertions
#[derive(Debug, Clone)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Contains substring
    Contains(String),
    /// Compiled regex
    Regex(Regex),
    /// Glob pattern: `**` spans path separators, `*` stays within a segment
    Glob {
        /// Pattern as written
        pattern: String,
        /// Anchored regex compiled from the pattern
        regex: Option<Regex>,
    },
}

impl UrlPattern {
    /// Exact match
    #[must_use]
    pub fn exact(url: impl Into<String>) -> Self {
        Self::Exact(url.into())
    }

    /// Substring match
    #[must_use]
    pub fn contains(fragment: impl Into<String>) -> Self {
        Self::Contains(fragment.into())
    }

    /// Glob match
    #[must_use]
    pub fn glob(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let regex = glob_to_regex(&pattern);
        Self::Glob { pattern, regex }
    }

    /// Regex match
    pub fn regex(pattern: &str) -> E2eResult<Self> {
        Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| E2eError::config(format!("bad URL regex '{pattern}': {e}")))
    }

    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(expected) => url == expected,
            Self::Contains(fragment) => url.contains(fragment.as_str()),
            Self::Regex(re) => re.is_match(url),
            Self::Glob { regex, .. } => regex.as_ref().is_some_and(|re| re.is_match(url)),
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(url) => write!(f, "{url}"),
            Self::Contains(fragment) => write!(f, "*{fragment}*"),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
            Self::Glob { pattern, .. } => write!(f, "{pattern}"),
        }
    }
}

fn glob_to_regex(pattern: &str) -> Option<Regex> {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '*' {
            if chars.peek() == Some(&'*') {
                chars.next();
                out.push_str(".*");
            } else {
                out.push_str("[^/]*");
            }
        } else {
            out.push_str(&regex::escape(&c.to_string()));
        }
    }
    out.push('$');
    Regex::new(&out).ok()
}
