//! Driver capability traits.
//!
//! Page objects never talk to a concrete browser. They hold an
//! `Arc<dyn BrowserDriver>` and use two narrow capabilities:
//!
//! - [`LocatorResolver`]: element operations addressed by selector and match index
//! - [`PageNavigator`]: page-level navigation, load state and screenshots
//!
//! Two implementations ship with the crate: the in-memory
//! [`crate::sim::SimulatedStorefront`] and, behind the `browser` feature,
//! a Chrome `DevTools` Protocol adapter in [`crate::browser`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::locator::Selector;
use crate::result::E2eResult;
use crate::wait::LoadState;

/// Element operations keyed by selector and 0-based match index.
///
/// Implementations perform no waiting; auto-wait lives in [`crate::Locator`].
#[async_trait]
pub trait LocatorResolver: Send + Sync {
    /// Number of elements currently matching `selector`
    async fn count(&self, selector: &Selector) -> E2eResult<usize>;

    /// Whether the `index`-th match is rendered and visible
    async fn is_visible(&self, selector: &Selector, index: usize) -> E2eResult<bool>;

    /// Text content of the `index`-th match (`None` when there is no such element)
    async fn text_content(&self, selector: &Selector, index: usize) -> E2eResult<Option<String>>;

    /// Text content of every match in document order
    async fn all_text_contents(&self, selector: &Selector) -> E2eResult<Vec<String>>;

    /// Replace the value of an input
    async fn fill(&self, selector: &Selector, index: usize, text: &str) -> E2eResult<()>;

    /// Click an element
    async fn click(&self, selector: &Selector, index: usize) -> E2eResult<()>;

    /// Choose an option of a `<select>` by value
    async fn select_option(&self, selector: &Selector, index: usize, value: &str)
        -> E2eResult<()>;
}

/// Page-level operations.
#[async_trait]
pub trait PageNavigator: Send + Sync {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Block until the page reaches `state`
    async fn wait_for_load_state(&self, state: LoadState) -> E2eResult<()>;

    /// Current page URL
    async fn current_url(&self) -> E2eResult<String>;

    /// PNG of the visible viewport
    async fn screenshot(&self) -> E2eResult<Vec<u8>>;

    /// Release the session's browser resources
    async fn close(&self) -> E2eResult<()>;
}

/// Everything a page object needs from a browser session.
pub trait BrowserDriver: LocatorResolver + PageNavigator {}

impl<T: LocatorResolver + PageNavigator + ?Sized> BrowserDriver for T {}

/// Shared handle to a session's driver
pub type DriverHandle = Arc<dyn BrowserDriver>;

/// Produces one fresh, isolated driver per scenario.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Short name used in logs and reports (`simulated`, `chromium`)
    fn name(&self) -> &str;

    /// Start a new isolated browser session
    async fn launch(&self) -> E2eResult<DriverHandle>;
}
