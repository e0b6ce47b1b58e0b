//! In-memory storefront.
//!
//! A hermetic stand-in for the remote application: every session gets its
//! own state, the DOM is re-rendered from that state on each query, and
//! element operations go through the same CSS selectors the page objects
//! use against a real browser.

mod app;
mod dom;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::data::{Product, TestData};
use crate::driver::{DriverHandle, LocatorResolver, PageNavigator, SessionLauncher};
use crate::locator::Selector;
use crate::result::{E2eError, E2eResult};
use crate::wait::LoadState;

pub use app::{Account, AccountKind, Screen, Storefront, ABOUT_URL, STORE_PASSWORD};
pub use dom::{Action, Binding, CssSelector, Node};

/// Default login delay for `performance_glitch_user`
pub const DEFAULT_GLITCH_DELAY_MS: u64 = 300;

/// Options for a simulated session
#[derive(Debug, Clone)]
pub struct SimOptions {
    /// Base URL the storefront answers on
    pub base_url: String,
    /// Inventory
    pub products: Vec<Product>,
    /// Accepted accounts
    pub accounts: Vec<Account>,
    /// Login delay for the performance glitch account
    pub glitch_delay: Duration,
    /// Screenshot size
    pub viewport: (u32, u32),
}

impl SimOptions {
    /// Storefront stocked from a test data catalog
    #[must_use]
    pub fn new(base_url: impl Into<String>, data: &TestData) -> Self {
        Self {
            base_url: base_url.into(),
            products: data.products.clone(),
            accounts: Account::defaults(),
            glitch_delay: Duration::from_millis(DEFAULT_GLITCH_DELAY_MS),
            viewport: (640, 360),
        }
    }

    /// Set the glitch delay
    #[must_use]
    pub const fn with_glitch_delay(mut self, delay: Duration) -> Self {
        self.glitch_delay = delay;
        self
    }

    /// Set the screenshot size
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = (width, height);
        self
    }
}

/// One simulated browser page
#[derive(Debug)]
pub struct SimulatedStorefront {
    state: Mutex<Storefront>,
    viewport: (u32, u32),
    closed: AtomicBool,
}

/// What the driver learned about one addressed element
struct Target {
    visible: bool,
    tag: &'static str,
    action: Option<Action>,
    binding: Option<Binding>,
    options: Vec<String>,
}

impl SimulatedStorefront {
    /// Fresh session, not yet navigated anywhere
    #[must_use]
    pub fn new(options: SimOptions) -> Self {
        let state = Storefront::new(
            &options.base_url,
            options.products,
            options.accounts,
            options.glitch_delay,
        );
        Self {
            state: Mutex::new(state),
            viewport: options.viewport,
            closed: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_defaults() -> Self {
        let data = TestData::embedded().expect("embedded test data");
        Self::new(SimOptions::new("https://www.saucedemo.com/", &data).with_glitch_delay(Duration::ZERO))
    }

    #[cfg(test)]
    pub(crate) async fn goto_base(&self) -> E2eResult<()> {
        let base = self.with_state(|s| Ok(s.base_url().to_string()))?;
        self.goto(&base).await
    }

    /// Current screen
    pub fn screen(&self) -> E2eResult<Screen> {
        self.with_state(|s| Ok(s.screen()))
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut Storefront) -> E2eResult<R>) -> E2eResult<R> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(E2eError::driver("page has been closed"));
        }
        let mut state = self
            .state
            .lock()
            .map_err(|_| E2eError::driver("simulated page state poisoned"))?;
        f(&mut state)
    }

    fn parse(selector: &Selector) -> E2eResult<CssSelector> {
        CssSelector::parse(&selector.to_css())
    }

    fn target(state: &Storefront, selector: &Selector, index: usize) -> E2eResult<Target> {
        let css = Self::parse(selector)?;
        let root = state.render();
        let hits = css.query_all(&root);
        let hit = hits.get(index).ok_or_else(|| E2eError::ElementNotFound {
            selector: selector.to_css(),
            index,
        })?;
        Ok(Target {
            visible: hit.visible,
            tag: hit.node.tag,
            action: hit.node.action,
            binding: hit.node.binding,
            options: hit
                .node
                .children
                .iter()
                .filter(|c| c.tag == "option")
                .filter_map(|c| c.get_attr("value").map(str::to_string))
                .collect(),
        })
    }

    fn require_visible(selector: &Selector, target: &Target, action: &'static str) -> E2eResult<()> {
        if target.visible {
            Ok(())
        } else {
            Err(E2eError::NotInteractable {
                selector: selector.to_css(),
                action,
                reason: "element is not visible".into(),
            })
        }
    }

    fn snapshot_png(&self, screen: Screen, cart_len: usize) -> E2eResult<Vec<u8>> {
        let (width, height) = self.viewport;
        let background: [u8; 3] = match screen {
            Screen::Login => [226, 35, 26],
            Screen::Inventory => [245, 245, 245],
            Screen::Cart => [237, 242, 247],
            Screen::CheckoutStepOne | Screen::CheckoutStepTwo => [232, 244, 234],
            Screen::CheckoutComplete => [61, 220, 145],
            Screen::External => [255, 255, 255],
        };
        let header_rows = if screen.requires_login() { height / 8 } else { 0 };
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let in_badge = cart_len > 0 && y < header_rows && x + header_rows > width;
                let rgb = if in_badge {
                    [226, 35, 26]
                } else if y < header_rows {
                    [19, 35, 34]
                } else {
                    background
                };
                pixels.extend_from_slice(&rgb);
            }
        }

        let mut output = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut output, width, height);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().map_err(|e| E2eError::Screenshot {
                message: format!("Failed to write PNG header: {e}"),
            })?;
            writer
                .write_image_data(&pixels)
                .map_err(|e| E2eError::Screenshot {
                    message: format!("Failed to write PNG data: {e}"),
                })?;
        }
        Ok(output)
    }
}

#[async_trait]
impl LocatorResolver for SimulatedStorefront {
    async fn count(&self, selector: &Selector) -> E2eResult<usize> {
        let css = Self::parse(selector)?;
        self.with_state(|state| Ok(css.query_all(&state.render()).len()))
    }

    async fn is_visible(&self, selector: &Selector, index: usize) -> E2eResult<bool> {
        let css = Self::parse(selector)?;
        self.with_state(|state| {
            Ok(css
                .query_all(&state.render())
                .get(index)
                .is_some_and(|hit| hit.visible))
        })
    }

    async fn text_content(&self, selector: &Selector, index: usize) -> E2eResult<Option<String>> {
        let css = Self::parse(selector)?;
        self.with_state(|state| {
            Ok(css
                .query_all(&state.render())
                .get(index)
                .map(|hit| hit.node.text_content()))
        })
    }

    async fn all_text_contents(&self, selector: &Selector) -> E2eResult<Vec<String>> {
        let css = Self::parse(selector)?;
        self.with_state(|state| {
            Ok(css
                .query_all(&state.render())
                .iter()
                .map(|hit| hit.node.text_content())
                .collect())
        })
    }

    async fn fill(&self, selector: &Selector, index: usize, text: &str) -> E2eResult<()> {
        self.with_state(|state| {
            let target = Self::target(state, selector, index)?;
            Self::require_visible(selector, &target, "filled")?;
            match (target.tag, target.binding) {
                ("input", Some(binding)) => state.fill(binding, text),
                _ => Err(E2eError::NotInteractable {
                    selector: selector.to_css(),
                    action: "filled",
                    reason: format!("<{}> is not an editable input", target.tag),
                }),
            }
        })
    }

    async fn click(&self, selector: &Selector, index: usize) -> E2eResult<()> {
        let effect = self.with_state(|state| {
            let target = Self::target(state, selector, index)?;
            Self::require_visible(selector, &target, "clicked")?;
            Ok(target.action.map(|action| {
                trace!(?action, "simulated click");
                state.click(action)
            }))
        })?;
        if let Some(app::Effect::Delay(delay)) = effect {
            debug!(delay_ms = delay.as_millis() as u64, "simulated slow response");
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn select_option(&self, selector: &Selector, index: usize, value: &str) -> E2eResult<()> {
        self.with_state(|state| {
            let target = Self::target(state, selector, index)?;
            Self::require_visible(selector, &target, "selected")?;
            let Some(binding) = target.binding.filter(|_| target.tag == "select") else {
                return Err(E2eError::NotInteractable {
                    selector: selector.to_css(),
                    action: "selected",
                    reason: format!("<{}> is not a <select>", target.tag),
                });
            };
            if !target.options.iter().any(|option| option == value) {
                return Err(E2eError::NotInteractable {
                    selector: selector.to_css(),
                    action: "selected",
                    reason: format!("no option with value '{value}'"),
                });
            }
            state.select(binding, value)
        })
    }
}

#[async_trait]
impl PageNavigator for SimulatedStorefront {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        debug!(url, "simulated navigation");
        self.with_state(|state| state.navigate(url))
    }

    async fn wait_for_load_state(&self, _state: LoadState) -> E2eResult<()> {
        self.with_state(|_| Ok(()))
    }

    async fn current_url(&self) -> E2eResult<String> {
        self.with_state(|state| Ok(state.url()))
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        let (screen, cart_len) = self.with_state(|state| Ok((state.screen(), state.cart().len())))?;
        self.snapshot_png(screen, cart_len)
    }

    async fn close(&self) -> E2eResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Launches one [`SimulatedStorefront`] per session
#[derive(Debug, Clone)]
pub struct SimLauncher {
    options: SimOptions,
}

impl SimLauncher {
    /// Launcher producing storefronts built from `options`
    #[must_use]
    pub const fn new(options: SimOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl SessionLauncher for SimLauncher {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn launch(&self) -> E2eResult<DriverHandle> {
        Ok(Arc::new(SimulatedStorefront::new(self.options.clone())))
    }
}
