//! Real Chromium over the DevTools protocol.
//!
//! Compiled with the `browser` feature. Every [`CdpLauncher::launch`] starts
//! its own browser process, so sessions share no cookies, storage or cache.
//! Element operations run as small scripts built from
//! [`Selector::to_query_all`]; none of them wait, auto-wait stays in
//! [`crate::Locator`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams,
};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::BrowserSettings;
use crate::driver::{DriverHandle, LocatorResolver, PageNavigator, SessionLauncher};
use crate::locator::Selector;
use crate::result::{E2eError, E2eResult};
use crate::wait::{LoadState, DEFAULT_POLL_INTERVAL_MS};

/// Launches one Chromium per session
#[derive(Debug, Clone)]
pub struct CdpLauncher {
    settings: BrowserSettings,
}

impl CdpLauncher {
    /// Launcher using `settings`
    #[must_use]
    pub const fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn browser_config(&self) -> E2eResult<CdpConfig> {
        let mut builder = CdpConfig::builder()
            .window_size(self.settings.viewport_width, self.settings.viewport_height);
        if !self.settings.headless {
            builder = builder.with_head();
        }
        if !self.settings.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &self.settings.chromium_path {
            builder = builder.chrome_executable(path);
        }
        builder
            .build()
            .map_err(|message| E2eError::BrowserLaunch { message })
    }
}

#[async_trait]
impl SessionLauncher for CdpLauncher {
    fn name(&self) -> &str {
        "chromium"
    }

    async fn launch(&self) -> E2eResult<DriverHandle> {
        let (browser, mut handler) = CdpBrowser::launch(self.browser_config()?)
            .await
            .map_err(|e| E2eError::BrowserLaunch {
                message: e.to_string(),
            })?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| E2eError::BrowserLaunch {
                message: e.to_string(),
            })?;
        debug!(headless = self.settings.headless, "chromium session started");

        Ok(Arc::new(CdpDriver {
            browser: Mutex::new(browser),
            page,
            events,
            closed: AtomicBool::new(false),
        }))
    }
}

/// One Chromium process with a single page
pub struct CdpDriver {
    browser: Mutex<CdpBrowser>,
    page: CdpPage,
    events: JoinHandle<()>,
    closed: AtomicBool,
}

impl fmt::Debug for CdpDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpDriver")
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl CdpDriver {
    fn ensure_open(&self) -> E2eResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(E2eError::driver("browser session is closed"))
        } else {
            Ok(())
        }
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> E2eResult<T> {
        self.ensure_open()?;
        self.page
            .evaluate(script)
            .await
            .map_err(|e| E2eError::driver(e.to_string()))?
            .into_value()
            .map_err(|e| E2eError::driver(format!("unexpected script result: {e}")))
    }

    async fn act(
        &self,
        selector: &Selector,
        index: usize,
        action: &'static str,
        script: String,
    ) -> E2eResult<()> {
        let outcome: String = self.eval(script).await?;
        match outcome.as_str() {
            "ok" => Ok(()),
            "missing" => Err(E2eError::ElementNotFound {
                selector: selector.to_css(),
                index,
            }),
            reason => Err(E2eError::NotInteractable {
                selector: selector.to_css(),
                action,
                reason: reason.to_string(),
            }),
        }
    }
}

/// JSON string literal for embedding in a script
fn js_string(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

fn visible_script(selector: &Selector, index: usize) -> String {
    format!(
        "(() => {{ const el = {}; if (!el) return false; \
         const s = getComputedStyle(el); const r = el.getBoundingClientRect(); \
         return s.display !== 'none' && s.visibility !== 'hidden' && r.width > 0 && r.height > 0; }})()",
        selector.to_query_nth(index)
    )
}

fn text_script(selector: &Selector, index: usize) -> String {
    format!(
        "(() => {{ const el = {}; return el ? el.textContent : null; }})()",
        selector.to_query_nth(index)
    )
}

fn click_script(selector: &Selector, index: usize) -> String {
    format!(
        "(() => {{ const el = {}; if (!el) return 'missing'; \
         if (el.disabled) return 'element is disabled'; \
         el.scrollIntoView({{ block: 'center' }}); el.click(); return 'ok'; }})()",
        selector.to_query_nth(index)
    )
}

// Goes through the prototype's value setter so React-controlled inputs see the change
fn fill_script(selector: &Selector, index: usize, text: &str) -> String {
    format!(
        "(() => {{ const el = {}; if (!el) return 'missing'; \
         if (!(el instanceof HTMLInputElement || el instanceof HTMLTextAreaElement)) \
           return 'element is not an <input>'; \
         el.focus(); \
         Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value').set.call(el, {}); \
         el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
         return 'ok'; }})()",
        selector.to_query_nth(index),
        js_string(text)
    )
}

fn select_script(selector: &Selector, index: usize, value: &str) -> String {
    let value = js_string(value);
    format!(
        "(() => {{ const el = {}; if (!el) return 'missing'; \
         if (!(el instanceof HTMLSelectElement)) return 'element is not a <select>'; \
         if (![...el.options].some(o => o.value === {value})) return 'no option with value ' + {value}; \
         Object.getOwnPropertyDescriptor(HTMLSelectElement.prototype, 'value').set.call(el, {value}); \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
         return 'ok'; }})()",
        selector.to_query_nth(index)
    )
}

#[async_trait]
impl LocatorResolver for CdpDriver {
    async fn count(&self, selector: &Selector) -> E2eResult<usize> {
        self.eval(format!("{}.length", selector.to_query_all())).await
    }

    async fn is_visible(&self, selector: &Selector, index: usize) -> E2eResult<bool> {
        self.eval(visible_script(selector, index)).await
    }

    async fn text_content(&self, selector: &Selector, index: usize) -> E2eResult<Option<String>> {
        self.eval(text_script(selector, index)).await
    }

    async fn all_text_contents(&self, selector: &Selector) -> E2eResult<Vec<String>> {
        self.eval(format!(
            "Array.from({}, el => el.textContent ?? '')",
            selector.to_query_all()
        ))
        .await
    }

    async fn fill(&self, selector: &Selector, index: usize, text: &str) -> E2eResult<()> {
        debug!(selector = %selector, index, "fill");
        self.act(selector, index, "filled", fill_script(selector, index, text))
            .await
    }

    async fn click(&self, selector: &Selector, index: usize) -> E2eResult<()> {
        debug!(selector = %selector, index, "click");
        self.act(selector, index, "clicked", click_script(selector, index))
            .await
    }

    async fn select_option(
        &self,
        selector: &Selector,
        index: usize,
        value: &str,
    ) -> E2eResult<()> {
        debug!(selector = %selector, index, value, "select option");
        self.act(selector, index, "selected", select_script(selector, index, value))
            .await
    }
}

#[async_trait]
impl PageNavigator for CdpDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.ensure_open()?;
        self.page
            .goto(url)
            .await
            .map_err(|e| E2eError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for_load_state(&self, state: LoadState) -> E2eResult<()> {
        loop {
            let ready: String = self.eval("document.readyState".to_string()).await?;
            if state.ready_states().contains(&ready.as_str()) {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)).await;
        }
    }

    async fn current_url(&self) -> E2eResult<String> {
        self.ensure_open()?;
        let url = self
            .page
            .url()
            .await
            .map_err(|e| E2eError::driver(e.to_string()))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn screenshot(&self) -> E2eResult<Vec<u8>> {
        self.ensure_open()?;
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let shot = self
            .page
            .execute(params)
            .await
            .map_err(|e| E2eError::Screenshot {
                message: e.to_string(),
            })?;
        base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| E2eError::Screenshot {
                message: e.to_string(),
            })
    }

    async fn close(&self) -> E2eResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await;
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "chromium did not exit cleanly");
        }
        self.events.abort();
        closed
            .map(|_| ())
            .map_err(|e| E2eError::driver(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod script_tests {
        use super::*;

        #[test]
        fn test_fill_script_escapes_value() {
            let script = fill_script(&Selector::test_id("username"), 0, "o'reilly \"x\"");
            assert!(script.contains(r#"document.querySelectorAll("[data-test=\"username\"]")[0]"#));
            assert!(script.contains(r#""o'reilly \"x\"""#));
        }

        #[test]
        fn test_select_script_checks_option() {
            let script = select_script(&Selector::css(".product_sort_container"), 0, "lohi");
            assert!(script.contains("HTMLSelectElement"));
            assert!(script.contains("\"lohi\""));
        }

        #[test]
        fn test_scripts_address_the_index() {
            let selector = Selector::css(".inventory_item button");
            assert!(click_script(&selector, 3).contains("[3]"));
            assert!(visible_script(&selector, 1).contains("[1]"));
            assert!(text_script(&selector, 2).contains("[2]"));
        }
    }

    mod launcher_tests {
        use super::*;

        #[test]
        fn test_launcher_name() {
            let launcher = CdpLauncher::new(BrowserSettings {
                headless: false,
                sandbox: false,
                ..BrowserSettings::default()
            });
            assert_eq!(launcher.name(), "chromium");
        }
    }
}
