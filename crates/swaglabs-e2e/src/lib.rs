//! Swag Labs end-to-end suite.
//!
//! Page objects for the saucedemo storefront (login, inventory, cart,
//! checkout), scenario presets, a scenario catalog and a parallel runner
//! that writes Allure-compatible results.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  scenarios ──► fixture (presets) ──► pages ──► Locator / expect  │
//! │      ▲                                             │             │
//! │   runner ── Session (driver, config, data, recorder)             │
//! │      │                                             ▼             │
//! │  reporter (Allure results)        BrowserDriver (trait)          │
//! │                                    ├─ sim::SimulatedStorefront   │
//! │                                    └─ browser::CdpDriver         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Page objects only see `Arc<dyn BrowserDriver>`; the simulated storefront
//! runs the whole suite hermetically, the `browser` feature drives a real
//! Chromium against the deployed site.

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod assertion;
#[cfg(feature = "browser")]
mod browser;
mod config;
mod data;
mod driver;
mod fixture;
mod locator;
/// Page objects for each storefront screen
pub mod pages;
mod reporter;
mod result;
mod runner;
/// Scenario catalog and filtering
pub mod scenarios;
mod session;
/// In-memory storefront implementing the driver traits
pub mod sim;
mod wait;

pub use assertion::{
    ensure, ensure_contains, ensure_eq, ensure_seq_eq, expect, expect_page, normalize_whitespace,
    LocatorAssertion, PageAssertion, RetryConfig,
};
#[cfg(feature = "browser")]
pub use browser::{CdpDriver, CdpLauncher};
pub use config::{BrowserSettings, SuiteConfig, Target, Timeouts, CI_RETRIES, CONFIG_FILE, DEFAULT_BASE_URL};
pub use data::{
    CheckoutCatalog, CheckoutField, CheckoutInfo, CredentialCatalog, Credentials, Price, Product,
    SortOrder, TestData,
};
pub use driver::{BrowserDriver, DriverHandle, LocatorResolver, PageNavigator, SessionLauncher};
pub use fixture::Preset;
pub use locator::{Locator, LocatorOptions, Nth, Selector, DEFAULT_TIMEOUT_MS};
pub use pages::{CartPage, CheckoutPage, CheckoutStep, InventoryPage, LoginPage, PageObject, Pages};
pub use reporter::{
    AllureResultsWriter, Attachment, FailureSummary, Label, ScenarioHeader, ScenarioRecorder,
    ScenarioReport, StatusDetails, StepRecord, SuiteReport, SuiteSummary, TestStatus,
    SUMMARY_FILE,
};
pub use result::{E2eError, E2eResult};
pub use runner::{launcher_for, ScenarioObserver, SuiteRunner};
pub use scenarios::{Scenario, ScenarioBody, ScenarioFilter, ScenarioKind};
pub use session::Session;
pub use sim::{SimLauncher, SimOptions, SimulatedStorefront};
pub use wait::{poll_until, LoadState, PollExpired, UrlPattern, WaitOptions};

/// Everything a scenario body usually needs
pub mod prelude {
    pub use super::assertion::{ensure, ensure_contains, ensure_eq, ensure_seq_eq, expect};
    pub use super::data::{CheckoutInfo, Price, SortOrder};
    pub use super::fixture::Preset;
    pub use super::pages::{CheckoutStep, PageObject, Pages};
    pub use super::result::{E2eError, E2eResult};
    pub use super::session::Session;
    pub use super::wait::UrlPattern;
}
