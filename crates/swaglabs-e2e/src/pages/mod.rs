//! Page objects for the storefront screens.
//!
//! Each page object borrows the scenario's [`Session`] and exposes
//! intention-revealing operations over its screen. Nothing is cached:
//! every read goes back to the DOM, so the page object is always
//! consistent with what the storefront currently renders.

mod cart;
mod checkout;
mod inventory;
mod login;

use async_trait::async_trait;

use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use crate::wait::LoadState;

pub use cart::CartPage;
pub use checkout::{CheckoutPage, CheckoutStep};
pub use inventory::InventoryPage;
pub use login::LoginPage;

/// Header badge showing the number of items in the cart
pub(crate) const CART_BADGE: &str = ".shopping_cart_badge";

/// A screen of the storefront
#[async_trait]
pub trait PageObject: Sync {
    /// Session the page object drives
    fn session(&self) -> &Session;

    /// URL path below the base URL
    fn path(&self) -> &'static str;

    /// Page name for logs
    fn page_name(&self) -> &'static str;

    /// Open the screen directly and wait for DOM content
    async fn navigate(&self) -> E2eResult<()> {
        tracing::debug!(page = self.page_name(), "navigate");
        let session = self.session();
        session.goto(self.path()).await?;
        session.wait_for_load_state(LoadState::DomContentLoaded).await
    }
}

/// Every page object of one session
#[derive(Debug, Clone, Copy)]
pub struct Pages<'a> {
    /// Login screen
    pub login: LoginPage<'a>,
    /// Product list
    pub inventory: InventoryPage<'a>,
    /// Cart
    pub cart: CartPage<'a>,
    /// Checkout flow
    pub checkout: CheckoutPage<'a>,
}

impl<'a> Pages<'a> {
    /// Page objects bound to `session`
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self {
            login: LoginPage::new(session),
            inventory: InventoryPage::new(session),
            cart: CartPage::new(session),
            checkout: CheckoutPage::new(session),
        }
    }
}

/// Reads the header badge; an absent or hidden badge means an empty cart
pub(crate) async fn cart_badge_count(session: &Session) -> E2eResult<usize> {
    let badge = session.css(CART_BADGE);
    if !badge.is_visible().await? {
        return Ok(0);
    }
    let text = badge.text_content().await?;
    text.trim().parse().map_err(|_| E2eError::UnexpectedContent {
        what: "cart badge".into(),
        content: text,
    })
}
