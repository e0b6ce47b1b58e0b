//! Cart (`/cart.html`).

use tracing::debug;

use super::{cart_badge_count, PageObject};
use crate::data::Price;
use crate::result::E2eResult;
use crate::session::Session;

const ITEM: &str = ".cart_item";
const ITEM_NAME: &str = ".cart_item .inventory_item_name";
const ITEM_PRICE: &str = ".cart_item .inventory_item_price";
const REMOVE: &str = ".cart_item .cart_button";
const CHECKOUT: &str = "[data-test=\"checkout\"]";
const CONTINUE_SHOPPING: &str = "[data-test=\"continue-shopping\"]";

/// Cart contents
#[derive(Debug, Clone, Copy)]
pub struct CartPage<'a> {
    session: &'a Session,
}

impl<'a> CartPage<'a> {
    /// Bind to a session
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Number of line items
    pub async fn get_cart_item_count(&self) -> E2eResult<usize> {
        self.session.css(ITEM).count().await
    }

    /// Line item names in order
    pub async fn get_cart_item_names(&self) -> E2eResult<Vec<String>> {
        self.session.css(ITEM_NAME).all_text_contents().await
    }

    /// Line item prices in order
    pub async fn get_cart_item_prices(&self) -> E2eResult<Vec<Price>> {
        self.session
            .css(ITEM_PRICE)
            .all_text_contents()
            .await?
            .iter()
            .map(|text| Price::parse_label(text))
            .collect()
    }

    /// Remove the `index`-th line item
    pub async fn remove_item(&self, index: usize) -> E2eResult<()> {
        debug!(index, "remove cart item");
        self.session.css(REMOVE).nth(index).click().await
    }

    /// Start checkout
    pub async fn proceed_to_checkout(&self) -> E2eResult<()> {
        self.session.css(CHECKOUT).click().await
    }

    /// Back to the product list
    pub async fn continue_shopping(&self) -> E2eResult<()> {
        self.session.css(CONTINUE_SHOPPING).click().await
    }

    /// Number shown on the cart badge, 0 when no badge is shown
    pub async fn get_cart_badge_count(&self) -> E2eResult<usize> {
        cart_badge_count(self.session).await
    }

    /// Assert exactly `expected` line items
    pub async fn verify_cart_has_items(&self, expected: usize) -> E2eResult<()> {
        self.session
            .expect(&self.session.css(ITEM))
            .to_have_count(expected)
            .await
    }

    /// Assert the cart has no line items
    pub async fn verify_cart_is_empty(&self) -> E2eResult<()> {
        self.verify_cart_has_items(0).await
    }

    /// Name of the first line item
    pub async fn get_first_item_name(&self) -> E2eResult<String> {
        self.session.css(ITEM_NAME).first().text_content().await
    }
}

impl PageObject for CartPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn path(&self) -> &'static str {
        "/cart.html"
    }

    fn page_name(&self) -> &'static str {
        "cart"
    }
}
