//! Product list (`/inventory.html`).

use tracing::debug;

use super::{cart_badge_count, PageObject};
use crate::assertion::ensure_eq;
use crate::data::{Price, SortOrder};
use crate::result::E2eResult;
use crate::session::Session;

const LIST: &str = ".inventory_list";
const ITEM: &str = ".inventory_item";
const ITEM_NAME: &str = ".inventory_item_name";
const ITEM_PRICE: &str = ".inventory_item_price";
const ITEM_BUTTON: &str = ".inventory_item button";
const CART_LINK: &str = ".shopping_cart_link";
const SORT: &str = ".product_sort_container";
const MENU_BUTTON: &str = "#react-burger-menu-btn";
const LOGOUT_LINK: &str = "#logout_sidebar_link";

/// Product list
#[derive(Debug, Clone, Copy)]
pub struct InventoryPage<'a> {
    session: &'a Session,
}

impl<'a> InventoryPage<'a> {
    /// Bind to a session
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Assert the product list is visible
    pub async fn verify_on_inventory_page(&self) -> E2eResult<()> {
        self.session.expect(&self.session.css(LIST)).to_be_visible().await
    }

    /// Assert exactly `expected` products are listed (single read, no retry)
    pub async fn verify_product_count(&self, expected: usize) -> E2eResult<()> {
        let count = self.session.css(ITEM).count().await?;
        ensure_eq("product count", expected, count)
    }

    /// Product names in display order
    pub async fn get_product_names(&self) -> E2eResult<Vec<String>> {
        self.session.css(ITEM_NAME).all_text_contents().await
    }

    /// Product prices in display order
    pub async fn get_product_prices(&self) -> E2eResult<Vec<Price>> {
        self.session
            .css(ITEM_PRICE)
            .all_text_contents()
            .await?
            .iter()
            .map(|text| Price::parse_label(text))
            .collect()
    }

    /// Click the `index`-th product button in current display order
    pub async fn add_product_to_cart(&self, index: usize) -> E2eResult<()> {
        debug!(index, "add product to cart");
        self.session.css(ITEM_BUTTON).nth(index).click().await
    }

    /// Re-order the list
    pub async fn sort_products(&self, order: SortOrder) -> E2eResult<()> {
        debug!(%order, "sort products");
        self.session.css(SORT).select_option(order.value()).await
    }

    /// Number shown on the cart badge, 0 when no badge is shown
    pub async fn get_cart_badge_count(&self) -> E2eResult<usize> {
        cart_badge_count(self.session).await
    }

    /// Go to the cart through the header icon
    pub async fn open_cart(&self) -> E2eResult<()> {
        self.session.css(CART_LINK).click().await
    }

    /// Open the burger menu
    pub async fn open_menu(&self) -> E2eResult<()> {
        self.session.css(MENU_BUTTON).click().await
    }

    /// Log out through the menu
    pub async fn logout(&self) -> E2eResult<()> {
        self.open_menu().await?;
        self.session.css(LOGOUT_LINK).click().await
    }

    /// Name of the first listed product
    pub async fn get_first_product_name(&self) -> E2eResult<String> {
        self.session.css(ITEM_NAME).first().text_content().await
    }

    /// Name of the last listed product
    pub async fn get_last_product_name(&self) -> E2eResult<String> {
        self.session.css(ITEM_NAME).last().text_content().await
    }
}

impl PageObject for InventoryPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn path(&self) -> &'static str {
        "/inventory.html"
    }

    fn page_name(&self) -> &'static str {
        "inventory"
    }
}
