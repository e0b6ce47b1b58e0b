//! Cart Tests

use futures::future::{BoxFuture, FutureExt};

use super::{Scenario, ScenarioKind};
use crate::assertion::{ensure_contains, ensure_eq};
use crate::fixture::Preset;
use crate::result::E2eResult;
use crate::session::Session;
use crate::wait::UrlPattern;

const SUITE: &str = "Cart Tests";

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario {
        id: "TC-CART-001",
        title: "Cart displays added items correctly",
        suite: SUITE,
        kind: ScenarioKind::Smoke,
        description: "Verifies cart contents",
        preset: Preset::WithCartItems,
        body: displays_added_items,
    },
    Scenario {
        id: "TC-CART-002",
        title: "Remove item from cart",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Tests item removal",
        preset: Preset::WithCartItems,
        body: remove_item,
    },
    Scenario {
        id: "TC-CART-003",
        title: "Continue shopping returns to inventory page",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Tests navigation",
        preset: Preset::WithCartItems,
        body: continue_shopping,
    },
    Scenario {
        id: "TC-CART-004",
        title: "Proceed to checkout",
        suite: SUITE,
        kind: ScenarioKind::Smoke,
        description: "Critical checkout flow entry",
        preset: Preset::WithCartItems,
        body: proceed_to_checkout,
    },
    Scenario {
        id: "TC-CART-005",
        title: "Cart badge shows correct count",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Tests badge counter",
        preset: Preset::WithCartItems,
        body: badge_count,
    },
    Scenario {
        id: "TC-CART-006",
        title: "Removing an item keeps the other one",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Removal targets the chosen line item",
        preset: Preset::WithCartItems,
        body: removal_keeps_other_item,
    },
];

async fn open_cart(session: &Session) -> E2eResult<()> {
    session
        .step("Navigate to cart", async {
            session.pages().inventory.open_cart().await?;
            session.attach_screenshot("Cart Page").await
        })
        .await
}

fn displays_added_items(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        open_cart(session).await?;
        session
            .step("Verify cart items", async {
                let cart = session.pages().cart;
                cart.verify_cart_has_items(2).await?;
                let names = cart.get_cart_item_names().await?.join("\n");
                for product in session.data().products.iter().take(2) {
                    ensure_contains("cart item names", &names, &product.name)?;
                }
                Ok(())
            })
            .await
    }
    .boxed()
}

fn remove_item(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        open_cart(session).await?;
        let cart = session.pages().cart;
        session
            .step("Remove first item", async {
                cart.remove_item(0).await?;
                session.attach_screenshot("After Removal").await
            })
            .await?;
        session
            .step("Verify one item remains", async { cart.verify_cart_has_items(1).await })
            .await
    }
    .boxed()
}

fn continue_shopping(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        open_cart(session).await?;
        session
            .step("Click continue shopping", async {
                session.pages().cart.continue_shopping().await?;
                session.attach_screenshot("Back to Inventory").await
            })
            .await?;
        session
            .step("Verify inventory page", async {
                session.expect_url(&session.url_of("/inventory.html")).await?;
                session.pages().inventory.verify_on_inventory_page().await
            })
            .await
    }
    .boxed()
}

fn proceed_to_checkout(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        open_cart(session).await?;
        session
            .step("Click checkout", async {
                session.pages().cart.proceed_to_checkout().await?;
                session.attach_screenshot("Checkout Step One").await
            })
            .await?;
        session
            .step("Verify checkout page", async {
                session.expect_url(&UrlPattern::regex("checkout-step-one")?).await?;
                session.pages().checkout.verify_on_step_one().await
            })
            .await
    }
    .boxed()
}

fn badge_count(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        session
            .step("Verify cart badge shows 2", async {
                let count = session.pages().inventory.get_cart_badge_count().await?;
                session.attach_screenshot("Cart Badge").await?;
                ensure_eq("cart badge", 2, count)
            })
            .await?;
        open_cart(session).await?;
        session
            .step("Verify badge matches line items", async {
                let cart = session.pages().cart;
                ensure_eq(
                    "cart badge",
                    cart.get_cart_item_count().await?,
                    cart.get_cart_badge_count().await?,
                )
            })
            .await
    }
    .boxed()
}

fn removal_keeps_other_item(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        open_cart(session).await?;
        let cart = session.pages().cart;
        let names = cart.get_cart_item_names().await?;
        ensure_eq("cart items", 2, names.len())?;
        session
            .step("Remove first item", async { cart.remove_item(0).await })
            .await?;
        session
            .step("Verify the second item is left", async {
                cart.verify_cart_has_items(1).await?;
                let remaining = cart.get_first_item_name().await?;
                ensure_eq("remaining item", names[1].as_str(), remaining.as_str())?;
                ensure_eq("cart badge", 1, cart.get_cart_badge_count().await?)
            })
            .await
    }
    .boxed()
}
