//! Inventory Page Tests

use futures::future::{BoxFuture, FutureExt};

use super::{Scenario, ScenarioKind};
use crate::assertion::{ensure_eq, ensure_seq_eq};
use crate::data::{Price, SortOrder};
use crate::fixture::Preset;
use crate::result::E2eResult;
use crate::session::Session;

const SUITE: &str = "Inventory Page Tests";

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario {
        id: "TC-INV-001",
        title: "Verify all products are displayed",
        suite: SUITE,
        kind: ScenarioKind::Smoke,
        description: "Verifies product listing",
        preset: Preset::LoggedIn,
        body: all_products_displayed,
    },
    Scenario {
        id: "TC-INV-002",
        title: "Sort products by name A to Z",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Tests sorting functionality",
        preset: Preset::LoggedIn,
        body: sort_name_ascending,
    },
    Scenario {
        id: "TC-INV-003",
        title: "Sort products by name Z to A",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Tests sorting functionality",
        preset: Preset::LoggedIn,
        body: sort_name_descending,
    },
    Scenario {
        id: "TC-INV-004",
        title: "Sort products by price low to high",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Tests sorting functionality",
        preset: Preset::LoggedIn,
        body: sort_price_ascending,
    },
    Scenario {
        id: "TC-INV-005",
        title: "Sort products by price high to low",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Tests sorting functionality",
        preset: Preset::LoggedIn,
        body: sort_price_descending,
    },
    Scenario {
        id: "TC-INV-006",
        title: "Add single product to cart",
        suite: SUITE,
        kind: ScenarioKind::Smoke,
        description: "Core shopping functionality",
        preset: Preset::LoggedIn,
        body: add_single_product,
    },
    Scenario {
        id: "TC-INV-007",
        title: "Add multiple products to cart",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Tests cart accumulation",
        preset: Preset::LoggedIn,
        body: add_multiple_products,
    },
    Scenario {
        id: "TC-INV-008",
        title: "Cart badge is hidden when the cart is empty",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Badge reflects an empty cart",
        preset: Preset::LoggedIn,
        body: empty_cart_badge,
    },
];

/// Catalog names in name order
fn expected_names(session: &Session, descending: bool) -> Vec<String> {
    let mut names: Vec<String> = session.data().products.iter().map(|p| p.name.clone()).collect();
    names.sort();
    if descending {
        names.reverse();
    }
    names
}

fn expected_prices(session: &Session, descending: bool) -> Vec<Price> {
    let mut prices: Vec<Price> = session.data().products.iter().map(|p| p.price).collect();
    prices.sort_unstable();
    if descending {
        prices.reverse();
    }
    prices
}

async fn sort_and_capture(session: &Session, order: SortOrder) -> E2eResult<()> {
    session
        .step(&format!("Sort products by {}", order.label()), async {
            session.pages().inventory.sort_products(order).await?;
            session.attach_screenshot(&format!("Sorted {}", order.label())).await
        })
        .await
}

fn all_products_displayed(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let inventory = session.pages().inventory;
        session
            .step("Verify inventory page is displayed", async {
                inventory.verify_on_inventory_page().await?;
                session.attach_screenshot("Inventory Page").await
            })
            .await?;
        session
            .step("Verify product count", async {
                inventory.verify_product_count(session.data().products.len()).await
            })
            .await
    }
    .boxed()
}

fn sort_name_ascending(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        sort_and_capture(session, SortOrder::NameAsc).await?;
        session
            .step("Verify products are sorted A to Z", async {
                let names = session.pages().inventory.get_product_names().await?;
                ensure_seq_eq("product names", &expected_names(session, false), &names)
            })
            .await
    }
    .boxed()
}

fn sort_name_descending(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        sort_and_capture(session, SortOrder::NameDesc).await?;
        session
            .step("Verify products are sorted Z to A", async {
                let names = session.pages().inventory.get_product_names().await?;
                ensure_seq_eq("product names", &expected_names(session, true), &names)
            })
            .await
    }
    .boxed()
}

fn sort_price_ascending(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        sort_and_capture(session, SortOrder::PriceAsc).await?;
        session
            .step("Verify prices are ascending", async {
                let prices = session.pages().inventory.get_product_prices().await?;
                ensure_seq_eq("product prices", &expected_prices(session, false), &prices)
            })
            .await
    }
    .boxed()
}

fn sort_price_descending(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        sort_and_capture(session, SortOrder::PriceDesc).await?;
        session
            .step("Verify prices are descending", async {
                let prices = session.pages().inventory.get_product_prices().await?;
                ensure_seq_eq("product prices", &expected_prices(session, true), &prices)
            })
            .await
    }
    .boxed()
}

fn add_single_product(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let inventory = session.pages().inventory;
        session
            .step("Add first product to cart", async {
                inventory.add_product_to_cart(0).await?;
                session.attach_screenshot("Product Added").await
            })
            .await?;
        session
            .step("Verify cart badge shows 1", async {
                ensure_eq("cart badge", 1, inventory.get_cart_badge_count().await?)
            })
            .await
    }
    .boxed()
}

fn add_multiple_products(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let inventory = session.pages().inventory;
        session
            .step("Add three products to cart", async {
                for index in 0..3 {
                    inventory.add_product_to_cart(index).await?;
                }
                session.attach_screenshot("Three Products Added").await
            })
            .await?;
        session
            .step("Verify cart badge shows 3", async {
                ensure_eq("cart badge", 3, inventory.get_cart_badge_count().await?)
            })
            .await
    }
    .boxed()
}

fn empty_cart_badge(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        session
            .step("Verify no cart badge", async {
                let badge = session.pages().inventory.get_cart_badge_count().await?;
                session.attach_screenshot("Empty Cart Badge").await?;
                ensure_eq("cart badge", 0, badge)
            })
            .await
    }
    .boxed()
}
