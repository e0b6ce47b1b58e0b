//! Checkout Tests

use futures::future::{BoxFuture, FutureExt};

use super::{Scenario, ScenarioKind};
use crate::assertion::{ensure, ensure_eq};
use crate::data::{CheckoutField, CheckoutInfo, Price};
use crate::fixture::Preset;
use crate::pages::CheckoutStep;
use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use crate::wait::UrlPattern;

const SUITE: &str = "Checkout Tests";

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario {
        id: "TC-CHECKOUT-001",
        title: "Complete checkout successfully",
        suite: SUITE,
        kind: ScenarioKind::Smoke,
        description: "Critical end-to-end purchase flow",
        preset: Preset::ReadyForCheckout,
        body: complete_checkout,
    },
    Scenario {
        id: "TC-CHECKOUT-002",
        title: "Error when first name is empty",
        suite: SUITE,
        kind: ScenarioKind::Negative,
        description: "Tests form validation",
        preset: Preset::ReadyForCheckout,
        body: empty_first_name,
    },
    Scenario {
        id: "TC-CHECKOUT-003",
        title: "Error when last name is empty",
        suite: SUITE,
        kind: ScenarioKind::Negative,
        description: "Tests form validation",
        preset: Preset::ReadyForCheckout,
        body: empty_last_name,
    },
    Scenario {
        id: "TC-CHECKOUT-004",
        title: "Error when postal code is empty",
        suite: SUITE,
        kind: ScenarioKind::Negative,
        description: "Tests form validation",
        preset: Preset::ReadyForCheckout,
        body: empty_postal_code,
    },
    Scenario {
        id: "TC-CHECKOUT-005",
        title: "Cancel checkout returns to cart",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Tests cancellation flow",
        preset: Preset::ReadyForCheckout,
        body: cancel_returns_to_cart,
    },
    Scenario {
        id: "TC-CHECKOUT-006",
        title: "Checkout summary is displayed correctly",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Verifies order summary",
        preset: Preset::ReadyForCheckout,
        body: summary_displayed,
    },
    Scenario {
        id: "TC-CHECKOUT-007",
        title: "First name error wins when every field is empty",
        suite: SUITE,
        kind: ScenarioKind::Negative,
        description: "Validation reports the first empty field",
        preset: Preset::ReadyForCheckout,
        body: all_fields_empty,
    },
    Scenario {
        id: "TC-CHECKOUT-008",
        title: "Summary total equals item total plus tax",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Verifies order arithmetic",
        preset: Preset::ReadyForCheckout,
        body: total_adds_up,
    },
];

/// Submit step one with `info` and expect the banner for its first empty field
async fn rejected(session: &Session, info: &CheckoutInfo) -> E2eResult<()> {
    let checkout = session.pages().checkout;
    let field = info.first_missing_field().ok_or_else(|| E2eError::Data {
        message: "checkout record has no empty field".into(),
    })?;
    session
        .step("Fill checkout information", async {
            checkout
                .fill_information(&info.first_name, &info.last_name, &info.postal_code)
                .await?;
            checkout.continue_checkout().await?;
            session.attach_screenshot("Validation Error").await
        })
        .await?;
    session
        .step("Verify error message", async {
            checkout.expect_error_message(field.required_message()).await?;
            ensure(
                checkout.current_step().await? == Some(CheckoutStep::StepOne),
                "still on checkout step one",
            )
        })
        .await
}

async fn fill_valid_and_continue(session: &Session) -> E2eResult<()> {
    let info = &session.data().checkout.valid;
    let checkout = session.pages().checkout;
    session
        .step("Fill checkout information", async {
            checkout
                .fill_information(&info.first_name, &info.last_name, &info.postal_code)
                .await?;
            session.attach_screenshot("Information Filled").await?;
            checkout.continue_checkout().await
        })
        .await?;
    session
        .step("Verify overview page", async {
            checkout.verify_on_step_two().await?;
            session.attach_screenshot("Checkout Overview").await
        })
        .await
}

fn complete_checkout(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        fill_valid_and_continue(session).await?;
        let checkout = session.pages().checkout;
        session
            .step("Finish order", async {
                checkout.finish().await?;
                session.attach_screenshot("Order Complete").await
            })
            .await?;
        session
            .step("Verify order confirmation", async {
                checkout.verify_on_complete_page().await?;
                session.expect_url(&session.url_of("/checkout-complete.html")).await?;
                ensure_eq("cart badge", 0, session.pages().cart.get_cart_badge_count().await?)
            })
            .await
    }
    .boxed()
}

fn empty_first_name(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move { rejected(session, &session.data().checkout.empty_first_name).await }.boxed()
}

fn empty_last_name(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move { rejected(session, &session.data().checkout.empty_last_name).await }.boxed()
}

fn empty_postal_code(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move { rejected(session, &session.data().checkout.empty_postal_code).await }.boxed()
}

fn all_fields_empty(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let info = CheckoutInfo::default();
        ensure(
            info.first_missing_field() == Some(CheckoutField::FirstName),
            "first name is validated first",
        )?;
        rejected(session, &info).await
    }
    .boxed()
}

fn cancel_returns_to_cart(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        session
            .step("Cancel checkout", async {
                session.pages().checkout.cancel().await?;
                session.attach_screenshot("Back to Cart").await
            })
            .await?;
        session
            .step("Verify cart page", async {
                session.expect_url(&UrlPattern::regex("cart\\.html")?).await?;
                session.pages().cart.verify_cart_has_items(1).await
            })
            .await
    }
    .boxed()
}

fn summary_displayed(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        fill_valid_and_continue(session).await?;
        session
            .step("Verify summary amounts", async {
                let checkout = session.pages().checkout;
                let expected = session
                    .data()
                    .products
                    .iter()
                    .min_by(|a, b| a.name.cmp(&b.name))
                    .map_or(Price::default(), |p| p.price);
                ensure_eq("item total", expected, checkout.get_item_total().await?)?;
                ensure(
                    checkout.get_tax().await? > Price::default(),
                    "tax is shown and positive",
                )?;
                ensure(
                    checkout.get_summary_total().await? > expected,
                    "total exceeds item total",
                )
            })
            .await
    }
    .boxed()
}

fn total_adds_up(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        fill_valid_and_continue(session).await?;
        session
            .step("Verify total = item total + tax", async {
                let checkout = session.pages().checkout;
                let subtotal = checkout.get_item_total().await?;
                let tax = checkout.get_tax().await?;
                ensure_eq("tax", subtotal.tax(), tax)?;
                ensure_eq("total", subtotal + tax, checkout.get_summary_total().await?)
            })
            .await
    }
    .boxed()
}
