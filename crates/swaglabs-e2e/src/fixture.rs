//! Scenario presets.
//!
//! A preset is a fixed recipe of page-object calls run on a fresh session
//! before the scenario body. Recipes are linear: no branching, no retries.
//! A failing step is reported as a fixture failure naming the preset.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pages::{PageObject, Pages};
use crate::result::{E2eError, E2eResult};
use crate::session::Session;
use crate::wait::UrlPattern;

/// Starting state for a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Preset {
    /// Blank page; the body does everything
    #[default]
    None,
    /// Login form open, screenshot "Login Page"
    LoginPage,
    /// Logged in as the standard user, on the product list
    LoggedIn,
    /// Logged in with the first two listed products in the cart
    WithCartItems,
    /// Logged in with one product in the cart, on checkout step one
    ReadyForCheckout,
}

impl Preset {
    /// Every preset
    pub const ALL: [Self; 5] = [
        Self::None,
        Self::LoginPage,
        Self::LoggedIn,
        Self::WithCartItems,
        Self::ReadyForCheckout,
    ];

    /// Name used in reports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::LoginPage => "loginPage",
            Self::LoggedIn => "loggedInPage",
            Self::WithCartItems => "pageWithCartItems",
            Self::ReadyForCheckout => "pageReadyForCheckout",
        }
    }

    /// Run the recipe and hand back the page objects
    pub async fn apply(self, session: &Session) -> E2eResult<Pages<'_>> {
        debug!(preset = self.name(), "applying preset");
        let pages = session.pages();
        if self != Self::None {
            session
                .step(&format!("Preset: {}", self.name()), self.run(session, pages))
                .await
                .map_err(|e| E2eError::Fixture {
                    preset: self.name().to_string(),
                    message: e.to_string(),
                })?;
        }
        Ok(pages)
    }

    async fn run(self, session: &Session, pages: Pages<'_>) -> E2eResult<()> {
        match self {
            Self::None => Ok(()),
            Self::LoginPage => {
                pages.login.navigate().await?;
                session.attach_screenshot("Login Page").await
            }
            Self::LoggedIn => log_in(session, pages).await,
            Self::WithCartItems => {
                log_in(session, pages).await?;
                pages.inventory.add_product_to_cart(0).await?;
                pages.inventory.add_product_to_cart(1).await?;
                session.attach_screenshot("Cart with 2 Items").await
            }
            Self::ReadyForCheckout => {
                log_in(session, pages).await?;
                pages.inventory.add_product_to_cart(0).await?;
                pages.inventory.open_cart().await?;
                pages.cart.proceed_to_checkout().await?;
                session.attach_screenshot("Checkout Page").await
            }
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

async fn log_in(session: &Session, pages: Pages<'_>) -> E2eResult<()> {
    let user = &session.data().credentials.valid_user;
    pages.login.navigate().await?;
    pages.login.login(&user.username, &user.password).await?;
    session.wait_for_url(&UrlPattern::glob("**/inventory.html")).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::pages::CheckoutStep;
    use crate::reporter::TestStatus;
    use crate::session::test_support::sim_session;

    mod recipe_tests {
        use super::*;

        #[tokio::test]
        async fn test_logged_in_lands_on_inventory() {
            let session = sim_session();
            let pages = Preset::LoggedIn.apply(&session).await.unwrap();
            pages.inventory.verify_on_inventory_page().await.unwrap();
            assert_eq!(pages.inventory.get_cart_badge_count().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_with_cart_items_has_two_and_a_screenshot() {
            let session = sim_session();
            let pages = Preset::WithCartItems.apply(&session).await.unwrap();
            assert_eq!(pages.inventory.get_cart_badge_count().await.unwrap(), 2);
            let report = session.into_report(TestStatus::Passed, None);
            assert_eq!(report.steps[0].name, "Preset: pageWithCartItems");
            assert_eq!(report.steps[0].attachments[0].name, "Cart with 2 Items");
        }

        #[tokio::test]
        async fn test_ready_for_checkout_is_on_step_one() {
            let session = sim_session();
            let pages = Preset::ReadyForCheckout.apply(&session).await.unwrap();
            assert_eq!(
                pages.checkout.current_step().await.unwrap(),
                Some(CheckoutStep::StepOne)
            );
            assert_eq!(pages.cart.get_cart_badge_count().await.unwrap(), 1);
        }

        #[tokio::test]
        async fn test_none_does_nothing() {
            let session = sim_session();
            Preset::None.apply(&session).await.unwrap();
            assert!(session.step_names().is_empty());
        }
    }

    mod failure_tests {
        use super::*;

        #[tokio::test]
        async fn test_failure_names_the_preset() {
            let session = sim_session();
            session.close().await.unwrap();
            let err = Preset::LoggedIn.apply(&session).await.unwrap_err();
            match err {
                E2eError::Fixture { preset, .. } => assert_eq!(preset, "loggedInPage"),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_serde_names() {
            let preset: Preset = serde_json::from_str("\"readyForCheckout\"").unwrap();
            assert_eq!(preset, Preset::ReadyForCheckout);
        }
    }
}
