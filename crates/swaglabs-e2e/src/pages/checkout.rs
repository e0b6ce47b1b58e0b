//! Checkout flow.
//!
//! ```text
//! StepOne ──continue (all fields set)──► StepTwo ──finish──► Complete
//!    │ └─continue (a field empty)─► StepOne + error
//!    └──cancel──► Cancelled (cart)
//! ```
//!
//! Validation is the storefront's: the first empty field in the order
//! first name, last name, postal code is the one reported.

use std::fmt;

use tracing::debug;

use super::PageObject;
use crate::data::{CheckoutField, Price};
use crate::result::E2eResult;
use crate::session::Session;

const CONTINUE: &str = "[data-test=\"continue\"]";
const CANCEL: &str = "[data-test=\"cancel\"]";
const FINISH: &str = "[data-test=\"finish\"]";
const ERROR: &str = "[data-test=\"error\"]";
const SUMMARY: &str = ".summary_info";
const SUBTOTAL: &str = ".summary_subtotal_label";
const TAX: &str = ".summary_tax_label";
const TOTAL: &str = ".summary_total_label";
const COMPLETE_HEADER: &str = ".complete-header";
const COMPLETE_TEXT: &str = ".complete-text";

/// Header shown once an order is placed
pub const ORDER_COMPLETE_HEADER: &str = "Thank you for your order!";

/// Where in the checkout flow the session is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutStep {
    /// Customer information form
    StepOne,
    /// Order overview
    StepTwo,
    /// Order placed
    Complete,
    /// Left the flow back to the cart
    Cancelled,
}

impl CheckoutStep {
    const ROUTES: [(Self, &'static str); 4] = [
        (Self::StepOne, "/checkout-step-one.html"),
        (Self::StepTwo, "/checkout-step-two.html"),
        (Self::Complete, "/checkout-complete.html"),
        (Self::Cancelled, "/cart.html"),
    ];

    /// Step a URL belongs to
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        Self::ROUTES
            .iter()
            .find(|(_, suffix)| path.ends_with(suffix))
            .map(|(step, _)| *step)
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StepOne => "step one",
            Self::StepTwo => "step two",
            Self::Complete => "complete",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Checkout screens
#[derive(Debug, Clone, Copy)]
pub struct CheckoutPage<'a> {
    session: &'a Session,
}

impl<'a> CheckoutPage<'a> {
    /// Bind to a session
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    fn field(&self, field: CheckoutField) -> crate::locator::Locator {
        self.session.test_id(field.test_id())
    }

    /// Open step one directly
    pub async fn navigate_to_step_one(&self) -> E2eResult<()> {
        self.navigate().await
    }

    /// Fill the three information fields; any may be empty
    pub async fn fill_information(
        &self,
        first_name: &str,
        last_name: &str,
        postal_code: &str,
    ) -> E2eResult<()> {
        self.field(CheckoutField::FirstName).fill(first_name).await?;
        self.field(CheckoutField::LastName).fill(last_name).await?;
        self.field(CheckoutField::PostalCode).fill(postal_code).await
    }

    /// Submit step one
    pub async fn continue_checkout(&self) -> E2eResult<()> {
        self.session.css(CONTINUE).click().await
    }

    /// Leave the flow
    pub async fn cancel(&self) -> E2eResult<()> {
        self.session.css(CANCEL).click().await
    }

    /// Place the order from step two
    pub async fn finish(&self) -> E2eResult<()> {
        self.session.css(FINISH).click().await
    }

    /// Assert the information form is shown
    pub async fn verify_on_step_one(&self) -> E2eResult<()> {
        for field in CheckoutField::VALIDATION_ORDER {
            self.session.expect(&self.field(field)).to_be_visible().await?;
        }
        Ok(())
    }

    /// Assert the overview with its finish button is shown
    pub async fn verify_on_step_two(&self) -> E2eResult<()> {
        self.session.expect(&self.session.css(SUMMARY)).to_be_visible().await?;
        self.session.expect(&self.session.css(FINISH)).to_be_visible().await
    }

    /// Assert the order confirmation is shown
    pub async fn verify_on_complete_page(&self) -> E2eResult<()> {
        self.session
            .expect(&self.session.css(COMPLETE_HEADER))
            .to_have_text(ORDER_COMPLETE_HEADER)
            .await?;
        self.session
            .expect(&self.session.css(COMPLETE_TEXT))
            .to_be_visible()
            .await
    }

    /// Assert the step-one error banner reads exactly `text`
    pub async fn expect_error_message(&self, text: &str) -> E2eResult<()> {
        self.session.expect(&self.session.css(ERROR)).to_have_text(text).await
    }

    /// Step derived from the current URL, `None` outside checkout
    pub async fn current_step(&self) -> E2eResult<Option<CheckoutStep>> {
        Ok(CheckoutStep::from_url(&self.session.url().await?))
    }

    /// Fill, continue, finish
    pub async fn complete_checkout(
        &self,
        first_name: &str,
        last_name: &str,
        postal_code: &str,
    ) -> E2eResult<()> {
        debug!("complete checkout");
        self.fill_information(first_name, last_name, postal_code).await?;
        self.continue_checkout().await?;
        self.finish().await
    }

    /// Overview subtotal
    pub async fn get_item_total(&self) -> E2eResult<Price> {
        self.read_price(SUBTOTAL).await
    }

    /// Overview tax
    pub async fn get_tax(&self) -> E2eResult<Price> {
        self.read_price(TAX).await
    }

    /// Overview total
    pub async fn get_summary_total(&self) -> E2eResult<Price> {
        self.read_price(TOTAL).await
    }

    async fn read_price(&self, selector: &str) -> E2eResult<Price> {
        Price::parse_label(&self.session.css(selector).text_content().await?)
    }
}

impl PageObject for CheckoutPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn path(&self) -> &'static str {
        "/checkout-step-one.html"
    }

    fn page_name(&self) -> &'static str {
        "checkout"
    }
}
