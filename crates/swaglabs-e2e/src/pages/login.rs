//! Login screen.

use tracing::debug;

use super::PageObject;
use crate::locator::Locator;
use crate::result::E2eResult;
use crate::session::Session;

const USERNAME: &str = "input[data-test=\"username\"]";
const PASSWORD: &str = "input[data-test=\"password\"]";
const SUBMIT: &str = "input[data-test=\"login-button\"]";
const ERROR: &str = "h3[data-test=\"error\"]";

/// Login form at the storefront root
#[derive(Debug, Clone, Copy)]
pub struct LoginPage<'a> {
    session: &'a Session,
}

impl<'a> LoginPage<'a> {
    /// Bind to a session
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Fill both fields (empty strings included) and submit.
    ///
    /// Performs no validation; the storefront decides the outcome.
    pub async fn login(&self, username: &str, password: &str) -> E2eResult<()> {
        debug!(username, "login");
        self.session.css(USERNAME).fill(username).await?;
        self.session.css(PASSWORD).fill(password).await?;
        self.session.css(SUBMIT).click().await
    }

    /// The error banner
    #[must_use]
    pub fn error_message(&self) -> Locator {
        self.session.css(ERROR)
    }

    /// Assert the error banner reads exactly `text`
    pub async fn expect_error_message(&self, text: &str) -> E2eResult<()> {
        self.session.expect(&self.error_message()).to_have_text(text).await
    }
}

impl PageObject for LoginPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn path(&self) -> &'static str {
        "/"
    }

    fn page_name(&self) -> &'static str {
        "login"
    }
}
