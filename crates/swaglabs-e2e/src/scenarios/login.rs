//! Login Tests

use futures::future::{BoxFuture, FutureExt};

use super::{Scenario, ScenarioKind};
use crate::fixture::Preset;
use crate::result::E2eResult;
use crate::session::Session;

const SUITE: &str = "Login Tests";

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario {
        id: "TC-LOGIN-001",
        title: "Login with valid credentials",
        suite: SUITE,
        kind: ScenarioKind::Smoke,
        description: "Critical happy path test",
        preset: Preset::LoginPage,
        body: valid_credentials,
    },
    Scenario {
        id: "TC-LOGIN-002",
        title: "Login with invalid credentials",
        suite: SUITE,
        kind: ScenarioKind::Negative,
        description: "Tests error handling",
        preset: Preset::LoginPage,
        body: invalid_credentials,
    },
    Scenario {
        id: "TC-LOGIN-003",
        title: "Login with empty username",
        suite: SUITE,
        kind: ScenarioKind::Negative,
        description: "Tests validation",
        preset: Preset::LoginPage,
        body: empty_username,
    },
    Scenario {
        id: "TC-LOGIN-004",
        title: "Login with empty password",
        suite: SUITE,
        kind: ScenarioKind::Negative,
        description: "Tests validation",
        preset: Preset::LoginPage,
        body: empty_password,
    },
    Scenario {
        id: "TC-LOGIN-005",
        title: "Locked out user cannot login",
        suite: SUITE,
        kind: ScenarioKind::Negative,
        description: "Known account refused by the storefront",
        preset: Preset::LoginPage,
        body: locked_out_user,
    },
    Scenario {
        id: "TC-LOGIN-006",
        title: "Performance glitch user eventually logs in",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Slow login response within the wait budget",
        preset: Preset::LoginPage,
        body: performance_glitch_user,
    },
    Scenario {
        id: "TC-LOGIN-007",
        title: "Protected page requires login",
        suite: SUITE,
        kind: ScenarioKind::Security,
        description: "Access control test",
        preset: Preset::LoginPage,
        body: protected_page_requires_login,
    },
];

/// Submit a credential record and check the banner
async fn rejected(session: &Session, username: &str, password: &str, message: &str) -> E2eResult<()> {
    let login = session.pages().login;
    session
        .step("Submit credentials", async {
            session.attach_screenshot("Before Login Attempt").await?;
            login.login(username, password).await?;
            session.attach_screenshot("After Failed Login").await
        })
        .await?;
    session
        .step("Verify error message", async {
            login.expect_error_message(message).await?;
            session.attach_screenshot("Error Message Displayed").await
        })
        .await
}

fn valid_credentials(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let user = &session.data().credentials.valid_user;
        let login = session.pages().login;
        session
            .step("Enter valid credentials and login", async {
                session.attach_screenshot("Before Login").await?;
                login.login(&user.username, &user.password).await?;
                session.attach_screenshot("After Login").await
            })
            .await?;
        session
            .step("Verify navigation to inventory page", async {
                session.expect_url(&session.url_of("/inventory.html")).await?;
                session.attach_screenshot("Inventory Page").await
            })
            .await
    }
    .boxed()
}

fn invalid_credentials(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let record = &session.data().credentials.invalid_credentials;
        rejected(
            session,
            &record.username,
            &record.password,
            "Epic sadface: Username and password do not match any user in this service",
        )
        .await
    }
    .boxed()
}

fn empty_username(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let record = &session.data().credentials.empty_username;
        rejected(
            session,
            &record.username,
            &record.password,
            "Epic sadface: Username is required",
        )
        .await
    }
    .boxed()
}

fn empty_password(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let record = &session.data().credentials.empty_password;
        rejected(
            session,
            &record.username,
            &record.password,
            "Epic sadface: Password is required",
        )
        .await
    }
    .boxed()
}

fn locked_out_user(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let record = &session.data().credentials.locked_out_user;
        rejected(
            session,
            &record.username,
            &record.password,
            "Epic sadface: Sorry, this user has been locked out.",
        )
        .await?;
        session.expect_url(&session.url_of("/")).await
    }
    .boxed()
}

fn performance_glitch_user(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        let user = &session.data().credentials.performance_glitch_user;
        let pages = session.pages();
        session
            .step("Login as performance glitch user", async {
                pages.login.login(&user.username, &user.password).await?;
                session.attach_screenshot("After Slow Login").await
            })
            .await?;
        session
            .step("Verify inventory page", async {
                pages.inventory.verify_on_inventory_page().await?;
                pages.inventory.verify_product_count(session.data().products.len()).await
            })
            .await
    }
    .boxed()
}

fn protected_page_requires_login(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        session
            .step("Open cart without logging in", async {
                session.goto("/cart.html").await?;
                session.attach_screenshot("Redirected to Login").await
            })
            .await?;
        session
            .step("Verify login required", async {
                session.expect(&session.test_id("username")).to_be_visible().await?;
                session
                    .pages()
                    .login
                    .expect_error_message(
                        "Epic sadface: You can only access '/cart.html' when you are logged in.",
                    )
                    .await
            })
            .await
    }
    .boxed()
}
