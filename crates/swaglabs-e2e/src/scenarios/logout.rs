//! Logout Tests

use futures::future::{BoxFuture, FutureExt};

use super::{Scenario, ScenarioKind};
use crate::fixture::Preset;
use crate::result::E2eResult;
use crate::session::Session;

const SUITE: &str = "Logout Tests";

pub(super) const SCENARIOS: &[Scenario] = &[
    Scenario {
        id: "TC-LOGOUT-001",
        title: "Logout returns to login page",
        suite: SUITE,
        kind: ScenarioKind::Smoke,
        description: "Critical session management",
        preset: Preset::LoggedIn,
        body: logout_returns_to_login,
    },
    Scenario {
        id: "TC-LOGOUT-002",
        title: "Cannot access inventory after logout",
        suite: SUITE,
        kind: ScenarioKind::Security,
        description: "Security test for session invalidation",
        preset: Preset::LoggedIn,
        body: inventory_guarded_after_logout,
    },
    Scenario {
        id: "TC-LOGOUT-003",
        title: "Can login again after logout",
        suite: SUITE,
        kind: ScenarioKind::Feature,
        description: "Tests re-authentication",
        preset: Preset::LoggedIn,
        body: login_again,
    },
];

async fn log_out(session: &Session) -> E2eResult<()> {
    session
        .step("Logout", async {
            session.pages().inventory.logout().await?;
            session.attach_screenshot("After Logout").await
        })
        .await
}

fn logout_returns_to_login(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        log_out(session).await?;
        session
            .step("Verify login page", async {
                session.expect_url(&session.url_of("")).await?;
                session.expect(&session.test_id("username")).to_be_visible().await
            })
            .await
    }
    .boxed()
}

fn inventory_guarded_after_logout(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        log_out(session).await?;
        session
            .step("Try to access inventory directly", async {
                session.goto("/inventory.html").await?;
                session.attach_screenshot("Access Denied").await
            })
            .await?;
        session
            .step("Verify redirect to login", async {
                session.expect(&session.test_id("username")).to_be_visible().await
            })
            .await
    }
    .boxed()
}

fn login_again(session: &Session) -> BoxFuture<'_, E2eResult<()>> {
    async move {
        log_out(session).await?;
        let user = &session.data().credentials.valid_user;
        session
            .step("Login again", async {
                session.pages().login.login(&user.username, &user.password).await?;
                session.attach_screenshot("Logged In Again").await
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
