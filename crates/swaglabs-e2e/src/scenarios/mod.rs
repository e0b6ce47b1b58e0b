//! Scenario catalog.
//!
//! Each scenario names a starting [`Preset`] and a body composed of
//! page-object calls wrapped in report steps. Bodies run sequentially on
//! their own session; the runner decides how many sessions run at once.

mod cart;
mod checkout;
mod inventory;
mod login;
mod logout;

use std::fmt;
use std::str::FromStr;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::fixture::Preset;
use crate::reporter::ScenarioHeader;
use crate::result::{E2eError, E2eResult};
use crate::session::Session;

/// Scenario body: borrows the session for the duration of the run
pub type ScenarioBody = for<'a> fn(&'a Session) -> BoxFuture<'a, E2eResult<()>>;

/// Annotation type carried into the report as a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Critical happy paths
    Smoke,
    /// Feature behavior
    Feature,
    /// Error handling and validation
    Negative,
    /// Access control
    Security,
}

impl ScenarioKind {
    /// Every kind
    pub const ALL: [Self; 4] = [Self::Smoke, Self::Feature, Self::Negative, Self::Security];

    /// Tag name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Smoke => "Smoke",
            Self::Feature => "Feature",
            Self::Negative => "Negative",
            Self::Security => "Security",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| E2eError::config(format!("unknown tag '{s}'")))
    }
}

/// One end-to-end scenario
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Stable id, e.g. `TC-LOGIN-001`
    pub id: &'static str,
    /// Title
    pub title: &'static str,
    /// Suite the scenario belongs to
    pub suite: &'static str,
    /// Annotation type
    pub kind: ScenarioKind,
    /// Annotation description
    pub description: &'static str,
    /// Starting state
    pub preset: Preset,
    /// Body
    pub body: ScenarioBody,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("kind", &self.kind)
            .field("preset", &self.preset)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    /// `TC-...: title`
    #[must_use]
    pub fn full_title(&self) -> String {
        format!("{}: {}", self.id, self.title)
    }

    /// Report header for this scenario
    #[must_use]
    pub fn header(&self) -> ScenarioHeader {
        ScenarioHeader {
            id: self.id.to_string(),
            title: self.full_title(),
            suite: self.suite.to_string(),
            kind: self.kind.to_string(),
            description: self.description.to_string(),
        }
    }
}

/// Every scenario in catalog order
#[must_use]
pub fn all() -> Vec<Scenario> {
    [
        login::SCENARIOS,
        inventory::SCENARIOS,
        cart::SCENARIOS,
        checkout::SCENARIOS,
        logout::SCENARIOS,
    ]
    .concat()
}

/// Selection of scenarios by text and tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioFilter {
    /// Case-insensitive substring of id or title
    pub text: Option<String>,
    /// Allowed kinds; empty means all
    pub kinds: Vec<ScenarioKind>,
}

impl ScenarioFilter {
    /// Match everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict by id/title substring
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Restrict to a kind (repeatable)
    #[must_use]
    pub fn with_kind(mut self, kind: ScenarioKind) -> Self {
        self.kinds.push(kind);
        self
    }

    /// Whether `scenario` is selected
    #[must_use]
    pub fn matches(&self, scenario: &Scenario) -> bool {
        let text_ok = self.text.as_deref().map_or(true, |needle| {
            let needle = needle.to_lowercase();
            scenario.full_title().to_lowercase().contains(&needle)
        });
        text_ok && (self.kinds.is_empty() || self.kinds.contains(&scenario.kind))
    }

    /// Apply to a catalog
    #[must_use]
    pub fn apply(&self, scenarios: Vec<Scenario>) -> Vec<Scenario> {
        scenarios.into_iter().filter(|s| self.matches(s)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    mod catalog_tests {
        use super::*;

        #[test]
        fn test_ids_are_unique() {
            let scenarios = all();
            let ids: HashSet<_> = scenarios.iter().map(|s| s.id).collect();
            assert_eq!(ids.len(), scenarios.len());
        }

        #[test]
        fn test_catalog_covers_every_suite() {
            let scenarios = all();
            for prefix in ["TC-LOGIN-", "TC-INV-", "TC-CART-", "TC-CHECKOUT-", "TC-LOGOUT-"] {
                assert!(scenarios.iter().any(|s| s.id.starts_with(prefix)), "{prefix}");
            }
            assert_eq!(scenarios.iter().filter(|s| s.id.starts_with("TC-INV-")).count(), 8);
        }

        #[test]
        fn test_header_carries_annotation() {
            let scenario = all().into_iter().find(|s| s.id == "TC-LOGIN-001").unwrap();
            let header = scenario.header();
            assert_eq!(header.title, "TC-LOGIN-001: Login with valid credentials");
            assert_eq!(header.kind, "Smoke");
            assert_eq!(header.suite, "Login Tests");
        }
    }

    mod filter_tests {
        use super::*;

        #[test]
        fn test_text_filter_is_case_insensitive() {
            let picked = ScenarioFilter::new().with_text("tc-cart").apply(all());
            assert!(!picked.is_empty());
            assert!(picked.iter().all(|s| s.id.starts_with("TC-CART-")));
        }

        #[test]
        fn test_kind_filter() {
            let picked = ScenarioFilter::new()
                .with_kind(ScenarioKind::Security)
                .apply(all());
            assert!(picked.iter().all(|s| s.kind == ScenarioKind::Security));
            assert!(picked.iter().any(|s| s.id == "TC-LOGOUT-002"));
        }

        #[test]
        fn test_kind_from_str() {
            assert_eq!("smoke".parse::<ScenarioKind>().unwrap(), ScenarioKind::Smoke);
            assert!("flaky".parse::<ScenarioKind>().is_err());
        }
    }
}
