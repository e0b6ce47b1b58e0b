//! List command handler

use crate::commands::ListArgs;
use crate::error::CliResult;
use crate::handlers::run::scenario_filter;
use serde::Serialize;
use swaglabs_e2e::{scenarios, Scenario};

/// Catalog entry as printed by `list --json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Scenario id
    pub id: &'static str,
    /// Title
    pub title: &'static str,
    /// Suite name
    pub suite: &'static str,
    /// Tag
    pub tag: String,
}

impl From<&Scenario> for CatalogEntry {
    fn from(scenario: &Scenario) -> Self {
        Self {
            id: scenario.id,
            title: scenario.title,
            suite: scenario.suite,
            tag: scenario.kind.to_string(),
        }
    }
}

/// Catalog lines: one per scenario, then a count
#[must_use]
pub fn catalog_lines(selected: &[Scenario]) -> Vec<String> {
    let mut lines: Vec<String> = selected
        .iter()
        .map(|s| format!("{:<16} {:<9} {}", s.id, s.kind, s.title))
        .collect();
    lines.push(format!("{} scenarios", selected.len()));
    lines
}

/// Execute the list command
pub fn execute_list(args: &ListArgs) -> CliResult<()> {
    let selected = scenario_filter(None, &args.tags).apply(scenarios::all());
    if args.json {
        let entries: Vec<CatalogEntry> = selected.iter().map(CatalogEntry::from).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for line in catalog_lines(&selected) {
            println!("{line}");
        }
    }
    Ok(())
}
