//! Full catalog against the in-memory storefront.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use swaglabs_e2e::{
    scenarios, AllureResultsWriter, ScenarioFilter, ScenarioKind, SimLauncher, SimOptions,
    SuiteConfig, SuiteRunner, TestData, TestStatus, Timeouts,
};

fn fast_config() -> SuiteConfig {
    SuiteConfig::default().with_workers(4).with_timeouts(Timeouts {
        action_ms: 1_000,
        expect_ms: 1_000,
        navigation_ms: 2_000,
        poll_ms: 5,
    })
}

fn runner(config: SuiteConfig) -> SuiteRunner {
    let data = TestData::embedded().unwrap();
    let launcher = SimLauncher::new(
        SimOptions::new(config.base_url.clone(), &data).with_glitch_delay(Duration::from_millis(20)),
    );
    SuiteRunner::new(Arc::new(launcher), Arc::new(config), Arc::new(data))
}

#[tokio::test]
async fn test_every_scenario_passes_on_the_simulator() {
    let catalog = scenarios::all();
    let report = runner(fast_config()).run(&catalog).await;

    let failures: Vec<_> = report
        .failures()
        .map(|s| format!("{}: {:?}", s.name, s.status_details.message))
        .collect();
    assert!(failures.is_empty(), "failures: {failures:#?}");
    assert_eq!(report.passed(), catalog.len());
    assert_eq!(report.skipped(), 0);

    let ids: Vec<_> = report.scenarios.iter().map(|s| s.id().to_string()).collect();
    let expected: Vec<_> = catalog.iter().map(|s| s.id.to_string()).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_reports_carry_steps_and_screenshots() {
    let catalog = ScenarioFilter::new().with_text("TC-LOGIN-001").apply(scenarios::all());
    let report = runner(fast_config()).run(&catalog).await;
    let login = &report.scenarios[0];

    assert_eq!(login.status, TestStatus::Passed);
    assert_eq!(login.name, "TC-LOGIN-001: Login with valid credentials");
    let steps: Vec<_> = login.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        steps,
        vec![
            "Preset: loginPage",
            "Enter valid credentials and login",
            "Verify navigation to inventory page",
        ]
    );
    let shots: Vec<_> = login.all_attachments().iter().map(|a| a.name.clone()).collect();
    assert_eq!(shots, vec!["Login Page", "Before Login", "After Login", "Inventory Page"]);
    assert!(login.all_attachments().iter().all(|a| a.mime == "image/png"));
    assert_eq!(login.label("tag"), Some("Smoke"));
}

#[tokio::test]
async fn test_results_directory_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = ScenarioFilter::new()
        .with_kind(ScenarioKind::Negative)
        .apply(scenarios::all());
    let report = runner(fast_config())
        .with_writer(AllureResultsWriter::new(dir.path()).unwrap())
        .run(&catalog)
        .await;
    assert!(report.all_passed());

    let written = AllureResultsWriter::read_results(dir.path()).unwrap();
    assert_eq!(written.len(), catalog.len());
    let pngs = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with("-attachment.png"))
        .count();
    assert!(pngs >= catalog.len());
}

#[tokio::test]
async fn test_unreachable_site_breaks_every_preset() {
    let config = fast_config().with_base_url("https://elsewhere.example/");
    let data = TestData::embedded().unwrap();
    let launcher = SimLauncher::new(SimOptions::new("https://www.saucedemo.com/", &data));
    let runner = SuiteRunner::new(Arc::new(launcher), Arc::new(config), Arc::new(data));

    let catalog = ScenarioFilter::new().with_text("TC-CART-").apply(scenarios::all());
    let report = runner.run(&catalog).await;
    assert_eq!(report.broken(), catalog.len());
    assert!(!report.all_passed());
}
