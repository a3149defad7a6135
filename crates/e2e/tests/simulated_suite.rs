//! Suite-level tests against the in-process simulation
//!
//! These exercise the same scenario code the harness binary runs, with
//! the simulated driver strategy, so the whole stack from runner down
//! to the mock store is covered without a browser.

use std::time::Duration;

use neuroarc_e2e::scenario::{Outcome, Scenario};
use neuroarc_e2e::{DriverStrategy, HarnessConfig, Provisioner, ScenarioRunner};

fn simulated_config() -> HarnessConfig {
    HarnessConfig {
        simulate: true,
        ..HarnessConfig::default()
    }
}

#[tokio::test]
async fn full_suite_passes_against_the_simulation() {
    let runner = ScenarioRunner::new(simulated_config());
    let results = runner.run_all().await;

    assert_eq!(results.total, Scenario::all().len());
    assert_eq!(results.failed, 0, "reports: {:?}", results.reports);
    assert_eq!(results.skipped, 0, "reports: {:?}", results.reports);
    assert_eq!(results.passed, results.total);
    assert_eq!(results.exit_code(), 0);
}

#[tokio::test]
async fn lifecycle_scenario_passes_end_to_end() {
    let provisioner = Provisioner::new(simulated_config());
    let mut session = provisioner.provision().await.unwrap();

    Scenario::ProjectLifecycle.run(&mut session).await.unwrap();
    session.close().await.unwrap();

    // The created hierarchy is visible in the shared store.
    let projects = provisioner
        .store()
        .list_children(&neuroarc_common::ScopePath::root())
        .unwrap();
    assert!(projects.iter().any(|p| p.name.starts_with("AUTO")));
}

#[tokio::test]
async fn duplicate_scenario_observes_rejection() {
    let provisioner = Provisioner::new(simulated_config());
    let mut session = provisioner.provision().await.unwrap();
    Scenario::RejectsDuplicateProject
        .run(&mut session)
        .await
        .unwrap();
    session.close().await.unwrap();
}

#[tokio::test]
async fn scenarios_share_backend_state_within_one_runner() {
    let runner = ScenarioRunner::new(simulated_config());
    runner.run(&[Scenario::ProjectLifecycle]).await;
    runner.run(&[Scenario::OptionalFields]).await;

    let projects = runner
        .provisioner()
        .store()
        .list_children(&neuroarc_common::ScopePath::root())
        .unwrap();
    assert!(projects.iter().any(|p| p.name.starts_with("AUTO")));
    assert!(projects.iter().any(|p| p.name.starts_with("MIN")));
}

#[tokio::test]
async fn unreachable_local_driver_falls_back_and_still_passes() {
    let config = HarnessConfig {
        base_url: Some("http://127.0.0.1:9".to_string()),
        webdriver_url: Some("http://127.0.0.1:1".to_string()),
        driver_timeout: Duration::from_millis(300),
        ..HarnessConfig::default()
    };
    let provisioner = Provisioner::new(config);
    let mut session = provisioner.provision().await.unwrap();
    assert_eq!(session.strategy, DriverStrategy::Simulated);

    Scenario::ProjectLifecycle.run(&mut session).await.unwrap();
    session.close().await.unwrap();
}

#[tokio::test]
async fn unreachable_remote_grid_reports_skips_not_failures() {
    let config = HarnessConfig {
        base_url: Some("http://127.0.0.1:9".to_string()),
        remote_url: Some("http://127.0.0.1:1".to_string()),
        driver_timeout: Duration::from_millis(300),
        ..HarnessConfig::default()
    };
    let runner = ScenarioRunner::new(config);
    let results = runner.run(&[Scenario::ProjectLifecycle]).await;

    assert_eq!(results.failed, 0);
    assert_eq!(results.skipped, 1);
    assert_eq!(results.exit_code(), 0);
    assert!(matches!(results.reports[0].outcome, Outcome::Skipped(_)));
}

#[tokio::test]
async fn results_file_round_trips() {
    let runner = ScenarioRunner::new(simulated_config());
    let results = runner.run(&[Scenario::RequiresAuthentication]).await;

    let dir = std::env::temp_dir().join(format!("neuroarc-results-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("test-results.json");
    results.write_to(&path).unwrap();

    let loaded: neuroarc_e2e::SuiteResult =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded.total, 1);
    assert_eq!(loaded.passed, 1);
    assert_eq!(loaded.reports[0].name, "requires_authentication");
    std::fs::remove_dir_all(&dir).ok();
}
