// tests/suite_run_test.rs
// End-to-end runs of the built-in suites against the in-process fake service

mod common;

use std::time::Duration;

use common::{FakeService, Faults, refused_base_url};
use tenant_probe::api;
use tenant_probe::cli::execute;
use tenant_probe::config::HarnessConfig;
use tenant_probe::http::{Dispatcher, HttpDispatcher};
use tenant_probe::report::{FailureKind, RunReport};
use tenant_probe::scenario::RunState;
use tenant_probe::suites::Suite;

fn failed_names(report: &RunReport) -> Vec<&str> {
    report.failures().map(|r| r.name.as_str()).collect()
}

#[tokio::test]
async fn test_isolation_suite_passes_and_cleans_up() {
    let service = FakeService::spawn(Faults::default()).await;
    let report = execute(&service.config(Suite::Isolation)).await.unwrap();

    assert!(report.passed(), "unexpected failures: {:?}", failed_names(&report));
    assert_eq!(report.summary.state, RunState::Completed);
    assert_eq!(report.summary.tests_failed, 0);
    assert_eq!(report.summary.tests_run, report.results.len());
    assert_eq!(report.exit_code(), 0);

    assert_eq!(report.summary.test_users.len(), 2);
    assert_ne!(report.summary.test_users[0], report.summary.test_users[1]);
    assert_eq!(service.user_count(), 2);
    assert_eq!(service.resource_counts(), (0, 0));
}

#[tokio::test]
async fn test_standard_suite_passes() {
    let service = FakeService::spawn(Faults::default()).await;
    let report = execute(&service.config(Suite::Standard)).await.unwrap();

    assert!(report.passed(), "unexpected failures: {:?}", failed_names(&report));
    assert_eq!(report.summary.suite, "standard");
    assert_eq!(report.summary.test_users.len(), 1);
    assert_eq!(service.resource_counts(), (0, 0));
}

#[tokio::test]
async fn test_repeated_runs_use_fresh_identities() {
    let service = FakeService::spawn(Faults::default()).await;
    let config = service.config(Suite::Isolation);

    let first = execute(&config).await.unwrap();
    let second = execute(&config).await.unwrap();

    assert!(first.passed() && second.passed());
    assert_ne!(first.summary.run_id, second.summary.run_id);
    assert_eq!(service.user_count(), 4);
}

#[tokio::test]
async fn test_leaky_listings_are_reported() {
    let service = FakeService::spawn(Faults {
        leaky_listings: true,
        ..Default::default()
    })
    .await;
    let report = execute(&service.config(Suite::Isolation)).await.unwrap();

    // The run still completes; a leak is a failed check, not an abort
    assert_eq!(report.summary.state, RunState::Completed);
    assert!(!report.passed());
    assert_eq!(report.exit_code(), 1);
    assert_eq!(
        failed_names(&report),
        vec!["Folder Data Isolation", "Project Data Isolation"]
    );
    for failure in report.failures() {
        assert_eq!(failure.failure, Some(FailureKind::Contract));
        assert!(failure.details.contains("Status 200 as expected"), "{}", failure.details);
    }
}

/// Run the isolation suite against a faulty service and check exactly
/// `expected` fail, each as a contract violation, without aborting
async fn assert_caught(faults: Faults, expected: &[&str]) {
    let service = FakeService::spawn(faults).await;
    let report = execute(&service.config(Suite::Isolation)).await.unwrap();

    assert_eq!(report.summary.state, RunState::Completed);
    assert_eq!(report.exit_code(), 1);
    assert_eq!(failed_names(&report), expected);
    for failure in report.failures() {
        assert_eq!(failure.failure, Some(FailureKind::Contract), "{}", failure.name);
        assert!(failure.details.contains("got 200"), "{}", failure.details);
    }
}

#[tokio::test]
async fn test_cross_tenant_access_is_reported() {
    assert_caught(
        Faults {
            leaky_get: true,
            ..Default::default()
        },
        &[
            "Cross-User Folder Update Prevention",
            "Cross-User Project Access Prevention",
        ],
    )
    .await;
}

#[tokio::test]
async fn test_unauthenticated_success_is_reported() {
    assert_caught(
        Faults {
            open_endpoints: true,
            ..Default::default()
        },
        &["Unauthorized Project Access", "Unauthorized Folder Access"],
    )
    .await;
}

#[tokio::test]
async fn test_tokenless_registration_aborts() {
    let service = FakeService::spawn(Faults {
        tokenless_registration: true,
        ..Default::default()
    })
    .await;
    let report = execute(&service.config(Suite::Isolation)).await.unwrap();

    match &report.summary.state {
        RunState::Aborted { step, reason } => {
            assert_eq!(step, "User 1 Registration");
            assert!(reason.contains("access_token"), "{reason}");
        }
        other => panic!("expected abort, got {other:?}"),
    }
    assert_eq!(report.results.len(), 1);
    assert!(!report.passed());
    assert_ne!(report.exit_code(), 0);
    assert_eq!(service.user_count(), 1);
}

#[tokio::test]
async fn test_unreachable_service_aborts_at_registration() {
    let config = HarnessConfig {
        base_url: refused_base_url().await,
        timeout_secs: 2,
        ..Default::default()
    };
    let report = execute(&config).await.unwrap();

    let first = &report.results[0];
    assert_eq!(first.name, "User 1 Registration");
    assert_eq!(first.failure, Some(FailureKind::Transport));
    assert!(first.details.contains("got 0"), "{}", first.details);
    assert!(matches!(
        &report.summary.state,
        RunState::Aborted { step, .. } if step == "User 1 Registration"
    ));
    assert!(report.summary.critical_failures.contains(&first.name));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let service = FakeService::spawn(Faults {
        slow_health: Some(Duration::from_secs(2)),
        ..Default::default()
    })
    .await;
    let dispatcher = HttpDispatcher::new(
        format!("{}/api", service.base_url),
        Duration::from_millis(200),
    )
    .unwrap();

    let outcome = dispatcher.dispatch(&api::health(), None).await;
    assert_eq!(outcome.status, 0);
    assert!(outcome.is_transport_failure());
    let error = outcome.transport_error.unwrap_or_default();
    assert!(error.contains("timed out"), "{error}");
}

#[tokio::test]
async fn test_dispatcher_reports_status_and_body() {
    let service = FakeService::spawn(Faults::default()).await;
    let dispatcher =
        HttpDispatcher::new(format!("{}/api", service.base_url), Duration::from_secs(5)).unwrap();

    let info = dispatcher.dispatch(&api::service_info(), None).await;
    assert_eq!(info.status, 200);
    assert_eq!(info.body["version"], "1.0.0");

    let denied = dispatcher.dispatch(&api::me(), Some("invalid_token")).await;
    assert_eq!(denied.status, 401);
    assert!(!denied.is_transport_failure());
}

#[tokio::test]
async fn test_report_round_trips_through_disk() {
    let service = FakeService::spawn(Faults {
        leaky_listings: true,
        ..Default::default()
    })
    .await;
    let report = execute(&service.config(Suite::Isolation)).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("results.json");
    report.persist(&path).unwrap();

    let loaded = RunReport::load(&path).unwrap();
    assert_eq!(loaded.summary.tests_run, report.summary.tests_run);
    assert_eq!(loaded.summary.tests_failed, 2);
    assert_eq!(loaded.summary.state, report.summary.state);
    assert_eq!(loaded.results, report.results);
    assert_eq!(loaded.exit_code(), 1);
}
