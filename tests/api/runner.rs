use crate::common::spawn_api;
use api_checks::runner::{SuiteSelection, render_html_report, run_suites};
use api_checks::suites::category::CategoryCheck;
use api_checks::suites::login::LoginCheck;

#[tokio::test]
async fn all_suites_run_in_order_and_pass() {
    // Arrange
    let app = spawn_api().await;

    // Act
    let summary = run_suites(&app.client, SuiteSelection::All).await;

    // Assert
    assert_eq!(
        summary.outcomes.len(),
        LoginCheck::all().len() + CategoryCheck::ALL.len()
    );
    assert_eq!(summary.outcomes[0].suite, "login");
    assert_eq!(summary.outcomes.last().unwrap().suite, "category");
    assert!(summary.is_success());
    assert_eq!(summary.exit_code(), 0);
}

#[tokio::test]
async fn a_single_suite_selection_runs_only_that_suite() {
    // Arrange
    let app = spawn_api().await;

    // Act
    let summary = run_suites(&app.client, SuiteSelection::Category).await;

    // Assert
    assert_eq!(summary.outcomes.len(), CategoryCheck::ALL.len());
    assert!(summary.outcomes.iter().all(|o| o.suite == "category"));
}

#[tokio::test]
async fn the_report_lists_every_check_that_ran() {
    // Arrange
    let app = spawn_api().await;
    let summary = run_suites(&app.client, SuiteSelection::All).await;

    // Act
    let html = render_html_report(&summary, &app.client.settings().base_url);

    // Assert
    for outcome in &summary.outcomes {
        assert!(html.contains(&outcome.name), "Missing {} in report", outcome.name);
    }
    assert!(html.contains(&format!("{} checks, {} passed, 0 failed", summary.outcomes.len(), summary.outcomes.len())));
}
