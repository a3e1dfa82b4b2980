mod report;

pub use report::render_html_report;

use crate::api_client::ApiClient;
use crate::suites::{category, login};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SuiteSelection {
    /// Login tests only
    Login,
    /// Category tests only
    Category,
    /// All tests
    All,
}

impl SuiteSelection {
    /// Map the interactive menu entry (`1`, `2` or `3`) to a selection.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(SuiteSelection::Login),
            "2" => Some(SuiteSelection::Category),
            "3" => Some(SuiteSelection::All),
            _ => None,
        }
    }

    pub fn includes_login(&self) -> bool {
        matches!(self, SuiteSelection::Login | SuiteSelection::All)
    }

    pub fn includes_category(&self) -> bool {
        matches!(self, SuiteSelection::Category | SuiteSelection::All)
    }
}

#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub suite: &'static str,
    pub name: String,
    pub elapsed: Duration,
    pub failure: Option<String>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Collects the outcome of each check of a suite, in execution order.
#[derive(Debug)]
pub struct Recorder {
    suite: &'static str,
    outcomes: Vec<CheckOutcome>,
}

impl Recorder {
    pub fn new(suite: &'static str) -> Self {
        Self {
            suite,
            outcomes: Vec::new(),
        }
    }

    /// Run one check and record whether it passed.
    pub async fn record<F>(&mut self, name: impl Into<String>, check: F)
    where
        F: Future<Output = anyhow::Result<()>>,
    {
        let name = name.into();
        let started = Instant::now();
        let result = check.await;
        let elapsed = started.elapsed();
        let failure = match result {
            Ok(()) => {
                tracing::info!(suite = self.suite, check = %name, "PASSED");
                None
            }
            Err(e) => {
                tracing::error!(
                    suite = self.suite,
                    check = %name,
                    error.cause_chain = ?e,
                    error.message = %e,
                    "FAILED"
                );
                Some(format!("{:?}", e))
            }
        };
        self.outcomes.push(CheckOutcome {
            suite: self.suite,
            name,
            elapsed,
            failure,
        });
    }

    pub fn into_outcomes(self) -> Vec<CheckOutcome> {
        self.outcomes
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<CheckOutcome>,
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

#[tracing::instrument(name = "Running suites", skip(client))]
pub async fn run_suites(client: &ApiClient, selection: SuiteSelection) -> RunSummary {
    let started_at = Utc::now();
    let mut outcomes = Vec::new();
    if selection.includes_login() {
        outcomes.extend(login::run_suite(client).await);
    }
    if selection.includes_category() {
        outcomes.extend(category::run_suite(client).await);
    }
    RunSummary {
        started_at,
        outcomes,
    }
}
