use anyhow::Context;
use api_checks::api_client::ApiClient;
use api_checks::configuration::get_configuration;
use api_checks::runner::{RunSummary, SuiteSelection, render_html_report, run_suites};
use api_checks::telemetry::{get_subscriber, init_subscriber};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Run the login and category checks against a live API.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Suite to run. Prompts for one when omitted.
    #[arg(long, value_enum)]
    suite: Option<SuiteSelection>,

    /// Where to write the HTML report.
    #[arg(long, default_value = "report.html")]
    html_report: PathBuf,

    /// Skip writing the HTML report.
    #[arg(long)]
    no_report: bool,
}

fn prompt_for_selection() -> anyhow::Result<Option<SuiteSelection>> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Select which tests to run:")?;
    writeln!(stdout, "1. Login tests only")?;
    writeln!(stdout, "2. Category tests only")?;
    writeln!(stdout, "3. All tests")?;
    write!(stdout, "Enter your choice (1/2/3): ")?;
    stdout.flush()?;

    let mut choice = String::new();
    io::stdin().lock().read_line(&mut choice)?;
    Ok(SuiteSelection::from_choice(&choice))
}

fn print_summary(summary: &RunSummary) {
    for outcome in &summary.outcomes {
        let result = if outcome.passed() { "PASSED" } else { "FAILED" };
        println!("{}::{} {}", outcome.suite, outcome.name, result);
    }
    println!(
        "\n{} checks, {} passed, {} failed",
        summary.outcomes.len(),
        summary.passed(),
        summary.failed()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let subscriber = get_subscriber("api_checks".into(), "info".into(), std::io::stderr);
    init_subscriber(subscriber);

    let settings = match get_configuration() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{:?}", e);
            return Ok(ExitCode::from(2));
        }
    };
    let base_url = settings.base_url.clone();
    let client = ApiClient::new(settings).context("Failed to build the HTTP client.")?;

    let selection = match args.suite {
        Some(selection) => selection,
        None => match prompt_for_selection()? {
            Some(selection) => selection,
            None => {
                println!("Invalid choice");
                return Ok(ExitCode::FAILURE);
            }
        },
    };

    let summary = run_suites(&client, selection).await;
    print_summary(&summary);

    if !args.no_report {
        let report = render_html_report(&summary, &base_url);
        std::fs::write(&args.html_report, report).with_context(|| {
            format!("Failed to write the report to {}", args.html_report.display())
        })?;
        println!("Report written to {}", args.html_report.display());
    }

    Ok(ExitCode::from(summary.exit_code()))
}
