//! E2E harness entry point
//!
//! This file is the test binary that runs the UI regression scenarios.
//! Run with: cargo test --package neuroarc-e2e --test e2e

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use neuroarc_e2e::scenario::Scenario;
use neuroarc_e2e::{HarnessConfig, Result, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "neuroarc-e2e")]
#[command(about = "UI regression suite for the NeuroArc archive")]
struct Args {
    /// Base URL of the deployment under test (omit for simulation)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Username to authenticate with
    #[arg(short, long)]
    username: Option<String>,

    /// Password to authenticate with
    #[arg(short, long)]
    password: Option<String>,

    /// Remote WebDriver grid address
    #[arg(long)]
    remote_url: Option<String>,

    /// Local WebDriver endpoint (default http://localhost:4444)
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Force the in-process simulation
    #[arg(long)]
    simulate: bool,

    /// Fall back to simulation when a remote grid is unreachable
    #[arg(long)]
    allow_fallback: bool,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Run only the scenario with this name
    #[arg(short, long)]
    name: Option<String>,

    /// Where to write the JSON results file
    #[arg(short, long, default_value = "test-results.json")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().expect("valid directive")))
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(async_main(args)) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> Result<i32> {
    let mut config = HarnessConfig::from_env();
    if let Some(url) = args.base_url {
        config.base_url = Some(url.trim_end_matches('/').to_string());
    }
    if let Some(username) = args.username {
        config.username = username;
    }
    if let Some(password) = args.password {
        config.password = password;
    }
    if args.remote_url.is_some() {
        config.remote_url = args.remote_url;
    }
    if args.webdriver_url.is_some() {
        config.webdriver_url = args.webdriver_url;
    }
    if args.simulate {
        config.simulate = true;
    }
    if args.allow_fallback {
        config.allow_fallback = true;
    }
    if args.headed {
        config.headless = false;
    }

    let scenarios = match &args.name {
        Some(name) => {
            let matched: Vec<Scenario> = Scenario::all()
                .into_iter()
                .filter(|s| s.name() == name)
                .collect();
            if matched.is_empty() {
                return Err(neuroarc_e2e::Error::Internal(format!(
                    "no scenario named '{}'",
                    name
                )));
            }
            matched
        }
        None => Scenario::all(),
    };

    let runner = ScenarioRunner::new(config);
    let results = runner.run(&scenarios).await;
    results.write_to(&args.output)?;

    println!(
        "{} scenarios: {} passed, {} failed, {} skipped ({} ms)",
        results.total, results.passed, results.failed, results.skipped, results.duration_ms
    );

    Ok(results.exit_code())
}
