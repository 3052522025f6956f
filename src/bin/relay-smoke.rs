use std::time::Duration;

use clap::Parser;
use serde_json::Value;

use api_relay::smoke::{default_checks, SmokeCheck, SmokeRunner, Summary};

#[derive(Parser)]
#[command(name = "relay-smoke")]
#[command(about = "Smoke-test a deployed API relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8001")]
    url: String,

    /// Bearer token sent with every check.
    #[arg(short, long)]
    token: Option<String>,

    /// Per-request timeout.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// METHOD:PATH:STATUS, repeatable. Defaults to the standard endpoint set.
    #[arg(short, long = "check")]
    checks: Vec<SmokeCheck>,

    /// JSON body sent with POST, PUT and PATCH checks.
    #[arg(long)]
    body: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let body = cli
        .body
        .as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()?;
    let checks = if cli.checks.is_empty() {
        default_checks()
    } else {
        cli.checks
    };

    let runner = SmokeRunner::new(
        &cli.url,
        cli.token.as_deref(),
        body,
        Duration::from_secs(cli.timeout_secs),
    )?;

    println!("Smoke testing {}", cli.url);
    println!("{}", "=".repeat(50));

    let reports = runner.run_all(&checks).await;
    for report in &reports {
        println!("\nTesting {}", report.check);
        println!("   URL: {}", report.url);
        match (report.passed, report.status) {
            (true, Some(status)) => {
                println!("PASS - Status: {}", status.as_u16());
                println!("   Response: {}", report.detail);
            }
            (false, Some(status)) => {
                println!(
                    "FAIL - Expected {}, got {}",
                    report.check.expected.as_u16(),
                    status.as_u16()
                );
                println!("   Response: {}", report.detail);
            }
            (_, None) => println!("FAIL - {}", report.detail),
        }
    }

    let summary = Summary::from_reports(&reports);
    println!("\n{}", "=".repeat(50));
    println!("Tests run: {}", summary.run);
    println!("Tests passed: {}", summary.passed);
    println!("Success rate: {:.1}%", summary.success_rate());

    if summary.all_passed() {
        println!("All checks passed");
        Ok(())
    } else {
        eprintln!("{} of {} checks failed", summary.run - summary.passed, summary.run);
        std::process::exit(1);
    }
}
