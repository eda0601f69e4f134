// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright © 2024-2025 DataScienceBioLab

//! CLI tool for replaying the seeded gesture scenarios.
//!
//! Runs headlessly, suitable for CI/CD pipelines and agent automation.

use clap::{Parser, ValueEnum};
use gesture_test_substrate::scenario::run_all;
use gesture_test_substrate::ValidationResult;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON for CI parsing
    Json,
    /// Compact summary
    Summary,
}

#[derive(Parser, Debug)]
#[command(name = "gesture-validate")]
#[command(about = "Replay the seeded gesture scenarios against a bare GestureEngine")]
#[command(version)]
struct Args {
    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Only print checks whose name contains this substring
    #[arg(short, long)]
    filter: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn print_result_text(result: &ValidationResult) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Gesture Scenario Report                       ║");
    println!("╠══════════════════════════════════════════════════════════════╣");

    for check in &result.checks {
        let status = if check.passed { "✓" } else { "✗" };
        let color_start = if check.passed { "\x1b[32m" } else { "\x1b[31m" };
        let color_end = "\x1b[0m";

        println!("║ {color_start}{status}{color_end} {:<56} ║", check.name);
        println!("║   {:<58} ║", check.message);
    }

    println!("╠══════════════════════════════════════════════════════════════╣");
    println!(
        "║ Total: {}  Passed: {}  Failed: {}                            ║",
        result.stats.total, result.stats.passed, result.stats.failed
    );

    let overall = if result.all_passed {
        "\x1b[32m✓ ALL CHECKS PASSED\x1b[0m"
    } else {
        "\x1b[31m✗ SOME CHECKS FAILED\x1b[0m"
    };
    println!("║ {overall:<61} ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

fn print_result_json(result: &ValidationResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

fn print_result_summary(result: &ValidationResult) {
    let status = if result.all_passed { "PASS" } else { "FAIL" };
    println!("{status} - {}/{} checks passed", result.stats.passed, result.stats.total);

    if !result.all_passed {
        for check in result.failures() {
            println!("  ✗ {}: {}", check.name, check.message);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).with_target(false).compact().finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("gesture-validate starting...");

    let mut result = run_all();
    if let Some(ref filter) = args.filter {
        result.checks.retain(|c| c.name.contains(filter.as_str()));
        let passed = result.checks.iter().filter(|c| c.passed).count();
        let total = result.checks.len();
        result.stats.total = total;
        result.stats.passed = passed;
        result.stats.failed = total - passed;
        result.all_passed = result.stats.failed == 0;
    }

    match args.format {
        OutputFormat::Text => print_result_text(&result),
        OutputFormat::Json => print_result_json(&result)?,
        OutputFormat::Summary => print_result_summary(&result),
    }

    if result.all_passed {
        Ok(())
    } else {
        std::process::exit(1)
    }
}
