//! Report rendering

use clap::ValueEnum;
use colored::Colorize;
use driftcheck_core::{ComparisonRow, Outcome, VerificationReport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored table for terminals
    #[default]
    Table,
    /// The full report as JSON
    Json,
}

pub fn render(report: &VerificationReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_table(report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

fn print_table(report: &VerificationReport) {
    if !report.rows.is_empty() {
        println!(
            "{}",
            format!(
                "{:<30} {:>8} {:>10}  {}",
                "RESOURCE", "LIVE", "DECLARED", "STATUS"
            )
            .bold()
        );
        println!("{}", "─".repeat(62).dimmed());
        for row in &report.rows {
            println!("{}", format_row(row));
        }
        println!();
    }

    match report.outcome {
        Outcome::Failed => {
            let phase = report
                .failed_phase
                .map(|p| p.to_string())
                .unwrap_or_else(|| "verifying".to_string());
            eprintln!(
                "{}",
                format!("✗ Verification failed while {}", phase).red().bold()
            );
            if let Some(error) = report.error() {
                eprintln!("  {}", error);
            }
        }
        Outcome::Mismatch => {
            let count = report.mismatches().count();
            println!(
                "{}",
                format!("✗ {} resource count(s) differ", count).red().bold()
            );
        }
        Outcome::PlanChanges => {
            println!("{}", summary(report.outcome).yellow().bold());
        }
        outcome => println!("{}", summary(outcome).green().bold()),
    }
}

fn format_row(row: &ComparisonRow) -> String {
    let status = if row.is_match {
        "✓ match".green()
    } else {
        "✗ mismatch".red()
    };
    format!(
        "{:<30} {:>8} {:>10}  {}",
        row.label, row.live, row.declared, status
    )
}

fn summary(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::EmptyEnvironment => "✓ No resources declared or running",
        Outcome::Matched => "✓ All resource counts match (plan check skipped)",
        Outcome::PlanClean => "✓ All resource counts match and terraform plan is clean",
        Outcome::PlanChanges => "✗ Resource counts match but terraform plan has pending changes",
        Outcome::Mismatch => "✗ Resource counts differ",
        Outcome::Failed => "✗ Verification failed",
    }
}
