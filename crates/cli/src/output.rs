//! Terminal rendering of diffs, migrations, and status

use anyhow::Result;
use archsync_codegen::migrations::{GeneratedMigration, MigrationStatus};
use archsync_codegen::{DiffResult, SpecChange};
use archsync_core::Dialect;
use colored::Colorize;
use serde::Serialize;

/// Pretty-print any serializable value as JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn print_diff(result: &DiffResult) {
    if result.is_empty() {
        println!("{}", "No changes".dimmed());
        return;
    }

    for change in &result.changes {
        println!("  {}", change_line(change));
    }
    println!();
    for line in &result.summary {
        println!("{}", summary_line(line));
    }
}

fn change_line(change: &SpecChange) -> String {
    let symbol = if change.change_type.is_addition() {
        "+".green()
    } else if change.change_type.is_removal() {
        "-".red()
    } else {
        "~".yellow()
    };
    if change.breaking {
        format!("{} {} {}", symbol, change.description, "(breaking)".red().bold())
    } else {
        format!("{} {}", symbol, change.description)
    }
}

fn summary_line(line: &str) -> String {
    match line.chars().next() {
        Some('+') => line.green().to_string(),
        Some('-') => line.red().to_string(),
        Some('~') => line.yellow().to_string(),
        Some('!') => line.red().bold().to_string(),
        _ => line.to_string(),
    }
}

pub(crate) fn print_migration(migration: &GeneratedMigration) {
    println!(
        "{} {} ({})",
        "Migration".bold(),
        migration.name.cyan(),
        migration.dialect
    );
    for change in &migration.diff.changes {
        println!("  {}", change_line(change));
    }

    if !migration.output.warnings.is_empty() {
        println!();
        println!("{}", "Warnings:".yellow().bold());
        for warning in &migration.output.warnings {
            println!("  {} {}", "!".yellow(), warning);
        }
    }

    println!();
    println!("{}", "-- Up".dimmed());
    print_statements(&migration.output.up);
    println!();
    println!("{}", "-- Down".dimmed());
    print_statements(&migration.output.down);
}

fn print_statements(statements: &[String]) {
    if statements.is_empty() {
        println!("{}", "-- No changes".dimmed());
    }
    for statement in statements {
        if statement.starts_with("--") {
            println!("{}", statement.dimmed());
        } else {
            println!("{}", statement);
        }
    }
}

pub(crate) fn print_status(status: &MigrationStatus, dialect: Dialect) {
    println!("{}", "Migration status".bold());
    println!(
        "  Baseline:  {}",
        if status.has_baseline {
            "yes".green()
        } else {
            "no".yellow()
        }
    );
    println!("  Dialect:   {}", dialect);
    println!("  Entities:  {}", status.entity_count);
    println!("  Applied:   {}", status.applied_count);
    println!(
        "  Pending:   {}",
        if status.pending_count > 0 {
            status.pending_count.to_string().yellow()
        } else {
            status.pending_count.to_string().normal()
        }
    );
    if let Some(last) = &status.last_migration {
        println!(
            "  Last:      {} ({}) at {}",
            last.name,
            last.direction,
            last.applied_at.to_rfc3339()
        );
    }
    if !status.drifted.is_empty() {
        println!(
            "  {}   {}",
            "Drifted:".red().bold(),
            status.drifted.join(", ")
        );
    }
}
