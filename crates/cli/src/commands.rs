//! Command implementations

use crate::output;
use crate::{Cli, Commands};
use anyhow::{Context, Result};
use archsync_codegen::migrations::{Direction, MigrationManager};
use archsync_codegen::{Differ, SyncConfig};
use archsync_ir::load_entities;
use colored::Colorize;
use std::path::Path;

pub(crate) fn execute(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    tracing::debug!(root = %cli.root.display(), dialect = %config.dialect, "resolved configuration");

    match cli.command {
        Commands::Diff { from, to, json } => diff(&config, &from, &to, json),
        Commands::Baseline { spec } => baseline(manager(&cli.root, config), &spec),
        Commands::Generate {
            spec,
            name,
            dry_run,
        } => generate(manager(&cli.root, config), &spec, name.as_deref(), dry_run),
        Commands::Status { json } => status(manager(&cli.root, config), json),
        Commands::Pending => pending(manager(&cli.root, config)),
        Commands::Record { name, direction } => {
            record(manager(&cli.root, config), &name, direction)
        }
        Commands::ResetState => reset_state(manager(&cli.root, config)),
    }
}

fn load_config(cli: &Cli) -> Result<SyncConfig> {
    let config = match &cli.config {
        Some(path) => SyncConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SyncConfig::load_from_root(&cli.root).context("Failed to load archsync.toml")?,
    };
    Ok(match cli.dialect {
        Some(dialect) => config.with_dialect(dialect),
        None => config,
    })
}

fn manager(root: &Path, config: SyncConfig) -> MigrationManager {
    MigrationManager::new(root, config)
}

// ============================================================================
// Commands
// ============================================================================

fn diff(config: &SyncConfig, from: &Path, to: &Path, json: bool) -> Result<()> {
    let old = load_entities(from)
        .with_context(|| format!("Failed to load old spec {}", from.display()))?;
    let new =
        load_entities(to).with_context(|| format!("Failed to load new spec {}", to.display()))?;

    let result = Differ::new(config.compatibility()).diff(&old, &new);
    if json {
        output::print_json(&result)
    } else {
        output::print_diff(&result);
        Ok(())
    }
}

fn baseline(manager: MigrationManager, spec: &Path) -> Result<()> {
    let entities = load_entities(spec)
        .with_context(|| format!("Failed to load spec {}", spec.display()))?;
    manager
        .baseline(&entities)
        .context("Failed to record baseline")?;

    println!(
        "{} Baseline recorded with {} entit{}",
        "✓".green(),
        entities.len(),
        if entities.len() == 1 { "y" } else { "ies" }
    );
    Ok(())
}

fn generate(
    manager: MigrationManager,
    spec: &Path,
    name: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let entities = load_entities(spec)
        .with_context(|| format!("Failed to load spec {}", spec.display()))?;

    let Some(migration) = manager
        .generate_migration(&entities, name)
        .context("Failed to generate migration")?
    else {
        println!("{}", "No changes".dimmed());
        return Ok(());
    };

    output::print_migration(&migration);

    if dry_run {
        println!();
        println!("{}", "Dry run: nothing written".yellow());
        return Ok(());
    }

    let path = manager
        .save_migration(&migration, &entities)
        .context("Failed to save migration")?;
    println!();
    println!("{} Wrote {}", "✓".green(), path.display());
    Ok(())
}

fn status(manager: MigrationManager, json: bool) -> Result<()> {
    let status = manager.status().context("Failed to read migration status")?;
    if json {
        output::print_json(&status)
    } else {
        output::print_status(&status, manager.dialect());
        Ok(())
    }
}

fn pending(manager: MigrationManager) -> Result<()> {
    let pending = manager
        .pending_migrations()
        .context("Failed to list pending migrations")?;
    if pending.is_empty() {
        println!("{}", "No pending migrations".dimmed());
    } else {
        for name in pending {
            println!("{}", name);
        }
    }
    Ok(())
}

fn record(manager: MigrationManager, name: &str, direction: Direction) -> Result<()> {
    let file = manager.find_migration(name)?;
    let content = file.read()?;
    let record = manager
        .record_applied(&file.name, direction, &content)
        .context("Failed to record migration")?;

    println!(
        "{} Recorded {} ({}) hash {}",
        "✓".green(),
        record.name.bold(),
        record.direction,
        record.hash.dimmed()
    );
    Ok(())
}

fn reset_state(manager: MigrationManager) -> Result<()> {
    let moved = manager.reset_state().context("Failed to reset state")?;
    if let Some(path) = moved {
        println!("{} Moved previous state to {}", "!".yellow(), path.display());
    }
    println!(
        "{} Fresh state written to {}",
        "✓".green(),
        manager.state_path().display()
    );
    Ok(())
}
