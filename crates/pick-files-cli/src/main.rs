mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, PickArgs, PrintDatabaseArgs};
use dotenv::dotenv;
use pick_files_core::config::load_configuration;
use pick_files_core::export::export_records;
use pick_files_core::{AppConfig, DatabaseStatistics, PickEngine};
use progress::CliReporter;
use tracing::{debug, error, info};

fn main() {
    dotenv().ok();

    let args = Cli::parse();
    let _guard = logging::init_logger(args.log_level());

    if let Err(err) = run(args) {
        match err.downcast_ref::<pick_files_core::Error>() {
            Some(core) if core.is_configuration() => error!("Configuration error: {:#}", err),
            _ => error!("Error: {:#}", err),
        }
        process::exit(1);
    }
}

fn run(args: Cli) -> anyhow::Result<()> {
    let mut config =
        load_configuration(args.config.as_deref()).context("Error loading configuration")?;
    if let Some(database) = &args.database {
        config.database = Some(database.clone());
    }

    match args.command {
        Some(Commands::Pick(pick)) => run_pick(config, &pick),
        Some(Commands::PrintDatabase(print)) => run_print_database(&config, &print),
        Some(Commands::Stats) => run_stats(&config),
        Some(Commands::ResetDatabase { force }) => run_reset_database(&config, force),
        Some(Commands::DumpConfig(pick)) => {
            pick.apply_to(&mut config);
            print!("{}", config.to_yaml()?);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    }
}

fn run_pick(mut config: AppConfig, pick: &PickArgs) -> anyhow::Result<()> {
    pick.apply_to(&mut config);
    debug!("Configuration: {:?}", config);

    if pick.reset_database {
        let store = config.history_store();
        if store.reset(true)? {
            info!("Removed history database {}", store.path().display());
        }
    }

    let engine = PickEngine::from_config(&config, pick.dry_run)?;
    let policy = engine.policy();
    info!("pick-files-{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Will pick {} file(s) into {} ({})",
        policy.count,
        policy.destination.display(),
        policy.conflict_policy
    );
    if !policy.suffixes.is_empty() {
        info!("Only files ending in {}", policy.suffixes.join(", "));
    }
    if !policy.block_duration.is_zero() {
        info!(
            "Files picked within the last {} are blocked",
            humanize(policy.block_duration)
        );
    }

    let reporter = CliReporter::new();
    let result = engine.run(&reporter)?;

    println!();
    info!(
        "Scan: {}, Select: {}, History: {}",
        format!("{:.2}s", result.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.select_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.store_write_duration.as_secs_f64()).green(),
    );
    info!(
        "{} files scanned, {} eligible, {} picked",
        format!("{}", result.total_files_scanned).cyan(),
        format!("{}", result.eligible_files).cyan(),
        format!("{}", result.picked.len()).green(),
    );
    info!(
        "{} history entries, {} expired",
        format!("{}", result.history_size).cyan(),
        format!("{}", result.expired_records).yellow(),
    );
    if result.picked.len() < policy.count {
        info!(
            "{}",
            format!(
                "Only {} of {} requested files could be picked",
                result.picked.len(),
                policy.count
            )
            .yellow()
        );
    }

    Ok(())
}

fn run_print_database(config: &AppConfig, print: &PrintDatabaseArgs) -> anyhow::Result<()> {
    let records = config.history_store().load()?;
    if records.is_empty() {
        info!("Database empty");
        return Ok(());
    }
    export_records(&records, print.format, &print.output)
        .with_context(|| format!("Error writing database to {}", print.output))?;
    Ok(())
}

fn run_stats(config: &AppConfig) -> anyhow::Result<()> {
    let store = config.history_store();
    let records = store.load()?;
    let stats = DatabaseStatistics::compute(&records, store.disk_size());
    info!("History database {}", store.path().display());
    println!("{}", stats);
    Ok(())
}

fn run_reset_database(config: &AppConfig, force: bool) -> anyhow::Result<()> {
    let store = config.history_store();
    if !store.exists() {
        info!("No history database at {}", store.path().display());
        return Ok(());
    }

    let confirmed = force
        || prompt_confirm(
            &format!(
                "Are you SURE you want to delete the history database {}?",
                store.path().display()
            ),
            Some(false),
        )?;
    if !confirmed {
        info!("History database left untouched");
        return Ok(());
    }

    store.reset(true)?;
    println!("History database removed");
    Ok(())
}

fn humanize(duration: std::time::Duration) -> String {
    humantime::format_duration(duration).to_string()
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(default.unwrap_or(false));
        }

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
