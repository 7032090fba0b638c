//! # Employees Table Initializer Entry Point
//!
//! Loads configuration, installs tracing, and runs the initializer or the
//! registry migration against the master database.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use employees::{
    config::ConfigLoader,
    db,
    initializer::EmployeeTableInitializer,
    migration::{Migrator, MigratorTrait},
    telemetry::init_tracing,
};

#[derive(Debug, Parser)]
#[command(name = "employees", version, about = "Employees table initializer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create or patch the employees table and optionally seed it.
    Reconcile(ReconcileArgs),
    /// Create the tenant registry table in the master database.
    MigrateRegistry,
}

#[derive(Debug, Args)]
struct ReconcileArgs {
    /// Only reconcile the master database.
    #[arg(long, conflicts_with = "tenants")]
    master: bool,
    /// Reconcile every tenant listed in the registry.
    #[arg(long)]
    tenants: bool,
    /// Seed empty tables with the baseline employees.
    #[arg(long, conflicts_with = "no_seed")]
    seed: bool,
    /// Never seed, whatever the configuration says.
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Missing master connection string is fatal here, before any target is touched.
    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    init_tracing(&config).context("initializing tracing")?;

    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(profile = %config.profile, config = %redacted_json, "loaded configuration");
    }

    match cli.command {
        Command::Reconcile(args) => {
            let mut init_config = config.initializer_config();
            if args.master {
                init_config.for_master = true;
            } else if args.tenants {
                init_config.for_master = false;
            }
            if args.seed {
                init_config.enable_seeding = true;
            } else if args.no_seed {
                init_config.enable_seeding = false;
            }

            let initializer =
                EmployeeTableInitializer::new(init_config).context("configuring initializer")?;
            let report = initializer.run().await;
            // Failed targets were already logged; the run itself still succeeds.
            println!(
                "Initialized employees table on {} of {} target(s).",
                report.succeeded(),
                report.attempted()
            );
        }
        Command::MigrateRegistry => {
            let master = db::init_pool(&config)
                .await
                .context("connecting to master database")?;
            db::health_check(&master).await?;
            Migrator::up(&master, None)
                .await
                .context("applying registry migration")?;
            tracing::info!("tenant registry is up to date");
        }
    }

    Ok(())
}
