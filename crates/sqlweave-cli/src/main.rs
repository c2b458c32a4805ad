//! sqlweave CLI - dependency-graph schema migrations.

mod scaffold;

use clap::{Parser, Subcommand};
use sqlweave::{
    create_engine, generate, load_schema, ConnectionConfig, MigrateOptions, MigrationPlan,
    MigrationRepository, Migrator, PlanSummary, SchemaDiff, WeaveError,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{warn, Level};

const SCHEMA_DIR: &str = "schema";
const MIGRATIONS_DIR: &str = "migrations";

#[derive(Parser)]
#[command(name = "sqlweave")]
#[command(about = "Dependency-graph schema migrations for PostgreSQL and MySQL")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short = 'f', long, env = "SQLWEAVE_CONFIG_FILE", default_value = "sqlweave.yaml")]
    config_file: PathBuf,

    /// Config profile name in the config file
    #[arg(short = 'c', long, env = "SQLWEAVE_CONFIG", default_value = "default")]
    config: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Init directory structure and starter config
    Init,

    /// Create the applied-migrations ledger in the database
    Initdb,

    /// Test the database connection
    TestConnection,

    /// Create a new migration from schema changes
    Makemigration {
        /// Create a migration with empty statements for manual editing
        #[arg(long)]
        empty: bool,

        /// Optional migration name
        #[arg(short, long)]
        name: Option<String>,

        /// Show the plan without saving the migration
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply pending migrations
    Migrate {
        /// Mark migrations as applied without executing statements
        #[arg(long)]
        fake: bool,

        /// Show pending migrations without touching the database
        #[arg(long)]
        dry_run: bool,

        /// Stop after applying the migration whose name starts with this
        #[arg(short, long)]
        migration: Option<String>,

        /// Un-apply the last applied migration
        #[arg(short, long)]
        revert: bool,
    },

    /// Show applied state of each migration
    Status,

    /// Show changes to the schema since the last migration
    Diff {
        /// Also print the changed apply statements
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), WeaveError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| WeaveError::Config(e.to_string()))?;

    let config_file = cli.config_file.clone();
    let profile = cli.config.clone();

    match cli.command {
        Commands::Init => {
            println!("Creating directories...");
            scaffold::run(&config_file)?;
            println!("Done.");
        }

        Commands::Initdb => {
            let engine = engine_from(&config_file, &profile)?;
            println!("Creating migrations ledger...");
            engine.ensure_ledger().await?;
            println!("Done.");
        }

        Commands::TestConnection => {
            let engine = engine_from(&config_file, &profile)?;
            engine.test_connection().await?;
            println!("Connection OK");
        }

        Commands::Makemigration {
            empty,
            name,
            dry_run,
        } => makemigration(empty, name, dry_run)?,

        Commands::Migrate {
            fake,
            dry_run,
            migration,
            revert,
        } => {
            let engine = engine_from(&config_file, &profile)?;
            let repo = MigrationRepository::new(MIGRATIONS_DIR);
            let migrator = Migrator::new(&repo, engine.as_ref());
            let opts = MigrateOptions {
                fake,
                dry_run,
                stop_at: migration,
                revert,
            };
            let report = migrator.run(&opts).await?;

            if dry_run {
                if report.skipped.is_empty() {
                    println!("Nothing to apply");
                } else {
                    println!("Would {}:", if revert { "revert" } else { "apply" });
                    for name in &report.skipped {
                        println!("  {}", name);
                    }
                }
            } else if revert {
                for name in &report.reverted {
                    println!("Un-applied migration {}", name);
                }
            } else if report.applied.is_empty() {
                println!("Nothing to apply");
            } else {
                for name in &report.applied {
                    println!("Applied migration {}", name);
                }
            }
        }

        Commands::Status => {
            let engine = engine_from(&config_file, &profile)?;
            let repo = MigrationRepository::new(MIGRATIONS_DIR);
            let migrator = Migrator::new(&repo, engine.as_ref());
            for status in migrator.status().await? {
                let state = if status.applied { "applied" } else { "NOT applied" };
                println!("Migration {} - {}", status.name, state);
            }
        }

        Commands::Diff { verbose } => diff(verbose)?,
    }

    Ok(())
}

fn engine_from(
    config_file: &Path,
    profile: &str,
) -> Result<Box<dyn sqlweave::DatabaseEngine>, WeaveError> {
    let config = ConnectionConfig::load(config_file, profile)?;
    create_engine(&config)
}

fn makemigration(empty: bool, name: Option<String>, dry_run: bool) -> Result<(), WeaveError> {
    let current = load_schema(Path::new(SCHEMA_DIR))?;
    let repo = MigrationRepository::new(MIGRATIONS_DIR);

    let (plan, default_suffix) = if empty {
        (MigrationPlan::empty(), "manual")
    } else {
        let previous = repo.load_latest_snapshot()?;
        let plan = generate(&previous, &current);
        if plan.is_empty() {
            println!("No changes detected");
            return Ok(());
        }
        (plan, "auto")
    };

    print_summary(&plan.summary);
    for name in &plan.summary.manual_edits {
        warn!(
            "{} has no previous revert statements; edit the generated up.sql before migrating",
            name
        );
    }
    for name in plan.summary.created.iter().chain(&plan.summary.recreated) {
        if let Some(unit) = current.get(name) {
            if !unit.up.is_empty() && unit.down.is_empty() {
                warn!("{} has no --DOWN section; this migration cannot revert it", name);
            }
        }
    }

    if dry_run {
        println!("Dry run, migration not saved");
        return Ok(());
    }

    let suffix = name.unwrap_or_else(|| default_suffix.to_string());
    let migration = repo.save(&current, &plan, &suffix)?;
    println!("Created migration {}", migration.name);
    Ok(())
}

fn print_summary(summary: &PlanSummary) {
    if !summary.created.is_empty() {
        println!("Creating:");
        for name in &summary.created {
            println!(" {}", name);
        }
    }
    if !summary.dropped.is_empty() || !summary.recreated.is_empty() {
        println!("Updating:");
        println!(" dropping:");
        for name in &summary.dropped {
            println!("  {}", name);
        }
        println!(" creating:");
        for name in &summary.recreated {
            println!("  {}", name);
        }
    }
    if !summary.removed.is_empty() {
        println!("Deleting:");
        for name in &summary.removed {
            println!(" {}", name);
        }
    }
}

fn diff(verbose: bool) -> Result<(), WeaveError> {
    let current = load_schema(Path::new(SCHEMA_DIR))?;
    let repo = MigrationRepository::new(MIGRATIONS_DIR);
    let previous = repo.load_latest_snapshot()?;
    let diff = SchemaDiff::compare(&previous, &current);

    if diff.is_empty() {
        println!("No changes");
        return Ok(());
    }

    if !diff.added.is_empty() {
        println!("New items:");
        for name in &diff.added {
            println!("  {}", name);
        }
    }
    if !diff.removed.is_empty() {
        println!("Removed items:");
        for name in &diff.removed {
            println!("  {}", name);
        }
    }
    if !diff.changed.is_empty() {
        println!("Changed items:");
        for name in &diff.changed {
            println!("  {}", name);
            if verbose {
                if let (Some(old), Some(new)) = (previous.get(name), current.get(name)) {
                    for line in &old.up {
                        println!("- {}", line);
                    }
                    for line in &new.up {
                        println!("+ {}", line);
                    }
                }
            }
        }
    }
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
