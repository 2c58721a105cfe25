//! pg-anon CLI - policy-driven, in-place PostgreSQL anonymization.

use clap::{Parser, Subcommand};
use pg_anon::{
    apply_plan, build_plan, db, dry_run_plan, enforce_row_cap, AnonError, DbConfig, ExecMode,
    Policy,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "pg-anon")]
#[command(about = "Policy-driven, in-place PostgreSQL anonymization")]
#[command(version)]
struct Cli {
    /// Path to the anonymization policy file
    #[arg(short, long, default_value = "anonymizer.yaml")]
    policy: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a starter policy from the live schema
    Init {
        /// Schema to scan
        #[arg(long, default_value = "public")]
        schema: String,

        /// Rows to sample per table for the review preview
        #[arg(long, default_value = "3")]
        sample_limit: usize,

        /// Write raw sample values instead of masked ones
        #[arg(long)]
        unsafe_samples: bool,

        /// Path for the sample preview file
        #[arg(long, default_value = "anonymizer.samples.yaml")]
        samples: PathBuf,
    },

    /// Print heuristic strategy suggestions for a schema
    Suggest {
        /// Schema to scan
        #[arg(long, default_value = "public")]
        schema: String,
    },

    /// Execute the plan inside a transaction that is always rolled back
    DryRun {
        /// Write a JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Execute the plan and commit
    Apply {
        /// Maximum total affected rows accepted without --force
        #[arg(long, default_value = "1000000")]
        cap: u64,

        /// Proceed even if the dry-run estimate exceeds the cap
        #[arg(short, long)]
        force: bool,

        /// Write a JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Test the database connection
    HealthCheck,
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

async fn run() -> Result<(), AnonError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| AnonError::Config(e.to_string()))?;

    match cli.command {
        Commands::Init {
            schema,
            sample_limit,
            unsafe_samples,
            samples,
        } => {
            let client = db::connect(&DbConfig::from_env()?).await?;
            info!("Generating anonymizer policy from database schema");

            let generated =
                pg_anon::config::generate_policy(&client, &schema, sample_limit, unsafe_samples)
                    .await?;

            generated.policy.save(&cli.policy)?;
            let preview = serde_yaml::to_string(&serde_json::json!({
                "tables_list": generated.tables,
                "samples": generated.samples,
            }))?;
            std::fs::write(&samples, preview)?;

            info!("Policy written to {:?}", cli.policy);
            info!("Samples written to {:?}", samples);
            println!(
                "Next steps:\n\
                 1. Review {}\n\
                 2. Edit {}\n\
                 3. Set reviewed: true\n\
                 4. Run dry-run",
                samples.display(),
                cli.policy.display()
            );
        }

        Commands::Suggest { schema } => {
            let client = db::connect(&DbConfig::from_env()?).await?;
            let tables = pg_anon::schema::read_schema(&client, &schema).await?;
            let suggestions = pg_anon::suggest::heuristic_scan(&tables);

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else {
                println!("{}", serde_yaml::to_string(&suggestions)?);
            }
        }

        Commands::DryRun { report } => {
            let policy = Policy::load(&cli.policy)?;
            policy.preflight(ExecMode::DryRun)?;

            let plan = build_plan(&policy)?;
            info!("Plan built with {} enabled tables", plan.tables.len());

            let mut client = db::connect(&DbConfig::from_env()?).await?;
            let result = dry_run_plan(&mut client, &plan).await?;
            let total = result.total();
            info!("Total rows affected (dry run): {}", total);

            if let Some(path) = report {
                write_report(&path, &plan, &result)?;
                info!("Dry run report written to {:?}", path);
            }

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                println!("\nDry run completed (rolled back)");
                print_summary(&result);
            }
        }

        Commands::Apply { cap, force, report } => {
            let policy = Policy::load(&cli.policy)?;
            policy.preflight(ExecMode::Apply)?;

            let plan = build_plan(&policy)?;
            info!("Plan built with {} enabled tables", plan.tables.len());

            let mut client = db::connect(&DbConfig::from_env()?).await?;

            // Estimate blast radius with a rolled-back run, then gate.
            let estimate = dry_run_plan(&mut client, &plan).await?;
            enforce_row_cap(estimate.total(), cap, force)?;

            info!("Beginning anonymization transaction");
            let tx = client.transaction().await?;
            let result = match apply_plan(&tx, &plan).await {
                Ok(result) => {
                    tx.commit().await?;
                    result
                }
                Err(e) => {
                    if let Err(rb) = tx.rollback().await {
                        tracing::warn!("Rollback after failed apply also failed: {}", rb);
                    }
                    return Err(e);
                }
            };

            if let Some(path) = report {
                write_report(&path, &plan, &result)?;
                info!("Apply report written to {:?}", path);
            }

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                println!("\nAnonymization completed");
                print_summary(&result);
            }
        }

        Commands::HealthCheck => {
            let client = db::connect(&DbConfig::from_env()?).await?;
            client.query_one("SELECT 1", &[]).await?;
            println!("Connection OK");
        }
    }

    Ok(())
}

fn print_summary(result: &pg_anon::ExecutionReport) {
    println!("  Mode: {}", result.mode);
    for (table, rows) in &result.updated_by_table {
        println!("  {}: {} rows", table, rows);
    }
    println!("  Total: {} rows", result.total());
    if !result.warnings.is_empty() {
        println!("  Type-safety downgrades: {}", result.warnings.len());
    }
}

fn write_report(
    path: &PathBuf,
    plan: &pg_anon::Plan,
    result: &pg_anon::ExecutionReport,
) -> Result<(), AnonError> {
    let report = serde_json::json!({
        "mode": result.mode,
        "plan": plan,
        "result": result,
        "total_rows": result.total(),
    });
    std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
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
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
