//! starrocks-migrate CLI - StarRocks and Flink CDC DDL generation.

use clap::{Parser, Subcommand};
use starrocks_migrate::{Config, MigrateError, Orchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "starrocks-migrate")]
#[command(about = "Generate StarRocks and Flink CDC DDL from source database schemas")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

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
    /// Introspect the source and generate DDL result files
    Generate {
        /// Override the configured output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Load and validate the configuration without connecting
    CheckConfig,
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

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(MigrateError::Config)?;

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Generate { output_dir } => {
            if let Some(dir) = output_dir {
                config.output.dir = dir.display().to_string();
            }
            let summary = Orchestrator::new(config).run().await?;

            println!("\nGeneration completed!");
            println!("  Duration: {:.2}s", summary.duration_seconds);
            println!("  Tables introspected: {}", summary.tables_introspected);
            println!(
                "  Planned bundles: {} across {} rules",
                summary.bundles_planned, summary.rules
            );
            println!("  Statements: {}", summary.statements);
            println!(
                "  Files: {} in {}",
                summary.files_written,
                summary.output_dir.display()
            );
        }

        Commands::CheckConfig => {
            // Config::load already validated; report what was found
            println!("Configuration OK: {} rule(s)", config.rules.len());
            println!("  Source: {} at {}:{}", config.source.r#type.as_str(), config.source.host, config.source.port);
            println!("  Output: {}", config.output.dir);
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
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
