use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "logs-transmitter")]
#[command(about = "Log ingestion endpoint that stores one batch per request", long_about = None)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Run,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Build a batch from a request body file (or stdin) and print it
    Parse {
        file: Option<PathBuf>,
        #[arg(long)]
        compact: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Init {
        #[arg(long)]
        stdout: bool,
    },
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so `parse` output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logs_transmitter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = logs_transmitter::config::resolve_config_path(cli.config.as_deref());

    match cli.command {
        Some(Commands::Run) | None => {
            logs_transmitter::cli::run::run(config_path).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { stdout } => {
                logs_transmitter::cli::config::init(stdout)?;
            }
            ConfigAction::Validate => {
                logs_transmitter::cli::config::validate(config_path)?;
            }
        },
        Some(Commands::Parse { file, compact }) => {
            logs_transmitter::cli::parse::parse(file.as_deref(), compact).await?;
        }
    }

    Ok(())
}
