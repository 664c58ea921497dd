//! earnings-agent CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use earnings_agent::{
    commands::{
        cmd_extract, cmd_ingest, cmd_init, cmd_path, print_ingest, print_init,
        print_snapshot_report, InitOptions,
    },
    config::Config,
    error::Result,
    progress::LogWriterFactory,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "earnings-agent")]
#[command(version, about = "Fetch earnings releases and extract headline figures", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "EARNINGS_AGENT_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration and create the data directories
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Fetch a document for a ticker into the archive
    Ingest {
        /// Ticker symbol (e.g. MSFT)
        ticker: String,

        /// Absolute http(s) URL of the document
        url: String,

        /// Show a download progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Extract the headline from the newest archived document
    Extract {
        /// Ticker symbol
        ticker: String,
    },

    /// Show where a document would be saved
    Path {
        /// Ticker symbol
        ticker: String,

        /// Document URL
        url: String,

        /// Content type to assume instead of guessing from the URL
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let json = cli.json;
    if let Err(e) = run(cli).await {
        error!(kind = %e.kind(), "{}", e);
        if json {
            match serde_json::to_string_pretty(&e.report()) {
                Ok(report) => println!("{}", report),
                Err(err) => error!("Failed to serialize error report: {}", err),
            }
        }
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) {
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let (text_layer, json_layer) = if cli.log_json {
        (
            None,
            Some(fmt::layer().json().with_writer(LogWriterFactory)),
        )
    } else {
        (Some(fmt::layer().with_writer(LogWriterFactory)), None)
    };

    tracing_subscriber::registry()
        .with(text_layer)
        .with(json_layer)
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    // Handle init command specially (doesn't need existing config)
    if let Commands::Init { force } = cli.command {
        let config_path = cli.config.unwrap_or_else(Config::default_config_path);
        let report = cmd_init(InitOptions {
            config_path,
            data_dir: cli.data_dir,
            force,
        })?;
        if cli.json {
            print_json(&report)?;
        } else {
            print_init(&report);
        }
        return Ok(());
    }

    // Handle completions command (doesn't need config)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "earnings-agent", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Init { .. } | Commands::Completions { .. } => unreachable!(),

        Commands::Ingest {
            ticker,
            url,
            progress,
        } => {
            let outcome = cmd_ingest(&config, &ticker, &url, progress && !cli.json).await?;
            if cli.json {
                print_json(&outcome)?;
            } else {
                print_ingest(&outcome);
            }
        }

        Commands::Extract { ticker } => {
            let report = cmd_extract(&config, &ticker)?;
            if cli.json {
                print_json(&report)?;
            } else {
                print_snapshot_report(&report);
            }
        }

        Commands::Path {
            ticker,
            url,
            content_type,
        } => {
            let path = cmd_path(&config, &ticker, &url, content_type.as_deref())?;
            if cli.json {
                print_json(&serde_json::json!({ "path": path }))?;
            } else {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

/// Config file (if any) plus command-line overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_from(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
