// SPDX-License-Identifier: MIT

//! Archivist: document uploader and AI-assisted organizer
//!
//! Uploads local documents to the Amplify document-intelligence API, waits
//! for processing, and asks the hosted LLM for a summary or an
//! organization script.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::signal;
use tracing::{error, info};

use archivist::api::AmplifyClient;
use archivist::config::{AppConfig, Credentials};
use archivist::{pipeline, ArchivistError, Result};

/// Archivist CLI - document upload and AI-assisted organization
#[derive(Parser, Debug)]
#[command(name = "archivist")]
#[command(version = "0.3.0")]
#[command(about = "Upload documents and generate AI organization plans", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a directory's documents and generate an organization script
    Organize {
        /// Directory containing documents
        path: PathBuf,

        /// Directory the generated script is written into
        #[arg(short, long, default_value = "organization_plan_output")]
        output: PathBuf,

        /// Cap on the number of files uploaded (overrides config)
        #[arg(long)]
        max_files: Option<usize>,

        /// Model id to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Upload a single document and print an AI-generated summary
    Summarize {
        /// File to summarize
        file: PathBuf,

        /// Model id to use (overrides config)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Look up the processing status of an uploaded file
    Status {
        /// Server-assigned file id
        file_id: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Non-zero exit codes distinguish pipeline failures (2) from
    // configuration or unexpected errors (1); clap exits 2 on bad usage.
    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{}", e);
            match e {
                ArchivistError::Pipeline(_)
                | ArchivistError::Upload(_)
                | ArchivistError::Processing(_) => 2,
                _ => 1,
            }
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Organize { path, output, max_files, model } => {
            run_organize(config, path, output, max_files, model).await
        }
        Commands::Summarize { file, model } => run_summarize(config, file, model).await,
        Commands::Status { file_id } => run_status(config, file_id).await,
        Commands::Config { action } => run_config_command(config, action, &cli.config),
    }
}

/// Build the API client from config plus the environment credential
fn build_client(config: &AppConfig) -> Result<AmplifyClient> {
    let credentials = Credentials::from_env()?;
    Ok(AmplifyClient::new(&config.api, credentials))
}

/// Run the organization-plan pipeline
async fn run_organize(
    mut config: AppConfig,
    path: PathBuf,
    output: PathBuf,
    max_files: Option<usize>,
    model: Option<String>,
) -> Result<()> {
    if max_files.is_some() {
        config.scanner.max_files = max_files;
    }
    if let Some(model) = model {
        config.chat.model = model;
    }

    let client = build_client(&config)?;

    tokio::select! {
        result = pipeline::organize(&client, &config, &path, &output) => {
            let outcome = result?;
            println!(
                "Organization plan for {} files written to {}",
                outcome.file_count,
                outcome.output_path.display()
            );
            Ok(())
        }
        _ = signal::ctrl_c() => {
            info!("Operation cancelled by user");
            Ok(())
        }
    }
}

/// Run the single-file summarization pipeline
async fn run_summarize(mut config: AppConfig, file: PathBuf, model: Option<String>) -> Result<()> {
    if let Some(model) = model {
        config.chat.model = model;
    }

    let client = build_client(&config)?;

    tokio::select! {
        result = pipeline::summarize(&client, &config, &file) => {
            println!("{}", result?);
            Ok(())
        }
        _ = signal::ctrl_c() => {
            info!("Operation cancelled by user");
            Ok(())
        }
    }
}

/// One-shot status lookup for an uploaded file
async fn run_status(config: AppConfig, file_id: String) -> Result<()> {
    use archivist::api::DocumentApi;

    let client = build_client(&config)?;
    let status = client.file_status(&file_id).await?;
    println!("{}: {}", file_id, status.status);
    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            let default_config = AppConfig::default();
            default_config.save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            println!("Configuration at {:?} is valid", config_path);
            println!("  API base URL: {}", config.api.base_url);
            println!("  Model: {}", config.chat.model);
            println!("  Knowledge base: {}", config.upload.knowledge_base);
            println!(
                "  Polling: {} attempts x {}s",
                config.polling.status_attempts, config.polling.interval_secs
            );
        }
    }

    Ok(())
}
