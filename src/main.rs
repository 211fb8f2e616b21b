//! Main entry point for the DeepL connector CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deepl_connector::cli::commands::{self, Commands};
use deepl_connector::{ConnectorConfig, DeeplConnector, ProtocolVariant};

/// DeepL connector - machine translation over DeepL's HTTP interfaces
#[derive(Parser, Debug)]
#[command(name = "deepl-connector", version, about, long_about = None)]
struct Args {
    /// Settings file layered under DEEPL_* environment variables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session-only API key, used when DEEPL_API_KEY is not set
    #[arg(long)]
    api_key: Option<String>,

    /// Wire protocol: legacy_get, modern_post or sdk_mediated
    #[arg(long)]
    protocol: Option<ProtocolVariant>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn build_connector(args: &Args) -> anyhow::Result<DeeplConnector> {
    let mut config = ConnectorConfig::load(args.config.as_deref())?;
    if let Some(protocol) = args.protocol {
        config.protocol = protocol;
    }

    let connector = DeeplConnector::from_config(config)?;
    Ok(match &args.api_key {
        Some(key) => connector.with_temporary_key(key.as_str()),
        None => connector,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("deepl_connector={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Some(command) = args.command.as_ref() else {
        println!("Please specify a command. Use --help for more information.");
        return Ok(());
    };

    let connector = build_connector(&args)?;

    // Execute command
    match command.clone() {
        Commands::Translate {
            text,
            source_lang,
            target_lang,
            options,
        } => {
            commands::handle_translate(connector, text, source_lang, target_lang, options).await?;
        }
        Commands::Batch {
            file,
            output,
            source_lang,
            target_lang,
            options,
        } => {
            commands::handle_batch(connector, file, output, source_lang, target_lang, options).await?;
        }
        Commands::Server { host, port } => {
            commands::handle_server(connector, host, port).await?;
        }
    }

    Ok(())
}
