//! CLI command definitions and handlers

use clap::Subcommand;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use crate::core::client::DeeplConnector;
use crate::core::models::{Language, TagHandling, TranslationOptions};

/// Commands for the DeepL connector
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Translate one text
    Translate {
        /// Text to translate
        text: String,

        /// Source language (auto-detect if not specified)
        #[arg(long)]
        source_lang: Option<String>,

        /// Target language (default: en-US)
        #[arg(short, long, default_value = "en-US")]
        target_lang: String,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Translate a file, one segment per line
    Batch {
        /// Input file (required)
        #[arg(short, long)]
        file: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source language (auto-detect if not specified)
        #[arg(long)]
        source_lang: Option<String>,

        /// Target language (default: en-US)
        #[arg(short, long, default_value = "en-US")]
        target_lang: String,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// Start HTTP API server
    Server {
        /// Bind address (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

/// Per-call provider options
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OptionArgs {
    /// Tell the provider the text is already one sentence
    #[arg(long)]
    pub no_split_sentences: bool,

    /// Keep the source formatting
    #[arg(long)]
    pub preserve_formatting: bool,

    /// Treat inline markup as XML
    #[arg(long)]
    pub xml: bool,
}

impl OptionArgs {
    /// Only flags that were given become overrides
    pub fn to_options(&self) -> TranslationOptions {
        let mut options = TranslationOptions::default();
        if self.no_split_sentences {
            options = options.with_split_sentences(false);
        }
        if self.preserve_formatting {
            options = options.with_preserve_formatting(true);
        }
        if self.xml {
            options = options.with_tag_handling(TagHandling::Xml);
        }
        options
    }
}

fn source_language(tag: Option<&str>) -> Option<Language> {
    match tag.map(str::trim) {
        None | Some("") | Some("auto") => None,
        Some(tag) => Some(Language::parse(tag)),
    }
}

/// `notes.txt` -> `notes_translated.txt`
fn default_output(file: &Path) -> PathBuf {
    let stem = file.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let name = match file.extension() {
        Some(ext) => format!("{}_translated.{}", stem, ext.to_string_lossy()),
        None => format!("{}_translated", stem),
    };
    file.with_file_name(name)
}

/// Handle single text translation command
pub async fn handle_translate(
    connector: DeeplConnector,
    text: String,
    source_lang: Option<String>,
    target_lang: String,
    options: OptionArgs,
) -> anyhow::Result<()> {
    let source = source_language(source_lang.as_deref());
    let target = Language::parse(&target_lang);

    info!("Translating {} characters to {}", text.chars().count(), target);

    match connector
        .translate(source.as_ref(), &target, &text, &options.to_options())
        .await?
    {
        Some(result) => {
            if result.truncated {
                eprintln!("⚠️  Text was truncated to {} characters", connector.config().max_text_length);
            }
            println!("{}", result.translation);
        }
        None => eprintln!("⚠️  {} returned no translation", connector.name()),
    }

    Ok(())
}

/// Handle batch translation command
pub async fn handle_batch(
    connector: DeeplConnector,
    file: PathBuf,
    output: Option<PathBuf>,
    source_lang: Option<String>,
    target_lang: String,
    options: OptionArgs,
) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let output = output.unwrap_or_else(|| default_output(&file));
    let source = source_language(source_lang.as_deref());
    let target = Language::parse(&target_lang);
    let options = options.to_options();

    info!("Starting batch translation");
    info!("Input: {}", file.display());
    info!("Output: {}", output.display());
    info!("Target language: {}", target);

    let content = tokio::fs::read_to_string(&file).await?;
    let lines: Vec<&str> = content.lines().collect();

    if lines.iter().all(|line| line.trim().is_empty()) {
        anyhow::bail!("No text found in {}", file.display());
    }

    // Create progress bar
    let pb = ProgressBar::new(lines.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("=>-"),
    );

    let mut translated = Vec::with_capacity(lines.len());
    let mut processed = 0;
    let mut failed = 0;

    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            translated.push(line.to_string());
            pb.inc(1);
            continue;
        }

        pb.set_message(format!("Line {}", index + 1));

        match connector.translate(source.as_ref(), &target, line, &options).await {
            Ok(Some(result)) => {
                processed += 1;
                translated.push(result.translation);
            }
            Ok(None) => {
                failed += 1;
                translated.push(line.to_string());
            }
            Err(e) => {
                failed += 1;
                pb.set_message(format!("Failed: line {} - {}", index + 1, e));
                eprintln!("Error translating line {}: {}", index + 1, e);
                translated.push(line.to_string());
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Completed");

    let mut body = translated.join("\n");
    if content.ends_with('\n') {
        body.push('\n');
    }
    tokio::fs::write(&output, body).await?;

    let duration = start_time.elapsed();
    let stats = connector.cache_stats().await;
    info!(
        "Completed: {} translated, {} failed, {} cache hits in {:?}",
        processed, failed, stats.hits, duration
    );

    println!("\n✅ Translation completed!");
    println!("   Translated: {}", processed);
    println!("   Failed: {}", failed);
    println!("   Cache hits: {}", stats.hits);
    println!("   Output: {}", output.display());
    println!("   Time: {:?}", duration);

    Ok(())
}

/// Handle server command
pub async fn handle_server(connector: DeeplConnector, host: String, port: u16) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);
    println!("🌐 Engine: {} ({})", connector.name(), connector.variant());

    run_server(connector, host, port).await?;

    Ok(())
}
