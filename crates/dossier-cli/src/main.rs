//! Dossier CLI - Command-line interface
//!
//! Usage:
//!   dossier analyze <files...>
//!   dossier formats

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use dossier_analyzer::Analyzer;
use dossier_batch::BatchProcessor;
use dossier_core::{AppConfig, BatchFile};
use dossier_extract::{DocumentExtractor, SUPPORTED_EXTENSIONS};
use dossier_llm::create_inference_client;

#[derive(Parser)]
#[command(name = "dossier")]
#[command(about = "Batch document analysis for investigative casework")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a batch of documents and print the report as JSON
    Analyze {
        /// Paths to the documents
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print compact instead of pretty JSON
        #[arg(long)]
        compact: bool,
    },
    /// List supported formats and limits
    Formats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dossier_batch=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { files, compact } => {
            let config = AppConfig::from_env()?;

            let client = create_inference_client(&config.llm)?;
            let analyzer = Arc::new(Analyzer::new(client, config.llm.budgets.clone()));
            let processor = BatchProcessor::new(
                Arc::new(DocumentExtractor::new()),
                analyzer,
                config.batch.clone(),
            );

            let mut batch = Vec::with_capacity(files.len());
            for path in &files {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("could not read {}", path.display()))?;
                let filename = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or("unbenannt")
                    .to_string();
                batch.push(BatchFile::new(filename, bytes));
            }

            let report = processor.process(batch).await?;

            let output = if compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };
            println!("{output}");
        }
        Commands::Formats => {
            let config = AppConfig::from_env()?;
            println!("Unterstützte Formate: {}", SUPPORTED_EXTENSIONS.join(", "));
            println!(
                "Maximale Dateigröße:  {} MB",
                config.batch.max_file_size / (1024 * 1024)
            );
            println!(
                "Analysierte Textlänge: {} Zeichen",
                config.batch.max_text_chars
            );
            println!("Modell: {}", config.llm.model);
        }
    }

    Ok(())
}
