//! MedPredict Export CLI
//!
//! Converts trained model artifacts into portable safetensors files for
//! deployment alongside the web client.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use medpredict_export::{
    copy_auxiliary, list_with_status, EntryKind, ExportManifest, ExportStatus, Exporter,
    DEFAULT_OUT_DIR,
};
use medpredict_models::ModelsConfig;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "medpredict-export")]
#[command(
    author,
    version,
    about = "Export trained MedPredict models to the portable format"
)]
#[command(propagate_version = true)]
struct Cli {
    /// Models catalog (YAML); the built-in catalog is used when omitted
    #[arg(short, long, global = true, env = "MEDPREDICT_MODELS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the catalog's base directory
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List catalog models and auxiliary files with their status
    List,

    /// Export a single model
    One {
        /// Model key
        #[arg(short, long)]
        model: String,

        /// Output path (default: web/models/<key>.safetensors)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Export the given models
    Many {
        /// Model keys
        #[arg(long, num_args = 1.., required = true)]
        models: Vec<String>,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Export every catalog model
    All {
        #[command(flatten)]
        batch: BatchArgs,
    },
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Output directory
    #[arg(long, default_value = DEFAULT_OUT_DIR)]
    out_dir: PathBuf,

    /// Write models_manifest.json
    #[arg(long)]
    manifest: bool,

    /// Copy the label encoder and symptom table into the output directory
    #[arg(long)]
    include_aux: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let mut config = ModelsConfig::load(cli.config.as_deref())
        .context("Failed to load models configuration")?;
    if let Some(base_dir) = cli.base_dir {
        config = config.with_base_dir(base_dir);
    }
    info!("Models catalog: {} entries, base dir {}", config.models.len(), config.base_dir.display());

    match cli.command {
        Commands::List => print_catalog(&config),
        Commands::One { model, out } => {
            let out = out.unwrap_or_else(|| {
                Path::new(DEFAULT_OUT_DIR).join(Exporter::file_name(&model))
            });
            let entry = Exporter::new(config).export_one(&model, &out);
            match entry.status {
                ExportStatus::Success => println!("Exported {} -> {}", model, out.display()),
                _ => println!(
                    "{} {}: {}",
                    status_label(entry.status),
                    model,
                    entry.reason.as_deref().unwrap_or("")
                ),
            }
        }
        Commands::Many { models, batch } => {
            let exporter = Exporter::new(config);
            let manifest = exporter.export_many(&models, &batch.out_dir);
            finish_batch(&exporter, &manifest, &batch)?;
        }
        Commands::All { batch } => {
            let exporter = Exporter::new(config);
            let manifest = exporter.export_all(&batch.out_dir);
            finish_batch(&exporter, &manifest, &batch)?;
        }
    }

    Ok(())
}

/// Optional manifest and auxiliary copy, then a summary.
///
/// Per-key failures are reported but never change the exit status.
fn finish_batch(exporter: &Exporter, manifest: &ExportManifest, batch: &BatchArgs) -> Result<()> {
    if batch.manifest {
        manifest
            .write(&batch.out_dir)
            .context("Failed to write export manifest")?;
    }
    if batch.include_aux {
        copy_auxiliary(exporter.config(), &batch.out_dir)
            .context("Failed to copy auxiliary files")?;
    }

    for entry in &manifest.models {
        println!(
            "  {:8} {:16} {}",
            status_label(entry.status),
            entry.key,
            entry
                .file
                .as_deref()
                .or(entry.reason.as_deref())
                .unwrap_or("")
        );
    }
    println!(
        "{}/{} models exported to {}",
        manifest.successful_exports,
        manifest.total_models,
        batch.out_dir.display()
    );

    if manifest.successful_exports < manifest.total_models {
        warn!(
            "{} models were not exported",
            manifest.total_models - manifest.successful_exports
        );
    }

    Ok(())
}

fn print_catalog(config: &ModelsConfig) {
    let entries = list_with_status(config);

    println!("Available models:");
    for entry in entries.iter().filter(|e| e.kind == EntryKind::Model) {
        println!("  {} {:16} -> {}", mark(entry.exists), entry.name, entry.path.display());
    }

    println!("\nAuxiliary files:");
    for entry in entries.iter().filter(|e| e.kind == EntryKind::Auxiliary) {
        println!("  {} {:16} -> {}", mark(entry.exists), entry.name, entry.path.display());
    }
}

fn mark(exists: bool) -> &'static str {
    if exists {
        "✓"
    } else {
        "✗"
    }
}

fn status_label(status: ExportStatus) -> &'static str {
    match status {
        ExportStatus::Success => "success",
        ExportStatus::Skipped => "skipped",
        ExportStatus::Failed => "failed",
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("medpredict=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("medpredict=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
