use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;
use vofp::{BackendConfig, OriginalityPipeline, VofpConfig};

#[derive(Parser, Debug)]
#[command(name = "vofp", version, about = "Index videos and check new ones for originality")]
struct Cli {
    /// Pipeline configuration (YAML)
    #[arg(short, long, value_name = "FILE", env = "VOFP_CONFIG")]
    config: Option<PathBuf>,

    /// Corpus database file, overriding the configuration
    #[arg(long, value_name = "FILE", env = "VOFP_DB")]
    db: Option<PathBuf>,

    /// Log filter, e.g. `info` or `vofp=debug`
    #[arg(long, default_value = "info", env = "VOFP_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download and fingerprint videos into the corpus
    Index {
        /// Video URLs
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Decide whether a video is original
    Analyze {
        /// Video URL
        url: String,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = match &cli.config {
        Some(path) => VofpConfig::from_file(path)?,
        None => VofpConfig::default(),
    };
    let backend = match &cli.db {
        Some(path) => BackendConfig::redb(path.to_string_lossy()),
        None => config.index.backend_config(),
    };
    let pipeline = OriginalityPipeline::from_config_with_backend(&config, &backend)?;

    match cli.command {
        Commands::Index { urls } => {
            let mut failed = 0usize;
            for url in &urls {
                match pipeline.index(url).await {
                    Ok(identity) => println!("indexed {} {}", identity.id, url),
                    Err(e) => {
                        failed += 1;
                        error!(url = %url, error = %e, "indexing failed");
                    }
                }
            }
            println!("{} indexed, {} failed", urls.len() - failed, failed);
            Ok(if failed == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Analyze { url, json } => {
            let report = pipeline.analyze(&url).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "original={} stage={:?} originality={:.3}",
                    report.original, report.stage, report.originality
                );
                if let Some(best) = &report.best_match {
                    println!(
                        "best match: {} ({}) similarity={:.4}",
                        best.video_id, best.url, best.similarity
                    );
                }
                if let Some(overlap) = report.overlap {
                    println!("frame overlap: {overlap:.3}");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
