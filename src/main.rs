use anyhow::{Context, Result};
use bts_ingest::{
    config::{self, DEFAULT_ENDPOINT, DEFAULT_KEY_PREFIX},
    fetch::HttpSource,
    publish::GcsStore,
    IngestConfig, Ingestor,
};
use clap::Parser;
use reqwest::Client;
use std::{env, path::PathBuf};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

/// Ingest BTS on-time performance data into Google Cloud Storage.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Cloud bucket to ingest data into
    #[arg(long, env = "INGEST_BUCKET")]
    bucket: String,

    /// First year to upload data for, e.g. 2015
    #[arg(long, env = "INGEST_START_YEAR")]
    start_year: i32,

    /// Last year to upload data for, e.g. 2018
    #[arg(long, env = "INGEST_END_YEAR")]
    end_year: i32,

    /// Directory that holds the per-month scratch workspaces
    #[arg(long, env = "INGEST_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Download form URL
    #[arg(long, env = "BTS_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: Url,

    /// Object key prefix for cleaned files
    #[arg(long, env = "INGEST_KEY_PREFIX", default_value = DEFAULT_KEY_PREFIX)]
    key_prefix: String,

    /// Leave the raw extracted CSV in the workspace after cleaning
    #[arg(long, env = "INGEST_KEEP_ORIGINAL")]
    keep_original: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .with_target(false)
        .init();

    // ─── 2) resolve configuration ────────────────────────────────────
    let args = Args::parse();
    let years = config::year_range(args.start_year, args.end_year)?;

    let mut cfg = IngestConfig::new(&args.bucket)
        .with_key_prefix(&args.key_prefix)
        .with_remove_original(!args.keep_original);
    if let Some(dir) = &args.work_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating work dir {}", dir.display()))?;
        cfg = cfg.with_work_root(dir);
    }
    cfg.validate()?;
    info!(
        bucket = %cfg.bucket,
        start_year = args.start_year,
        end_year = args.end_year,
        work_root = %cfg.work_root.display(),
        key_prefix = %cfg.key_prefix,
        remove_original = cfg.remove_original,
        endpoint = %args.endpoint,
        "configuration"
    );

    // ─── 3) wire source and store ────────────────────────────────────
    let source = HttpSource::new(Client::new(), args.endpoint);
    let store = GcsStore::connect()
        .await
        .context("authenticating to GCS")?;

    // ─── 4) run the batch ────────────────────────────────────────────
    info!("starting batch ingestion...");
    let ingestor = Ingestor::new(source, store, cfg);
    match ingestor.run(years).await {
        Ok(locations) => {
            info!("data ingested in {} locations", locations.len());
            println!("{}", serde_json::to_string_pretty(&locations)?);
            Ok(())
        }
        Err(e) => {
            error!("ingest failed: {}", e);
            Err(e.into())
        }
    }
}
