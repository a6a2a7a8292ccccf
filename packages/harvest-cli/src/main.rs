// Command-line entry point for the occupation harvester

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use harvester::{
    load_saved_records, HarvestConfig, Harvester, HttpFetcher, JsonCheckpointStore, MergePolicy,
    OCCUPATION_FAMILIES,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "harvest", about = "Scrape occupation data into CSV/JSON datasets")]
struct Args {
    /// Directory for the final dataset and checkpoints
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Previously saved JSON datasets to merge into this run
    #[arg(long)]
    merge_from: Vec<PathBuf>,

    /// Site root to scrape
    #[arg(long)]
    base_url: Option<String>,

    /// Restrict the run to these SOC major group ids (e.g. 15, 29)
    #[arg(long)]
    family: Vec<u16>,

    /// Delay between occupation page fetches, milliseconds
    #[arg(long)]
    item_delay_ms: Option<u64>,

    /// Write a checkpoint every this many occupations (0 disables)
    #[arg(long)]
    checkpoint_interval: Option<usize>,

    /// Which side wins when a title exists in both old and new data
    #[arg(long, value_enum, default_value_t = Precedence::New)]
    precedence: Precedence,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Precedence {
    /// Keep the previously saved record
    Existing,
    /// Keep the freshly scraped record
    New,
}

impl From<Precedence> for MergePolicy {
    fn from(p: Precedence) -> Self {
        match p {
            Precedence::Existing => MergePolicy::PreferExisting,
            Precedence::New => MergePolicy::PreferNew,
        }
    }
}

fn build_config(args: &Args) -> Result<HarvestConfig> {
    let mut config = HarvestConfig::default();

    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url);
    }
    if !args.family.is_empty() {
        let families: Vec<(u16, String)> = OCCUPATION_FAMILIES
            .iter()
            .filter(|(id, _)| args.family.contains(id))
            .map(|(id, name)| (*id, name.to_string()))
            .collect();
        anyhow::ensure!(
            !families.is_empty(),
            "no known occupation families match {:?}",
            args.family
        );
        config = config.with_families(families);
    }
    if let Some(ms) = args.item_delay_ms {
        config.item_delay_ms = ms;
    }
    if let Some(interval) = args.checkpoint_interval {
        config = config.with_checkpoint_interval(interval);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,harvester=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    tracing::info!(
        output_dir = %args.output_dir.display(),
        families = config.families.len(),
        "starting harvest"
    );

    let existing = load_saved_records(&args.merge_from);

    let fetcher = HttpFetcher::new(&config);
    let checkpoints = JsonCheckpointStore::new(args.output_dir.join("checkpoints"));
    let mut harvester = Harvester::new(fetcher, checkpoints, config);

    // First Ctrl-C requests a graceful stop; the run finishes the
    // current occupation and saves partial results.
    let cancel = harvester.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing current item and saving");
            cancel.cancel();
        }
    });

    let outcome = harvester
        .run(existing, &args.output_dir, args.precedence.into())
        .await
        .context("harvest run failed")?;

    tracing::info!(
        scraped = outcome.stats.scraped,
        failed = outcome.stats.failed,
        total_records = outcome.records.len(),
        csv = %outcome.saved.csv_path.display(),
        json = %outcome.saved.json_path.display(),
        "harvest complete"
    );
    if outcome.stats.cancelled {
        tracing::warn!("run was interrupted; dataset contains partial results");
    }

    Ok(())
}
