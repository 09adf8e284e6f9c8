use anyhow::Context;
use clap::Parser;
use std::path::Path;
use yelp_harvest::adapters::grid_store::GridStore;
use yelp_harvest::adapters::ledger::DedupLedger;
use yelp_harvest::adapters::sink::{self, CsvSink};
use yelp_harvest::config::file::HarvestConfig;
use yelp_harvest::core::summary;
use yelp_harvest::domain::model::{Business, RunStats};
use yelp_harvest::utils::{logger, validation::Validate};
use yelp_harvest::{Cli, Command, GridCollector, HarvestError, LocationCollector, YelpClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let config = HarvestConfig::load(cli.config.as_deref())?;
    if let Err(e) = config.validate() {
        tracing::error!("configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating output directory {}", cli.output_dir.display()))?;
    let grid_path = cli.output_dir.join(&config.files.grid_state);
    let ledger_path = cli.output_dir.join(&config.files.restaurants);

    match cli.command {
        Command::InitGrid { force, rows, cols } => {
            if grid_path.exists() && !force {
                eprintln!(
                    "❌ {} already exists; re-run with --force to overwrite (resume progress will be lost)",
                    grid_path.display()
                );
                std::process::exit(1);
            }
            let mut spec = config.grid_spec();
            if let Some(rows) = rows {
                spec.rows = rows;
            }
            if let Some(cols) = cols {
                spec.cols = cols;
            }
            if spec.rows == 0 || spec.cols == 0 {
                eprintln!("❌ grid dimensions must be at least 1x1");
                std::process::exit(1);
            }
            let store = GridStore::generate(&grid_path, &spec)?;
            println!("✅ Wrote {} grid cells to {}", store.len(), grid_path.display());
        }
        Command::Summary => {
            let rows = summary::read_rows(&ledger_path)
                .with_context(|| format!("reading ledger {}", ledger_path.display()))?;
            summary::print_report(&summary::summarize(&rows));
        }
        Command::Grid => {
            let client = build_client(&config)?;
            let store = GridStore::load_or_generate(&grid_path, &config.grid_spec())?;
            let ledger = DedupLedger::load_existing(&ledger_path);
            let csv_sink = CsvSink::new(&ledger_path);
            let mut collector =
                GridCollector::new(&client, store, ledger, csv_sink, &cli.output_dir);

            match collector.run().await {
                Ok(stats) => report_success(&stats, &ledger_path),
                Err(err) => exit_with_failure(err, collector.records(), &cli.output_dir),
            }
        }
        Command::Locations => {
            let client = build_client(&config)?;
            let ledger = DedupLedger::load_existing(&ledger_path);
            let csv_sink = CsvSink::new(&ledger_path);
            let mut collector = LocationCollector::new(&client, ledger, csv_sink, &cli.output_dir);

            match collector.run(&config.locations).await {
                Ok(stats) => report_success(&stats, &ledger_path),
                Err(err) => exit_with_failure(err, collector.records(), &cli.output_dir),
            }
        }
    }

    Ok(())
}

fn build_client(config: &HarvestConfig) -> anyhow::Result<YelpClient> {
    let api_key = HarvestConfig::api_key()?;
    let mut client = YelpClient::new(api_key);
    if let Some(base_url) = &config.api_base_url {
        client = client.with_base_url(base_url.as_str());
    }
    Ok(client)
}

fn report_success(stats: &RunStats, ledger_path: &Path) {
    println!(
        "✅ Collection complete: {} new restaurants ({} found, {} duplicates skipped)",
        stats.new_records, stats.businesses_found, stats.duplicates_skipped
    );
    println!("📁 Ledger: {}", ledger_path.display());
}

fn exit_with_failure(err: HarvestError, records: &[Business], output_dir: &Path) -> ! {
    if err.is_rate_limit() {
        tracing::error!("run aborted by provider rate limit: {}", err);
        eprintln!("❌ Rate limit hit; progress has been saved. Re-run later to resume.");
        std::process::exit(2);
    }

    tracing::error!("run failed: {}", err);
    if !records.is_empty() {
        let emergency_path = output_dir.join(sink::EMERGENCY_SNAPSHOT);
        match sink::snapshot_json(&emergency_path, records) {
            Ok(()) => tracing::info!(
                "emergency snapshot of {} records written to {}",
                records.len(),
                emergency_path.display()
            ),
            Err(snapshot_err) => {
                tracing::error!("emergency snapshot failed: {}", snapshot_err)
            }
        }
    }
    eprintln!("❌ {}", err);
    std::process::exit(1);
}
