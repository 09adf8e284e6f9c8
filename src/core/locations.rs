use crate::adapters::ledger::DedupLedger;
use crate::adapters::sink::{self, CsvSink};
use crate::domain::model::{Business, RunStats};
use crate::domain::ports::{SearchApi, SearchQuery, MAX_RESULT_WINDOW, PAGE_SIZE};
use crate::utils::error::{HarvestError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const DETAIL_DELAY: Duration = Duration::from_millis(100);
const PAGE_DELAY: Duration = Duration::from_millis(500);
const LOCATION_DELAY: Duration = Duration::from_secs(2);

/// Default city list for a statewide Maryland sweep.
pub const MARYLAND_LOCATIONS: [&str; 20] = [
    "Baltimore, MD",
    "Annapolis, MD",
    "Frederick, MD",
    "Gaithersburg, MD",
    "Rockville, MD",
    "Bowie, MD",
    "Hagerstown, MD",
    "College Park, MD",
    "Salisbury, MD",
    "Cumberland, MD",
    "Takoma Park, MD",
    "Greenbelt, MD",
    "Laurel, MD",
    "Ocean City, MD",
    "Bethesda, MD",
    "Silver Spring, MD",
    "Columbia, MD",
    "Germantown, MD",
    "Waldorf, MD",
    "Glen Burnie, MD",
];

#[derive(Debug, Default)]
struct LocationOutcome {
    found: usize,
    duplicates: usize,
    records: Vec<Business>,
    rate_limited: Option<HarvestError>,
}

/// City-list collector: best-match pagination per location, shared dedup
/// ledger and CSV sink with the grid collector. Not resumable; a location
/// whose search fails is simply logged and skipped.
pub struct LocationCollector<'a, A: SearchApi> {
    api: &'a A,
    ledger: DedupLedger,
    sink: CsvSink,
    backup_path: PathBuf,
    run_records: Vec<Business>,
}

impl<'a, A: SearchApi> LocationCollector<'a, A> {
    pub fn new(api: &'a A, ledger: DedupLedger, sink: CsvSink, snapshot_dir: &Path) -> Self {
        Self {
            api,
            ledger,
            sink,
            backup_path: snapshot_dir.join(sink::BACKUP_SNAPSHOT),
            run_records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[Business] {
        &self.run_records
    }

    pub async fn run(&mut self, locations: &[String]) -> Result<RunStats> {
        let mut stats = RunStats::default();
        info!(
            "starting collection at {} across {} locations, {} known restaurants",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            locations.len(),
            self.ledger.len()
        );

        for (idx, location) in locations.iter().enumerate() {
            info!(
                "processing location {}/{}: {}",
                idx + 1,
                locations.len(),
                location
            );

            let outcome = self.collect_location(location).await;
            stats.businesses_found += outcome.found;
            stats.duplicates_skipped += outcome.duplicates;

            let appended = self.sink.append(&outcome.records, location)?;
            stats.new_records += appended;
            info!(
                "{}: {} found, {} duplicates, {} unique added (running total {})",
                location,
                outcome.found,
                outcome.duplicates,
                appended,
                self.ledger.len()
            );

            if let Some(err) = outcome.rate_limited {
                sink::snapshot_json(&self.backup_path, &self.run_records)?;
                return Err(err);
            }

            if idx + 1 < locations.len() {
                sleep(LOCATION_DELAY).await;
            }
        }

        sink::snapshot_json(&self.backup_path, &self.run_records)?;
        info!(
            "collection complete: {} found, {} new, {} duplicates across {} locations",
            stats.businesses_found,
            stats.new_records,
            stats.duplicates_skipped,
            locations.len()
        );
        Ok(stats)
    }

    async fn collect_location(&mut self, location: &str) -> LocationOutcome {
        let mut outcome = LocationOutcome::default();

        let mut offset = 0u32;
        loop {
            let query = SearchQuery::location_page(location, offset);
            let page = match self.api.search(&query).await {
                Ok(page) => page,
                Err(err) if err.is_rate_limit() => {
                    warn!("rate limit hit while searching {}; stopping run", location);
                    outcome.rate_limited = Some(err);
                    break;
                }
                Err(err) => {
                    warn!(
                        "search failed for {} at offset {}: {}; moving on",
                        location, offset, err
                    );
                    break;
                }
            };
            if page.businesses.is_empty() {
                break;
            }

            let page_len = page.businesses.len();
            debug!("{}: {} results at offset {}", location, page_len, offset);

            for summary in &page.businesses {
                outcome.found += 1;
                if self.ledger.contains(&summary.id) {
                    outcome.duplicates += 1;
                    continue;
                }
                // Detail failures fall back to the search summary so the
                // business is still captured.
                let record = match self.api.details(&summary.id).await {
                    Ok(detail) => detail,
                    Err(err) => {
                        warn!(
                            "failed to get details for {} ({}): {}; using basic info",
                            summary.name, summary.id, err
                        );
                        summary.clone()
                    }
                };
                if self.ledger.add(&record.id) {
                    outcome.records.push(record.clone());
                    self.run_records.push(record);
                }
                sleep(DETAIL_DELAY).await;
            }

            if page_len < PAGE_SIZE as usize || offset + PAGE_SIZE >= MAX_RESULT_WINDOW {
                break;
            }
            offset += PAGE_SIZE;
            sleep(PAGE_DELAY).await;
        }
        outcome
    }
}
