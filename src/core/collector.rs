use crate::adapters::grid_store::GridStore;
use crate::adapters::ledger::DedupLedger;
use crate::adapters::sink::{self, CsvSink};
use crate::domain::model::{Business, CellStatus, GridCell, RunStats};
use crate::domain::ports::{SearchApi, SearchQuery, MAX_RESULT_WINDOW, PAGE_SIZE};
use crate::utils::error::{HarvestError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

// Fixed pacing between outbound requests. Delays, not retries.
const DETAIL_DELAY: Duration = Duration::from_millis(200);
const PAGE_DELAY: Duration = Duration::from_millis(500);
const CELL_DELAY: Duration = Duration::from_secs(1);
const SNAPSHOT_EVERY_CELLS: usize = 5;

/// Drives the exhaustive grid search: walks pending cells in grid order,
/// paginates each, detail-fetches unseen businesses, and keeps the CSV
/// ledger and grid state file consistent after every cell. Owns the dedup
/// ledger and grid store for the duration of one run.
pub struct GridCollector<'a, A: SearchApi> {
    api: &'a A,
    store: GridStore,
    ledger: DedupLedger,
    sink: CsvSink,
    backup_path: PathBuf,
    progress_path: PathBuf,
    run_records: Vec<Business>,
}

struct CellScan {
    records: Vec<Business>,
    total_found: usize,
    duplicates: usize,
    error: Option<HarvestError>,
}

impl<'a, A: SearchApi> GridCollector<'a, A> {
    pub fn new(
        api: &'a A,
        store: GridStore,
        ledger: DedupLedger,
        sink: CsvSink,
        snapshot_dir: &Path,
    ) -> Self {
        Self {
            api,
            store,
            ledger,
            sink,
            backup_path: snapshot_dir.join(sink::BACKUP_SNAPSHOT),
            progress_path: snapshot_dir.join(sink::RATE_LIMIT_SNAPSHOT),
            run_records: Vec::new(),
        }
    }

    /// Everything collected so far this run, for emergency snapshots.
    pub fn records(&self) -> &[Business] {
        &self.run_records
    }

    pub async fn run(&mut self) -> Result<RunStats> {
        let cell_count = self.store.len();
        let done_count = self.store.cells().iter().filter(|c| c.is_done()).count();
        let mut stats = RunStats {
            cells_total: cell_count,
            ..RunStats::default()
        };
        info!(
            "starting grid search at {}: {} cells, {} already done, {} known restaurants",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            cell_count,
            done_count,
            self.ledger.len()
        );

        let mut attempted = 0usize;
        for idx in 0..cell_count {
            let cell = self.store.cells()[idx].clone();
            if cell.is_done() {
                debug!(
                    "skipping completed cell {}/{}: {}",
                    idx + 1,
                    cell_count,
                    cell.cell_id
                );
                stats.cells_skipped += 1;
                continue;
            }

            attempted += 1;
            info!(
                "processing cell {}/{}: {} (center {:.4},{:.4}, radius {}m)",
                idx + 1,
                cell_count,
                cell.cell_id,
                cell.center_lat,
                cell.center_lng,
                cell.search_radius_m
            );

            let scan = self.scan_cell(&cell).await;
            stats.businesses_found += scan.total_found;
            stats.duplicates_skipped += scan.duplicates;

            // Rows are flushed before the done mark so a crash between the
            // two can never record a completed cell without its records.
            let appended = self.sink.append(&scan.records, &cell.cell_id)?;
            stats.new_records += appended;

            match scan.error {
                None => {
                    self.store.mark(&cell.cell_id, CellStatus::Done)?;
                    stats.cells_completed += 1;
                    info!(
                        "cell {} complete: {} found, {} new, {} duplicates",
                        cell.cell_id, scan.total_found, appended, scan.duplicates
                    );
                }
                Some(err) if err.is_rate_limit() => {
                    error!(
                        "rate limit hit in cell {}; {} partial records flushed, saving progress and stopping",
                        cell.cell_id, appended
                    );
                    self.store.mark(&cell.cell_id, CellStatus::Pending)?;
                    sink::snapshot_json(&self.progress_path, &self.run_records)?;
                    info!(
                        "progress snapshot of {} records written to {}",
                        self.run_records.len(),
                        self.progress_path.display()
                    );
                    return Err(err);
                }
                Some(err) => {
                    warn!(
                        "cell {} left pending after search error: {}",
                        cell.cell_id, err
                    );
                    stats.cells_failed += 1;
                }
            }

            if attempted % SNAPSHOT_EVERY_CELLS == 0 {
                sink::snapshot_json(&self.backup_path, &self.run_records)?;
                debug!(
                    "periodic backup of {} records written to {}",
                    self.run_records.len(),
                    self.backup_path.display()
                );
            }

            sleep(CELL_DELAY).await;
        }

        sink::snapshot_json(&self.backup_path, &self.run_records)?;
        info!(
            "grid search finished: {} cells done, {} skipped, {} failed; {} found, {} new, {} duplicates",
            stats.cells_completed,
            stats.cells_skipped,
            stats.cells_failed,
            stats.businesses_found,
            stats.new_records,
            stats.duplicates_skipped
        );
        Ok(stats)
    }

    /// Paginates one cell. Never fails outright: partial results plus the
    /// terminating error (if any) come back together so the caller can
    /// flush before deciding what the error means for the run.
    async fn scan_cell(&mut self, cell: &GridCell) -> CellScan {
        let mut scan = CellScan {
            records: Vec::new(),
            total_found: 0,
            duplicates: 0,
            error: None,
        };

        let mut offset = 0u32;
        loop {
            let query = SearchQuery::cell_page(cell, offset);
            let page = match self.api.search(&query).await {
                Ok(page) => page,
                Err(err) => {
                    scan.error = Some(err);
                    break;
                }
            };
            if page.businesses.is_empty() {
                break;
            }

            let page_len = page.businesses.len();
            scan.total_found += page_len;
            debug!(
                "cell {}: {} results at offset {}",
                cell.cell_id, page_len, offset
            );

            for summary in &page.businesses {
                if self.ledger.contains(&summary.id) {
                    scan.duplicates += 1;
                    debug!("already collected {} ({})", summary.name, summary.id);
                    continue;
                }
                match self.api.details(&summary.id).await {
                    Ok(detail) => {
                        if self.ledger.add(&detail.id) {
                            scan.records.push(detail.clone());
                            self.run_records.push(detail);
                        }
                    }
                    Err(err) => {
                        // Skip this business only; the cell keeps going.
                        warn!(
                            "failed to fetch details for {} ({}) in cell {}: {}",
                            summary.name, summary.id, cell.cell_id, err
                        );
                    }
                }
                sleep(DETAIL_DELAY).await;
            }

            if page_len < PAGE_SIZE as usize || offset + PAGE_SIZE >= MAX_RESULT_WINDOW {
                break;
            }
            offset += PAGE_SIZE;
            sleep(PAGE_DELAY).await;
        }
        scan
    }
}
