use crate::domain::model::Business;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Periodic crash-recovery backup, rewritten every few cells and at the end
/// of a clean run.
pub const BACKUP_SNAPSHOT: &str = "restaurants_backup.json";
/// Written once when a rate limit aborts the run, so the operator can see
/// exactly what the interrupted run had collected.
pub const RATE_LIMIT_SNAPSHOT: &str = "restaurants_rate_limit_progress.json";
/// Written by main when a run dies on an unexpected error.
pub const EMERGENCY_SNAPSHOT: &str = "restaurants_emergency.json";

/// Flattened CSV row schema of the restaurant ledger. `cell_id` carries the
/// grid cell id, or the location string in locations mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub cell_id: String,
    pub id: String,
    pub name: String,
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
    pub price: String,
    pub categories: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: String,
    pub url: String,
}

impl LedgerRow {
    pub fn flatten(business: &Business, tag: &str) -> Self {
        let coordinates = business.coordinates.unwrap_or_default();
        Self {
            cell_id: tag.to_string(),
            id: business.id.clone(),
            name: business.name.clone(),
            rating: business.rating,
            review_count: business.review_count,
            price: business.price.clone().unwrap_or_default(),
            categories: business.joined_categories(),
            address: business.joined_address(),
            city: business.location.city.clone().unwrap_or_default(),
            state: business.location.state.clone().unwrap_or_default(),
            zip_code: business.location.zip_code.clone().unwrap_or_default(),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            phone: business.phone.clone().unwrap_or_default(),
            url: business.url.clone().unwrap_or_default(),
        }
    }
}

/// Append-only CSV ledger of collected restaurants. Callers are expected to
/// pass batches already filtered through the dedup ledger; the sink itself
/// only flattens and appends.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the batch, writing the header only when the file is new.
    /// Returns the number of rows written.
    pub fn append(&self, records: &[Business], tag: &str) -> Result<usize> {
        if records.is_empty() {
            debug!("no new restaurants to append for {}", tag);
            return Ok(0);
        }

        let file_exists = self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(!file_exists)
            .from_writer(file);

        for business in records {
            writer.serialize(LedgerRow::flatten(business, tag))?;
        }
        writer.flush()?;
        Ok(records.len())
    }
}

/// Overwrites `path` with a full JSON array of the given records.
pub fn snapshot_json(path: &Path, records: &[Business]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Category, Coordinates, Location};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn business(id: &str, name: &str) -> Business {
        Business {
            id: id.to_string(),
            name: name.to_string(),
            alias: None,
            rating: Some(4.5),
            review_count: Some(120),
            price: Some("$$".to_string()),
            categories: vec![
                Category {
                    alias: "seafood".to_string(),
                    title: "Seafood".to_string(),
                },
                Category {
                    alias: "bars".to_string(),
                    title: "Bars".to_string(),
                },
            ],
            location: Location {
                city: Some("Annapolis".to_string()),
                state: Some("MD".to_string()),
                zip_code: Some("21401".to_string()),
                display_address: vec!["1 Dock St".to_string(), "Annapolis, MD 21401".to_string()],
                ..Location::default()
            },
            coordinates: Some(Coordinates {
                latitude: Some(38.97),
                longitude: Some(-76.49),
            }),
            phone: Some("+14105550199".to_string()),
            url: Some("https://example.com/crab-house".to_string()),
            is_closed: Some(false),
            extra: HashMap::new(),
        }
    }

    #[test]
    fn flatten_joins_categories_and_address() {
        let row = LedgerRow::flatten(&business("b1", "Crab House"), "3_4");
        assert_eq!(row.cell_id, "3_4");
        assert_eq!(row.categories, "Seafood, Bars");
        assert_eq!(row.address, "1 Dock St, Annapolis, MD 21401");
        assert_eq!(row.city, "Annapolis");
        assert_eq!(row.latitude, Some(38.97));
    }

    #[test]
    fn header_is_written_exactly_once_across_appends() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path().join("restaurants.csv"));

        sink.append(&[business("b1", "Crab House")], "0_0").unwrap();
        sink.append(&[business("b2", "Pit Beef")], "0_1").unwrap();

        let text = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("cell_id,id,name,rating,review_count,price,"));
        assert_eq!(
            text.matches("cell_id,id,name").count(),
            1,
            "header repeated: {}",
            text
        );
        assert!(lines[1].contains("b1"));
        assert!(lines[2].contains("b2"));
    }

    #[test]
    fn empty_batch_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path().join("restaurants.csv"));
        assert_eq!(sink.append(&[], "0_0").unwrap(), 0);
        assert!(!sink.path().exists());
    }

    #[test]
    fn rows_round_trip_through_csv() {
        let dir = TempDir::new().unwrap();
        let sink = CsvSink::new(dir.path().join("restaurants.csv"));
        sink.append(&[business("b1", "Crab House")], "0_0").unwrap();

        let mut reader = csv::Reader::from_path(sink.path()).unwrap();
        let rows: Vec<LedgerRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], LedgerRow::flatten(&business("b1", "Crab House"), "0_0"));
    }

    #[test]
    fn snapshot_overwrites_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(BACKUP_SNAPSHOT);

        snapshot_json(&path, &[business("b1", "Crab House"), business("b2", "Pit Beef")])
            .unwrap();
        snapshot_json(&path, &[business("b3", "Diner")]).unwrap();

        let parsed: Vec<Business> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "b3");
    }
}
