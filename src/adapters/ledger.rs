use crate::utils::error::{HarvestError, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// The single authoritative set of business ids this ledger has ever
/// accepted: seeded from the persisted CSV at startup, extended as new
/// businesses are collected, never shrunk. Every dedup decision in the
/// crate goes through this set.
pub struct DedupLedger {
    seen: HashSet<String>,
}

impl DedupLedger {
    /// Seeds the set from the `id` column of an existing restaurant CSV.
    /// A missing or unreadable file yields an empty ledger; the run then
    /// starts from scratch rather than failing.
    pub fn load_existing(csv_path: &Path) -> Self {
        match Self::read_ids(csv_path) {
            Ok(seen) => {
                info!(
                    "loaded {} existing restaurant ids from {}",
                    seen.len(),
                    csv_path.display()
                );
                Self { seen }
            }
            Err(err) => {
                if csv_path.exists() {
                    warn!(
                        "could not read existing restaurants from {} ({}); starting with an empty ledger",
                        csv_path.display(),
                        err
                    );
                } else {
                    info!("no existing restaurants file at {}", csv_path.display());
                }
                Self {
                    seen: HashSet::new(),
                }
            }
        }
    }

    pub fn empty() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    fn read_ids(path: &Path) -> Result<HashSet<String>> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let id_idx = headers
            .iter()
            .position(|h| h == "id")
            .ok_or_else(|| HarvestError::Config {
                message: format!("no 'id' column in {}", path.display()),
            })?;

        let mut seen = HashSet::new();
        for row in reader.records() {
            let row = row?;
            if let Some(id) = row.get(id_idx) {
                if !id.is_empty() {
                    seen.insert(id.to_string());
                }
            }
        }
        Ok(seen)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Returns true when the id was not seen before.
    pub fn add(&mut self, id: &str) -> bool {
        self.seen.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
