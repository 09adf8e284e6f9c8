use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One business as returned by the provider. Search pages carry an
/// abbreviated form of the same object, so every field except `id` is
/// optional; attributes we do not model explicitly are kept in `extra` so
/// JSON snapshots reproduce the provider payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u64>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub is_closed: Option<bool>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Business {
    pub fn joined_categories(&self) -> String {
        self.categories
            .iter()
            .map(|c| c.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn joined_address(&self) -> String {
        self.location.display_address.join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub address3: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub display_address: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Completion flag of a grid cell, serialized as the strings `no`/`yes` in
/// the grid state file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellStatus {
    #[serde(rename = "no")]
    Pending,
    #[serde(rename = "yes")]
    Done,
}

/// One rectangular search cell. Created once by the grid generator; only
/// `done` ever changes afterwards, and every change is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub cell_id: String,
    pub south_lat: f64,
    pub north_lat: f64,
    pub west_lng: f64,
    pub east_lng: f64,
    pub center_lat: f64,
    pub center_lng: f64,
    pub search_radius_m: u32,
    pub done: CellStatus,
}

impl GridCell {
    pub fn is_done(&self) -> bool {
        self.done == CellStatus::Done
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub cells_total: usize,
    pub cells_skipped: usize,
    pub cells_completed: usize,
    pub cells_failed: usize,
    pub businesses_found: usize,
    pub new_records: usize,
    pub duplicates_skipped: usize,
}
