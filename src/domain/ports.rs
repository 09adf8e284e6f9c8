use crate::domain::model::{Business, GridCell};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Provider contract limits, hard requirements of the search API rather
/// than tunables.
pub const PAGE_SIZE: u32 = 50;
pub const MAX_RESULT_WINDOW: u32 = 1000;
pub const MAX_SEARCH_RADIUS_M: u32 = 40_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    BestMatch,
    Distance,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::BestMatch => "best_match",
            SortOrder::Distance => "distance",
        }
    }
}

#[derive(Debug, Clone)]
pub enum SearchArea {
    Point {
        latitude: f64,
        longitude: f64,
        radius_m: u32,
    },
    Named(String),
}

#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub area: SearchArea,
    pub limit: u32,
    pub offset: u32,
    pub sort: SortOrder,
}

impl SearchQuery {
    /// One page of the exhaustive cell search: centered on the cell,
    /// distance-sorted so pagination sweeps outward from the center.
    pub fn cell_page(cell: &GridCell, offset: u32) -> Self {
        Self {
            area: SearchArea::Point {
                latitude: cell.center_lat,
                longitude: cell.center_lng,
                radius_m: cell.search_radius_m,
            },
            limit: PAGE_SIZE,
            offset,
            sort: SortOrder::Distance,
        }
    }

    /// One page of a named-location search, relevance-sorted.
    pub fn location_page(location: &str, offset: u32) -> Self {
        Self {
            area: SearchArea::Named(location.to_string()),
            limit: PAGE_SIZE,
            offset,
            sort: SortOrder::BestMatch,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub businesses: Vec<Business>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage>;
    async fn details(&self, business_id: &str) -> Result<Business>;
}
