use crate::core::grid::{Bounds, GridSpec};
use crate::core::locations::MARYLAND_LOCATIONS;
use crate::utils::error::{HarvestError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const API_KEY_ENV: &str = "YELP_API_KEY";

/// Run configuration: bounding box, grid dimensions, output file names and
/// the locations list. All fixed at startup; every field has a Maryland
/// default so the tool works with no config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    pub bounds: Bounds,
    pub grid: GridDims,
    pub files: FileNames,
    pub locations: Vec<String>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridDims {
    pub rows: u32,
    pub cols: u32,
}

impl Default for GridDims {
    fn default() -> Self {
        Self { rows: 10, cols: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNames {
    pub grid_state: String,
    pub restaurants: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            grid_state: "grid_cells.csv".to_string(),
            restaurants: "restaurants.csv".to_string(),
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            grid: GridDims::default(),
            files: FileNames::default(),
            locations: MARYLAND_LOCATIONS.iter().map(|s| s.to_string()).collect(),
            api_base_url: None,
        }
    }
}

impl HarvestConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| HarvestError::Config {
            message: format!("invalid config file {}: {}", path.display(), e),
        })
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn grid_spec(&self) -> GridSpec {
        GridSpec {
            bounds: self.bounds,
            rows: self.grid.rows,
            cols: self.grid.cols,
        }
    }

    /// The provider API key comes from the environment only; it never lives
    /// in the config file.
    pub fn api_key() -> Result<String> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(HarvestError::MissingConfig {
                field: API_KEY_ENV.to_string(),
            }),
        }
    }
}

impl Validate for HarvestConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("grid.rows", self.grid.rows as usize, 1)?;
        validate_positive_number("grid.cols", self.grid.cols as usize, 1)?;
        validate_range("bounds.north", self.bounds.north, -90.0, 90.0)?;
        validate_range("bounds.south", self.bounds.south, -90.0, 90.0)?;
        validate_range("bounds.east", self.bounds.east, -180.0, 180.0)?;
        validate_range("bounds.west", self.bounds.west, -180.0, 180.0)?;

        if self.bounds.north <= self.bounds.south {
            return Err(HarvestError::InvalidConfigValue {
                field: "bounds".to_string(),
                value: format!("north={}, south={}", self.bounds.north, self.bounds.south),
                reason: "north must be greater than south".to_string(),
            });
        }
        if self.bounds.east <= self.bounds.west {
            return Err(HarvestError::InvalidConfigValue {
                field: "bounds".to_string(),
                value: format!("east={}, west={}", self.bounds.east, self.bounds.west),
                reason: "east must be greater than west".to_string(),
            });
        }

        validate_non_empty_string("files.grid_state", &self.files.grid_state)?;
        validate_non_empty_string("files.restaurants", &self.files.restaurants)?;

        if self.locations.is_empty() {
            return Err(HarvestError::InvalidConfigValue {
                field: "locations".to_string(),
                value: "[]".to_string(),
                reason: "at least one location is required".to_string(),
            });
        }
        for location in &self.locations {
            validate_non_empty_string("locations", location)?;
        }

        if let Some(url) = &self.api_base_url {
            validate_url("api_base_url", url)?;
        }
        Ok(())
    }
}
