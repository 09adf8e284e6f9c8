use crate::domain::model::{CellStatus, GridCell};
use crate::domain::ports::MAX_SEARCH_RADIUS_M;
use serde::{Deserialize, Serialize};

pub const METERS_PER_DEGREE_LAT: f64 = 111_000.0;
const OVERLAP_FACTOR: f64 = 1.2;

/// Rectangular search area in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    /// Approximate bounding box of the state of Maryland.
    pub const MARYLAND: Bounds = Bounds {
        north: 39.72284,
        south: 37.9171,
        east: -75.0506,
        west: -79.4870,
    };
}

impl Default for Bounds {
    fn default() -> Self {
        Self::MARYLAND
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub bounds: Bounds,
    pub rows: u32,
    pub cols: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            rows: 10,
            cols: 10,
        }
    }
}

impl GridSpec {
    /// Generates the full row-major cell sequence, all cells pending.
    pub fn cells(&self) -> Vec<GridCell> {
        let cell_height = (self.bounds.north - self.bounds.south) / f64::from(self.rows);
        let cell_width = (self.bounds.east - self.bounds.west) / f64::from(self.cols);

        let mut cells = Vec::with_capacity((self.rows * self.cols) as usize);
        for i in 0..self.rows {
            for j in 0..self.cols {
                let south = self.bounds.south + f64::from(i) * cell_height;
                let north = self.bounds.south + f64::from(i + 1) * cell_height;
                let west = self.bounds.west + f64::from(j) * cell_width;
                let east = self.bounds.west + f64::from(j + 1) * cell_width;
                let center_lat = (south + north) / 2.0;
                let center_lng = (west + east) / 2.0;

                cells.push(GridCell {
                    cell_id: format!("{}_{}", i, j),
                    south_lat: south,
                    north_lat: north,
                    west_lng: west,
                    east_lng: east,
                    center_lat,
                    center_lng,
                    search_radius_m: search_radius_m(center_lat, cell_height, cell_width),
                    done: CellStatus::Pending,
                });
            }
        }
        cells
    }
}

/// Radius of a circle, centered on the cell, that covers its corners with a
/// 20% overlap margin. 1 degree of latitude is roughly 111km; longitude
/// degrees shrink with cos(latitude). Capped at the provider maximum.
pub fn search_radius_m(center_lat: f64, cell_height_deg: f64, cell_width_deg: f64) -> u32 {
    let lat_m = cell_height_deg * METERS_PER_DEGREE_LAT / 2.0;
    let lng_m = cell_width_deg * METERS_PER_DEGREE_LAT * center_lat.to_radians().cos() / 2.0;
    let radius = (lat_m * lat_m + lng_m * lng_m).sqrt() * OVERLAP_FACTOR;
    (radius as u32).min(MAX_SEARCH_RADIUS_M)
}
