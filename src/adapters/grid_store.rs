use crate::core::grid::GridSpec;
use crate::domain::model::{CellStatus, GridCell};
use crate::utils::error::{HarvestError, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// CSV-backed store of grid cells and their completion flags. The file is
/// read once at startup and rewritten in full after every flag change, so
/// on-disk state always reflects the last persisted mutation.
pub struct GridStore {
    path: PathBuf,
    cells: Vec<GridCell>,
}

impl GridStore {
    /// Loads the persisted grid, or generates a fresh one when the file is
    /// missing or unreadable. Regeneration loses any resume progress, which
    /// is why the unreadable case is only a warning and not an error.
    pub fn load_or_generate(path: impl Into<PathBuf>, spec: &GridSpec) -> Result<Self> {
        let path = path.into();
        match Self::read_cells(&path) {
            Ok(cells) => {
                let done = cells.iter().filter(|c| c.is_done()).count();
                info!(
                    "loaded grid state from {}: {} cells, {} completed",
                    path.display(),
                    cells.len(),
                    done
                );
                Ok(Self { path, cells })
            }
            Err(err) => {
                if path.exists() {
                    warn!(
                        "grid state file {} unreadable ({}); regenerating, prior progress is lost",
                        path.display(),
                        err
                    );
                } else {
                    info!(
                        "no grid state file at {}; generating a fresh {}x{} grid",
                        path.display(),
                        spec.rows,
                        spec.cols
                    );
                }
                Self::generate(path, spec)
            }
        }
    }

    /// Generates and persists a fresh grid, overwriting any existing file.
    pub fn generate(path: impl Into<PathBuf>, spec: &GridSpec) -> Result<Self> {
        let store = Self {
            path: path.into(),
            cells: spec.cells(),
        };
        store.save()?;
        info!(
            "wrote {} grid cells to {}",
            store.cells.len(),
            store.path.display()
        );
        Ok(store)
    }

    fn read_cells(path: &Path) -> Result<Vec<GridCell>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut cells = Vec::new();
        for row in reader.deserialize() {
            cells.push(row?);
        }
        if cells.is_empty() {
            return Err(HarvestError::Config {
                message: format!("grid state file {} contains no cells", path.display()),
            });
        }
        Ok(cells)
    }

    fn save(&self) -> Result<()> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        for cell in &self.cells {
            writer.serialize(cell)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Updates one cell's flag and persists the whole store.
    pub fn mark(&mut self, cell_id: &str, status: CellStatus) -> Result<()> {
        match self.cells.iter_mut().find(|c| c.cell_id == cell_id) {
            Some(cell) => cell.done = status,
            None => {
                return Err(HarvestError::Config {
                    message: format!("unknown grid cell {}", cell_id),
                })
            }
        }
        self.save()
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
