//! Configuration types for grids, tile generation and pathfinding

use serde::{Deserialize, Serialize};

/// Default hex radius in world units
pub const DEFAULT_CELL_SIZE: f64 = 10.0;

/// Default radius (in cells) of a generated board
pub const DEFAULT_GRID_SIZE: i32 = 5;

/// Grid construction parameters
#[derive(Clone, Debug, PartialEq)]
pub struct GridConfig {
    /// World-unit radius of a single hex
    pub cell_size: f64,
    /// Board radius recorded on a new grid (`HexGrid::size`) until the
    /// next `generate` call
    pub size: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            size: DEFAULT_GRID_SIZE,
        }
    }
}

impl GridConfig {
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_size(mut self, size: i32) -> Self {
        self.size = size;
        self
    }
}

/// Extrusion parameters for tile prisms
///
/// `amount` is overwritten per height when geometry is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtrudeSettings {
    pub amount: f64,
    pub bevel_enabled: bool,
    pub bevel_segments: u32,
    pub steps: u32,
    pub bevel_size: f64,
    pub bevel_thickness: f64,
}

impl Default for ExtrudeSettings {
    fn default() -> Self {
        Self {
            amount: 1.0,
            bevel_enabled: true,
            bevel_segments: 1,
            steps: 1,
            bevel_size: 0.5,
            bevel_thickness: 0.5,
        }
    }
}

/// Settings for `HexGrid::generate_tiles`
#[derive(Clone, Debug, PartialEq)]
pub struct TileGenConfig {
    /// Uniform scale applied to every generated tile
    pub tile_scale: f64,
    /// Replaces the grid's cell size (and derived widths) when set
    pub cell_size: Option<f64>,
    /// Opaque material name handed to the renderer
    pub material: Option<String>,
    pub extrude_settings: ExtrudeSettings,
}

impl Default for TileGenConfig {
    fn default() -> Self {
        Self {
            tile_scale: 0.95,
            cell_size: None,
            material: None,
            extrude_settings: ExtrudeSettings::default(),
        }
    }
}

impl TileGenConfig {
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = Some(cell_size);
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn with_tile_scale(mut self, tile_scale: f64) -> Self {
        self.tile_scale = tile_scale;
        self
    }
}

/// A* search configuration
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FinderConfig {
    /// Also step to the six diagonal cells
    pub allow_diagonal: bool,
    /// Give up after expanding this many cells (None = unbounded)
    pub max_iterations: Option<usize>,
}

impl FinderConfig {
    pub fn with_diagonals(mut self) -> Self {
        self.allow_diagonal = true;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}
