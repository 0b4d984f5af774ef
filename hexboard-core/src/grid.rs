//! Cube-coordinate hex grid
//!
//! Owns every live cell, keyed by its coordinates, and provides:
//! - world <-> cube transforms (`cell_to_pixel`, `pixel_to_cell`)
//! - neighbor and diagonal queries
//! - procedural generation and tile construction
//! - JSON persistence

use std::collections::hash_map::Entry;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use glam::DVec3;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellKey, CellMut, PathState, DIAGONALS, DIRECTIONS};
use crate::config::{ExtrudeSettings, GridConfig, TileGenConfig};
use crate::error::GridError;
use crate::tile::{hex_outline, Tile, TileConfig, TileGeometry};

// ============================================================================
// CONSTANTS
// ============================================================================

const SQRT3: f64 = 1.732_050_807_568_877_2;
const TWO_THIRDS: f64 = 2.0 / 3.0;

// ============================================================================
// TYPES
// ============================================================================

/// Which offset set produced a neighbor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeighborKind {
    Orthogonal,
    Diagonal,
}

/// One cell in the persisted grid format
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRecord {
    pub q: i32,
    pub r: i32,
    pub s: i32,
    pub h: i32,
    pub walkable: bool,
    pub user_data: serde_json::Value,
}

impl From<&Cell> for CellRecord {
    fn from(cell: &Cell) -> Self {
        Self {
            q: cell.q,
            r: cell.r,
            s: cell.s,
            h: cell.h,
            walkable: cell.walkable,
            user_data: cell.user_data.clone(),
        }
    }
}

/// Persisted grid document. Every field is required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridJson {
    pub size: i32,
    pub cell_size: f64,
    #[serde(deserialize_with = "Option::deserialize")]
    pub extrude_settings: Option<ExtrudeSettings>,
    pub autogenerated: bool,
    pub cells: Vec<CellRecord>,
}

/// Snap fractional cube coordinates to the nearest hex.
///
/// Each axis is rounded half-up; the axis with the largest rounding error is
/// then rebuilt from the other two so that `q + r + s == 0` holds exactly.
pub fn cube_round(q: f64, r: f64, s: f64) -> CellKey {
    let mut rq = round_half_up(q);
    let mut rr = round_half_up(r);
    let mut rs = round_half_up(s);

    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();

    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr >= ds {
        rr = -rq - rs;
    } else {
        rs = -rq - rr;
    }

    CellKey::new(rq as i32, rr as i32, rs as i32)
}

#[inline]
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Every coordinate within `radius` of the origin, in generation order
pub fn hexagon(radius: i32) -> impl Iterator<Item = CellKey> {
    (-radius..=radius).flat_map(move |x| {
        (-radius..=radius).filter_map(move |y| {
            let z = -x - y;
            (z.abs() <= radius).then(|| CellKey::new(x, y, z))
        })
    })
}

// ============================================================================
// HEX GRID
// ============================================================================

#[derive(Clone, Debug)]
pub struct HexGrid {
    /// Radius of the last generated board
    pub size: i32,
    pub extrude_settings: Option<ExtrudeSettings>,
    /// Set once tiles have been generated for this grid
    pub autogenerated: bool,

    cell_size: f64,
    cell_width: f64,
    cell_length: f64,

    cells: FxHashMap<CellKey, Cell>,

    /// Base hexagon, fixed at construction
    outline: [DVec3; 6],
    /// Extruded geometry per height; never invalidated
    geo_cache: FxHashMap<i32, Arc<TileGeometry>>,
}

impl HexGrid {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    pub fn new(config: GridConfig) -> Self {
        let mut grid = Self {
            size: config.size,
            extrude_settings: None,
            autogenerated: false,
            cell_size: config.cell_size,
            cell_width: 0.0,
            cell_length: 0.0,
            cells: FxHashMap::default(),
            outline: hex_outline(config.cell_size),
            geo_cache: FxHashMap::default(),
        };
        grid.set_cell_size(config.cell_size);
        grid
    }

    /// Load a grid from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read grid file {}", path.display()))?;

        let mut grid = HexGrid::default();
        grid.from_json_str(&content)
            .with_context(|| format!("Failed to load grid from {}", path.display()))?;
        Ok(grid)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(&self.to_json())?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write grid file {}", path.display()))?;
        Ok(())
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn cell_length(&self) -> f64 {
        self.cell_length
    }

    /// Change the transform scale; width and length follow
    pub fn set_cell_size(&mut self, cell_size: f64) {
        self.cell_size = cell_size;
        self.cell_width = cell_size * 2.0;
        self.cell_length = (SQRT3 * 0.5) * self.cell_width;
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, key: CellKey) -> bool {
        self.cells.contains_key(&key)
    }

    pub fn get(&self, key: CellKey) -> Option<&Cell> {
        self.cells.get(&key)
    }

    /// Mutable access for height, walkability, user data and scratch state
    pub fn get_mut(&mut self, key: CellKey) -> Option<CellMut<'_>> {
        self.cells.get_mut(&key).map(CellMut::new)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    // ========================================================================
    // COORDINATE TRANSFORMS
    // ========================================================================

    /// World position of a cell; `y` is the cell height
    pub fn cell_to_pixel(&self, cell: &Cell) -> DVec3 {
        DVec3::new(
            cell.q as f64 * self.cell_width * 0.75,
            cell.h as f64,
            -((cell.s - cell.r) as f64 * self.cell_length * 0.5),
        )
    }

    /// Nearest cell coordinate to a world position (the cell need not exist)
    pub fn pixel_to_cell(&self, pos: DVec3) -> Cell {
        Cell::from(self.pixel_to_key(pos))
    }

    fn pixel_to_key(&self, pos: DVec3) -> CellKey {
        let q = pos.x * (TWO_THIRDS / self.cell_size);
        let r = ((-pos.x / 3.0) + (SQRT3 / 3.0) * pos.z) / self.cell_size;
        cube_round(q, r, -q - r)
    }

    /// Stored cell under a world position, if any
    pub fn get_cell_at(&self, pos: DVec3) -> Option<&Cell> {
        self.cells.get(&self.pixel_to_key(pos))
    }

    /// Canonical `"q.r.s"` hash of a cell
    pub fn cell_to_hash(&self, cell: &Cell) -> String {
        cell.key().to_string()
    }

    /// Cube distance plus the signed height change from `a` to `b`
    pub fn distance(&self, a: &Cell, b: &Cell) -> i32 {
        a.key().distance_to(b.key()).saturating_add(b.h - a.h)
    }

    // ========================================================================
    // GRAPH QUERIES
    // ========================================================================

    /// Stored neighbors of `cell`: the six orthogonal cells in direction
    /// order, then (optionally) the six diagonals. Always a fresh vector.
    pub fn get_neighbors(&self, cell: &Cell, include_diagonals: bool) -> Vec<&Cell> {
        self.get_neighbors_filtered(cell, include_diagonals, |_, _, _| true)
    }

    /// Like `get_neighbors`, keeping only candidates for which
    /// `filter(origin, candidate, kind)` is true
    pub fn get_neighbors_filtered<F>(
        &self,
        cell: &Cell,
        include_diagonals: bool,
        filter: F,
    ) -> Vec<&Cell>
    where
        F: Fn(&Cell, &Cell, NeighborKind) -> bool,
    {
        let mut found = Vec::with_capacity(if include_diagonals { 12 } else { 6 });
        self.collect_neighbors(cell, &DIRECTIONS, NeighborKind::Orthogonal, &filter, &mut found);
        if include_diagonals {
            self.collect_neighbors(cell, &DIAGONALS, NeighborKind::Diagonal, &filter, &mut found);
        }
        found
    }

    fn collect_neighbors<'a, F>(
        &'a self,
        cell: &Cell,
        offsets: &[CellKey; 6],
        kind: NeighborKind,
        filter: &F,
        found: &mut Vec<&'a Cell>,
    ) where
        F: Fn(&Cell, &Cell, NeighborKind) -> bool,
    {
        let origin = cell.key();
        for offset in offsets {
            let Some(key) = origin.checked_add(*offset) else {
                continue;
            };
            if let Some(n) = self.cells.get(&key) {
                if filter(cell, n, kind) {
                    found.push(n);
                }
            }
        }
    }

    /// Uniform pick over the stored cells
    pub fn get_random_cell<R: Rng>(&self, rng: &mut R) -> Option<&Cell> {
        if self.cells.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.cells.len());
        self.cells.values().nth(index)
    }

    /// Reset every cell's search scratch state
    pub fn clear_path(&mut self) {
        for cell in self.cells.values_mut() {
            cell.path = PathState::default();
        }
    }

    /// Visit every stored cell once
    pub fn traverse<F: FnMut(&Cell)>(&self, mut f: F) {
        for cell in self.cells.values() {
            f(cell);
        }
    }

    pub fn traverse_mut<F: FnMut(&mut CellMut<'_>)>(&mut self, mut f: F) {
        for cell in self.cells.values_mut() {
            f(&mut CellMut::new(cell));
        }
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Insert a cell. First writer wins: an occupied coordinate is left
    /// untouched and `None` is returned.
    pub fn add(&mut self, cell: Cell) -> Option<&Cell> {
        let key = cell.key();
        if !key.is_valid() {
            tracing::warn!("Rejected cell {}: not a valid cube coordinate", key);
            return None;
        }

        match self.cells.entry(key) {
            Entry::Occupied(_) => {
                tracing::debug!("A cell already exists at {}", key);
                None
            }
            Entry::Vacant(slot) => Some(&*slot.insert(cell)),
        }
    }

    /// Remove the cell at `key`, returning it if it was stored
    pub fn remove(&mut self, key: CellKey) -> Option<Cell> {
        self.cells.remove(&key)
    }

    /// Release all cells and cached geometry. The grid is consumed.
    pub fn dispose(mut self) {
        tracing::debug!(
            "Disposing grid with {} cells and {} cached geometries",
            self.cells.len(),
            self.geo_cache.len()
        );
        self.cells.clear();
        self.geo_cache.clear();
    }

    // ========================================================================
    // GENERATION
    // ========================================================================

    /// Fill a hexagon of radius `size` around the origin
    pub fn generate(&mut self, size: i32) {
        self.size = size;
        let before = self.cells.len();
        for key in hexagon(size) {
            self.add(Cell::from(key));
        }
        tracing::info!(
            "Generated hexagon of radius {}: {} new cells, {} total",
            size,
            self.cells.len() - before,
            self.cells.len()
        );
    }

    /// Ground-level centres of every slot in a hexagon of radius `size`,
    /// whether or not a cell is stored there
    pub fn generate_overlay(&self, size: i32) -> Vec<DVec3> {
        hexagon(size)
            .map(|key| {
                let mut pos = self.cell_to_pixel(&Cell::from(key));
                pos.y = 0.0;
                pos
            })
            .collect()
    }

    /// Build a tile for the stored cell at `key` and bind it to that cell
    pub fn generate_tile(
        &mut self,
        key: CellKey,
        scale: f64,
        material: Option<String>,
    ) -> Result<Tile, GridError> {
        let height = self
            .cells
            .get(&key)
            .ok_or(GridError::UnknownCell(key))?
            .h
            .abs()
            .max(1);
        let geometry = self.cached_geometry(height);

        let tile = Tile::new(TileConfig {
            size: self.cell_size,
            scale,
            cell: Some(key),
            geometry: Some(geometry),
            material,
        })?;

        if let Some(cell) = self.cells.get_mut(&key) {
            cell.tile = Some(tile.id());
        }
        Ok(tile)
    }

    /// Build one tile per stored cell.
    ///
    /// This also applies `config.cell_size` to the grid transforms, marks the
    /// grid autogenerated and stores the extrusion settings.
    pub fn generate_tiles(&mut self, config: TileGenConfig) -> Result<Vec<Tile>, GridError> {
        if let Some(cell_size) = config.cell_size {
            self.set_cell_size(cell_size);
        }
        self.autogenerated = true;
        self.extrude_settings = Some(config.extrude_settings.clone());

        let keys: Vec<CellKey> = self.cells.keys().copied().collect();
        let mut tiles = Vec::with_capacity(keys.len());
        for key in keys {
            let mut tile = self.generate_tile(key, config.tile_scale, config.material.clone())?;
            let mut pos = self.cell_to_pixel(&self.cells[&key]);
            pos.y = 0.0;
            tile.position = pos;
            tiles.push(tile);
        }

        tracing::info!(
            "Generated {} tiles ({} cached geometries)",
            tiles.len(),
            self.geo_cache.len()
        );
        Ok(tiles)
    }

    fn cached_geometry(&mut self, height: i32) -> Arc<TileGeometry> {
        let outline = self.outline;
        let settings = self.extrude_settings.clone().unwrap_or_default();
        self.geo_cache
            .entry(height)
            .or_insert_with(|| Arc::new(TileGeometry::extrude(outline, height, &settings)))
            .clone()
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Snapshot of the scalar config and every cell, sorted by coordinate
    pub fn to_json(&self) -> GridJson {
        let mut cells: Vec<CellRecord> = self.cells.values().map(CellRecord::from).collect();
        cells.sort_by_key(|c| (c.q, c.r, c.s));

        GridJson {
            size: self.size,
            cell_size: self.cell_size,
            extrude_settings: self.extrude_settings.clone(),
            autogenerated: self.autogenerated,
            cells,
        }
    }

    /// Replace the whole grid with the document's contents.
    /// On error the grid is left unchanged.
    pub fn from_json(&mut self, json: GridJson) -> Result<(), GridError> {
        if let Some(bad) = json
            .cells
            .iter()
            .map(|c| CellKey::new(c.q, c.r, c.s))
            .find(|k| !k.is_valid())
        {
            return Err(GridError::InvalidCoordinate(bad));
        }

        self.cells.clear();
        self.size = json.size;
        self.set_cell_size(json.cell_size);
        self.extrude_settings = json.extrude_settings;
        self.autogenerated = json.autogenerated;

        let total = json.cells.len();
        for record in json.cells {
            let mut cell = Cell::new(record.q, record.r, record.s)
                .with_height(record.h)
                .with_user_data(record.user_data);
            cell.walkable = record.walkable;
            self.add(cell);
        }

        tracing::info!(
            "Loaded grid: {} cells ({} records), cell size {}",
            self.cells.len(),
            total,
            self.cell_size
        );
        Ok(())
    }

    /// Load from an already-parsed JSON value
    pub fn from_json_value(&mut self, value: &serde_json::Value) -> Result<(), GridError> {
        if value.get("cells").is_none() {
            return Err(GridError::MissingField("cells"));
        }
        let json = GridJson::deserialize(value)?;
        self.from_json(json)
    }

    pub fn from_json_str(&mut self, content: &str) -> Result<(), GridError> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        self.from_json_value(&value)
    }
}

impl Default for HexGrid {
    fn default() -> Self {
        HexGrid::new(GridConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
