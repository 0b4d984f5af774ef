//! Tiles: the physical counterpart of a cell
//!
//! A tile is bound to exactly one cell and carries at most one entity.
//! Both links are plain keys, readable by anyone and written only by the
//! grid and board.

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::cell::CellKey;
use crate::config::ExtrudeSettings;
use crate::error::GridError;

static NEXT_TILE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique tile identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId(pub u64);

impl TileId {
    /// Allocate a fresh, process-unique id
    pub fn next() -> Self {
        TileId(NEXT_TILE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identifier of a game entity placed on a tile; entities live outside the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Extruded hexagon prism. Shared between all tiles of the same height.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGeometry {
    /// Base outline in the XY plane
    pub outline: [DVec3; 6],
    /// Extrusion depth (the cell height it was built for)
    pub depth: i32,
    pub settings: ExtrudeSettings,
}

impl TileGeometry {
    pub fn extrude(outline: [DVec3; 6], depth: i32, settings: &ExtrudeSettings) -> Self {
        let mut settings = settings.clone();
        settings.amount = depth as f64;
        Self {
            outline,
            depth,
            settings,
        }
    }
}

/// Corners of a flat hexagon of the given radius
pub fn hex_outline(cell_size: f64) -> [DVec3; 6] {
    std::array::from_fn(|i| {
        let angle = (TAU / 6.0) * i as f64;
        DVec3::new(cell_size * angle.cos(), cell_size * angle.sin(), 0.0)
    })
}

/// Inputs for `Tile::new`; `cell` and `geometry` are required
#[derive(Clone, Debug)]
pub struct TileConfig {
    pub size: f64,
    pub scale: f64,
    pub cell: Option<CellKey>,
    pub geometry: Option<Arc<TileGeometry>>,
    pub material: Option<String>,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            size: crate::config::DEFAULT_CELL_SIZE,
            scale: 1.0,
            cell: None,
            geometry: None,
            material: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Tile {
    id: TileId,
    pub(crate) cell: Option<CellKey>,
    pub geometry: Option<Arc<TileGeometry>>,
    pub material: Option<String>,
    pub size: f64,
    pub scale: f64,
    pub position: DVec3,
    pub(crate) entity: Option<EntityId>,
    pub user_data: serde_json::Value,
    selected: bool,
}

impl Tile {
    pub fn new(config: TileConfig) -> Result<Self, GridError> {
        let cell = config.cell.ok_or(GridError::MissingTileConfig("cell"))?;
        let geometry = config
            .geometry
            .ok_or(GridError::MissingTileConfig("geometry"))?;

        Ok(Self {
            id: TileId::next(),
            cell: Some(cell),
            geometry: Some(geometry),
            material: config.material,
            size: config.size,
            scale: config.scale,
            position: DVec3::ZERO,
            entity: None,
            user_data: serde_json::Value::Null,
            selected: false,
        })
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn cell(&self) -> Option<CellKey> {
        self.cell
    }

    /// Entity standing on this tile
    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn select(&mut self) -> &mut Self {
        self.selected = true;
        self
    }

    pub fn deselect(&mut self) -> &mut Self {
        self.selected = false;
        self
    }

    pub fn toggle(&mut self) -> &mut Self {
        self.selected = !self.selected;
        self
    }

    /// Release the tile with its geometry handle and links
    pub fn dispose(self) {
        tracing::trace!("Disposing tile {:?} (cell {:?})", self.id, self.cell);
    }
}
