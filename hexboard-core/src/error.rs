//! Error types

use crate::cell::CellKey;
use crate::tile::TileId;

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Grid JSON is missing required field: {0}")]
    MissingField(&'static str),

    #[error("Malformed grid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid cube coordinate {0}: q + r + s must be 0")]
    InvalidCoordinate(CellKey),

    #[error("Missing tile configuration: {0}")]
    MissingTileConfig(&'static str),

    #[error("Cell {0} is not part of the grid")]
    UnknownCell(CellKey),

    #[error("Tile {0:?} is not on the board")]
    UnknownTile(TileId),
}
