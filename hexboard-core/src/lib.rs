//! HEXBOARD Core - cube-coordinate hex grid and board
//!
//! This crate provides:
//! - Cells in cube coordinates (`q + r + s == 0`) with height and walkability
//! - A hash-keyed hex grid with world <-> cube transforms and neighbor queries
//! - Procedural generation, tile construction and JSON persistence
//! - A board binding tiles and entities to cells
//! - A pathfinder boundary with a bundled A* implementation

pub mod cell;
pub mod config;
pub mod error;
pub mod grid;
pub mod tile;
pub mod board;
pub mod pathfinder;

// Re-exports for convenient access
pub use cell::{Cell, CellKey, CellMut, PathState, DIAGONALS, DIRECTIONS, MAX_COORD};
pub use config::{ExtrudeSettings, FinderConfig, GridConfig, TileGenConfig};
pub use error::GridError;
pub use grid::{cube_round, hexagon, CellRecord, GridJson, HexGrid, NeighborKind};
pub use tile::{EntityId, Tile, TileConfig, TileGeometry, TileId};
pub use board::Board;
pub use pathfinder::{cube_distance, AStarFinder, Heuristic, Pathfinder};
