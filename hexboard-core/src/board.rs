//! Board: a grid, its tiles, and the entities standing on them
//!
//! The grid owns cells, the board owns tiles, and game code owns entities.
//! Links between them are keys, kept consistent here:
//! - at most one tile per cell (`Cell::tile`)
//! - at most one entity per tile (`Tile::entity`), and one tile per entity

use glam::DVec3;
use rand::Rng;
use rustc_hash::FxHashMap;

use crate::cell::{Cell, CellKey};
use crate::config::TileGenConfig;
use crate::error::GridError;
use crate::grid::HexGrid;
use crate::pathfinder::{AStarFinder, Heuristic, Pathfinder};
use crate::tile::{EntityId, Tile, TileId};

pub struct Board<F: Pathfinder = AStarFinder> {
    grid: HexGrid,
    finder: F,
    tiles: Vec<Tile>,
    entities: FxHashMap<EntityId, TileId>,
}

impl<F: Pathfinder> Board<F> {
    pub fn new(grid: HexGrid, finder: F) -> Self {
        Self {
            grid,
            finder,
            tiles: Vec::new(),
            entities: FxHashMap::default(),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// Direct grid access. Adding or removing cells here bypasses tile
    /// bookkeeping; prefer `add_tile` / `remove_tile`.
    pub fn grid_mut(&mut self) -> &mut HexGrid {
        &mut self.grid
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id() == id)
    }

    /// Mutable tile access for position, selection and user data.
    /// Cell and entity links stay under the board's control.
    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.iter_mut().find(|t| t.id() == id)
    }

    /// Tile an entity currently stands on
    pub fn entity_tile(&self, entity: EntityId) -> Option<TileId> {
        self.entities.get(&entity).copied()
    }

    // ========================================================================
    // GRID SWAP
    // ========================================================================

    /// Dispose every tile and the current grid, then adopt `grid` with no tiles
    pub fn set_grid(&mut self, grid: HexGrid) {
        for tile in self.tiles.drain(..) {
            tile.dispose();
        }
        self.entities.clear();

        let previous = std::mem::replace(&mut self.grid, grid);
        previous.dispose();
        tracing::debug!("Board adopted grid with {} cells", self.grid.num_cells());
    }

    // ========================================================================
    // TILES
    // ========================================================================

    /// Put a tile on the board. Its cell is added to the grid if missing and
    /// linked back to the tile; a tile already bound to that cell is disposed.
    /// Adding a tile that is already on the board is a no-op.
    pub fn add_tile(&mut self, mut tile: Tile) -> Result<TileId, GridError> {
        let id = tile.id();
        if self.tile(id).is_some() {
            return Ok(id);
        }
        let key = tile.cell.ok_or(GridError::MissingTileConfig("cell"))?;

        self.snap_tile_to_grid(&mut tile);
        tile.position.y = 0.0;

        self.grid.add(Cell::from(key));
        let mut cell = self.grid.get_mut(key).ok_or(GridError::InvalidCoordinate(key))?;
        let displaced = cell.set_tile(Some(id));

        if let Some(old) = displaced.filter(|old| *old != id) {
            self.discard_tile(old);
        }
        self.tiles.push(tile);
        Ok(id)
    }

    /// Take a tile off the board, removing its cell from the grid.
    /// Returns false if the tile was not on the board.
    pub fn remove_tile(&mut self, id: TileId) -> bool {
        let Some(index) = self.tiles.iter().position(|t| t.id() == id) else {
            return false;
        };
        let tile = self.tiles.swap_remove(index);
        if let Some(key) = tile.cell {
            self.grid.remove(key);
        }
        if let Some(entity) = tile.entity {
            self.entities.remove(&entity);
        }
        tile.dispose();
        true
    }

    /// Drop a tile without touching the grid's cell set
    fn discard_tile(&mut self, id: TileId) {
        if let Some(index) = self.tiles.iter().position(|t| t.id() == id) {
            let tile = self.tiles.swap_remove(index);
            if let Some(entity) = tile.entity {
                self.entities.remove(&entity);
            }
            tile.dispose();
        }
    }

    /// Remove every tile but keep the grid's cells
    pub fn reset(&mut self) {
        for tile in self.tiles.drain(..) {
            if let Some(mut cell) = tile.cell.and_then(|key| self.grid.get_mut(key)) {
                cell.set_tile(None);
            }
            tile.dispose();
        }
        self.entities.clear();
    }

    /// Replace all tiles with one generated per grid cell
    pub fn generate_tilemap(&mut self, config: TileGenConfig) -> Result<(), GridError> {
        self.reset();
        self.tiles = self.grid.generate_tiles(config)?;
        Ok(())
    }

    pub fn get_tile_at_cell(&self, key: CellKey) -> Option<&Tile> {
        self.grid
            .get(key)
            .and_then(|cell| cell.tile)
            .and_then(|id| self.tile(id))
    }

    pub fn get_random_tile<R: Rng>(&self, rng: &mut R) -> Option<&Tile> {
        if self.tiles.is_empty() {
            return None;
        }
        self.tiles.get(rng.gen_range(0..self.tiles.len()))
    }

    // ========================================================================
    // POSITIONING
    // ========================================================================

    /// Centre of the cell nearest to `pos`
    pub fn snap_to_grid(&self, pos: DVec3) -> DVec3 {
        let cell = self.grid.pixel_to_cell(pos);
        self.grid.cell_to_pixel(&cell)
    }

    /// Move a tile to its cell's centre, or to the nearest cell's centre if
    /// it has none
    pub fn snap_tile_to_grid<'t>(&self, tile: &'t mut Tile) -> &'t mut Tile {
        tile.position = match tile.cell {
            Some(key) => match self.grid.get(key) {
                Some(cell) => self.grid.cell_to_pixel(cell),
                None => self.grid.cell_to_pixel(&Cell::from(key)),
            },
            None => self.snap_to_grid(tile.position),
        };
        tile
    }

    /// Place an entity on a tile and return its world position (the cell
    /// centre raised by `height_offset`). The entity leaves its previous
    /// tile; an entity already on the target tile is evicted.
    pub fn set_entity_on_tile(
        &mut self,
        entity: EntityId,
        tile_id: TileId,
        height_offset: f64,
    ) -> Result<DVec3, GridError> {
        let key = self
            .tile(tile_id)
            .ok_or(GridError::UnknownTile(tile_id))?
            .cell
            .ok_or(GridError::MissingTileConfig("cell"))?;
        let mut pos = match self.grid.get(key) {
            Some(cell) => self.grid.cell_to_pixel(cell),
            None => self.grid.cell_to_pixel(&Cell::from(key)),
        };
        pos.y += height_offset;

        if let Some(previous) = self.entities.remove(&entity) {
            if let Some(old_tile) = self.tile_mut(previous) {
                old_tile.entity = None;
            }
        }

        let tile = self
            .tile_mut(tile_id)
            .ok_or(GridError::UnknownTile(tile_id))?;
        if let Some(evicted) = tile.entity.replace(entity) {
            if evicted != entity {
                self.entities.remove(&evicted);
            }
        }
        self.entities.insert(entity, tile_id);
        Ok(pos)
    }

    // ========================================================================
    // PATHFINDING
    // ========================================================================

    /// Path between two tiles' cells, computed by the board's pathfinder
    pub fn find_path(
        &mut self,
        start: TileId,
        end: TileId,
        heuristic: Heuristic<'_>,
    ) -> Result<Option<Vec<CellKey>>, GridError> {
        let start_cell = self.tile_cell(start)?;
        let end_cell = self.tile_cell(end)?;
        Ok(self
            .finder
            .find_path(start_cell, end_cell, heuristic, &mut self.grid))
    }

    fn tile_cell(&self, id: TileId) -> Result<CellKey, GridError> {
        self.tile(id)
            .ok_or(GridError::UnknownTile(id))?
            .cell
            .ok_or(GridError::MissingTileConfig("cell"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtrudeSettings, FinderConfig, GridConfig};
    use crate::pathfinder::cube_distance;
    use crate::tile::{hex_outline, TileConfig, TileGeometry};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::sync::Arc;

    fn board(radius: i32) -> Board {
        let mut grid = HexGrid::new(GridConfig::default());
        grid.generate(radius);
        Board::new(grid, AStarFinder::new(FinderConfig::default()))
    }

    fn loose_tile(key: CellKey) -> Tile {
        Tile::new(TileConfig {
            cell: Some(key),
            geometry: Some(Arc::new(TileGeometry::extrude(
                hex_outline(10.0),
                1,
                &ExtrudeSettings::default(),
            ))),
            ..Default::default()
        })
        .unwrap()
    }

    fn assert_links_consistent(board: &Board) {
        for tile in board.tiles() {
            let key = tile.cell.expect("tile on board without a cell");
            assert_eq!(board.grid().get(key).unwrap().tile, Some(tile.id()));
            if let Some(entity) = tile.entity {
                assert_eq!(board.entity_tile(entity), Some(tile.id()));
            }
        }
        board.grid().traverse(|c| {
            if let Some(id) = c.tile {
                assert_eq!(board.tile(id).unwrap().cell, Some(c.key()));
            }
        });
    }

    #[test]
    fn test_generate_tilemap() {
        let mut board = board(2);
        board.generate_tilemap(TileGenConfig::default()).unwrap();
        assert_eq!(board.tiles().len(), 19);
        assert_links_consistent(&board);

        board.generate_tilemap(TileGenConfig::default()).unwrap();
        assert_eq!(board.tiles().len(), 19);
        assert_links_consistent(&board);
    }

    #[test]
    fn test_add_tile_adds_cell_and_link() {
        let mut board = board(1);
        let key = CellKey::new(2, -1, -1);
        let id = board.add_tile(loose_tile(key)).unwrap();

        assert_eq!(board.grid().num_cells(), 8);
        assert_eq!(board.get_tile_at_cell(key).map(|t| t.id()), Some(id));
        let tile = board.tile(id).unwrap();
        assert!((tile.position.x - 30.0).abs() < 1e-9);
        assert_eq!(tile.position.y, 0.0);
        assert_links_consistent(&board);
    }

    #[test]
    fn test_add_tile_twice_is_noop() {
        let mut board = board(1);
        let tile = loose_tile(CellKey::ORIGIN);
        let copy = tile.clone();
        board.add_tile(tile).unwrap();
        board.add_tile(copy).unwrap();
        assert_eq!(board.tiles().len(), 1);
    }

    #[test]
    fn test_add_tile_displaces_previous_tile() {
        let mut board = board(1);
        let first = board.add_tile(loose_tile(CellKey::ORIGIN)).unwrap();
        let second = board.add_tile(loose_tile(CellKey::ORIGIN)).unwrap();

        assert!(board.tile(first).is_none());
        assert_eq!(board.tiles().len(), 1);
        assert_eq!(board.get_tile_at_cell(CellKey::ORIGIN).unwrap().id(), second);
        assert_eq!(board.grid().num_cells(), 7);
    }

    #[test]
    fn test_remove_tile() {
        let mut board = board(1);
        let key = CellKey::new(0, 1, -1);
        let id = board.add_tile(loose_tile(key)).unwrap();

        assert!(board.remove_tile(id));
        assert!(board.tiles().is_empty());
        assert!(!board.grid().contains(key));
        assert!(!board.remove_tile(id));
    }

    #[test]
    fn test_tile_edits_leave_links_alone() {
        let mut board = board(1);
        board.generate_tilemap(TileGenConfig::default()).unwrap();
        let id = board.get_tile_at_cell(CellKey::ORIGIN).unwrap().id();

        let tile = board.tile_mut(id).unwrap();
        tile.position = DVec3::new(99.0, 0.0, 99.0);
        tile.material = Some("lava".to_string());
        tile.select();
        assert_links_consistent(&board);

        assert!(board.remove_tile(id));
        assert!(!board.grid().contains(CellKey::ORIGIN));
        assert!(board.grid().contains(CellKey::new(1, -1, 0)));
        assert_eq!(board.grid().num_cells(), 6);
        assert_links_consistent(&board);
    }

    #[test]
    fn test_reset_keeps_cells() {
        let mut board = board(1);
        board.generate_tilemap(TileGenConfig::default()).unwrap();
        board.reset();
        assert!(board.tiles().is_empty());
        assert_eq!(board.grid().num_cells(), 7);
        board.grid().traverse(|c| assert!(c.tile.is_none()));
    }

    #[test]
    fn test_set_grid_drops_tiles() {
        let mut board = board(1);
        board.generate_tilemap(TileGenConfig::default()).unwrap();
        let mut next = HexGrid::default();
        next.generate(3);
        board.set_grid(next);

        assert!(board.tiles().is_empty());
        assert_eq!(board.grid().num_cells(), 37);
    }

    #[test]
    fn test_snap_tile_without_cell() {
        let board = board(1);
        let mut tile = loose_tile(CellKey::ORIGIN);
        tile.cell = None;
        tile.position = DVec3::new(14.0, 0.0, 9.0);
        board.snap_tile_to_grid(&mut tile);

        let expected = board.grid().cell_to_pixel(&Cell::new(1, 0, -1));
        assert!((tile.position - expected).length() < 1e-9);
    }

    #[test]
    fn test_entity_moves_between_tiles() {
        let mut board = board(1);
        board.generate_tilemap(TileGenConfig::default()).unwrap();
        let a = board.get_tile_at_cell(CellKey::ORIGIN).unwrap().id();
        let b = board.get_tile_at_cell(CellKey::new(1, -1, 0)).unwrap().id();
        let hero = EntityId(1);

        let pos = board.set_entity_on_tile(hero, a, 2.0).unwrap();
        assert_eq!(pos.y, 3.0);
        assert_eq!(board.tile(a).unwrap().entity, Some(hero));

        board.set_entity_on_tile(hero, b, 0.0).unwrap();
        assert_eq!(board.tile(a).unwrap().entity, None);
        assert_eq!(board.tile(b).unwrap().entity, Some(hero));
        assert_eq!(board.entity_tile(hero), Some(b));
        assert_links_consistent(&board);
    }

    #[test]
    fn test_entity_eviction() {
        let mut board = board(1);
        board.generate_tilemap(TileGenConfig::default()).unwrap();
        let tile = board.get_tile_at_cell(CellKey::ORIGIN).unwrap().id();

        board.set_entity_on_tile(EntityId(1), tile, 0.0).unwrap();
        board.set_entity_on_tile(EntityId(2), tile, 0.0).unwrap();

        assert_eq!(board.tile(tile).unwrap().entity, Some(EntityId(2)));
        assert_eq!(board.entity_tile(EntityId(1)), None);
        assert_links_consistent(&board);
    }

    #[test]
    fn test_unknown_tile_errors() {
        let mut board = board(1);
        let stray = loose_tile(CellKey::ORIGIN);
        assert!(matches!(
            board.set_entity_on_tile(EntityId(1), stray.id(), 0.0),
            Err(GridError::UnknownTile(_))
        ));
        assert!(matches!(
            board.find_path(stray.id(), stray.id(), &cube_distance),
            Err(GridError::UnknownTile(_))
        ));
    }

    #[test]
    fn test_find_path_between_tiles() {
        let mut board = board(2);
        board.generate_tilemap(TileGenConfig::default()).unwrap();
        let start = board.get_tile_at_cell(CellKey::new(-2, 2, 0)).unwrap().id();
        let end = board.get_tile_at_cell(CellKey::new(2, -2, 0)).unwrap().id();

        let path = board.find_path(start, end, &cube_distance).unwrap().unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], CellKey::new(-2, 2, 0));
        assert_eq!(path[4], CellKey::new(2, -2, 0));
    }

    #[test]
    fn test_random_tile() {
        let mut board = board(1);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(board.get_random_tile(&mut rng).is_none());
        board.generate_tilemap(TileGenConfig::default()).unwrap();
        for _ in 0..20 {
            assert!(board.get_random_tile(&mut rng).is_some());
        }
    }
}
