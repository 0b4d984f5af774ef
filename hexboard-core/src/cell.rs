//! Hex cells in cube coordinates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Deref};

use crate::tile::TileId;

/// Cube coordinate triple, the storage identity of a cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

/// Largest coordinate magnitude a stored cell may have. Keeps neighbor
/// offsets and coordinate differences inside `i32`.
pub const MAX_COORD: i32 = i32::MAX / 4;

impl CellKey {
    pub const ORIGIN: CellKey = CellKey::new(0, 0, 0);

    pub const fn new(q: i32, r: i32, s: i32) -> Self {
        Self { q, r, s }
    }

    /// Check the cube constraint `q + r + s == 0` and that every
    /// component lies within `MAX_COORD`
    pub fn is_valid(&self) -> bool {
        let in_range = [self.q, self.r, self.s]
            .iter()
            .all(|c| c.unsigned_abs() <= MAX_COORD as u32);
        in_range && self.q as i64 + self.r as i64 + self.s as i64 == 0
    }

    /// Cube distance between two coordinates (ignores height).
    /// Saturates at `i32::MAX`.
    pub fn distance_to(&self, other: CellKey) -> i32 {
        let dq = (self.q as i64 - other.q as i64).abs();
        let dr = (self.r as i64 - other.r as i64).abs();
        let ds = (self.s as i64 - other.s as i64).abs();
        i32::try_from(dq.max(dr).max(ds)).unwrap_or(i32::MAX)
    }

    /// Component-wise addition, `None` on overflow
    pub fn checked_add(self, other: CellKey) -> Option<CellKey> {
        Some(Self::new(
            self.q.checked_add(other.q)?,
            self.r.checked_add(other.r)?,
            self.s.checked_add(other.s)?,
        ))
    }
}

impl Add for CellKey {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.q + other.q, self.r + other.r, self.s + other.s)
    }
}

/// Formats as the hex hash `"q.r.s"`
impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.q, self.r, self.s)
    }
}

impl From<&Cell> for CellKey {
    fn from(cell: &Cell) -> Self {
        cell.key()
    }
}

/// Orthogonal neighbor offsets, in lookup order
pub const DIRECTIONS: [CellKey; 6] = [
    CellKey::new(1, -1, 0),
    CellKey::new(1, 0, -1),
    CellKey::new(0, 1, -1),
    CellKey::new(-1, 1, 0),
    CellKey::new(-1, 0, 1),
    CellKey::new(0, -1, 1),
];

/// Diagonal neighbor offsets, in lookup order
pub const DIAGONALS: [CellKey; 6] = [
    CellKey::new(2, -1, -1),
    CellKey::new(1, 1, -2),
    CellKey::new(-1, 2, -1),
    CellKey::new(-2, 1, 1),
    CellKey::new(-1, -1, 2),
    CellKey::new(1, -2, 1),
];

/// Per-search scratch state. Only meaningful during a single search;
/// `HexGrid::clear_path` resets it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathState {
    pub cost: f64,
    pub priority: f64,
    pub visited: bool,
    pub parent: Option<CellKey>,
}

/// A single hex in cube space
#[derive(Clone, Debug)]
pub struct Cell {
    pub q: i32,
    pub r: i32,
    pub s: i32,
    /// Vertical height, never below 1
    pub(crate) h: i32,
    pub walkable: bool,
    pub user_data: serde_json::Value,
    /// Tile bound to this cell, written only by the grid and board
    pub(crate) tile: Option<TileId>,
    pub path: PathState,
}

impl Cell {
    pub fn new(q: i32, r: i32, s: i32) -> Self {
        Self {
            q,
            r,
            s,
            h: 1,
            walkable: true,
            user_data: serde_json::Value::Null,
            tile: None,
            path: PathState::default(),
        }
    }

    pub fn with_height(mut self, h: i32) -> Self {
        self.set_height(h);
        self
    }

    pub fn with_user_data(mut self, user_data: serde_json::Value) -> Self {
        self.user_data = user_data;
        self
    }

    pub fn key(&self) -> CellKey {
        CellKey::new(self.q, self.r, self.s)
    }

    pub fn h(&self) -> i32 {
        self.h
    }

    pub fn tile(&self) -> Option<TileId> {
        self.tile
    }

    pub fn is_valid(&self) -> bool {
        self.key().is_valid()
    }

    pub fn set_height(&mut self, h: i32) {
        self.h = h.max(1);
    }

    /// Overwrite coordinates in place. The caller keeps `q + r + s == 0`.
    pub fn set(&mut self, q: i32, r: i32, s: i32) -> &mut Self {
        self.q = q;
        self.r = r;
        self.s = s;
        self
    }

    /// Copy coordinates, height, walkability, user data and the tile link
    pub fn copy(&mut self, other: &Cell) -> &mut Self {
        self.q = other.q;
        self.r = other.r;
        self.s = other.s;
        self.h = other.h;
        self.walkable = other.walkable;
        self.user_data = other.user_data.clone();
        self.tile = other.tile;
        self
    }

    /// Component-wise coordinate addition, e.g. stepping by a direction offset
    pub fn add(&mut self, offset: CellKey) -> &mut Self {
        self.q += offset.q;
        self.r += offset.r;
        self.s += offset.s;
        self
    }

    /// Coordinate equality only
    pub fn equals(&self, other: &Cell) -> bool {
        self.q == other.q && self.r == other.r && self.s == other.s
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::new(0, 0, 0)
    }
}

impl From<CellKey> for Cell {
    fn from(key: CellKey) -> Self {
        Cell::new(key.q, key.r, key.s)
    }
}

// ============================================================================
// STORED CELL ACCESS
// ============================================================================

/// Mutable view of a cell stored in a grid.
///
/// Height, walkability, user data and search scratch may change in place.
/// Coordinates and the tile link are read-only through this view.
pub struct CellMut<'a> {
    cell: &'a mut Cell,
}

impl<'a> CellMut<'a> {
    pub(crate) fn new(cell: &'a mut Cell) -> Self {
        Self { cell }
    }

    pub fn set_height(&mut self, h: i32) {
        self.cell.set_height(h);
    }

    pub fn set_walkable(&mut self, walkable: bool) {
        self.cell.walkable = walkable;
    }

    pub fn set_user_data(&mut self, user_data: serde_json::Value) {
        self.cell.user_data = user_data;
    }

    pub fn user_data_mut(&mut self) -> &mut serde_json::Value {
        &mut self.cell.user_data
    }

    pub fn path_mut(&mut self) -> &mut PathState {
        &mut self.cell.path
    }

    /// Rebind the tile link, returning the previous one
    pub(crate) fn set_tile(&mut self, tile: Option<TileId>) -> Option<TileId> {
        std::mem::replace(&mut self.cell.tile, tile)
    }
}

impl Deref for CellMut<'_> {
    type Target = Cell;

    fn deref(&self) -> &Cell {
        &*self.cell
    }
}
