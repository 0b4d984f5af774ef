//! Pathfinding over a `HexGrid`
//!
//! The grid supplies neighbors, step costs and per-cell scratch state; a
//! `Pathfinder` only decides the search order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::cell::{Cell, CellKey};
use crate::config::FinderConfig;
use crate::grid::HexGrid;

/// Estimated remaining cost between two cells
pub type Heuristic<'a> = &'a dyn Fn(&Cell, &Cell) -> f64;

/// Boundary between the board and a search algorithm
pub trait Pathfinder {
    /// Path from `start` to `end` (both inclusive), or `None` if unreachable.
    /// Overwrites the grid's scratch state.
    fn find_path(
        &mut self,
        start: CellKey,
        end: CellKey,
        heuristic: Heuristic<'_>,
        grid: &mut HexGrid,
    ) -> Option<Vec<CellKey>>;
}

/// Plain cube distance, ignoring height
pub fn cube_distance(a: &Cell, b: &Cell) -> f64 {
    a.key().distance_to(b.key()) as f64
}

// ============================================================================
// OPEN LIST
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    priority: f64,
    key: CellKey,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reversed so the max-heap pops the lowest priority first
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.key.cmp(&self.key))
    }
}

// ============================================================================
// A* FINDER
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct AStarFinder {
    pub config: FinderConfig,
}

impl AStarFinder {
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }
}

impl Pathfinder for AStarFinder {
    fn find_path(
        &mut self,
        start: CellKey,
        end: CellKey,
        heuristic: Heuristic<'_>,
        grid: &mut HexGrid,
    ) -> Option<Vec<CellKey>> {
        if !grid.contains(start) || !grid.contains(end) {
            return None;
        }

        grid.clear_path();
        let mut open = BinaryHeap::new();
        open.push(OpenEntry {
            priority: 0.0,
            key: start,
        });

        let mut expanded = 0usize;
        while let Some(entry) = open.pop() {
            if entry.key == end {
                tracing::debug!("Path {} -> {} found after {} expansions", start, end, expanded);
                return Some(build_path(grid, start, end));
            }

            // Stale entries: already expanded, or superseded by a cheaper route
            let current = grid.get(entry.key)?;
            if current.path.visited || entry.priority > current.path.priority {
                continue;
            }

            expanded += 1;
            if self.config.max_iterations.is_some_and(|max| expanded > max) {
                tracing::debug!("Gave up on {} -> {} after {} expansions", start, end, expanded - 1);
                return None;
            }

            let updates = relax_neighbors(grid, entry.key, start, end, heuristic, self.config.allow_diagonal);
            if let Some(mut cell) = grid.get_mut(entry.key) {
                cell.path_mut().visited = true;
            }

            for (key, cost, priority) in updates {
                if let Some(mut cell) = grid.get_mut(key) {
                    let path = cell.path_mut();
                    path.cost = cost;
                    path.priority = priority;
                    path.parent = Some(entry.key);
                    path.visited = false;
                }
                open.push(OpenEntry { priority, key });
            }
        }

        None
    }
}

/// Walkable neighbors of `key` that the current route reaches more cheaply,
/// as `(neighbor, cost, priority)`
fn relax_neighbors(
    grid: &HexGrid,
    key: CellKey,
    start: CellKey,
    end: CellKey,
    heuristic: Heuristic<'_>,
    allow_diagonal: bool,
) -> Vec<(CellKey, f64, f64)> {
    let (Some(current), Some(target)) = (grid.get(key), grid.get(end)) else {
        return Vec::new();
    };

    grid.get_neighbors_filtered(current, allow_diagonal, |_: &Cell, n: &Cell, _| n.walkable)
        .into_iter()
        .filter_map(|n| {
            let cost = current.path.cost + grid.distance(current, n) as f64;
            let reached = n.key() == start || n.path.parent.is_some();
            if reached && cost >= n.path.cost {
                return None;
            }
            Some((n.key(), cost, cost + heuristic(target, n)))
        })
        .collect()
}

fn build_path(grid: &HexGrid, start: CellKey, end: CellKey) -> Vec<CellKey> {
    let mut path = vec![end];
    let mut key = end;
    while key != start {
        match grid.get(key).and_then(|c| c.path.parent) {
            Some(parent) => {
                path.push(parent);
                key = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;

    fn grid(radius: i32) -> HexGrid {
        let mut grid = HexGrid::new(GridConfig::default());
        grid.generate(radius);
        grid
    }

    fn assert_connected(path: &[CellKey], diagonal: bool) {
        for pair in path.windows(2) {
            let step = pair[0].distance_to(pair[1]);
            assert!(step == 1 || (diagonal && step == 2), "{} -> {} is not a step", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_straight_path() {
        let mut grid = grid(3);
        let mut finder = AStarFinder::default();
        let start = CellKey::new(-3, 3, 0);
        let end = CellKey::new(3, -3, 0);

        let path = finder.find_path(start, end, &cube_distance, &mut grid).unwrap();
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        assert_eq!(path.len(), 7);
        assert_connected(&path, false);
    }

    #[test]
    fn test_path_to_self() {
        let mut grid = grid(1);
        let mut finder = AStarFinder::default();
        let path = finder
            .find_path(CellKey::ORIGIN, CellKey::ORIGIN, &cube_distance, &mut grid)
            .unwrap();
        assert_eq!(path, vec![CellKey::ORIGIN]);
    }

    #[test]
    fn test_path_avoids_unwalkable() {
        let mut grid = grid(2);
        for key in [CellKey::ORIGIN, CellKey::new(0, -1, 1), CellKey::new(0, 1, -1)] {
            grid.get_mut(key).unwrap().set_walkable(false);
        }
        let mut finder = AStarFinder::default();
        let start = CellKey::new(-1, 0, 1);
        let end = CellKey::new(1, 0, -1);

        let path = finder.find_path(start, end, &cube_distance, &mut grid).unwrap();
        assert_connected(&path, false);
        for key in &path {
            assert!(grid.get(*key).unwrap().walkable);
        }
        assert!(path.len() > 3);
    }

    #[test]
    fn test_unreachable() {
        let mut grid = grid(2);
        for d in crate::cell::DIRECTIONS {
            grid.get_mut(d).unwrap().set_walkable(false);
        }
        let mut finder = AStarFinder::default();
        let path = finder.find_path(CellKey::ORIGIN, CellKey::new(2, -2, 0), &cube_distance, &mut grid);
        assert!(path.is_none());
    }

    #[test]
    fn test_missing_endpoints() {
        let mut grid = grid(1);
        let mut finder = AStarFinder::default();
        let outside = CellKey::new(5, -5, 0);
        assert!(finder.find_path(CellKey::ORIGIN, outside, &cube_distance, &mut grid).is_none());
        assert!(finder.find_path(outside, CellKey::ORIGIN, &cube_distance, &mut grid).is_none());
    }

    #[test]
    fn test_diagonals_jump_blocked_ring() {
        let mut grid = grid(2);
        for d in crate::cell::DIRECTIONS {
            grid.get_mut(d).unwrap().set_walkable(false);
        }
        let end = CellKey::new(2, -1, -1);

        let mut plain = AStarFinder::default();
        assert!(plain.find_path(CellKey::ORIGIN, end, &cube_distance, &mut grid).is_none());

        let mut diagonal = AStarFinder::new(FinderConfig::default().with_diagonals());
        let path = diagonal.find_path(CellKey::ORIGIN, end, &cube_distance, &mut grid).unwrap();
        assert_eq!(path, vec![CellKey::ORIGIN, end]);
    }

    #[test]
    fn test_cost_includes_height() {
        let mut grid = grid(3);
        let start = CellKey::new(-1, 0, 1);
        let end = CellKey::new(2, 0, -2);
        grid.get_mut(end).unwrap().set_height(4);

        let mut finder = AStarFinder::default();
        let path = finder.find_path(start, end, &cube_distance, &mut grid).unwrap();
        assert_eq!(path.len(), 4);
        // Three steps plus the climb from height 1 to 4
        assert_eq!(grid.get(end).unwrap().path.cost, 6.0);
    }

    #[test]
    fn test_max_iterations() {
        let mut grid = grid(4);
        let mut finder = AStarFinder::new(FinderConfig::default().with_max_iterations(2));
        let path = finder.find_path(CellKey::new(-4, 4, 0), CellKey::new(4, -4, 0), &cube_distance, &mut grid);
        assert!(path.is_none());
    }

    #[test]
    fn test_repeated_searches_reset_state() {
        let mut grid = grid(3);
        let mut finder = AStarFinder::default();
        let a = finder
            .find_path(CellKey::new(-3, 0, 3), CellKey::new(3, 0, -3), &cube_distance, &mut grid)
            .unwrap();
        let b = finder
            .find_path(CellKey::new(-3, 0, 3), CellKey::new(3, 0, -3), &cube_distance, &mut grid)
            .unwrap();
        assert_eq!(a, b);
    }
}
