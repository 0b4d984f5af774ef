//! Path command - find a path between two cells of a saved grid
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: find_path(), report_path()
//! - Level 4: coordinate parsing

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use hexboard_core::{cube_distance, AStarFinder, CellKey, FinderConfig, HexGrid, Pathfinder};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PathArgs {
    /// Grid JSON file
    #[arg(value_name = "FILE")]
    pub grid: PathBuf,

    /// Start cell as q,r,s
    #[arg(long, value_parser = parse_cell_key, allow_hyphen_values = true)]
    pub from: CellKey,

    /// End cell as q,r,s
    #[arg(long, value_parser = parse_cell_key, allow_hyphen_values = true)]
    pub to: CellKey,

    /// Allow diagonal steps
    #[arg(long)]
    pub diagonals: bool,

    /// Stop after expanding this many cells
    #[arg(long)]
    pub max_iterations: Option<usize>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: PathArgs) -> Result<()> {
    let mut grid = HexGrid::load(&args.grid)?;

    tracing::info!(
        "Searching {} -> {} over {} cells (diagonals: {})",
        args.from,
        args.to,
        grid.num_cells(),
        args.diagonals
    );

    let path = find_path(&mut grid, &args)?;
    report_path(&grid, path.as_deref());
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn find_path(grid: &mut HexGrid, args: &PathArgs) -> Result<Option<Vec<CellKey>>> {
    for key in [args.from, args.to] {
        if !grid.contains(key) {
            anyhow::bail!("Cell {} is not part of the grid", key);
        }
    }

    let mut finder = AStarFinder::new(FinderConfig {
        allow_diagonal: args.diagonals,
        max_iterations: args.max_iterations,
    });
    Ok(finder.find_path(args.from, args.to, &cube_distance, grid))
}

fn report_path(grid: &HexGrid, path: Option<&[CellKey]>) {
    let Some(path) = path else {
        println!("No path found");
        return;
    };

    let cost = path
        .last()
        .and_then(|end| grid.get(*end))
        .map(|c| c.path.cost)
        .unwrap_or(0.0);
    println!("Path of {} steps (cost {}):", path.len().saturating_sub(1), cost);
    for key in path {
        println!("  {}", key);
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Parse `"q,r,s"` into a valid cube coordinate
fn parse_cell_key(input: &str) -> Result<CellKey, String> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    let &[q, r, s] = parts.as_slice() else {
        return Err(format!("expected q,r,s but got '{}'", input));
    };
    let parse = |v: &str| v.parse::<i32>().map_err(|e| format!("bad coordinate '{}': {}", v, e));
    let key = CellKey::new(parse(q)?, parse(r)?, parse(s)?);
    if !key.is_valid() {
        return Err(format!("{} is not a valid cube coordinate", key));
    }
    Ok(key)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_key() {
        assert_eq!(parse_cell_key("1,-1,0"), Ok(CellKey::new(1, -1, 0)));
        assert_eq!(parse_cell_key(" 0, 2 ,-2"), Ok(CellKey::new(0, 2, -2)));
        assert!(parse_cell_key("1,1,1").is_err());
        assert!(parse_cell_key("1,-1").is_err());
        assert!(parse_cell_key("a,b,c").is_err());
    }

    #[test]
    fn test_find_path_rejects_unknown_cells() {
        let mut grid = HexGrid::default();
        grid.generate(1);
        let args = PathArgs {
            grid: PathBuf::from("unused.json"),
            from: CellKey::ORIGIN,
            to: CellKey::new(3, -3, 0),
            diagonals: false,
            max_iterations: None,
        };
        assert!(find_path(&mut grid, &args).is_err());
    }

    #[test]
    fn test_find_path() {
        let mut grid = HexGrid::default();
        grid.generate(2);
        let args = PathArgs {
            grid: PathBuf::from("unused.json"),
            from: CellKey::new(-2, 0, 2),
            to: CellKey::new(2, 0, -2),
            diagonals: false,
            max_iterations: None,
        };
        let path = find_path(&mut grid, &args).unwrap().unwrap();
        assert_eq!(path.len(), 5);
    }
}
