//! Generate command - build a hexagon-shaped grid and save it
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_grid(), save_grid()
//! - Level 3: randomize_heights()
//! - Level 4: argument validation, rng setup

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hexboard_core::{GridConfig, HexGrid, TileGenConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct GenerateArgs {
    /// Radius of the hexagon, in cells
    #[arg(long, default_value = "5")]
    pub size: i32,

    /// World-unit radius of a single hex
    #[arg(long, default_value = "10.0")]
    pub cell_size: f64,

    /// Assign random heights from 1 up to this value
    #[arg(long)]
    pub max_height: Option<i32>,

    /// Also generate tiles (stores extrusion settings in the file)
    #[arg(long)]
    pub tiles: bool,

    /// Output JSON file
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run generate command
///
/// 1. Build the grid (and optional heights / tiles)
/// 2. Save it
pub fn run(args: GenerateArgs, seed: Option<u64>) -> Result<()> {
    validate_args(&args)?;

    let grid = build_grid(&args, seed)?;
    save_grid(&grid, &args)?;

    println!(
        "Wrote {} cells (radius {}) to {}",
        grid.num_cells(),
        grid.size,
        args.output.display()
    );
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_grid(args: &GenerateArgs, seed: Option<u64>) -> Result<HexGrid> {
    let mut grid = HexGrid::new(GridConfig::default().with_cell_size(args.cell_size));
    grid.generate(args.size);

    if let Some(max_height) = args.max_height {
        let mut rng = create_rng(seed);
        randomize_heights(&mut grid, max_height, &mut rng);
    }

    if args.tiles {
        let tiles = grid.generate_tiles(TileGenConfig::default())?;
        tracing::info!("Generated {} tiles", tiles.len());
    }

    Ok(grid)
}

fn save_grid(grid: &HexGrid, args: &GenerateArgs) -> Result<()> {
    grid.save(&args.output)?;
    tracing::info!("Saved grid to {}", args.output.display());
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn randomize_heights<R: Rng>(grid: &mut HexGrid, max_height: i32, rng: &mut R) {
    grid.traverse_mut(|cell| cell.set_height(rng.gen_range(1..=max_height)));
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn validate_args(args: &GenerateArgs) -> Result<()> {
    if args.size < 0 {
        anyhow::bail!("Grid size must not be negative (got {})", args.size);
    }
    if args.cell_size <= 0.0 {
        anyhow::bail!("Cell size must be positive (got {})", args.cell_size);
    }
    if let Some(max_height) = args.max_height {
        if max_height < 1 {
            anyhow::bail!("Max height must be at least 1 (got {})", max_height);
        }
    }
    Ok(())
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(size: i32) -> GenerateArgs {
        GenerateArgs {
            size,
            cell_size: 10.0,
            max_height: None,
            tiles: false,
            output: PathBuf::from("unused.json"),
        }
    }

    #[test]
    fn test_validate_args() {
        assert!(validate_args(&args(3)).is_ok());
        assert!(validate_args(&args(-1)).is_err());

        let mut bad = args(3);
        bad.cell_size = 0.0;
        assert!(validate_args(&bad).is_err());

        let mut bad = args(3);
        bad.max_height = Some(0);
        assert!(validate_args(&bad).is_err());
    }

    #[test]
    fn test_build_grid_with_heights() {
        let mut a = args(2);
        a.max_height = Some(4);
        let grid = build_grid(&a, Some(9)).unwrap();

        assert_eq!(grid.num_cells(), 19);
        grid.traverse(|c| assert!((1..=4).contains(&c.h())));
    }

    #[test]
    fn test_heights_are_seeded() {
        let mut a = args(2);
        a.max_height = Some(6);
        let first = build_grid(&a, Some(1)).unwrap().to_json();
        let second = build_grid(&a, Some(1)).unwrap().to_json();
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_grid_with_tiles() {
        let mut a = args(1);
        a.tiles = true;
        let grid = build_grid(&a, None).unwrap();
        assert!(grid.autogenerated);
        assert!(grid.extrude_settings.is_some());
    }
}
