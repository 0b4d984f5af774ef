//! Inspect command - summarize a saved grid
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: summarize(), report()
//! - Level 4: formatting

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use hexboard_core::{CellKey, HexGrid};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct InspectArgs {
    /// Grid JSON file
    #[arg(value_name = "FILE")]
    pub grid: PathBuf,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Aggregated grid statistics
#[derive(Debug, Serialize)]
struct GridSummary {
    num_cells: usize,
    walkable: usize,
    radius: i32,
    cell_size: f64,
    autogenerated: bool,
    /// Height -> number of cells
    heights: BTreeMap<i32, usize>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: InspectArgs) -> Result<()> {
    let grid = HexGrid::load(&args.grid)?;
    let summary = summarize(&grid);
    report(&summary, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn summarize(grid: &HexGrid) -> GridSummary {
    let mut summary = GridSummary {
        num_cells: grid.num_cells(),
        walkable: 0,
        radius: 0,
        cell_size: grid.cell_size(),
        autogenerated: grid.autogenerated,
        heights: BTreeMap::new(),
    };

    grid.traverse(|cell| {
        if cell.walkable {
            summary.walkable += 1;
        }
        summary.radius = summary.radius.max(cell.key().distance_to(CellKey::ORIGIN));
        *summary.heights.entry(cell.h()).or_insert(0) += 1;
    });

    summary
}

fn report(summary: &GridSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("Cells:         {}", summary.num_cells);
    println!("Walkable:      {}", summary.walkable);
    println!("Radius:        {}", summary.radius);
    println!("Cell size:     {}", summary.cell_size);
    println!("Autogenerated: {}", summary.autogenerated);
    println!("Heights:");
    for (height, count) in &summary.heights {
        println!("  {:>3}: {}", height, count);
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
