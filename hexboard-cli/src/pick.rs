//! Pick command - resolve a world position to a cell

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use glam::DVec3;

use hexboard_core::HexGrid;

#[derive(Args)]
pub struct PickArgs {
    /// Grid JSON file
    #[arg(value_name = "FILE")]
    pub grid: PathBuf,

    /// World x coordinate
    #[arg(long, allow_hyphen_values = true)]
    pub x: f64,

    /// World z coordinate
    #[arg(long, allow_hyphen_values = true)]
    pub z: f64,
}

pub fn run(args: PickArgs) -> Result<()> {
    let grid = HexGrid::load(&args.grid)?;
    let pos = DVec3::new(args.x, 0.0, args.z);

    let nearest = grid.pixel_to_cell(pos);
    match grid.get_cell_at(pos) {
        Some(cell) => {
            let centre = grid.cell_to_pixel(cell);
            println!(
                "Cell {} (h={}, walkable={}) centred at ({:.3}, {:.3})",
                cell.key(),
                cell.h(),
                cell.walkable,
                centre.x,
                centre.z
            );
        }
        None => println!("No cell at {} (outside the grid)", nearest.key()),
    }
    Ok(())
}
