use anyhow::Result;
use spider::{cells_crossing, expand_user, extend_grid, Cells, ColumnValues, VectorLayer};
use tracing::{info, warn};

use crate::commands::write_cells;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ExtendGridArgs) -> Result<()> {
    let mut cells = Cells::read(&expand_user(&args.cells))?;
    let lines = VectorLayer::read(&expand_user(&args.line))?;

    let mut seeds = Vec::new();
    for line in lines.shapes().iter().flatten() {
        seeds.extend(cells_crossing(&cells, line, lines.crs())?);
    }
    if seeds.is_empty() {
        warn!("[extend-grid] line does not cross any cell");
    }

    let adjacency = cells.geoms().adjacencies()?;
    let mut grid_dist = cells.column_f64(&args.column)?;
    let updates = extend_grid(&mut grid_dist, &adjacency, &seeds, args.step)?;
    info!("[extend-grid] {} seed cells, {updates} distances lowered", seeds.len());

    cells.set_column(&args.column, ColumnValues::Float(grid_dist))?;
    write_cells(&cells, &args.output)
}
