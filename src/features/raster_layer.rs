use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cells::Cells;
use crate::geom::Crs;
use crate::raster::{zonal_stats, Raster, Stat};

/// Zonal `stat` of `raster` over each cell.
/// `crs` overrides the CRS stored in the raster file.
pub fn add_raster_layer(cells: &Cells, raster: &Path, stat: Stat, crs: Option<&Crs>) -> Result<Vec<Option<f64>>> {
    let raster = Raster::read(raster)?;
    let crs = match crs {
        Some(crs) => crs,
        None => raster.crs()
            .context("raster has no CRS; set 'crs' on the feature to override")?,
    };

    debug!("[features] zonal {stat} over {} cells in {crs}", cells.len());
    let shapes = cells.geoms().to_crs(crs)?;
    Ok(zonal_stats(shapes.shapes(), &raster, stat))
}
