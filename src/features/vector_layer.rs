use std::{fmt, path::Path, str::FromStr};

use anyhow::{bail, ensure, Context, Result};
use geo::{BoundingRect, Geometry, Intersects};
use rstar::{RTree, AABB};
use tracing::debug;

use crate::cells::{Cells, ColumnValues};
use crate::geom::{BoundingBox, Crs};
use crate::raster::{distance_transform_edt, rasterize, zonal_stats, Raster, RasterMeta, Stat};
use crate::vector::{planar_length, VectorLayer};

/// Nodata marker for the distance grid.
const DISTANCE_NODATA: f64 = -999.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorOperation {
    /// Attribute of the first intersecting feature.
    SpatialJoin,
    /// Minimum distance from the cell to any feature, in raster CRS units.
    Distance,
}

impl FromStr for VectorOperation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sjoin" => Ok(Self::SpatialJoin),
            "distance" => Ok(Self::Distance),
            _ => bail!("vector operation '{s}' is not implemented; use 'sjoin' or 'distance'"),
        }
    }
}

impl fmt::Display for VectorOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SpatialJoin => "sjoin",
            Self::Distance => "distance",
        })
    }
}

/// Extract a per-cell column from a vector dataset.
pub fn add_vector_layer(cells: &Cells, vector: &Path, operation: &str, raster_like: &Path, joined_col: Option<&str>) -> Result<ColumnValues> {
    let operation = operation.parse::<VectorOperation>()?;
    let layer = VectorLayer::read(vector)?;

    match operation {
        VectorOperation::SpatialJoin => {
            let joined_col = joined_col.context("'sjoin' needs 'joined_col'")?;
            spatial_join(cells, &layer, joined_col)
        }
        VectorOperation::Distance => distance(cells, &layer, raster_like).map(ColumnValues::Float),
    }
}

/// Cell -> index of the lowest-index intersecting feature, in EPSG:4326.
fn first_intersecting(cells: &Cells, layer: &VectorLayer) -> Result<Vec<Option<usize>>> {
    let wgs84 = Crs::wgs84();
    let shapes = cells.geoms().to_crs(&wgs84)?;
    let layer = layer.to_crs(&wgs84)?;

    let rtree = RTree::bulk_load(
        layer.shapes().iter().enumerate()
            .filter_map(|(i, shape)| shape.as_ref()?.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
            .collect(),
    );

    Ok(shapes.shapes().iter()
        .map(|cell| {
            let rect = cell.bounding_rect()?;
            let envelope = AABB::from_corners(rect.min().into(), rect.max().into());
            rtree.locate_in_envelope_intersecting(&envelope)
                .map(BoundingBox::idx)
                .filter(|&i| layer.shapes()[i].as_ref().is_some_and(|shape| shape.intersects(cell)))
                .min()
        })
        .collect())
}

fn spatial_join(cells: &Cells, layer: &VectorLayer, joined_col: &str) -> Result<ColumnValues> {
    let source = layer.column_values(joined_col)?;
    let matches = first_intersecting(cells, layer)?;
    debug!(
        "[features] sjoin matched {} of {} cells",
        matches.iter().flatten().count(), matches.len()
    );

    Ok(match source {
        ColumnValues::Float(values) => ColumnValues::Float(
            matches.iter().map(|m| m.and_then(|i| values[i])).collect()
        ),
        ColumnValues::Text(values) => ColumnValues::Text(
            matches.iter().map(|m| m.and_then(|i| values[i].clone())).collect()
        ),
    })
}

/// Rasterize the layer onto the `raster_like` grid, then take each cell's
/// minimum Euclidean distance to a burned pixel.
fn distance(cells: &Cells, layer: &VectorLayer, raster_like: &Path) -> Result<Vec<Option<f64>>> {
    let meta = RasterMeta::read(raster_like)?;
    let crs = meta.crs.clone()
        .with_context(|| format!("reference raster has no CRS: {}", raster_like.display()))?;

    let layer = layer.to_crs(&crs)?;
    let shapes = cells.geoms().to_crs(&crs)?;

    let lines = layer.shapes().iter()
        .flatten()
        .filter(|shape| planar_length(shape) > 0.0)
        .cloned()
        .collect::<Vec<Geometry<f64>>>();
    ensure!(!lines.is_empty(), "no line or polygon geometries to measure distance to");

    let burned = rasterize(&lines, &meta, 1.0, 0.0, true);
    let grid = distance_transform_edt(&burned) * meta.transform.pixel_width();
    debug!("[features] distance grid {}x{} from {} geometries", meta.rows, meta.cols, lines.len());

    let raster = Raster::new(grid, meta.transform, Some(crs), Some(DISTANCE_NODATA));
    Ok(zonal_stats(shapes.shapes(), &raster, Stat::Min))
}
