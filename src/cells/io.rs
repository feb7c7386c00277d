use std::path::Path;

use anyhow::{Context, Result};

use crate::cells::Cells;
use crate::common::{self, io};
use crate::geom::Geometries;

impl Cells {
    /// Read cells from a GeoJSON FeatureCollection of Polygon/MultiPolygon features.
    pub fn read(path: &Path) -> Result<Self> {
        common::require_file_exists(path)?;
        let features = io::read_geojson(path)?;

        let shapes = features.geometries.into_iter().enumerate()
            .map(|(i, geometry)| {
                let geometry = geometry
                    .with_context(|| format!("feature {i} has no geometry"))?;
                io::to_multipolygon(geometry)
                    .with_context(|| format!("feature {i} is not a cell"))
            })
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Failed to read cells from {}", path.display()))?;

        let data = io::properties_to_dataframe(&features.properties)?;
        Cells::new(Geometries::new(shapes, features.crs), data)
    }

    /// Write cells with all attribute columns as GeoJSON.
    pub fn write_geojson(&self, path: &Path) -> Result<()> {
        let properties = (0..self.len())
            .map(|idx| io::row_to_json(self.data(), idx))
            .collect::<Result<Vec<_>>>()?;
        io::write_geojson(path, self.geoms().shapes(), properties, self.geoms().crs())
    }

    /// Write the attribute table (no geometry) as CSV.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        io::write_csv(&mut self.data().clone(), path)
    }
}
