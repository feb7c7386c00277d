use std::path::Path;

use anyhow::{bail, Context, Result};
use geo::{Euclidean, Geometry, Length, Polygon};
use polars::prelude::{DataFrame, DataType};
use tracing::debug;

use crate::cells::ColumnValues;
use crate::common::{self, io};
use crate::geom::{Crs, Reprojector};

/// Features of a vector dataset: optional geometry plus one attribute row each.
#[derive(Debug, Clone)]
pub struct VectorLayer {
    shapes: Vec<Option<Geometry<f64>>>,
    data: DataFrame,
    crs: Crs,
}

impl VectorLayer {
    pub fn new(shapes: Vec<Option<Geometry<f64>>>, data: DataFrame, crs: Crs) -> Result<Self> {
        anyhow::ensure!(
            shapes.len() == data.height(),
            "geometry count ({}) does not match attribute rows ({})",
            shapes.len(), data.height()
        );
        Ok(Self { shapes, data, crs })
    }

    /// Read a GeoJSON (`.geojson`, `.json`) or ESRI Shapefile (`.shp`) layer.
    pub fn read(path: &Path) -> Result<Self> {
        common::require_file_exists(path)?;

        let layer = match common::extension(path).as_deref() {
            Some("geojson" | "json") => {
                let features = io::read_geojson(path)?;
                let data = io::properties_to_dataframe(&features.properties)?;
                Self::new(features.geometries, data, features.crs)?
            }
            Some("shp") => {
                let crs = io::crs_from_shapefile(path)?;
                let (shapes, properties): (Vec<_>, Vec<_>) = io::read_shapefile(path)?.into_iter().unzip();
                let data = io::properties_to_dataframe(&properties)?;
                Self::new(shapes, data, crs)?
            }
            _ => bail!("unsupported vector format: {}", path.display()),
        };

        debug!("[vector] read {} features ({}) from {}", layer.len(), layer.crs, path.display());
        Ok(layer)
    }

    #[inline] pub fn len(&self) -> usize { self.shapes.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.shapes.is_empty() }

    #[inline] pub fn crs(&self) -> &Crs { &self.crs }

    #[inline] pub fn shapes(&self) -> &[Option<Geometry<f64>>] { &self.shapes }

    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    /// Reproject every geometry into `crs`.
    pub fn to_crs(&self, crs: &Crs) -> Result<Self> {
        if &self.crs == crs { return Ok(self.clone()) }

        let reprojector = Reprojector::new(&self.crs, crs)?;
        let shapes = self.shapes.iter()
            .map(|shape| shape.as_ref().map(|g| reprojector.geometry(g)).transpose())
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("failed to reproject vector layer from {} to {}", self.crs, crs))?;

        Ok(Self { shapes, data: self.data.clone(), crs: crs.clone() })
    }

    /// Values of an attribute column, numeric when the column is numeric.
    pub fn column_values(&self, name: &str) -> Result<ColumnValues> {
        let column = self.data.column(name)
            .with_context(|| format!("vector layer has no column named '{name}'"))?;

        Ok(if column.dtype().is_primitive_numeric() {
            let column = column.cast(&DataType::Float64)?;
            ColumnValues::Float(column.f64()?.into_iter().collect())
        } else {
            let column = column.cast(&DataType::String)?;
            ColumnValues::Text(column.str()?.into_iter().map(|v| v.map(str::to_string)).collect())
        })
    }
}

fn polygon_length(polygon: &Polygon<f64>) -> f64 {
    Euclidean.length(polygon.exterior())
        + polygon.interiors().iter().map(|ring| Euclidean.length(ring)).sum::<f64>()
}

/// Planar length: line length for lines, perimeter for polygons, zero for points.
pub fn planar_length(geometry: &Geometry<f64>) -> f64 {
    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => 0.0,
        Geometry::Line(l) => Euclidean.length(l),
        Geometry::LineString(ls) => Euclidean.length(ls),
        Geometry::MultiLineString(mls) => Euclidean.length(mls),
        Geometry::Polygon(p) => polygon_length(p),
        Geometry::MultiPolygon(mp) => mp.iter().map(polygon_length).sum(),
        Geometry::Rect(r) => 2.0 * (r.width() + r.height()),
        Geometry::Triangle(t) => polygon_length(&t.to_polygon()),
        Geometry::GeometryCollection(gc) => gc.iter().map(planar_length).sum(),
    }
}
