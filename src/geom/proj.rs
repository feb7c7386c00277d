use anyhow::{Context, Result};
use geo::{Coord, MapCoords};
use proj4rs::{proj::Proj, transform::transform};

use crate::geom::{Crs, Geometries};

/// A reusable source -> target CRS transformation.
pub(crate) struct Reprojector {
    from: Proj,
    to: Proj,
    from_geographic: bool,
    to_geographic: bool,
    identity: bool,
}

impl Reprojector {
    pub(crate) fn new(from: &Crs, to: &Crs) -> Result<Self> {
        Ok(Self {
            from: from.to_proj()?,
            to: to.to_proj()?,
            from_geographic: from.is_geographic(),
            to_geographic: to.is_geographic(),
            identity: from == to,
        })
    }

    /// Transform a single coordinate. Degrees in/out for geographic CRSs.
    pub(crate) fn coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        if self.identity { return Ok(coord) }

        let mut point = if self.from_geographic {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };
        transform(&self.from, &self.to, &mut point)
            .with_context(|| format!("CRS transform failed for ({}, {})", coord.x, coord.y))?;

        Ok(if self.to_geographic {
            Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
        } else {
            Coord { x: point.0, y: point.1 }
        })
    }

    /// Transform every coordinate of a geometry.
    pub(crate) fn geometry<G>(&self, geometry: &G) -> Result<G::Output>
    where
        G: MapCoords<f64, f64>,
    {
        geometry.try_map_coords(|coord| self.coord(coord))
    }
}

/// Reproject a single geometry from one CRS to another.
pub fn reproject<G>(geometry: &G, from: &Crs, to: &Crs) -> Result<G::Output>
where
    G: MapCoords<f64, f64>,
{
    Reprojector::new(from, to)?.geometry(geometry)
}

impl Geometries {
    /// Reproject all shapes into `crs`, keeping order.
    pub fn to_crs(&self, crs: &Crs) -> Result<Geometries> {
        if self.crs() == crs { return Ok(self.clone()) }

        let reprojector = Reprojector::new(self.crs(), crs)?;
        let shapes = self.shapes().iter()
            .map(|shape| reprojector.geometry(shape))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("failed to reproject shapes from {} to {}", self.crs(), crs))?;

        Ok(Geometries::new(shapes, crs.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, Point};

    #[test]
    fn identity_is_exact() {
        let p = Point::new(28.28, -15.41);
        let q = reproject(&p, &Crs::wgs84(), &Crs::wgs84()).unwrap();
        assert_eq!(p, q);
    }

    #[test]
    fn wgs84_to_web_mercator() {
        let mercator = Crs::from_epsg(3857).unwrap();
        let r = Reprojector::new(&Crs::wgs84(), &mercator).unwrap();
        let out = r.coord(coord! { x: 180.0, y: 0.0 }).unwrap();
        assert!((out.x - 20_037_508.34).abs() < 1.0);
        assert!(out.y.abs() < 1e-6);

        let back = Reprojector::new(&mercator, &Crs::wgs84()).unwrap()
            .coord(coord! { x: 1_000_000.0, y: 1_000_000.0 }).unwrap();
        let again = r.coord(back).unwrap();
        assert!((again.x - 1_000_000.0).abs() < 1e-3);
        assert!((again.y - 1_000_000.0).abs() < 1e-3);
    }
}
