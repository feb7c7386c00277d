use std::{fs, path::Path, sync::LazyLock};

use anyhow::{bail, Context, Result};
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use regex::Regex;
use serde_json::{json, Map, Value};
use shapefile::{self as shp, dbase::FieldValue, PolygonRing, Shape};
use tracing::warn;

use crate::geom::Crs;

/// Planar access to the x/y of any shapefile point flavour.
trait Xy {
    fn coord(&self) -> Coord<f64>;
}

impl Xy for shp::Point {
    fn coord(&self) -> Coord<f64> { Coord { x: self.x, y: self.y } }
}

impl Xy for shp::PointM {
    fn coord(&self) -> Coord<f64> { Coord { x: self.x, y: self.y } }
}

impl Xy for shp::PointZ {
    fn coord(&self) -> Coord<f64> { Coord { x: self.x, y: self.y } }
}

fn line<P: Xy>(points: &[P]) -> LineString<f64> {
    LineString(points.iter().map(Xy::coord).collect())
}

/// Ensure first and last are the same for ring coords.
fn ring<P: Xy>(points: &[P]) -> LineString<f64> {
    let mut ls = line(points);
    ls.close();
    ls
}

/// Group rings in Shapefile order: each outer ring followed by its holes.
fn polygon_rings<P: Xy>(rings: &[PolygonRing<P>]) -> MultiPolygon<f64> {
    let mut polys = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes = Vec::new();

    for r in rings {
        match r {
            PolygonRing::Outer(points) => {
                if let Some(ext) = current_exterior.take() {
                    polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
                }
                current_exterior = Some(ring(points));
            }
            PolygonRing::Inner(points) => current_holes.push(ring(points)),
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(Polygon::new(ext, current_holes));
    }

    MultiPolygon(polys)
}

fn multipoint<P: Xy>(points: &[P]) -> MultiPoint<f64> {
    MultiPoint(points.iter().map(|p| Point(p.coord())).collect())
}

fn polyline<P: Xy>(parts: &[Vec<P>]) -> MultiLineString<f64> {
    MultiLineString(parts.iter().map(|part| line(part)).collect())
}

/// Convert a shapefile shape into a 2D geo Geometry (M and Z are dropped).
pub(crate) fn shape_to_geometry(shape: Shape) -> Result<Option<Geometry<f64>>> {
    Ok(Some(match shape {
        Shape::NullShape => return Ok(None),
        Shape::Point(p) => Point(p.coord()).into(),
        Shape::PointM(p) => Point(p.coord()).into(),
        Shape::PointZ(p) => Point(p.coord()).into(),
        Shape::Multipoint(mp) => multipoint(mp.points()).into(),
        Shape::MultipointM(mp) => multipoint(mp.points()).into(),
        Shape::MultipointZ(mp) => multipoint(mp.points()).into(),
        Shape::Polyline(pl) => polyline(pl.parts()).into(),
        Shape::PolylineM(pl) => polyline(pl.parts()).into(),
        Shape::PolylineZ(pl) => polyline(pl.parts()).into(),
        Shape::Polygon(pg) => polygon_rings(pg.rings()).into(),
        Shape::PolygonM(pg) => polygon_rings(pg.rings()).into(),
        Shape::PolygonZ(pg) => polygon_rings(pg.rings()).into(),
        other => bail!("unsupported shape type: {:?}", other.shapetype()),
    }))
}

fn field_to_json(value: FieldValue) -> Value {
    match value {
        FieldValue::Character(s) => s.map_or(Value::Null, |s| json!(s.trim())),
        FieldValue::Numeric(n) => json!(n),
        FieldValue::Float(f) => json!(f),
        FieldValue::Integer(i) => json!(i),
        FieldValue::Double(d) => json!(d),
        FieldValue::Currency(c) => json!(c),
        FieldValue::Logical(b) => json!(b),
        FieldValue::Memo(s) => json!(s),
        other => json!(format!("{other:?}")),
    }
}

/// Reads all shapes + attribute records (as JSON objects) from a `.shp` path.
pub(crate) fn read_shapefile(path: &Path) -> Result<Vec<(Option<Geometry<f64>>, Map<String, Value>)>> {
    let mut reader = shp::Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut items = Vec::with_capacity(reader.shape_count()?);
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("Error reading shape+record")?;
        let properties = record.into_iter()
            .map(|(field, value)| (field, field_to_json(value)))
            .collect();
        items.push((shape_to_geometry(shape)?, properties));
    }
    Ok(items)
}

static AUTHORITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:AUTHORITY|ID)\[\s*"EPSG"\s*,\s*"?(\d+)"?\s*\]"#).expect("valid regex")
});

/// Best-effort CRS from WKT: the last EPSG authority is the outermost CRS.
pub(crate) fn crs_from_wkt(wkt: &str) -> Result<Option<Crs>> {
    if let Some(code) = AUTHORITY.captures_iter(wkt).last().and_then(|c| c[1].parse::<u32>().ok()) {
        return Crs::from_epsg(code).map(Some);
    }
    let upper = wkt.to_ascii_uppercase();
    if upper.starts_with("GEOGCS") && (upper.contains("WGS_1984") || upper.contains("WGS 84")) {
        return Ok(Some(Crs::wgs84()));
    }
    Ok(None)
}

/// CRS of a shapefile from its sidecar `.prj`. Missing `.prj` means WGS84.
pub(crate) fn crs_from_shapefile(path: &Path) -> Result<Crs> {
    let prj = path.with_extension("prj");
    if !prj.exists() {
        warn!("[shp] no .prj next to {}; assuming EPSG:4326", path.display());
        return Ok(Crs::wgs84());
    }

    let wkt = fs::read_to_string(&prj)
        .with_context(|| format!("Failed to read {}", prj.display()))?;
    match crs_from_wkt(&wkt)? {
        Some(crs) => Ok(crs),
        None => bail!("could not determine an EPSG code from {}", prj.display()),
    }
}
