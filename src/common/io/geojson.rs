use std::{fs::File, io::{BufReader, BufWriter}, path::Path};

use anyhow::{bail, Context, Result};
use geo::{Geometry, MultiPolygon};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject};
use serde_json::{json, Map, Value};

use crate::geom::Crs;

/// Features of a GeoJSON file, split into geometries and property objects.
pub(crate) struct GeoJsonFeatures {
    pub geometries: Vec<Option<Geometry<f64>>>,
    pub properties: Vec<Map<String, Value>>,
    pub crs: Crs,
}

/// CRS from the legacy `crs` member; RFC 7946 files are always WGS84.
fn crs_from_members(members: Option<&JsonObject>) -> Result<Crs> {
    let name = members
        .and_then(|m| m.get("crs"))
        .and_then(|crs| crs.pointer("/properties/name"))
        .and_then(Value::as_str);

    match name {
        Some(name) => Crs::parse(name).with_context(|| format!("unsupported GeoJSON crs: {name}")),
        None => Ok(Crs::wgs84()),
    }
}

/// Read a GeoJSON FeatureCollection (or a single Feature) from `path`.
pub(crate) fn read_geojson(path: &Path) -> Result<GeoJsonFeatures> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {}", path.display()))?;
    let geojson = GeoJson::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse GeoJSON: {}", path.display()))?;

    let (features, crs) = match geojson {
        GeoJson::FeatureCollection(fc) => {
            let crs = crs_from_members(fc.foreign_members.as_ref())?;
            (fc.features, crs)
        }
        GeoJson::Feature(feature) => (vec![feature], Crs::wgs84()),
        GeoJson::Geometry(geometry) => (vec![Feature::from(geometry)], Crs::wgs84()),
    };

    let mut geometries = Vec::with_capacity(features.len());
    let mut properties = Vec::with_capacity(features.len());
    for (i, feature) in features.into_iter().enumerate() {
        let geometry = feature.geometry
            .map(Geometry::<f64>::try_from)
            .transpose()
            .with_context(|| format!("Invalid geometry in feature {i} of {}", path.display()))?;
        geometries.push(geometry);
        properties.push(feature.properties.unwrap_or_default());
    }

    Ok(GeoJsonFeatures { geometries, properties, crs })
}

/// Narrow an areal geometry to a MultiPolygon.
pub(crate) fn to_multipolygon(geometry: Geometry<f64>) -> Result<MultiPolygon<f64>> {
    Ok(match geometry {
        Geometry::Polygon(polygon) => MultiPolygon(vec![polygon]),
        Geometry::MultiPolygon(mp) => mp,
        Geometry::Rect(rect) => MultiPolygon(vec![rect.to_polygon()]),
        other => bail!("expected Polygon or MultiPolygon, found {}", geometry_name(&other)),
    })
}

fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Write MultiPolygons with matching property objects as a FeatureCollection.
pub(crate) fn write_geojson(path: &Path, shapes: &[MultiPolygon<f64>], properties: Vec<Map<String, Value>>, crs: &Crs) -> Result<()> {
    let features = shapes.iter().zip(properties)
        .map(|(shape, properties)| {
            let value = match shape.0.as_slice() {
                [polygon] => geojson::Value::from(polygon),
                _ => geojson::Value::from(shape),
            };
            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(value)),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let foreign_members = match crs.epsg() {
        Some(4326) => None,
        Some(code) => Some(JsonObject::from_iter([(
            "crs".to_string(),
            json!({ "type": "name", "properties": { "name": format!("urn:ogc:def:crs:EPSG::{code}") } }),
        )])),
        None => bail!("cannot write GeoJSON in a CRS without an EPSG code: {crs}"),
    };

    let collection = FeatureCollection { bbox: None, features, foreign_members };

    let file = File::create(path)
        .with_context(|| format!("Failed to create GeoJSON file: {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), &collection)
        .with_context(|| format!("Failed to write GeoJSON to {}", path.display()))
}
