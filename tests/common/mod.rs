#![allow(dead_code)]

use std::{fs::File, path::Path};

use serde_json::{json, Value};
use tiff::{encoder::{colortype::Gray32Float, TiffEncoder}, tags::Tag};

/// Closed square ring with lower-left corner `(x, y)`.
pub fn square(x: f64, y: f64, size: f64) -> Value {
    json!([[[x, y], [x + size, y], [x + size, y + size], [x, y + size], [x, y]]])
}

/// Write Polygon features with matching properties as a GeoJSON FeatureCollection.
pub fn write_polygons(path: &Path, polygons: &[(Value, Value)]) {
    let features = polygons.iter()
        .map(|(coordinates, properties)| json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": coordinates },
            "properties": properties,
        }))
        .collect::<Vec<_>>();
    write_json(path, &json!({ "type": "FeatureCollection", "features": features }));
}

pub fn write_lines(path: &Path, lines: &[Value]) {
    let features = lines.iter()
        .map(|coordinates| json!({
            "type": "Feature",
            "geometry": { "type": "LineString", "coordinates": coordinates },
            "properties": {},
        }))
        .collect::<Vec<_>>();
    write_json(path, &json!({ "type": "FeatureCollection", "features": features }));
}

pub fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
}

/// Grid reference of a fixture GeoTIFF.
pub struct Grid {
    pub width: u32,
    pub height: u32,
    /// Upper-left corner.
    pub west: f64,
    pub north: f64,
    /// Square pixel size in CRS units.
    pub pixel: f64,
    pub epsg: u16,
}

/// Single-band north-up float GeoTIFF. `data` is row-major, top row first.
pub fn write_geotiff(path: &Path, data: &[f32], grid: &Grid, nodata: Option<f64>) {
    // GTModelType: 1 = projected, 2 = geographic
    let (model, crs_key) = match grid.epsg {
        4000..=4999 => (2u16, 2048u16),
        _ => (1, 3072),
    };

    let mut encoder = TiffEncoder::new(File::create(path).unwrap()).unwrap();
    let mut image = encoder.new_image::<Gray32Float>(grid.width, grid.height).unwrap();

    let dir = image.encoder();
    dir.write_tag(Tag::from_u16_exhaustive(33550), &[grid.pixel, grid.pixel, 0.0][..]).unwrap();
    dir.write_tag(Tag::from_u16_exhaustive(33922), &[0.0, 0.0, 0.0, grid.west, grid.north, 0.0][..]).unwrap();
    dir.write_tag(Tag::from_u16_exhaustive(34735), &[1u16, 1, 0, 2, 1024, 0, 1, model, crs_key, 0, 1, grid.epsg][..]).unwrap();
    if let Some(nodata) = nodata {
        dir.write_tag(Tag::from_u16_exhaustive(42113), nodata.to_string().as_str()).unwrap();
    }

    image.write_data(data).unwrap();
}

/// 4x4 EPSG:4326 raster of 1 degree pixels over [0, 4] x [0, 4] holding `row * 4 + col`.
pub fn write_ramp(path: &Path) {
    let data = (0..16).map(|v| v as f32).collect::<Vec<_>>();
    let grid = Grid { width: 4, height: 4, west: 0.0, north: 4.0, pixel: 1.0, epsg: 4326 };
    write_geotiff(path, &data, &grid, None);
}
