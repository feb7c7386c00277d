mod common;

use serde_json::{json, Value};
use spider::{Cells, ColumnValues, Crs, Raster, RasterMeta, VectorLayer};
use tempfile::tempdir;

use common::{square, write_geotiff, write_json, write_polygons, Grid};

#[test]
fn cells_round_trip_through_geojson() {
    let dir = tempdir().expect("create temp dir");
    let input = dir.path().join("cells.geojson");
    write_polygons(&input, &[
        (square(0.0, 0.0, 1.0), json!({ "hh": 12, "label": "a" })),
        (square(1.0, 0.0, 1.0), json!({ "hh": 3.5, "label": null })),
    ]);

    let mut cells = Cells::read(&input).unwrap();
    assert_eq!(cells.len(), 2);
    assert_eq!(cells.column_names(), ["idx", "hh", "label"]);
    cells.set_column("score", ColumnValues::Float(vec![Some(1.0), None])).unwrap();

    let output = dir.path().join("out.geojson");
    cells.write_geojson(&output).unwrap();

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["type"], "FeatureCollection");
    assert!(written.get("crs").is_none());
    assert_eq!(written["features"][0]["geometry"]["type"], "Polygon");
    assert_eq!(written["features"][0]["properties"]["hh"], json!(12.0));
    assert_eq!(written["features"][1]["properties"]["score"], Value::Null);

    let reread = Cells::read(&output).unwrap();
    assert_eq!(reread.column_f64("score").unwrap(), vec![Some(1.0), None]);
    assert_eq!(reread.geoms().shapes(), cells.geoms().shapes());
}

#[test]
fn cells_write_csv_without_geometry() {
    let dir = tempdir().expect("create temp dir");
    let input = dir.path().join("cells.geojson");
    write_polygons(&input, &[(square(0.0, 0.0, 1.0), json!({ "Pop": 7 }))]);

    let output = dir.path().join("cells.csv");
    Cells::read(&input).unwrap().write_csv(&output).unwrap();

    let text = std::fs::read_to_string(&output).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(header, "idx,Pop");
}

#[test]
fn legacy_crs_member_is_honoured() {
    let dir = tempdir().expect("create temp dir");
    let input = dir.path().join("utm.geojson");
    write_json(&input, &json!({
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:EPSG::32735" } },
        "features": [{
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": square(500000.0, 8000000.0, 1000.0) },
            "properties": {},
        }],
    }));

    let cells = Cells::read(&input).unwrap();
    assert_eq!(cells.geoms().crs().epsg(), Some(32735));

    // Writing keeps the CRS member
    let output = dir.path().join("out.geojson");
    cells.write_geojson(&output).unwrap();
    let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["crs"]["properties"]["name"], "urn:ogc:def:crs:EPSG::32735");
}

#[test]
fn non_polygon_cells_are_rejected() {
    let dir = tempdir().expect("create temp dir");
    let input = dir.path().join("points.geojson");
    write_json(&input, &json!({
        "type": "FeatureCollection",
        "features": [{ "type": "Feature", "geometry": { "type": "Point", "coordinates": [1.0, 2.0] }, "properties": {} }],
    }));
    assert!(Cells::read(&input).is_err());
    assert!(Cells::read(&dir.path().join("absent.geojson")).is_err());
}

#[test]
fn vector_layer_keeps_attribute_types() {
    let dir = tempdir().expect("create temp dir");
    let input = dir.path().join("regions.geojson");
    write_polygons(&input, &[
        (square(0.0, 0.0, 1.0), json!({ "name": "a", "code": 4 })),
        (square(1.0, 0.0, 1.0), json!({ "name": "b", "code": null })),
    ]);

    let layer = VectorLayer::read(&input).unwrap();
    assert_eq!(layer.len(), 2);
    assert_eq!(layer.crs(), &Crs::wgs84());
    assert_eq!(layer.column_values("code").unwrap(), ColumnValues::Float(vec![Some(4.0), None]));
    assert_eq!(
        layer.column_values("name").unwrap(),
        ColumnValues::Text(vec![Some("a".into()), Some("b".into())])
    );
    assert!(layer.column_values("missing").is_err());
    assert!(VectorLayer::read(&dir.path().join("layer.kml")).is_err());
}

#[test]
fn geotiff_metadata_and_pixels() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("small.tif");
    let grid = Grid { width: 3, height: 2, west: 10.0, north: 20.0, pixel: 1.0, epsg: 4326 };
    write_geotiff(&path, &[1.0, 2.0, 3.0, -9999.0, 5.0, 6.0], &grid, Some(-9999.0));

    let meta = RasterMeta::read(&path).unwrap();
    assert_eq!(meta.shape(), (2, 3));
    assert_eq!(meta.crs, Some(Crs::wgs84()));
    assert_eq!(meta.nodata, Some(-9999.0));
    assert_eq!((meta.transform.c, meta.transform.f), (10.0, 20.0));
    assert_eq!((meta.transform.a, meta.transform.e), (1.0, -1.0));

    let raster = Raster::read(&path).unwrap();
    assert_eq!(raster.data[[0, 2]], 3.0);
    assert_eq!(raster.data[[1, 0]], -9999.0);
    assert!(!raster.is_valid(raster.data[[1, 0]]));
}

/// Two unit-square regions written as a shapefile; the first has a hole.
fn write_regions_shapefile(path: &std::path::Path) {
    use shapefile::{
        dbase::{FieldName, FieldValue, Record, TableWriterBuilder},
        Point, Polygon, PolygonRing,
    };

    let ring = |pts: &[(f64, f64)]| pts.iter().map(|&(x, y)| Point::new(x, y)).collect::<Vec<_>>();
    let table = TableWriterBuilder::new()
        .add_character_field(FieldName::try_from("name").unwrap(), 20)
        .add_numeric_field(FieldName::try_from("code").unwrap(), 10, 0);
    let mut writer = shapefile::Writer::from_path(path, table).unwrap();

    let shapes = [
        Polygon::with_rings(vec![
            PolygonRing::Outer(ring(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0), (0.0, 0.0)])),
            PolygonRing::Inner(ring(&[(0.5, 0.5), (1.5, 0.5), (1.5, 1.5), (0.5, 1.5), (0.5, 0.5)])),
        ]),
        Polygon::new(PolygonRing::Outer(ring(&[(2.0, 0.0), (2.0, 2.0), (4.0, 2.0), (4.0, 0.0), (2.0, 0.0)]))),
    ];
    for (shape, (name, code)) in shapes.iter().zip([("west", 1.0), ("east", 2.0)]) {
        let mut record = Record::default();
        record.insert("name".to_string(), FieldValue::Character(Some(name.to_string())));
        record.insert("code".to_string(), FieldValue::Numeric(Some(code)));
        writer.write_shape_and_record(shape, &record).unwrap();
    }
}

#[test]
fn shapefile_layer_with_projection_sidecar() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("regions.shp");
    write_regions_shapefile(&path);
    std::fs::write(
        path.with_extension("prj"),
        r#"PROJCS["WGS 84 / UTM zone 35S",GEOGCS["WGS 84",AUTHORITY["EPSG","4326"]],UNIT["metre",1],AUTHORITY["EPSG","32735"]]"#,
    ).unwrap();

    let layer = VectorLayer::read(&path).unwrap();
    assert_eq!(layer.crs().epsg(), Some(32735));
    assert_eq!(layer.len(), 2);
    assert_eq!(
        layer.column_values("name").unwrap(),
        ColumnValues::Text(vec![Some("west".into()), Some("east".into())])
    );
    assert_eq!(layer.column_values("code").unwrap(), ColumnValues::Float(vec![Some(1.0), Some(2.0)]));

    // The inner ring stays a hole of the first polygon
    let Some(geo::Geometry::MultiPolygon(west)) = &layer.shapes()[0] else {
        panic!("expected a polygon, got {:?}", layer.shapes()[0]);
    };
    assert_eq!(west.0.len(), 1);
    assert_eq!(west.0[0].interiors().len(), 1);
}

#[test]
fn shapefile_without_prj_is_wgs84() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("regions.shp");
    write_regions_shapefile(&path);

    let layer = VectorLayer::read(&path).unwrap();
    assert_eq!(layer.crs(), &Crs::wgs84());

    // Joinable like any GeoJSON layer
    let cells_path = dir.path().join("cells.geojson");
    write_polygons(&cells_path, &[
        (square(0.2, 0.2, 0.2), json!({})),
        (square(3.0, 1.0, 0.5), json!({})),
    ]);
    let mut cells = Cells::read(&cells_path).unwrap();
    let specs: Vec<spider::FeatureSpec> = serde_json::from_value(json!([
        { "name": "code", "type": "vector", "file": path, "operation": "sjoin", "joined_col": "code" },
    ])).unwrap();
    let report = spider::add_features(&mut cells, &specs, &path);
    assert!(report.is_complete(), "{:?}", report.failure);
    assert_eq!(cells.column_f64("code").unwrap(), vec![Some(1.0), Some(2.0)]);
}
