mod common;

use serde_json::json;
use spider::{apply_model, apply_objective, filter_mask, Cells, Filter, ModelKind, ObjectiveWeights, Pars, PROFIT_COLUMN};
use tempfile::tempdir;

use common::{square, write_polygons};

fn cells(dir: &std::path::Path) -> Cells {
    let path = dir.join("towns.geojson");
    write_polygons(&path, &[
        (square(0.0, 0.0, 1.0), json!({ "hh": 100, "hh_access": 3, "grid_dist": 2, "road_dist": 1, "pop": 50 })),
        (square(1.0, 0.0, 1.0), json!({ "hh": 10, "hh_access": 0, "grid_dist": 40, "road_dist": 5, "pop": 400 })),
        (square(2.0, 0.0, 1.0), json!({ "hh": null, "hh_access": 1, "grid_dist": 0, "road_dist": 0, "pop": 0 })),
    ]);
    Cells::read(&path).unwrap()
}

const PARS: Pars = Pars { interest_rate: 0.5, num_years: 10 };

#[test]
fn grid_distance_model_scores_every_cell() {
    let dir = tempdir().expect("create temp dir");
    let mut cells = cells(dir.path());

    apply_model(&mut cells, ModelKind::GridDistance, &PARS).unwrap();
    assert_eq!(cells.column_f64(PROFIT_COLUMN).unwrap(), vec![Some(21.0), Some(420.0), Some(0.0)]);
}

#[test]
fn missing_field_names_the_row() {
    let dir = tempdir().expect("create temp dir");
    let mut cells = cells(dir.path());

    let err = apply_model(&mut cells, ModelKind::Households, &PARS).unwrap_err();
    assert!(format!("{err:#}").contains("row 2"), "{err:#}");
    assert!(!cells.has_column(PROFIT_COLUMN));

    let err = apply_model(&mut cells, ModelKind::Test, &PARS).unwrap_err();
    assert!(format!("{err:#}").contains("row 0"), "{err:#}");
}

#[test]
fn objective_then_filters() {
    let dir = tempdir().expect("create temp dir");
    let mut cells = cells(dir.path());

    let weights = ObjectiveWeights { grid: -1.0, road: -2.0, pop: 0.1 };
    apply_objective(&mut cells, &weights).unwrap();
    assert_eq!(cells.column_f64(PROFIT_COLUMN).unwrap(), vec![Some(1.0), Some(-10.0), Some(0.0)]);

    let filters = ["pop >= 50", "grid_dist < 40"].map(|f| f.parse::<Filter>().unwrap());
    assert_eq!(filter_mask(&cells, &filters).unwrap(), [true, false, false]);

    let kept = cells.select(&filter_mask(&cells, &filters[..1]).unwrap()).unwrap();
    assert_eq!(kept.len(), 2);

    let unknown = ["elevation > 3".parse::<Filter>().unwrap()];
    assert!(filter_mask(&cells, &unknown).is_err());
}
