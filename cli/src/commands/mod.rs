pub mod enrich;
pub mod extend_grid;
pub mod model;

use std::path::Path;

use anyhow::Result;
use spider::Cells;

/// Write cells as CSV when `path` ends in `.csv`, GeoJSON otherwise.
pub fn write_cells(cells: &Cells, path: &Path) -> Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => cells.write_csv(path),
        _ => cells.write_geojson(path),
    }
}
