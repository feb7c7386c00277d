use std::path::Path;

use anyhow::{Error, Result};
use tracing::{debug, error, info, warn};

use crate::cells::{Cells, ColumnValues};
use crate::common::expand_user;
use crate::features::{add_raster_layer, add_vector_layer, fix_column, round_column, FeatureKind, FeatureSpec};
use crate::geom::Crs;

/// Name of the population column used by `per_capita` fixes.
pub const POP_COLUMN: &str = "Pop";

/// The feature that stopped an enrichment run.
#[derive(Debug)]
pub struct FeatureFailure {
    pub feature: String,
    pub error: Error,
}

/// Outcome of `add_features`.
#[derive(Debug, Default)]
pub struct Enrichment {
    /// Columns computed in this run, in order.
    pub added: Vec<String>,
    /// Features skipped because their column already existed.
    pub skipped: Vec<String>,
    pub failure: Option<FeatureFailure>,
}

impl Enrichment {
    #[inline] pub fn is_complete(&self) -> bool { self.failure.is_none() }
}

/// Compute each feature as a new column of `cells`.
///
/// Features whose column already exists are skipped, so a table saved after
/// a failure can be fed back in to resume. The first failing feature stops
/// the run; columns added before it are kept and the failure is reported.
pub fn add_features(cells: &mut Cells, features: &[FeatureSpec], raster_like: &Path) -> Enrichment {
    let mut report = Enrichment::default();

    for feature in features {
        if cells.has_column(&feature.name) {
            debug!("[features] '{}' already present, skipping", feature.name);
            report.skipped.push(feature.name.clone());
            continue;
        }

        info!("Doing {}", feature.name);
        let result = extract_feature(cells, feature, raster_like)
            .and_then(|values| cells.set_column(&feature.name, values));

        if let Err(err) = result {
            error!("Error: {err:#}");
            warn!("Saving result so far and quitting");
            report.failure = Some(FeatureFailure { feature: feature.name.clone(), error: err });
            return report;
        }
        report.added.push(feature.name.clone());
    }

    report
}

/// Extract, round and fix one feature's values without touching `cells`.
fn extract_feature(cells: &Cells, feature: &FeatureSpec, raster_like: &Path) -> Result<ColumnValues> {
    let file = expand_user(&feature.file);

    let mut values = match feature.kind()? {
        FeatureKind::Raster => {
            let crs = feature.crs.as_deref().map(Crs::parse).transpose()?;
            let stat = feature.operation.parse()?;
            ColumnValues::Float(add_raster_layer(cells, &file, stat, crs.as_ref())?)
        }
        FeatureKind::Vector => {
            add_vector_layer(cells, &file, &feature.operation, raster_like, feature.joined_col.as_deref())?
        }
    };

    if let Some(decimals) = feature.decimals.filter(|&d| d > 0) {
        values = ColumnValues::Float(round_column(values.into_float(&feature.name)?, decimals));
    }

    if let Some(fix) = &feature.fix {
        let pop = match cells.has_column(POP_COLUMN) {
            true => Some(cells.column_f64(POP_COLUMN)?),
            false => None,
        };
        values = ColumnValues::Float(fix_column(values.into_float(&feature.name)?, pop.as_deref(), fix)?);
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use polars::prelude::{Column, DataFrame};

    use crate::geom::Geometries;

    fn cells() -> Cells {
        let cell = MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0), (x: 0.0, y: 0.0),
        ]]);
        let data = DataFrame::new(vec![Column::new("idx".into(), vec![0u32])]).unwrap();
        Cells::new(Geometries::new(vec![cell], Crs::wgs84()), data).unwrap()
    }

    fn feature(name: &str, kind: &str) -> FeatureSpec {
        FeatureSpec {
            name: name.into(),
            kind: kind.into(),
            file: "missing.tif".into(),
            operation: "sum".into(),
            crs: None,
            joined_col: None,
            decimals: None,
            fix: None,
        }
    }

    #[test]
    fn existing_columns_are_skipped() {
        let mut cells = cells();
        let report = add_features(&mut cells, &[feature("idx", "raster")], Path::new("ref.tif"));
        assert!(report.is_complete());
        assert_eq!(report.skipped, vec!["idx".to_string()]);
        assert!(report.added.is_empty());
    }

    #[test]
    fn bad_type_stops_the_run() {
        let mut cells = cells();
        let features = [feature("a", "table"), feature("b", "raster")];
        let report = add_features(&mut cells, &features, Path::new("ref.tif"));

        let failure = report.failure.unwrap();
        assert_eq!(failure.feature, "a");
        assert_eq!(failure.error.to_string(), "Only 'raster' or 'vector' supported for 'type'.");
        assert!(!cells.has_column("a"));
        assert!(!cells.has_column("b"));
    }
}
