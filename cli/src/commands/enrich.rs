use anyhow::Result;
use spider::{add_features, expand_user, Cells, FeatureSpec};
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::EnrichArgs) -> Result<()> {
    let mut cells = Cells::read(&expand_user(&args.cells))?;
    let features = FeatureSpec::load_all(&expand_user(&args.features))?;
    info!("[enrich] {} features for {} cells", features.len(), cells.len());

    let report = add_features(&mut cells, &features, &expand_user(&args.raster_like));
    info!("[enrich] added {:?}, skipped {:?}", report.added, report.skipped);

    cells.write_geojson(&args.output)?;
    if let Some(csv) = &args.csv {
        cells.write_csv(csv)?;
    }

    match report.failure {
        Some(failure) => Err(failure.error.context(format!(
            "feature '{}' failed; partial results written to {}",
            failure.feature, args.output.display()
        ))),
        None => Ok(()),
    }
}
