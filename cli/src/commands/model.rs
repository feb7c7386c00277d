use anyhow::{bail, Result};
use spider::{apply_model, apply_objective, expand_user, filter_mask, Cells, Filter, ModelKind, ObjectiveWeights, Pars};
use tracing::info;

use crate::commands::write_cells;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ModelArgs) -> Result<()> {
    let filters = args.filters.iter()
        .map(|f| f.parse::<Filter>())
        .collect::<Result<Vec<_>>>()?;

    let mut cells = Cells::read(&expand_user(&args.cells))?;

    match (&args.model, &args.objective, &args.pars) {
        (Some(name), _, Some(pars)) => {
            let kind = name.parse::<ModelKind>()?;
            apply_model(&mut cells, kind, &Pars::load(&expand_user(pars))?)?;
        }
        (None, Some(weights), _) => {
            apply_objective(&mut cells, &ObjectiveWeights::load(&expand_user(weights))?)?;
        }
        _ => bail!("pass --model with --pars, or --objective"),
    }

    if !filters.is_empty() {
        let mask = filter_mask(&cells, &filters)?;
        cells = cells.select(&mask)?;
        info!("[model] {} cells pass {} filters", cells.len(), filters.len());
    }

    write_cells(&cells, &args.output)
}
