use std::{fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

use crate::cells::{Cells, ColumnValues};

/// Column written by `apply_model`.
pub const PROFIT_COLUMN: &str = "profit";

/// Scenario parameters shared by all models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pars {
    pub interest_rate: f64,
    pub num_years: i64,
}

impl Pars {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open model parameters: {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse model parameters: {}", path.display()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelResult {
    pub profit: f64,
}

/// A profit model evaluated independently for each cell ("town").
pub trait Model {
    /// Attributes the model reads from a cell row.
    type Town: DeserializeOwned;

    fn run(town: &Self::Town, pars: &Pars) -> ModelResult;
}

/// Smoke-test model over a single `test` attribute.
pub struct TestModel;

#[derive(Debug, Deserialize)]
pub struct TestTown {
    pub test: f64,
}

impl Model for TestModel {
    type Town = TestTown;

    fn run(town: &TestTown, pars: &Pars) -> ModelResult {
        ModelResult { profit: town.test * pars.interest_rate }
    }
}

/// Households and household electricity access.
pub struct HouseholdModel;

#[derive(Debug, Deserialize)]
pub struct HouseholdTown {
    pub hh: f64,
    pub hh_access: f64,
}

impl Model for HouseholdModel {
    type Town = HouseholdTown;

    fn run(town: &HouseholdTown, pars: &Pars) -> ModelResult {
        ModelResult { profit: town.hh * pars.interest_rate + town.hh_access * pars.num_years as f64 }
    }
}

/// Distance to the existing grid.
pub struct GridDistanceModel;

#[derive(Debug, Deserialize)]
pub struct GridTown {
    pub grid_dist: f64,
}

impl Model for GridDistanceModel {
    type Town = GridTown;

    fn run(town: &GridTown, pars: &Pars) -> ModelResult {
        ModelResult { profit: town.grid_dist * pars.interest_rate + town.grid_dist * pars.num_years as f64 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Test,
    Households,
    GridDistance,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Test => "test",
            ModelKind::Households => "households",
            ModelKind::GridDistance => "grid_distance",
        }
    }
}

impl FromStr for ModelKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "test" => Ok(ModelKind::Test),
            "households" => Ok(ModelKind::Households),
            "grid_distance" => Ok(ModelKind::GridDistance),
            _ => bail!("unknown model '{s}' (expected test, households or grid_distance)"),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn profits<M: Model>(cells: &Cells, pars: &Pars) -> Result<Vec<Option<f64>>> {
    Ok(cells.records::<M::Town>()?.iter()
        .map(|town| Some(M::run(town, pars).profit))
        .collect())
}

/// Evaluate `kind` for every cell and store the result in the `profit` column.
pub fn apply_model(cells: &mut Cells, kind: ModelKind, pars: &Pars) -> Result<()> {
    let profit = match kind {
        ModelKind::Test => profits::<TestModel>(cells, pars),
        ModelKind::Households => profits::<HouseholdModel>(cells, pars),
        ModelKind::GridDistance => profits::<GridDistanceModel>(cells, pars),
    }
    .with_context(|| format!("model '{kind}' failed"))?;

    info!("[models] {kind} evaluated for {} cells", profit.len());
    cells.set_column(PROFIT_COLUMN, ColumnValues::Float(profit))
}
