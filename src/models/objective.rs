use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cells::{Cells, ColumnValues};
use crate::models::PROFIT_COLUMN;

/// Weights of the interactive planning objective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    #[serde(default)]
    pub grid: f64,
    #[serde(default)]
    pub road: f64,
    #[serde(default)]
    pub pop: f64,
}

impl ObjectiveWeights {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open objective weights: {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse objective weights: {}", path.display()))
    }
}

/// Cell attributes the objective reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ObjectiveInputs {
    pub grid_dist: f64,
    pub road_dist: f64,
    pub pop: f64,
}

#[inline]
pub fn objective(props: &ObjectiveInputs, weights: &ObjectiveWeights) -> f64 {
    props.grid_dist * weights.grid + props.road_dist * weights.road + props.pop * weights.pop
}

/// Score every cell with `objective` into the `profit` column.
pub fn apply_objective(cells: &mut Cells, weights: &ObjectiveWeights) -> Result<()> {
    let scores = cells.records::<ObjectiveInputs>()
        .context("objective needs grid_dist, road_dist and pop")?
        .iter()
        .map(|props| Some(objective(props, weights)))
        .collect();
    cells.set_column(PROFIT_COLUMN, ColumnValues::Float(scores))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_sum() {
        let props = ObjectiveInputs { grid_dist: 10.0, road_dist: 2.0, pop: 300.0 };
        let weights = ObjectiveWeights { grid: -1.0, road: -2.0, pop: 0.1 };
        assert!((objective(&props, &weights) - 16.0).abs() < 1e-9);
        assert_eq!(objective(&props, &ObjectiveWeights::default()), 0.0);
    }
}
