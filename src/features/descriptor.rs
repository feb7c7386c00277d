use std::{fs::File, io::BufReader, path::{Path, PathBuf}};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Where a feature's values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Raster,
    Vector,
}

/// Missing-value strategy applied after the other fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoValue {
    Median,
}

/// Post-processing applied to an extracted column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fix {
    /// Multiply values by this factor.
    #[serde(default)]
    pub factor: Option<f64>,
    /// Clip values below this threshold.
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub no_value: Option<NoValue>,
    /// Divide values by the cell's `Pop`.
    #[serde(default)]
    pub per_capita: bool,
}

/// One feature column to compute for every cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureSpec {
    /// Output column name.
    pub name: String,
    /// "raster" or "vector".
    #[serde(rename = "type")]
    pub kind: String,
    /// Source dataset; a leading `~` is expanded.
    pub file: PathBuf,
    /// Raster: zonal statistic ("sum", "mean", "max", ...). Vector: "sjoin" or "distance".
    pub operation: String,
    /// Raster CRS override, for files that report none or the wrong one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
    /// Vector column to pull with "sjoin".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_col: Option<String>,
    /// Round to this many decimals (nulls become 0). Zero disables rounding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<Fix>,
}

impl FeatureSpec {
    pub fn kind(&self) -> Result<FeatureKind> {
        match self.kind.as_str() {
            "raster" => Ok(FeatureKind::Raster),
            "vector" => Ok(FeatureKind::Vector),
            _ => bail!("Only 'raster' or 'vector' supported for 'type'."),
        }
    }

    /// Load a JSON array of feature descriptors.
    pub fn load_all(path: &Path) -> Result<Vec<FeatureSpec>> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open feature list: {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse feature list: {}", path.display()))
    }
}
