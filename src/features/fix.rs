use anyhow::{ensure, Context, Result};

use crate::features::{Fix, NoValue};
use crate::raster::median;

/// Round half to even at `decimals` places, with nulls replaced by 0.
/// Precision beyond what an f64 can scale to leaves values unrounded.
pub fn round_column(values: Vec<Option<f64>>, decimals: u32) -> Vec<Option<f64>> {
    let scale = i32::try_from(decimals).map_or(f64::INFINITY, |d| 10f64.powi(d));
    values.into_iter()
        .map(|value| {
            let value = value.unwrap_or(0.0);
            let scaled = value * scale;
            Some(if scaled.is_finite() { scaled.round_ties_even() / scale } else { value })
        })
        .collect()
}

/// Apply a feature's post-processing: factor, floor, per-capita, then null fill.
pub fn fix_column(mut values: Vec<Option<f64>>, pop: Option<&[Option<f64>]>, fix: &Fix) -> Result<Vec<Option<f64>>> {
    if let Some(factor) = fix.factor.filter(|&factor| factor != 1.0) {
        for value in values.iter_mut().flatten() { *value *= factor }
    }

    if let Some(minimum) = fix.minimum {
        for value in values.iter_mut().flatten() { *value = value.max(minimum) }
    }

    if fix.per_capita {
        let pop = pop.context("Need to calculate Pop before doing per_capita")?;
        ensure!(pop.len() == values.len(), "Pop has {} values for {} cells", pop.len(), values.len());
        values = values.iter().zip(pop)
            .map(|(value, pop)| match (value, pop) {
                (Some(value), Some(pop)) => Some(value / pop).filter(|v| !v.is_nan()),
                _ => None,
            })
            .collect();
    }

    if let Some(NoValue::Median) = fix.no_value {
        let mut present = values.iter().flatten().copied().collect::<Vec<_>>();
        if let Some(median) = median(&mut present) {
            for value in values.iter_mut().filter(|value| value.is_none()) {
                *value = Some(median);
            }
        }
    }

    Ok(values)
}
