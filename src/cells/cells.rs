use anyhow::{ensure, Context, Result};
use polars::prelude::{BooleanChunked, Column, DataFrame, DataType, NewChunkedArray};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::common::io;
use crate::geom::Geometries;

/// Values extracted for one feature column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Float(values) => values.len(),
            ColumnValues::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Numeric view; text columns are an error.
    pub fn into_float(self, name: &str) -> Result<Vec<Option<f64>>> {
        match self {
            ColumnValues::Float(values) => Ok(values),
            ColumnValues::Text(_) => anyhow::bail!("column '{name}' is not numeric"),
        }
    }

    fn into_column(self, name: &str) -> Column {
        match self {
            ColumnValues::Float(values) => Column::new(name.into(), values),
            ColumnValues::Text(values) => Column::new(name.into(), values),
        }
    }
}

/// Hexagonal cells: one shape and one attribute row per cell.
#[derive(Debug, Clone)]
pub struct Cells {
    geoms: Geometries,
    data: DataFrame,
}

impl Cells {
    pub fn new(geoms: Geometries, data: DataFrame) -> Result<Self> {
        ensure!(
            geoms.len() == data.height(),
            "geometry count ({}) does not match attribute rows ({})",
            geoms.len(), data.height()
        );
        Ok(Self { geoms, data })
    }

    #[inline] pub fn len(&self) -> usize { self.geoms.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geoms.is_empty() }

    #[inline] pub fn geoms(&self) -> &Geometries { &self.geoms }

    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    #[inline] pub fn has_column(&self, name: &str) -> bool { self.data.column(name).is_ok() }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.data.get_column_names().iter().map(|name| name.to_string()).collect()
    }

    /// Read a column as f64, with NaN treated as missing.
    pub fn column_f64(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self.data.column(name)
            .with_context(|| format!("no column named '{name}'"))?
            .cast(&DataType::Float64)
            .with_context(|| format!("column '{name}' is not numeric"))?;

        Ok(column.f64()?.into_iter()
            .map(|value| value.filter(|v| !v.is_nan()))
            .collect())
    }

    /// Deserialize every attribute row into `T`. Missing or null fields a
    /// `T` requires are an error naming the row.
    pub fn records<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        (0..self.len())
            .map(|idx| {
                let row = io::row_to_json(&self.data, idx)?;
                serde_json::from_value(Value::Object(row))
                    .with_context(|| format!("invalid attributes in cell row {idx}"))
            })
            .collect()
    }

    /// Keep the cells where `mask` is true, in order.
    pub fn select(&self, mask: &[bool]) -> Result<Self> {
        ensure!(mask.len() == self.len(), "mask has {} values for {} cells", mask.len(), self.len());
        let shapes = self.geoms.shapes().iter().zip(mask)
            .filter_map(|(shape, &keep)| keep.then(|| shape.clone()))
            .collect();
        let data = self.data.filter(&BooleanChunked::from_slice("mask".into(), mask))?;
        Cells::new(Geometries::new(shapes, self.geoms.crs().clone()), data)
    }

    /// Add or replace a column.
    pub fn set_column(&mut self, name: &str, values: ColumnValues) -> Result<()> {
        ensure!(
            values.len() == self.len(),
            "column '{name}' has {} values for {} cells",
            values.len(), self.len()
        );
        self.data.with_column(values.into_column(name))?;
        Ok(())
    }
}
