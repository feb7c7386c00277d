use ahash::AHashSet;
use anyhow::Result;
use polars::prelude::{AnyValue, Column, DataFrame};
use serde_json::{json, Map, Value};

/// Name of the row-index column added to tables that do not carry one.
pub const INDEX_COLUMN: &str = "idx";

/// Build a DataFrame from per-feature JSON properties.
/// Columns appear in order of first use. Numbers become f64, booleans bool,
/// anything else a string. Missing and null values are null.
pub(crate) fn properties_to_dataframe(rows: &[Map<String, Value>]) -> Result<DataFrame> {
    let mut seen = AHashSet::new();
    let names = rows.iter()
        .flat_map(|row| row.keys())
        .filter(|key| seen.insert(key.as_str()))
        .collect::<Vec<_>>();

    let mut columns = Vec::with_capacity(names.len() + 1);
    if !seen.contains(INDEX_COLUMN) {
        columns.push(Column::new(INDEX_COLUMN.into(), (0..rows.len() as u32).collect::<Vec<_>>()));
    }
    for name in names {
        let values = rows.iter()
            .map(|row| row.get(name.as_str()).filter(|value| !value.is_null()))
            .collect::<Vec<_>>();
        columns.push(json_column(name, &values));
    }

    Ok(DataFrame::new(columns)?)
}

fn json_column(name: &str, values: &[Option<&Value>]) -> Column {
    let mut present = values.iter().flatten();
    if present.clone().all(|value| value.is_number()) {
        Column::new(name.into(), values.iter().map(|v| v.and_then(Value::as_f64)).collect::<Vec<_>>())
    } else if present.all(|value| value.is_boolean()) {
        Column::new(name.into(), values.iter().map(|v| v.and_then(Value::as_bool)).collect::<Vec<_>>())
    } else {
        Column::new(
            name.into(),
            values.iter()
                .map(|v| v.map(|value| match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                }))
                .collect::<Vec<_>>(),
        )
    }
}

/// Convert a single polars cell to JSON. Integral floats stay floats; NaN becomes null.
pub(crate) fn any_value_to_json(value: &AnyValue) -> Value {
    if let Some(s) = value.get_str() { return json!(s) }
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => json!(b),
        AnyValue::UInt32(v) => json!(v),
        AnyValue::UInt64(v) => json!(v),
        AnyValue::Int32(v) => json!(v),
        AnyValue::Int64(v) => json!(v),
        AnyValue::Float32(v) => json!(v),
        AnyValue::Float64(v) => json!(v),
        other => Value::String(other.to_string()),
    }
}

/// All values of row `idx` as a JSON object keyed by column name.
pub(crate) fn row_to_json(df: &DataFrame, idx: usize) -> Result<Map<String, Value>> {
    df.get_columns().iter()
        .map(|column| Ok((column.name().to_string(), any_value_to_json(&column.get(idx)?))))
        .collect()
}
