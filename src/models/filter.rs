use std::{fmt, str::FromStr};

use anyhow::{bail, Context, Result};

use crate::cells::Cells;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
            FilterOp::Eq => "==",
            FilterOp::Ne => "!=",
        }
    }

    #[inline]
    pub fn eval(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            FilterOp::Lt => lhs < rhs,
            FilterOp::Le => lhs <= rhs,
            FilterOp::Gt => lhs > rhs,
            FilterOp::Ge => lhs >= rhs,
            FilterOp::Eq => lhs == rhs,
            FilterOp::Ne => lhs != rhs,
        }
    }
}

impl FromStr for FilterOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "<" => FilterOp::Lt,
            "<=" => FilterOp::Le,
            ">" => FilterOp::Gt,
            ">=" => FilterOp::Ge,
            "==" => FilterOp::Eq,
            "!=" => FilterOp::Ne,
            _ => bail!("unknown filter operator '{s}'"),
        })
    }
}

/// Attribute comparison `var op val`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub var: String,
    pub op: FilterOp,
    pub val: f64,
}

impl Filter {
    /// Missing values never match.
    #[inline]
    pub fn matches(&self, value: Option<f64>) -> bool {
        value.is_some_and(|value| self.op.eval(value, self.val))
    }
}

/// Parses `"var op val"`, e.g. `"pop >= 100"`.
impl FromStr for Filter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts = s.split_whitespace().collect::<Vec<_>>();
        let [var, op, val] = parts.as_slice() else {
            bail!("filter must look like 'var op val', got '{s}'");
        };
        Ok(Filter {
            var: var.to_string(),
            op: op.parse()?,
            val: val.parse().with_context(|| format!("filter value '{val}' is not a number"))?,
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.var, self.op.as_str(), self.val)
    }
}

/// Cells passing every filter.
pub fn filter_mask(cells: &Cells, filters: &[Filter]) -> Result<Vec<bool>> {
    let mut mask = vec![true; cells.len()];
    for filter in filters {
        let values = cells.column_f64(&filter.var)
            .with_context(|| format!("cannot apply filter '{filter}'"))?;
        for (keep, value) in mask.iter_mut().zip(values) {
            *keep &= filter.matches(value);
        }
    }
    Ok(mask)
}
