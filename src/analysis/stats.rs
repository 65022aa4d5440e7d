//! Descriptive statistics over a single column.

use crate::error::{ParleyError, Result};
use rusqlite::types::Value as SqlValue;
use serde::{Deserialize, Serialize};

/// Supported statistical operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    Mean,
    Median,
    Std,
    Min,
    Max,
    Sum,
    Count,
}

impl Statistic {
    pub const ALL: [Statistic; 7] = [
        Statistic::Mean,
        Statistic::Median,
        Statistic::Std,
        Statistic::Min,
        Statistic::Max,
        Statistic::Sum,
        Statistic::Count,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::Std => "std",
            Statistic::Min => "min",
            Statistic::Max => "max",
            Statistic::Sum => "sum",
            Statistic::Count => "count",
        }
    }

    /// Compute the statistic. `None` means there was nothing to compute over.
    pub fn compute(&self, values: &[SqlValue]) -> Result<Option<f64>> {
        let result = match self {
            Statistic::Count => {
                let non_null = values.iter().filter(|v| !matches!(v, SqlValue::Null)).count();
                Some(non_null as f64)
            }
            Statistic::Mean => mean(&numeric_values(values)?),
            Statistic::Median => median(numeric_values(values)?),
            Statistic::Std => sample_std(&numeric_values(values)?),
            Statistic::Min => numeric_values(values)?.into_iter().reduce(f64::min),
            Statistic::Max => numeric_values(values)?.into_iter().reduce(f64::max),
            Statistic::Sum => numeric_values(values)?.into_iter().reduce(|a, b| a + b),
        };
        Ok(result)
    }
}

impl std::str::FromStr for Statistic {
    type Err = ParleyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Statistic::ALL
            .into_iter()
            .find(|op| op.as_str() == lowered)
            .ok_or_else(|| ParleyError::Tool(format!("Unknown operation: {}", s)))
    }
}

impl std::fmt::Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Nulls are skipped; any text or blob value makes the column non-numeric.
fn numeric_values(values: &[SqlValue]) -> Result<Vec<f64>> {
    let mut numbers = Vec::with_capacity(values.len());
    for value in values {
        match value {
            SqlValue::Null => {}
            SqlValue::Integer(i) => numbers.push(*i as f64),
            SqlValue::Real(f) => numbers.push(*f),
            SqlValue::Text(_) | SqlValue::Blob(_) => {
                return Err(ParleyError::Tool(
                    "Column is not numeric; only 'count' applies to it".to_string(),
                ))
            }
        }
    }
    Ok(numbers)
}

fn mean(numbers: &[f64]) -> Option<f64> {
    if numbers.is_empty() {
        return None;
    }
    Some(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

fn median(mut numbers: Vec<f64>) -> Option<f64> {
    if numbers.is_empty() {
        return None;
    }
    numbers.sort_by(f64::total_cmp);
    let mid = numbers.len() / 2;
    if numbers.len() % 2 == 0 {
        Some((numbers[mid - 1] + numbers[mid]) / 2.0)
    } else {
        Some(numbers[mid])
    }
}

// Sample standard deviation (n - 1 denominator); undefined below two values.
fn sample_std(numbers: &[f64]) -> Option<f64> {
    if numbers.len() < 2 {
        return None;
    }
    let n = numbers.len() as f64;
    let mean = numbers.iter().sum::<f64>() / n;
    let variance = numbers.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}
