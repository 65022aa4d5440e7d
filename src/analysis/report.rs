//! Summary and trend reports over the sales table.

use super::database::SalesDatabase;
use crate::error::{ParleyError, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Kinds of report the toolkit can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Summary,
    Trends,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Summary => "summary",
            ReportType::Trends => "trends",
        }
    }
}

impl std::str::FromStr for ReportType {
    type Err = ParleyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "summary" => Ok(ReportType::Summary),
            "trends" => Ok(ReportType::Trends),
            other => Err(ParleyError::Tool(format!("Unknown report type: {}", other))),
        }
    }
}

/// A WHERE clause with its bound parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterClause {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl FilterClause {
    /// Build equality conditions joined by AND. Column names are matched
    /// against `known_columns` ignoring case; values are always bound, never inlined.
    pub fn build(filters: &Map<String, Value>, known_columns: &[String]) -> Result<Self> {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        for (key, value) in filters {
            let column = known_columns
                .iter()
                .find(|c| c.eq_ignore_ascii_case(key))
                .ok_or_else(|| ParleyError::Tool(format!("Unknown filter column: {}", key)))?;
            let bound = match value {
                Value::Null => {
                    conditions.push(format!("\"{}\" IS NULL", column));
                    continue;
                }
                Value::String(s) => SqlValue::Text(s.clone()),
                Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => SqlValue::Integer(i),
                    None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
                },
                Value::Array(_) | Value::Object(_) => {
                    return Err(ParleyError::Tool(format!(
                        "Unsupported filter value for '{}': expected a scalar",
                        column
                    )))
                }
            };
            params.push(bound);
            conditions.push(format!("\"{}\" = ?{}", column, params.len()));
        }

        let sql = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        Ok(Self { sql, params })
    }
}

/// Generate a report payload, optionally restricted by equality filters.
pub fn generate(
    db: &SalesDatabase,
    report_type: ReportType,
    filters: Option<&Map<String, Value>>,
) -> Result<Value> {
    let clause = match filters {
        Some(filters) => FilterClause::build(filters, &db.columns()?)?,
        None => FilterClause::default(),
    };

    db.with_connection(|conn| match report_type {
        ReportType::Summary => summary(conn, &clause),
        ReportType::Trends => trends(conn, &clause),
    })
}

fn summary(conn: &Connection, clause: &FilterClause) -> Result<Value> {
    let (rows, total_revenue, total_units, avg_revenue, first_date, last_date): (
        i64,
        Option<f64>,
        Option<i64>,
        Option<f64>,
        Option<String>,
        Option<String>,
    ) = conn.query_row(
        &format!(
            "SELECT COUNT(*), SUM(revenue), SUM(units_sold), AVG(revenue), MIN(date), MAX(date)
             FROM sales{}",
            clause.sql
        ),
        params_from_iter(clause.params.iter()),
        |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        },
    )?;

    if rows == 0 {
        return Err(ParleyError::Tool("No rows match the given filters".to_string()));
    }

    let top_region = top_by_revenue(conn, clause, "region")?;
    let top_category = top_by_revenue(conn, clause, "product_category")?;

    Ok(json!({
        "total_revenue": total_revenue,
        "total_units": total_units,
        "avg_revenue_per_day": avg_revenue,
        "top_region": top_region,
        "top_category": top_category,
        "date_range": format!(
            "{} to {}",
            first_date.unwrap_or_default(),
            last_date.unwrap_or_default()
        ),
    }))
}

fn top_by_revenue(conn: &Connection, clause: &FilterClause, column: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {col} FROM sales{filter} GROUP BY {col} ORDER BY SUM(revenue) DESC, {col} ASC LIMIT 1",
        col = column,
        filter = clause.sql
    ))?;
    let mut rows = stmt.query(params_from_iter(clause.params.iter()))?;
    match rows.next()? {
        Some(row) => Ok(row.get(0)?),
        None => Ok(None),
    }
}

fn trends(conn: &Connection, clause: &FilterClause) -> Result<Value> {
    let mut stmt = conn.prepare(&format!(
        "SELECT substr(date, 1, 7) AS month, SUM(revenue), SUM(units_sold)
         FROM sales{} GROUP BY month ORDER BY month",
        clause.sql
    ))?;
    let months = stmt
        .query_map(params_from_iter(clause.params.iter()), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let (first, last) = match (months.first(), months.last()) {
        (Some(first), Some(last)) => (first.1, last.1),
        _ => return Err(ParleyError::Tool("No rows match the given filters".to_string())),
    };

    let growth_rate = if first == 0.0 {
        None
    } else {
        Some((last - first) / first * 100.0)
    };

    let monthly: Vec<Value> = months
        .iter()
        .map(|(month, revenue, units)| {
            json!({
                "month": month,
                "revenue": revenue,
                "units_sold": units,
            })
        })
        .collect();

    Ok(json!({
        "monthly_trends": monthly,
        "growth_rate": growth_rate,
    }))
}
