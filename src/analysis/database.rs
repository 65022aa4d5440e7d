//! In-memory SQLite sales database.
//!
//! The database lives for as long as the toolkit that owns it. Sample data is
//! generated from a seeded RNG so the same seed always yields the same table.

use crate::error::{ParleyError, Result};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params, params_from_iter, Connection};
use serde_json::{Map, Number, Value};
use std::sync::Mutex;
use tracing::{debug, info, instrument};

pub const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
pub const CATEGORIES: [&str; 4] = ["Electronics", "Clothing", "Books", "Home"];

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sales (
    date TEXT NOT NULL,
    revenue REAL NOT NULL,
    units_sold INTEGER NOT NULL,
    region TEXT NOT NULL,
    product_category TEXT NOT NULL
);
"#;

/// One day of sales.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub revenue: f64,
    pub units_sold: i64,
    pub region: String,
    pub product_category: String,
}

/// Rows and column names returned by an ad-hoc query.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

/// Sales database backed by an in-memory SQLite connection.
pub struct SalesDatabase {
    conn: Mutex<Connection>,
}

impl SalesDatabase {
    /// Create an empty database with the sales schema.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a database holding one generated record per day of 2024.
    #[instrument]
    pub fn with_sample_data(seed: u64) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .ok_or_else(|| ParleyError::InvalidInput("Invalid start date".to_string()))?;
        let end = NaiveDate::from_ymd_opt(2024, 12, 31)
            .ok_or_else(|| ParleyError::InvalidInput("Invalid end date".to_string()))?;

        let db = Self::in_memory()?;
        let records = generate_sample_records(seed, start, end)?;
        let inserted = db.insert(&records)?;
        info!("Loaded {} sample sales records (seed {})", inserted, seed);
        Ok(db)
    }

    /// Insert records in a single transaction.
    pub fn insert(&self, records: &[SalesRecord]) -> Result<usize> {
        self.with_connection(|conn| {
            let tx = conn.unchecked_transaction()?;
            for record in records {
                tx.execute(
                    "INSERT INTO sales (date, revenue, units_sold, region, product_category)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        record.date.format("%Y-%m-%d").to_string(),
                        record.revenue,
                        record.units_sold,
                        record.region,
                        record.product_category,
                    ],
                )?;
            }
            tx.commit()?;
            Ok(records.len())
        })
    }

    /// Run a closure against the locked connection.
    pub fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ParleyError::Tool(format!("Failed to acquire database lock: {}", e)))?;
        f(&conn)
    }

    /// Execute an arbitrary SQL statement and collect its rows.
    pub fn query(&self, sql: &str) -> Result<QueryResult> {
        self.query_with_params(sql, &[])
    }

    /// Execute SQL with positional parameters and collect its rows.
    pub fn query_with_params(&self, sql: &str, params: &[SqlValue]) -> Result<QueryResult> {
        debug!("Executing SQL: {}", sql);
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

            let mut rows = stmt.query(params_from_iter(params.iter()))?;
            let mut collected = Vec::new();
            while let Some(row) = rows.next()? {
                let mut map = Map::new();
                for (i, name) in columns.iter().enumerate() {
                    map.insert(name.clone(), sql_to_json(row.get_ref(i)?));
                }
                collected.push(map);
            }

            Ok(QueryResult {
                columns,
                rows: collected,
            })
        })
    }

    /// Names of the columns of the sales table.
    pub fn columns(&self) -> Result<Vec<String>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('sales')")?;
            let names = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(names)
        })
    }

    /// Resolve a column name the way SQLite does, ignoring ASCII case, and
    /// return its declared spelling.
    pub fn canonical_column(&self, column: &str) -> Result<String> {
        self.columns()?
            .into_iter()
            .find(|c| c.eq_ignore_ascii_case(column))
            .ok_or_else(|| ParleyError::Tool(format!("Unknown column: {}", column)))
    }

    /// Ensure a column exists, returning it quoted for use in SQL.
    pub fn quoted_column(&self, column: &str) -> Result<String> {
        Ok(format!("\"{}\"", self.canonical_column(column)?))
    }

    /// All values of one column, in table order.
    pub fn column_values(&self, column: &str) -> Result<Vec<SqlValue>> {
        let quoted = self.quoted_column(column)?;
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {} FROM sales", quoted))?;
            let values = stmt
                .query_map([], |row| row.get::<_, SqlValue>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(values)
        })
    }

    pub fn row_count(&self) -> Result<i64> {
        self.with_connection(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM sales", [], |row| row.get(0))?)
        })
    }
}

/// Convert a SQLite value into JSON.
pub fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(format!("<blob {} bytes>", bytes.len())),
    }
}

/// Generate one record per day in `start..=end`.
///
/// revenue ~ Normal(10000, 2000), units_sold ~ Poisson(100), region and
/// category uniform.
pub fn generate_sample_records(
    seed: u64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<SalesRecord>> {
    let revenue = Normal::<f64>::new(10_000.0, 2_000.0)
        .map_err(|e| ParleyError::InvalidInput(format!("Invalid revenue distribution: {}", e)))?;
    let units = Poisson::<f64>::new(100.0)
        .map_err(|e| ParleyError::InvalidInput(format!("Invalid units distribution: {}", e)))?;
    let mut rng = StdRng::seed_from_u64(seed);

    Ok(start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| SalesRecord {
            date,
            revenue: revenue.sample(&mut rng),
            units_sold: units.sample(&mut rng) as i64,
            region: REGIONS[rng.gen_range(0..REGIONS.len())].to_string(),
            product_category: CATEGORIES[rng.gen_range(0..CATEGORIES.len())].to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, revenue: f64, units: i64, region: &str, category: &str) -> SalesRecord {
        SalesRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            revenue,
            units_sold: units,
            region: region.to_string(),
            product_category: category.to_string(),
        }
    }

    #[test]
    fn test_sample_data_covers_2024() {
        let db = SalesDatabase::with_sample_data(42).unwrap();
        assert_eq!(db.row_count().unwrap(), 366);

        let result = db.query("SELECT MIN(date) AS first, MAX(date) AS last FROM sales").unwrap();
        assert_eq!(result.rows[0]["first"], Value::from("2024-01-01"));
        assert_eq!(result.rows[0]["last"], Value::from("2024-12-31"));
    }

    #[test]
    fn test_sample_data_is_deterministic() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let a = generate_sample_records(7, start, end).unwrap();
        let b = generate_sample_records(7, start, end).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 31);
        assert!(a.iter().all(|r| REGIONS.contains(&r.region.as_str())));
        assert!(a.iter().all(|r| CATEGORIES.contains(&r.product_category.as_str())));
    }

    #[test]
    fn test_sample_distributions_are_plausible() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let records = generate_sample_records(1, start, end).unwrap();
        let n = records.len() as f64;
        let mean_revenue = records.iter().map(|r| r.revenue).sum::<f64>() / n;
        let mean_units = records.iter().map(|r| r.units_sold as f64).sum::<f64>() / n;
        assert!((9_000.0..11_000.0).contains(&mean_revenue));
        assert!((90.0..110.0).contains(&mean_units));
    }

    #[test]
    fn test_query_returns_columns_and_rows() {
        let db = SalesDatabase::in_memory().unwrap();
        db.insert(&[
            record("2024-01-01", 100.5, 3, "North", "Books"),
            record("2024-01-02", 200.0, 4, "South", "Home"),
        ])
        .unwrap();

        let result = db
            .query("SELECT region, units_sold FROM sales ORDER BY date")
            .unwrap();
        assert_eq!(result.columns, vec!["region", "units_sold"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1]["region"], Value::from("South"));
        assert_eq!(result.rows[1]["units_sold"], Value::from(4));
    }

    #[test]
    fn test_query_with_params() {
        let db = SalesDatabase::in_memory().unwrap();
        db.insert(&[
            record("2024-01-01", 1.0, 1, "North", "Books"),
            record("2024-01-02", 2.0, 2, "West", "Books"),
        ])
        .unwrap();

        let result = db
            .query_with_params(
                "SELECT date FROM sales WHERE region = ?1",
                &[SqlValue::Text("West".to_string())],
            )
            .unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0]["date"], Value::from("2024-01-02"));
    }

    #[test]
    fn test_bad_sql_is_database_error() {
        let db = SalesDatabase::in_memory().unwrap();
        let err = db.query("SELECT nope FROM nowhere").unwrap_err();
        assert!(matches!(err, ParleyError::Database(_)));
    }

    #[test]
    fn test_column_names_ignore_case() {
        let db = SalesDatabase::in_memory().unwrap();
        assert_eq!(db.canonical_column("Revenue").unwrap(), "revenue");
        assert_eq!(db.quoted_column("UNITS_SOLD").unwrap(), "\"units_sold\"");
        assert!(db.canonical_column("revenues").is_err());
    }

    #[test]
    fn test_unknown_column_rejected() {
        let db = SalesDatabase::in_memory().unwrap();
        assert_eq!(
            db.columns().unwrap(),
            vec!["date", "revenue", "units_sold", "region", "product_category"]
        );
        let err = db.column_values("revenue; DROP TABLE sales").unwrap_err();
        assert_eq!(err.to_string(), "Tool error: Unknown column: revenue; DROP TABLE sales");
    }
}
