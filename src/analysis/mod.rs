//! Data analysis tools over an in-memory sales database.
//!
//! Exposes three tools to the agent: ad-hoc SQL queries, column statistics,
//! and summary/trend reports.

mod database;
mod report;
mod stats;

pub use database::{
    generate_sample_records, QueryResult, SalesDatabase, SalesRecord, CATEGORIES, REGIONS,
};
pub use report::{FilterClause, ReportType};
pub use stats::Statistic;

use crate::agent::{decode_arguments, Resolved, ToolKit, ToolOutcome, ToolSchema};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

pub const QUERY_DATABASE: &str = "query_database";
pub const CALCULATE_STATISTICS: &str = "calculate_statistics";
pub const GENERATE_REPORT: &str = "generate_report";

/// Tools available to the data analysis agent.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisTool {
    QueryDatabase(QueryArgs),
    CalculateStatistics(StatisticsArgs),
    GenerateReport(ReportArgs),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryArgs {
    pub sql_query: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatisticsArgs {
    pub column: String,
    /// Kept as text so an unsupported operation is reported by the tool itself.
    pub operation: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportArgs {
    pub report_type: String,
    #[serde(default)]
    pub filters: Option<Map<String, Value>>,
}

/// Toolkit owning the sales database for the lifetime of the agent.
pub struct AnalysisToolKit {
    db: SalesDatabase,
}

impl AnalysisToolKit {
    pub fn new(db: SalesDatabase) -> Self {
        Self { db }
    }

    /// Create a toolkit over freshly generated sample data.
    pub fn with_sample_data(seed: u64) -> Result<Self> {
        Ok(Self::new(SalesDatabase::with_sample_data(seed)?))
    }

    /// Execute a SQL query and return its rows.
    pub fn query_database(&self, sql_query: &str) -> ToolOutcome {
        ToolOutcome::from_result(self.db.query(sql_query).map(|result| {
            json!({
                "data": result.rows,
                "row_count": result.rows.len(),
                "columns": result.columns,
            })
        }))
    }

    /// Calculate one statistic over one column of the sales table.
    pub fn calculate_statistics(&self, column: &str, operation: &str) -> ToolOutcome {
        let result = operation.parse::<Statistic>().and_then(|statistic| {
            let column = self.db.canonical_column(column)?;
            let values = self.db.column_values(&column)?;
            let value = statistic.compute(&values)?;
            Ok(json!({
                "column": column,
                "operation": operation,
                "result": value,
            }))
        });
        ToolOutcome::from_result(result)
    }

    /// Generate a summary or trends report.
    pub fn generate_report(&self, report_type: &str, filters: Option<&Map<String, Value>>) -> ToolOutcome {
        let result = report_type.parse::<ReportType>().and_then(|kind| {
            let data = report::generate(&self.db, kind, filters)?;
            Ok(json!({
                "report_type": kind.as_str(),
                "data": data,
                "generated_at": chrono::Local::now().to_rfc3339(),
            }))
        });
        ToolOutcome::from_result(result)
    }
}

#[async_trait]
impl ToolKit for AnalysisToolKit {
    type Tool = AnalysisTool;

    fn schemas(&self) -> Vec<ToolSchema> {
        tool_definitions()
    }

    fn resolve(&self, name: &str, arguments: &str) -> Result<Resolved<AnalysisTool>> {
        let tool = match name {
            QUERY_DATABASE => AnalysisTool::QueryDatabase(decode_arguments(arguments)?),
            CALCULATE_STATISTICS => AnalysisTool::CalculateStatistics(decode_arguments(arguments)?),
            GENERATE_REPORT => AnalysisTool::GenerateReport(decode_arguments(arguments)?),
            other => return Ok(Resolved::Unknown(other.to_string())),
        };
        Ok(Resolved::Known(tool))
    }

    async fn invoke(&self, tool: AnalysisTool) -> ToolOutcome {
        debug!("Invoking {:?}", tool);
        match tool {
            AnalysisTool::QueryDatabase(args) => self.query_database(&args.sql_query),
            AnalysisTool::CalculateStatistics(args) => {
                self.calculate_statistics(&args.column, &args.operation)
            }
            AnalysisTool::GenerateReport(args) => {
                self.generate_report(&args.report_type, args.filters.as_ref())
            }
        }
    }
}

/// Schemas for the data analysis tools.
pub fn tool_definitions() -> Vec<ToolSchema> {
    vec![
        ToolSchema::new(
            QUERY_DATABASE,
            "Execute SQL queries on the sales database",
            json!({
                "type": "object",
                "properties": {
                    "sql_query": {
                        "type": "string",
                        "description": "SQL query to execute"
                    }
                },
                "required": ["sql_query"]
            }),
        ),
        ToolSchema::new(
            CALCULATE_STATISTICS,
            "Calculate statistical measures on data columns",
            json!({
                "type": "object",
                "properties": {
                    "column": {
                        "type": "string",
                        "description": "Column name to analyze"
                    },
                    "operation": {
                        "type": "string",
                        "enum": Statistic::ALL.iter().map(Statistic::as_str).collect::<Vec<_>>(),
                        "description": "Statistical operation to perform"
                    }
                },
                "required": ["column", "operation"]
            }),
        ),
        ToolSchema::new(
            GENERATE_REPORT,
            "Generate analytical reports",
            json!({
                "type": "object",
                "properties": {
                    "report_type": {
                        "type": "string",
                        "enum": ["summary", "trends"],
                        "description": "Type of report to generate"
                    },
                    "filters": {
                        "type": "object",
                        "description": "Optional filters to apply, as column/value equality pairs"
                    }
                },
                "required": ["report_type"]
            }),
        ),
    ]
}
