//! `visualize_data`: derive a chart spec from tabular query results.
//!
//! Columns are classified as numeric, temporal or categorical. The x axis
//! is the first temporal column, else the first categorical one, else the
//! first column; every other numeric column becomes a series. When no
//! chart type is requested one is picked from the x axis kind.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use interlude_types::agent::ToolResult;
use interlude_types::error::ToolError;

use crate::agent::tool::{Tool, ToolContext, parse_args, schema_of};

pub const VISUALIZE_DATA: &str = "visualize_data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Pie,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Temporal,
    Categorical,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VisualizeDataArgs {
    /// Column names, in row order.
    pub columns: Vec<String>,
    /// Result rows; each row has one value per column.
    pub rows: Vec<Vec<Value>>,
    /// Chart title.
    #[serde(default)]
    pub title: Option<String>,
    /// Force a chart type instead of picking one from the data.
    #[serde(default)]
    pub chart_type: Option<ChartKind>,
}

pub struct VisualizeDataTool;

impl Tool for VisualizeDataTool {
    fn name(&self) -> &str {
        VISUALIZE_DATA
    }

    fn description(&self) -> &str {
        "Build a chart specification (bar, line, scatter, pie or table) from tabular query results."
    }

    fn parameters(&self) -> Value {
        schema_of::<VisualizeDataArgs>()
    }

    async fn execute(&self, _ctx: &ToolContext, args: Value) -> Result<ToolResult, ToolError> {
        let args: VisualizeDataArgs = parse_args(args)?;
        let spec = chart_spec(&args)?;
        let content = format!(
            "Created a {} chart of {} row(s).",
            spec["chart_type"].as_str().unwrap_or("table"),
            args.rows.len()
        );
        Ok(ToolResult::ok(content).with_data(spec))
    }
}

/// Build the chart spec for `args`.
pub fn chart_spec(args: &VisualizeDataArgs) -> Result<Value, ToolError> {
    if args.columns.is_empty() {
        return Err(ToolError::InvalidArguments("columns must not be empty".to_string()));
    }
    if let Some((i, row)) = args
        .rows
        .iter()
        .enumerate()
        .find(|(_, r)| r.len() != args.columns.len())
    {
        return Err(ToolError::InvalidArguments(format!(
            "row {i} has {} values, expected {}",
            row.len(),
            args.columns.len()
        )));
    }

    let kinds: Vec<ColumnKind> = (0..args.columns.len())
        .map(|c| classify(args.rows.iter().map(|r| &r[c])))
        .collect();

    let x = kinds
        .iter()
        .position(|k| *k == ColumnKind::Temporal)
        .or_else(|| kinds.iter().position(|k| *k == ColumnKind::Categorical))
        .unwrap_or(0);
    let ys: Vec<usize> = (0..kinds.len())
        .filter(|&c| c != x && kinds[c] == ColumnKind::Numeric)
        .collect();

    let chart_type = args.chart_type.unwrap_or(if ys.is_empty() {
        ChartKind::Table
    } else {
        match kinds[x] {
            ColumnKind::Temporal => ChartKind::Line,
            ColumnKind::Numeric => ChartKind::Scatter,
            ColumnKind::Categorical => ChartKind::Bar,
        }
    });

    let series: Vec<Value> = ys
        .iter()
        .map(|&y| {
            let points: Vec<Value> = args
                .rows
                .iter()
                .map(|r| json!([r[x], as_number(&r[y])]))
                .collect();
            json!({ "name": args.columns[y], "points": points })
        })
        .collect();

    Ok(json!({
        "chart_type": chart_type,
        "title": args.title.clone().unwrap_or_else(|| default_title(args, x, &ys)),
        "x": { "field": args.columns[x], "kind": kinds[x] },
        "y": ys.iter().map(|&y| args.columns[y].clone()).collect::<Vec<_>>(),
        "series": series,
        "columns": args.columns,
        "row_count": args.rows.len(),
    }))
}

fn default_title(args: &VisualizeDataArgs, x: usize, ys: &[usize]) -> String {
    if ys.is_empty() {
        return args.columns.join(", ");
    }
    let names: Vec<&str> = ys.iter().map(|&y| args.columns[y].as_str()).collect();
    format!("{} by {}", names.join(", "), args.columns[x])
}

fn classify<'a>(values: impl Iterator<Item = &'a Value>) -> ColumnKind {
    let mut seen = false;
    let mut numeric = true;
    let mut temporal = true;
    for v in values.filter(|v| !v.is_null()) {
        seen = true;
        numeric &= as_number(v).is_some();
        temporal &= v.as_str().is_some_and(is_temporal);
    }
    match (seen, numeric, temporal) {
        (false, _, _) => ColumnKind::Categorical,
        (true, true, _) => ColumnKind::Numeric,
        (true, _, true) => ColumnKind::Temporal,
        _ => ColumnKind::Categorical,
    }
}

/// Numbers, and strings holding numbers (DECIMAL columns arrive as text).
fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn is_temporal(s: &str) -> bool {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").is_ok()
        || DateTime::parse_from_rfc3339(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    use super::super::tests::{ctx, user};

    fn args(columns: &[&str], rows: Vec<Vec<Value>>) -> VisualizeDataArgs {
        VisualizeDataArgs {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            title: None,
            chart_type: None,
        }
    }

    #[test]
    fn test_time_series_becomes_line_chart() {
        let spec = chart_spec(&args(
            &["month", "revenue"],
            vec![
                vec![json!("2024-01"), json!("1200.50")],
                vec![json!("2024-02"), json!(1300)],
            ],
        ))
        .unwrap();
        assert_eq!(spec["chart_type"], "line");
        assert_eq!(spec["x"]["field"], "month");
        assert_eq!(spec["x"]["kind"], "temporal");
        assert_eq!(spec["series"][0]["points"][0], json!(["2024-01", 1200.5]));
        assert_eq!(spec["title"], "revenue by month");
    }

    #[test]
    fn test_categories_become_bar_chart() {
        let spec = chart_spec(&args(
            &["country", "users", "orders"],
            vec![
                vec![json!("FR"), json!(10), json!(3)],
                vec![json!("DE"), json!(12), json!(null)],
            ],
        ))
        .unwrap();
        assert_eq!(spec["chart_type"], "bar");
        assert_eq!(spec["y"], json!(["users", "orders"]));
        assert_eq!(spec["series"][1]["points"][1], json!(["DE", null]));
    }

    #[test]
    fn test_all_numeric_becomes_scatter() {
        let spec = chart_spec(&args(
            &["age", "spend"],
            vec![vec![json!(20), json!(5.5)], vec![json!(30), json!(7)]],
        ))
        .unwrap();
        assert_eq!(spec["chart_type"], "scatter");
        assert_eq!(spec["x"]["field"], "age");
    }

    #[test]
    fn test_no_numeric_columns_is_table() {
        let spec = chart_spec(&args(&["name"], vec![vec![json!("ann")]])).unwrap();
        assert_eq!(spec["chart_type"], "table");
        assert!(spec["series"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_requested_chart_type_wins() {
        let mut a = args(&["k", "v"], vec![vec![json!("a"), json!(1)]]);
        a.chart_type = Some(ChartKind::Pie);
        a.title = Some("Share".to_string());
        let spec = chart_spec(&a).unwrap();
        assert_eq!(spec["chart_type"], "pie");
        assert_eq!(spec["title"], "Share");
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = chart_spec(&args(&["a", "b"], vec![vec![json!(1)]])).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_tool_attaches_spec() {
        let result = VisualizeDataTool
            .execute(
                &ctx(user(&["user"])),
                json!({"columns": ["k", "v"], "rows": [["a", 1], ["b", 2]]}),
            )
            .await
            .unwrap();
        assert_eq!(result.content, "Created a bar chart of 2 row(s).");
        assert_eq!(result.data.unwrap()["row_count"], 2);
    }
}
