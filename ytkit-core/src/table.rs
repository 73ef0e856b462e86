//! Tabular result model.
//!
//! Every wrapper reshapes its JSON (or CSV) payload into a [`Table`]: one
//! row per returned item, with the column set taken from the response
//! itself. Three conversions cover the three APIs:
//!
//! - [`Table::from_report`] - Analytics `columnHeaders` + `rows` payloads
//! - [`Table::from_items`] - Data API item lists (one column per top-level key)
//! - [`Table::from_csv`] - Reporting report downloads

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;

// ============================================================================
// Cells & columns
// ============================================================================

/// A single table value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Boolean value.
    Bool(bool),
    /// Calendar date (used for `day`/`month` report columns).
    Date(NaiveDate),
    /// Nested JSON kept opaque (Data API sub-resources).
    Json(Value),
    /// Missing value.
    Null,
}

impl Cell {
    /// The value as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The value as a float; integers widen.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// The value as a date, if it is one.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// True for [`Cell::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert into a JSON value (for JSON output).
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::Text(s) => Value::from(s.clone()),
            Self::Bool(b) => Value::from(*b),
            Self::Date(d) => Value::from(d.to_string()),
            Self::Json(v) => v.clone(),
            Self::Null => Value::Null,
        }
    }

    /// Convert a raw JSON scalar into a cell, keeping nested values opaque.
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::Json(value.clone()),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Json(v) => write!(f, "{v}"),
            Self::Null => Ok(()),
        }
    }
}

/// Declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Integer column.
    Integer,
    /// Floating-point column.
    Float,
    /// Text column.
    Text,
    /// Boolean column.
    Bool,
    /// Date column.
    Date,
    /// Opaque JSON column.
    Json,
}

/// A table column: name plus declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name as declared by the response.
    pub name: String,
    /// Declared type.
    pub ty: ColumnType,
}

impl Column {
    /// Creates a column.
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self { name: name.into(), ty }
    }
}

// ============================================================================
// Table
// ============================================================================

/// Analytics report payload shape (`columnHeaders` + `rows`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportPayload {
    #[serde(default)]
    column_headers: Vec<ColumnHeader>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnHeader {
    name: String,
    #[serde(default)]
    data_type: Option<String>,
}

/// A tabular result: ordered columns and rows of cells.
///
/// Row count and declared column names always mirror the response the table
/// was built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates an empty table with the given columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    /// Creates a table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The column definitions.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The declared column names, in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// The rows.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// The cell at `(row, column-name)`.
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Append a row.
    ///
    /// # Panics
    ///
    /// Panics when the cell count does not match the column count; rows only
    /// ever come from the conversion constructors, which build them to width.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        assert_eq!(row.len(), self.columns.len(), "row width mismatch");
        self.rows.push(row);
    }

    /// Serialize as an array of one JSON object per row.
    pub fn to_json(&self) -> Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let object: serde_json::Map<String, Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(col, cell)| (col.name.clone(), cell.to_json()))
                    .collect();
                Value::Object(object)
            })
            .collect();
        Value::Array(rows)
    }

    // ------------------------------------------------------------------
    // Conversions
    // ------------------------------------------------------------------

    /// Build a table from an Analytics `reports.query` payload.
    ///
    /// Column names and order come from `columnHeaders`; `dataType`
    /// INTEGER/FLOAT coerce the cells, and the `day`/`month` time dimensions
    /// additionally parse into dates.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Json`] when the payload does not have the
    /// `columnHeaders`/`rows` shape.
    pub fn from_report(payload: &Value) -> Result<Self, ApiError> {
        let report: ReportPayload = serde_json::from_value(payload.clone())?;

        let columns: Vec<Column> = report
            .column_headers
            .iter()
            .map(|h| Column::new(&h.name, header_type(h)))
            .collect();

        let mut table = Self::new(columns);
        for raw in &report.rows {
            let row = table
                .columns
                .iter()
                .enumerate()
                .map(|(i, col)| coerce(raw.get(i).unwrap_or(&Value::Null), col.ty))
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }

    /// Build a table from a Data API item list: one row per item, one
    /// column per top-level key.
    ///
    /// Columns appear in first-seen order and their set is the union across
    /// all items; keys absent from an item become [`Cell::Null`]. Nested
    /// objects and arrays stay opaque [`Cell::Json`] values.
    pub fn from_items(items: &[Value]) -> Self {
        let mut columns: Vec<Column> = Vec::new();
        let mut raw_rows: Vec<&serde_json::Map<String, Value>> = Vec::new();

        for item in items {
            let Some(object) = item.as_object() else { continue };
            for key in object.keys() {
                if !columns.iter().any(|c| &c.name == key) {
                    columns.push(Column::new(key, value_type(&object[key])));
                }
            }
            raw_rows.push(object);
        }

        let mut table = Self::new(columns);
        for object in raw_rows {
            let row = table
                .columns
                .iter()
                .map(|col| object.get(&col.name).map_or(Cell::Null, Cell::from_value))
                .collect();
            table.rows.push(row);
        }
        table
    }

    /// Build a table from a downloaded report CSV.
    ///
    /// Numeric cells coerce to integers or floats; columns whose name ends
    /// in `day`, `date`, `month`, or `time` (case-insensitive) parse
    /// `YYYYMMDD` values into dates.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Csv`] when the bytes are not valid CSV.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, ApiError> {
        let mut reader = csv::ReaderBuilder::new().from_reader(bytes);

        let headers = reader.headers()?.clone();
        let date_like: Vec<bool> = headers.iter().map(is_date_like).collect();
        let columns = headers
            .iter()
            .zip(&date_like)
            .map(|(name, is_date)| {
                Column::new(name, if *is_date { ColumnType::Date } else { ColumnType::Text })
            })
            .collect();

        let mut table = Self::new(columns);
        for record in reader.records() {
            let record = record?;
            let row = record
                .iter()
                .enumerate()
                .map(|(i, field)| csv_cell(field, date_like.get(i).copied().unwrap_or(false)))
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }

    /// Concatenate tables row-wise.
    ///
    /// The column set is the union across all inputs in first-seen order;
    /// rows are aligned by column name with nulls filling any gaps. Used by
    /// the per-id fan-out helpers.
    pub fn concat(tables: impl IntoIterator<Item = Self>) -> Self {
        let tables: Vec<Self> = tables.into_iter().collect();

        let mut columns: Vec<Column> = Vec::new();
        for table in &tables {
            for col in &table.columns {
                if !columns.iter().any(|c| c.name == col.name) {
                    columns.push(col.clone());
                }
            }
        }

        let mut out = Self::new(columns);
        for table in tables {
            for row in &table.rows {
                let aligned = out
                    .columns
                    .iter()
                    .map(|col| {
                        table
                            .column_index(&col.name)
                            .and_then(|i| row.get(i))
                            .cloned()
                            .unwrap_or(Cell::Null)
                    })
                    .collect();
                out.rows.push(aligned);
            }
        }
        out
    }
}

// ============================================================================
// Coercion helpers
// ============================================================================

fn header_type(header: &ColumnHeader) -> ColumnType {
    // Time dimensions become dates regardless of the declared dataType.
    if header.name == "day" || header.name == "month" {
        return ColumnType::Date;
    }
    match header.data_type.as_deref() {
        Some("INTEGER") => ColumnType::Integer,
        Some("FLOAT") => ColumnType::Float,
        _ => ColumnType::Text,
    }
}

fn value_type(value: &Value) -> ColumnType {
    match value {
        Value::Bool(_) => ColumnType::Bool,
        Value::Number(n) if n.is_i64() => ColumnType::Integer,
        Value::Number(_) => ColumnType::Float,
        Value::Array(_) | Value::Object(_) => ColumnType::Json,
        _ => ColumnType::Text,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn coerce(value: &Value, ty: ColumnType) -> Cell {
    if value.is_null() {
        return Cell::Null;
    }
    match ty {
        ColumnType::Integer => value
            .as_i64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
            .map_or_else(|| Cell::from_value(value), Cell::Int),
        ColumnType::Float => value
            .as_f64()
            .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
            .map_or_else(|| Cell::from_value(value), Cell::Float),
        ColumnType::Date => value
            .as_str()
            .and_then(parse_report_date)
            .map_or_else(|| Cell::from_value(value), Cell::Date),
        _ => Cell::from_value(value),
    }
}

/// Parse `YYYY-MM-DD` day values and `YYYY-MM` month values.
fn parse_report_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"))
        .ok()
}

fn is_date_like(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    ["day", "date", "month", "time"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
}

fn csv_cell(field: &str, date_like: bool) -> Cell {
    if field.is_empty() {
        return Cell::Null;
    }
    if date_like {
        if let Ok(date) = NaiveDate::parse_from_str(field, "%Y%m%d") {
            return Cell::Date(date);
        }
    }
    if let Ok(n) = field.parse::<i64>() {
        return Cell::Int(n);
    }
    if let Ok(f) = field.parse::<f64>() {
        return Cell::Float(f);
    }
    Cell::Text(field.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn geo_report() -> Value {
        json!({
            "kind": "youtubeAnalytics#resultTable",
            "columnHeaders": [
                {"name": "day", "columnType": "DIMENSION", "dataType": "STRING"},
                {"name": "country", "columnType": "DIMENSION", "dataType": "STRING"},
                {"name": "views", "columnType": "METRIC", "dataType": "INTEGER"},
                {"name": "averageViewDuration", "columnType": "METRIC", "dataType": "FLOAT"}
            ],
            "rows": [
                ["2024-01-01", "US", 123, 45.5],
                ["2024-01-02", "DE", 7, 12.25]
            ]
        })
    }

    #[test]
    fn test_from_report_columns_and_rows() {
        let table = Table::from_report(&geo_report()).unwrap();
        assert_eq!(
            table.column_names(),
            vec!["day", "country", "views", "averageViewDuration"]
        );
        assert_eq!(table.n_rows(), 2);
    }

    #[test]
    fn test_from_report_dtype_coercion() {
        let table = Table::from_report(&geo_report()).unwrap();
        assert_eq!(table.get(0, "views").unwrap().as_i64(), Some(123));
        assert_eq!(
            table.get(1, "averageViewDuration").unwrap().as_f64(),
            Some(12.25)
        );
        assert_eq!(
            table.get(0, "day").unwrap().as_date(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    }

    #[test]
    fn test_from_report_month_dimension() {
        let payload = json!({
            "columnHeaders": [
                {"name": "month", "columnType": "DIMENSION", "dataType": "STRING"},
                {"name": "views", "columnType": "METRIC", "dataType": "INTEGER"}
            ],
            "rows": [["2024-03", "9"]]
        });
        let table = Table::from_report(&payload).unwrap();
        assert_eq!(
            table.get(0, "month").unwrap().as_date(),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        // INTEGER arriving as a string still coerces.
        assert_eq!(table.get(0, "views").unwrap().as_i64(), Some(9));
    }

    #[test]
    fn test_from_report_empty_rows() {
        let payload = json!({
            "columnHeaders": [{"name": "views", "dataType": "INTEGER"}],
            "rows": []
        });
        let table = Table::from_report(&payload).unwrap();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.column_names(), vec!["views"]);
    }

    #[test]
    fn test_from_items_union_of_keys() {
        let items = vec![
            json!({"id": "a", "snippet": {"title": "First"}}),
            json!({"id": "b", "statistics": {"viewCount": "10"}}),
        ];
        let table = Table::from_items(&items);
        assert_eq!(table.column_names(), vec!["id", "snippet", "statistics"]);
        assert_eq!(table.n_rows(), 2);
        assert!(table.get(0, "statistics").unwrap().is_null());
        assert!(matches!(table.get(1, "statistics").unwrap(), Cell::Json(_)));
    }

    #[test]
    fn test_from_csv_with_date_coercion() {
        let csv = b"date,views,estimated_minutes_watched\n20240101,12,3.5\n20240102,7,1.25\n";
        let table = Table::from_csv(csv).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(
            table.get(0, "date").unwrap().as_date(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(table.get(1, "views").unwrap().as_i64(), Some(7));
        assert_eq!(
            table.get(1, "estimated_minutes_watched").unwrap().as_f64(),
            Some(1.25)
        );
    }

    #[test]
    fn test_concat_aligns_by_name() {
        let a = Table::from_items(&[json!({"video": "a", "views": 1})]);
        let b = Table::from_items(&[json!({"views": 2, "likes": 3})]);
        let joined = Table::concat([a, b]);

        assert_eq!(joined.column_names(), vec!["video", "views", "likes"]);
        assert_eq!(joined.n_rows(), 2);
        assert_eq!(joined.get(1, "views").unwrap().as_i64(), Some(2));
        assert!(joined.get(1, "video").unwrap().is_null());
        assert!(joined.get(0, "likes").unwrap().is_null());
    }

    #[test]
    fn test_to_json_rows() {
        let table = Table::from_items(&[json!({"id": "a", "views": 5})]);
        let value = table.to_json();
        assert_eq!(value, json!([{"id": "a", "views": 5}]));
    }
}
