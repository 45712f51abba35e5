//! Content model: the values a component can carry, plus the option bag
//! that rides alongside them.
//!
//! `Value` is a closed set of renderable shapes with one escape hatch
//! (`Other`) for caller-defined payloads that only custom detectors and
//! renderers understand.

use serde_json::json;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::RenderError;

/// Tabular content: named columns and row-major string cells.
///
/// The terminal host renders cells as text, so callers stringify values at
/// construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn new(
        columns: impl IntoIterator<Item = impl Into<String>>,
        rows: Vec<Vec<String>>,
    ) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows,
        }
    }
}

/// An ordered 1-D labeled sequence, e.g. one column of a data frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(String, f64)>,
}

impl Series {
    pub fn new(name: impl Into<String>, points: Vec<(String, f64)>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    /// Two-column tabular view (label, value) used by the table capability.
    pub fn to_table(&self) -> TableData {
        TableData {
            columns: vec!["index".to_string(), self.name.clone()],
            rows: self
                .points
                .iter()
                .map(|(label, value)| vec![label.clone(), format_number(*value)])
                .collect(),
        }
    }
}

/// Which plotting ecosystem produced a figure.
///
/// The distinction only affects type resolution (`matplotlib_figure` vs
/// `plotly_figure`); the terminal host draws both the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureEcosystem {
    Matplotlib,
    Plotly,
}

/// One named line of points in a figure.
#[derive(Debug, Clone, PartialEq)]
pub struct FigureSeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// A chart-like content value.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub ecosystem: FigureEcosystem,
    pub title: Option<String>,
    pub series: Vec<FigureSeries>,
}

impl Figure {
    pub fn new(ecosystem: FigureEcosystem) -> Self {
        Self {
            ecosystem,
            title: None,
            series: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_series(mut self, name: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        self.series.push(FigureSeries {
            name: name.into(),
            points,
        });
        self
    }
}

/// Caller-defined payload: type-erased, shared, with the concrete type name
/// captured for the debug panel.
#[derive(Clone)]
pub struct OtherValue {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl OtherValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Downcast back to the concrete type, for custom detectors/renderers.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl fmt::Debug for OtherValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtherValue")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// A renderable content value.
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Number(f64),
    Table(TableData),
    Series(Series),
    Figure(Figure),
    Json(serde_json::Value),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(Vec<(String, Value)>),
    Other(OtherValue),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn number(n: impl Into<f64>) -> Self {
        Value::Number(n.into())
    }

    /// Wrap an arbitrary caller-defined payload.
    pub fn other<T: Any + Send + Sync>(value: T) -> Self {
        Value::Other(OtherValue::new(value))
    }

    /// Short name of the content shape, for the debug panel.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Number(_) => "number",
            Value::Table(_) => "table",
            Value::Series(_) => "series",
            Value::Figure(_) => "figure",
            Value::Json(_) => "json",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "map",
            Value::Other(other) => other.type_name(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Coerce to tabular form where a sensible one exists.
    pub fn to_table(&self) -> Option<TableData> {
        match self {
            Value::Table(table) => Some(table.clone()),
            Value::Series(series) => Some(series.to_table()),
            Value::Map(pairs) => Some(TableData {
                columns: vec!["key".to_string(), "value".to_string()],
                rows: pairs
                    .iter()
                    .map(|(k, v)| vec![k.clone(), v.to_string()])
                    .collect(),
            }),
            _ => None,
        }
    }

    pub fn as_figure(&self) -> Option<&Figure> {
        match self {
            Value::Figure(figure) => Some(figure),
            _ => None,
        }
    }

    /// Convert to a JSON tree for the structured-rendering capability.
    ///
    /// `Other` payloads are opaque and cannot be converted.
    pub fn to_json(&self) -> Result<serde_json::Value, RenderError> {
        match self {
            Value::Text(s) => Ok(json!(s)),
            Value::Number(n) => Ok(json!(n)),
            Value::Json(v) => Ok(v.clone()),
            Value::List(items) | Value::Tuple(items) => Ok(serde_json::Value::Array(
                items
                    .iter()
                    .map(Value::to_json)
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            Value::Map(pairs) => {
                let mut map = serde_json::Map::new();
                for (key, value) in pairs {
                    map.insert(key.clone(), value.to_json()?);
                }
                Ok(serde_json::Value::Object(map))
            }
            Value::Series(series) => {
                let mut map = serde_json::Map::new();
                for (label, value) in &series.points {
                    map.insert(label.clone(), json!(value));
                }
                let mut outer = serde_json::Map::new();
                outer.insert(series.name.clone(), serde_json::Value::Object(map));
                Ok(serde_json::Value::Object(outer))
            }
            Value::Table(table) => Ok(serde_json::Value::Array(
                table
                    .rows
                    .iter()
                    .map(|row| {
                        let mut obj = serde_json::Map::new();
                        for (col, cell) in table.columns.iter().zip(row) {
                            obj.insert(col.clone(), json!(cell));
                        }
                        serde_json::Value::Object(obj)
                    })
                    .collect(),
            )),
            Value::Figure(_) | Value::Other(_) => Err(RenderError::UnsupportedContent {
                content: self.type_name(),
                component: "structured".to_string(),
            }),
        }
    }
}

/// Best-effort display string: the TEXT fallback and the debug panel both
/// use this.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Json(v) => f.write_str(&v.to_string()),
            Value::List(items) | Value::Tuple(items) => {
                let parts: Vec<String> = items.iter().map(Value::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Map(pairs) => {
                let parts: Vec<String> =
                    pairs.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Value::Series(series) => write!(f, "series '{}' ({} points)", series.name, series.points.len()),
            Value::Table(table) => write!(
                f,
                "table ({} columns, {} rows)",
                table.columns.len(),
                table.rows.len()
            ),
            Value::Figure(figure) => write!(
                f,
                "figure '{}' ({} series)",
                figure.title.as_deref().unwrap_or("untitled"),
                figure.series.len()
            ),
            Value::Other(other) => write!(f, "<{}>", other.type_name()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

/// Format a number without a trailing `.0` for whole values.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Option bag attached to a component: boolean resolution flags, the explicit
/// `component_type` override, and arbitrary keys forwarded to renderers.
#[derive(Debug, Clone, Default)]
pub struct Options(std::collections::BTreeMap<String, serde_json::Value>);

/// Key naming the explicit type override.
pub const COMPONENT_TYPE_KEY: &str = "component_type";

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// True iff the key is present and set to boolean `true`.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(serde_json::Value::Bool(true)))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_json::Value::as_str)
    }

    /// The explicit type override, if any.
    pub fn component_type(&self) -> Option<&str> {
        self.get_str(COMPONENT_TYPE_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for Options {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
