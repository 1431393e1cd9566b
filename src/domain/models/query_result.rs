use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A result-set column. Only `name` is interpreted; any other attributes the
/// service reports (`type_name`, `position`, ...) are carried through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// Tabular output of a generated query, in the `{schema, rows}` shape the
/// chat widget renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResultTable {
    pub schema: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResultTable {
    pub fn new(schema: Vec<Column>, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Normalizes a query-result payload.
    ///
    /// Accepts the already-normalized `{schema, rows}` form and the statement
    /// execution form (`manifest.schema.columns` + `result.data_array`),
    /// with or without the `statement_response` wrapper. Returns `None` for
    /// anything else.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        if payload.get("schema").is_some_and(Value::is_array)
            && payload.get("rows").is_some_and(Value::is_array)
        {
            return serde_json::from_value(payload.clone()).ok();
        }

        let statement = payload.get("statement_response").unwrap_or(payload);
        let columns = statement.pointer("/manifest/schema/columns")?.as_array()?;

        let schema = columns
            .iter()
            .map(|c| serde_json::from_value::<Column>(c.clone()))
            .collect::<Result<Vec<_>, _>>()
            .ok()?;

        // A statement with zero rows has no data_array at all.
        let rows = match statement.pointer("/result/data_array") {
            Some(data) if !data.is_null() => serde_json::from_value(data.clone()).ok()?,
            _ => Vec::new(),
        };

        Some(Self { schema, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Outcome of the secondary query-result fetch. Losing the table is not
/// fatal to the answer, so the failure is kept as a value with its cause.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResultFetch {
    Loaded(QueryResultTable),
    Unavailable(String),
}

impl QueryResultFetch {
    pub fn into_table(self) -> Option<QueryResultTable> {
        match self {
            QueryResultFetch::Loaded(table) => Some(table),
            QueryResultFetch::Unavailable(_) => None,
        }
    }
}
