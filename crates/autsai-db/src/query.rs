use std::cmp::Ordering;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

/// `where` / `orderBy` / `limit` options of a collection `list` call.
///
/// Filters are exact-match equality on top-level fields. Values compare the
/// way SQLite compares `json_extract` results: booleans are 0/1 integers and
/// text never equals a number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<(String, Value)>,
    pub order_by: Vec<(String, Order)>,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, order: Order) -> Self {
        self.order_by.push((field.into(), order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, record: &Value) -> bool {
        self.filters.iter().all(|(field, expected)| {
            Key::of(record.get(field)) == Key::of(Some(expected))
        })
    }

    /// Evaluate the query against an in-memory collection held in insertion
    /// order.
    pub fn apply<I>(&self, records: I) -> Vec<Value>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut rows: Vec<Value> = records.into_iter().filter(|r| self.matches(r)).collect();

        if !self.order_by.is_empty() {
            // sort_by is stable, so ties keep insertion order
            rows.sort_by(|a, b| {
                self.order_by
                    .iter()
                    .map(|(field, order)| {
                        let ord = Key::of(a.get(field)).cmp(&Key::of(b.get(field)));
                        match order {
                            Order::Asc => ord,
                            Order::Desc => ord.reverse(),
                        }
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        if let Some(limit) = self.limit {
            rows.truncate(limit as usize);
        }
        rows
    }
}

/// Comparable projection of a JSON field, ordered NULL < number < text like
/// SQLite's storage classes.
#[derive(Debug, Clone, PartialEq)]
enum Key {
    Null,
    Number(f64),
    Text(String),
    Other(String),
}

impl Key {
    fn of(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Key::Null,
            Some(Value::Bool(b)) => Key::Number(if *b { 1.0 } else { 0.0 }),
            Some(Value::Number(n)) => Key::Number(n.as_f64().unwrap_or_default()),
            Some(Value::String(s)) => Key::Text(s.clone()),
            Some(other) => Key::Other(other.to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Key::Null => 0,
            Key::Number(_) => 1,
            Key::Text(_) => 2,
            Key::Other(_) => 3,
        }
    }

    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Number(a), Key::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Key::Text(a), Key::Text(b)) | (Key::Other(a), Key::Other(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// JSON path for a top-level field, as bound into `json_extract`.
pub(crate) fn json_path(field: &str) -> String {
    format!("$.{}", field)
}

/// SQL parameter for a filter value, matching what `json_extract` yields.
pub(crate) fn sql_value(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;

    match value {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Sql::Integer(i),
            None => Sql::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => Sql::Text(s.clone()),
        other => Sql::Text(other.to_string()),
    }
}
