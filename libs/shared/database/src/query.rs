use std::cmp::Ordering;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A single predicate over one column of a stored row.
///
/// Conditions are backend-neutral: `MemoryStore` evaluates them against the
/// JSON form of each record and `SupabaseStore` renders them as PostgREST
/// filters. Comparisons follow SQL semantics, a NULL column never matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(&'static str, Value),
    NotEq(&'static str, Value),
    AtLeast(&'static str, Value),
    AtMost(&'static str, Value),
    /// Case-insensitive substring match.
    Contains(&'static str, String),
    /// Matches when any of the inner conditions matches.
    AnyOf(Vec<Condition>),
}

impl Condition {
    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Condition::Eq(field, expected) => {
                column(row, field).is_some_and(|v| compare(v, expected) == Some(Ordering::Equal))
            }
            Condition::NotEq(field, expected) => column(row, field)
                .is_some_and(|v| matches!(compare(v, expected), Some(Ordering::Less | Ordering::Greater))),
            Condition::AtLeast(field, bound) => column(row, field)
                .is_some_and(|v| matches!(compare(v, bound), Some(Ordering::Greater | Ordering::Equal))),
            Condition::AtMost(field, bound) => column(row, field)
                .is_some_and(|v| matches!(compare(v, bound), Some(Ordering::Less | Ordering::Equal))),
            Condition::Contains(field, needle) => column(row, field)
                .and_then(Value::as_str)
                .is_some_and(|haystack| haystack.to_lowercase().contains(&needle.to_lowercase())),
            Condition::AnyOf(options) => options.iter().any(|c| c.matches(row)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub conditions: Vec<Condition>,
    pub order: Vec<(&'static str, SortOrder)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn eq(self, field: &'static str, value: impl Into<Value>) -> Self {
        self.filter(Condition::Eq(field, value.into()))
    }

    pub fn not_eq(self, field: &'static str, value: impl Into<Value>) -> Self {
        self.filter(Condition::NotEq(field, value.into()))
    }

    pub fn at_least(self, field: &'static str, value: impl Into<Value>) -> Self {
        self.filter(Condition::AtLeast(field, value.into()))
    }

    pub fn at_most(self, field: &'static str, value: impl Into<Value>) -> Self {
        self.filter(Condition::AtMost(field, value.into()))
    }

    pub fn contains(self, field: &'static str, needle: impl Into<String>) -> Self {
        self.filter(Condition::Contains(field, needle.into()))
    }

    pub fn any_of(self, options: Vec<Condition>) -> Self {
        self.filter(Condition::AnyOf(options))
    }

    pub fn order_by(mut self, field: &'static str, order: SortOrder) -> Self {
        self.order.push((field, order));
        self
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }

    /// Orders two rows by the query's sort keys. NULLs sort last in either direction.
    pub fn compare_rows(&self, a: &Value, b: &Value) -> Ordering {
        for (field, order) in &self.order {
            let left = column(a, field);
            let right = column(b, field);
            let ordering = match (left, right) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => return Ordering::Greater,
                (Some(_), None) => return Ordering::Less,
                (Some(l), Some(r)) => compare(l, r).unwrap_or(Ordering::Equal),
            };
            let ordering = match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

fn column<'a>(row: &'a Value, field: &str) -> Option<&'a Value> {
    row.get(field).filter(|v| !v.is_null())
}

/// Compares two JSON scalars of the same kind.
///
/// Dates (`YYYY-MM-DD`), times (`HH:MM`) and timestamps are stored as strings
/// whose lexical order matches their chronological order.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
