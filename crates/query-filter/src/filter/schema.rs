//! Column descriptors and field-name resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{FilterError, FilterResult};
use super::value::{ColumnType, Row, Value};

/// A queryable column and its native type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    /// Column identifier used inside predicates.
    pub name: String,
    /// Declared scalar type.
    pub column_type: ColumnType,
}

impl Column {
    /// Creates a new column descriptor.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Resolves field names from a filter expression to columns.
pub trait ColumnResolver {
    /// Returns the column for `field`, or `None` if it does not exist.
    fn resolve(&self, field: &str) -> Option<Column>;
}

impl<F> ColumnResolver for F
where
    F: Fn(&str) -> Option<Column>,
{
    fn resolve(&self, field: &str) -> Option<Column> {
        self(field)
    }
}

/// A named set of typed columns.
///
/// Deserializes from a plain table of `name = "type"` pairs:
///
/// ```toml
/// id = "integer"
/// email = "text"
/// created_at = "datetime"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: BTreeMap<String, ColumnType>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, builder style.
    pub fn with_column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.insert(name.into(), column_type);
        self
    }

    /// Returns the type of `name`, if declared.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns.get(name).copied()
    }

    /// Iterates over all columns in name order.
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns
            .iter()
            .map(|(name, column_type)| Column::new(name.clone(), *column_type))
    }

    /// Number of declared columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if no columns are declared.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Builds a schema from the first non-null value of every key in a
    /// set of JSON objects.
    pub fn infer(objects: &[serde_json::Map<String, serde_json::Value>]) -> Self {
        let mut columns = BTreeMap::new();
        for object in objects {
            for (key, value) in object {
                if columns.contains_key(key) {
                    continue;
                }
                if let Some(column_type) = ColumnType::infer(value) {
                    columns.insert(key.clone(), column_type);
                }
            }
        }
        Self { columns }
    }

    /// Converts a JSON object into a typed row.
    ///
    /// Keys not in the schema are dropped; declared columns missing from
    /// the object become NULL.
    pub fn row_from_json(
        &self,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> FilterResult<Row> {
        let mut row = Row::new();
        for (name, column_type) in &self.columns {
            let value = match object.get(name) {
                None => Value::Null,
                Some(json) => column_type.from_json(json).ok_or_else(|| {
                    FilterError::type_coercion(name.clone(), json.to_string(), column_type.name())
                })?,
            };
            row.insert(name.clone(), value);
        }
        Ok(row)
    }
}

impl ColumnResolver for Schema {
    fn resolve(&self, field: &str) -> Option<Column> {
        self.column_type(field)
            .map(|column_type| Column::new(field, column_type))
    }
}

impl FromIterator<(String, ColumnType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (String, ColumnType)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}
