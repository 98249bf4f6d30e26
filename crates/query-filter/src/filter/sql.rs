//! Rendering of compiled predicates as parameterized SQL.
//!
//! Values are never inlined: each one becomes a placeholder and is
//! returned in [`SqlFragment::params`] in placeholder order. Column names
//! come from the resolver and are emitted as quoted identifiers.

use serde::{Deserialize, Serialize};

use super::ast::{CompareOp, Comparison, Operand, Predicate};
use super::value::Value;

/// Placeholder syntax of the target database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStyle {
    /// PostgreSQL numbered placeholders: `$1`, `$2`, ...
    #[default]
    Postgres,
    /// Positional placeholders: `?` (SQLite, MySQL).
    QuestionMark,
}

/// A `WHERE` clause body and its bind values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlFragment {
    /// SQL text with placeholders.
    pub sql: String,
    /// Bind values in placeholder order.
    pub params: Vec<Value>,
}

struct SqlWriter {
    style: PlaceholderStyle,
    next_index: usize,
    params: Vec<Value>,
}

impl SqlWriter {
    fn bind(&mut self, value: &Value) -> String {
        self.params.push(value.clone());
        self.next_index += 1;
        match self.style {
            PlaceholderStyle::Postgres => format!("${}", self.next_index),
            PlaceholderStyle::QuestionMark => "?".to_string(),
        }
    }

    fn predicate(&mut self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::Compare(comparison) => self.comparison(comparison),
            Predicate::And(left, right) => {
                format!("({} AND {})", self.predicate(left), self.predicate(right))
            }
            Predicate::Or(left, right) => {
                format!("({} OR {})", self.predicate(left), self.predicate(right))
            }
            Predicate::Not(inner) => format!("NOT ({})", self.predicate(inner)),
        }
    }

    fn comparison(&mut self, comparison: &Comparison) -> String {
        let column = quote_identifier(&comparison.column);

        match (&comparison.op, &comparison.operand) {
            (CompareOp::Is, Operand::Scalar(Value::Null)) => format!("{} IS NULL", column),
            (CompareOp::Is, Operand::Scalar(Value::Bool(true))) => format!("{} IS TRUE", column),
            (CompareOp::Is, Operand::Scalar(Value::Bool(false))) => format!("{} IS FALSE", column),
            (CompareOp::Like, Operand::List(patterns)) => {
                let alternatives: Vec<String> = patterns
                    .iter()
                    .map(|p| format!("{} LIKE {}", column, self.bind(p)))
                    .collect();
                format!("({})", alternatives.join(" OR "))
            }
            (CompareOp::In, Operand::List(values)) => {
                let placeholders: Vec<String> = values.iter().map(|v| self.bind(v)).collect();
                format!("{} IN ({})", column, placeholders.join(", "))
            }
            (CompareOp::Between, Operand::Range(low, high)) => {
                let low = self.bind(low);
                let high = self.bind(high);
                format!("{} BETWEEN {} AND {}", column, low, high)
            }
            (op, Operand::Scalar(value)) => {
                let symbol = match op {
                    CompareOp::Gt => ">",
                    CompareOp::Gte => ">=",
                    CompareOp::Lt => "<",
                    CompareOp::Lte => "<=",
                    CompareOp::Like => "LIKE",
                    _ => "=",
                };
                format!("{} {} {}", column, symbol, self.bind(value))
            }
            // The translator never builds these shapes.
            (_, Operand::List(_)) | (_, Operand::Range(..)) => "FALSE".to_string(),
        }
    }
}

/// Quotes an identifier with double quotes, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl Predicate {
    /// Renders this predicate as SQL, numbering placeholders from 1.
    ///
    /// # Example
    ///
    /// ```
    /// use query_filter::filter::{compile, ColumnType, PlaceholderStyle, Schema, Value};
    ///
    /// let schema = Schema::new().with_column("age", ColumnType::Integer);
    /// let predicate = compile("age:gte:18:lt:65", &schema).unwrap().unwrap();
    /// let fragment = predicate.to_sql(PlaceholderStyle::Postgres);
    /// assert_eq!(fragment.sql, r#"("age" >= $1 AND "age" < $2)"#);
    /// assert_eq!(fragment.params, vec![Value::Int(18), Value::Int(65)]);
    /// ```
    pub fn to_sql(&self, style: PlaceholderStyle) -> SqlFragment {
        self.to_sql_with_offset(style, 0)
    }

    /// Renders this predicate as SQL with numbering starting after
    /// `start_offset`, for appending to a query that already has
    /// placeholders.
    pub fn to_sql_with_offset(&self, style: PlaceholderStyle, start_offset: usize) -> SqlFragment {
        let mut writer = SqlWriter {
            style,
            next_index: start_offset,
            params: Vec::new(),
        };
        let sql = writer.predicate(self);
        SqlFragment {
            sql,
            params: writer.params,
        }
    }
}
