//! Typed scalar values and column types.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A row of named values.
pub type Row = BTreeMap<String, Value>;

/// Native type declared by a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// 64-bit signed integer.
    #[serde(alias = "int", alias = "bigint")]
    Integer,
    /// 64-bit float.
    #[serde(alias = "double", alias = "real")]
    Float,
    /// Arbitrary text.
    #[serde(alias = "string", alias = "varchar")]
    Text,
    /// Boolean.
    #[serde(alias = "bool")]
    Boolean,
    /// Calendar date without time.
    Date,
    /// Date and time without timezone (UTC by convention).
    #[serde(alias = "timestamp")]
    DateTime,
}

impl ColumnType {
    /// Lowercase name used in error messages and config files.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
        }
    }

    /// Parses a raw (already unquoted) string into a value of this type.
    ///
    /// Returns `None` when the text is not a valid literal of the type.
    pub fn coerce(&self, raw: &str) -> Option<Value> {
        match self {
            ColumnType::Integer => raw.trim().parse().ok().map(Value::Int),
            ColumnType::Float => raw.trim().parse().ok().map(Value::Float),
            ColumnType::Text => Some(Value::Text(raw.to_string())),
            ColumnType::Boolean => parse_bool(raw).map(Value::Bool),
            ColumnType::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .ok()
                .map(Value::Date),
            ColumnType::DateTime => parse_datetime(raw.trim()).map(Value::DateTime),
        }
    }

    /// Converts a JSON scalar into a value of this type.
    ///
    /// JSON `null` is always accepted. Strings are parsed with
    /// [`ColumnType::coerce`]; numbers and booleans must match the type.
    pub fn from_json(&self, json: &serde_json::Value) -> Option<Value> {
        match (self, json) {
            (_, serde_json::Value::Null) => Some(Value::Null),
            (ColumnType::Integer, serde_json::Value::Number(n)) => n.as_i64().map(Value::Int),
            (ColumnType::Float, serde_json::Value::Number(n)) => n.as_f64().map(Value::Float),
            (ColumnType::Boolean, serde_json::Value::Bool(b)) => Some(Value::Bool(*b)),
            (ColumnType::Text, serde_json::Value::Number(n)) => Some(Value::Text(n.to_string())),
            (ColumnType::Text, serde_json::Value::Bool(b)) => Some(Value::Text(b.to_string())),
            (_, serde_json::Value::String(s)) => self.coerce(s),
            _ => None,
        }
    }

    /// Guesses a column type from a JSON scalar.
    pub fn infer(json: &serde_json::Value) -> Option<ColumnType> {
        match json {
            serde_json::Value::Bool(_) => Some(ColumnType::Boolean),
            serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Some(ColumnType::Integer),
            serde_json::Value::Number(_) => Some(ColumnType::Float),
            serde_json::Value::String(s) => {
                if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() {
                    Some(ColumnType::Date)
                } else if parse_datetime(s).is_some() {
                    Some(ColumnType::DateTime)
                } else {
                    Some(ColumnType::Text)
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Accepted datetime layouts, tried in order after RFC 3339.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// A typed scalar value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// Text.
    Text(String),
    /// Date.
    Date(NaiveDate),
    /// Date and time.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Orders two values of compatible types.
    ///
    /// Integers and floats compare numerically, dates compare with
    /// datetimes at midnight. Anything involving NULL or mismatched types
    /// is unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::DateTime(b)) => Some(a.and_time(NaiveTime::MIN).cmp(b)),
            (Value::DateTime(a), Value::Date(b)) => Some(a.cmp(&b.and_time(NaiveTime::MIN))),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Date(d) => write!(f, "'{}'", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "'{}'", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_scalars() {
        assert_eq!(ColumnType::Integer.coerce("42"), Some(Value::Int(42)));
        assert_eq!(ColumnType::Integer.coerce("4.2"), None);
        assert_eq!(ColumnType::Float.coerce("4.5"), Some(Value::Float(4.5)));
        assert_eq!(ColumnType::Boolean.coerce("TRUE"), Some(Value::Bool(true)));
        assert_eq!(ColumnType::Boolean.coerce("0"), Some(Value::Bool(false)));
        assert_eq!(ColumnType::Boolean.coerce("maybe"), None);
        assert_eq!(
            ColumnType::Text.coerce("hello"),
            Some(Value::Text("hello".to_string()))
        );
    }

    #[test]
    fn test_coerce_dates() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
        assert_eq!(ColumnType::Date.coerce("2020-01-31"), Some(Value::Date(date)));
        assert_eq!(ColumnType::Date.coerce("2020-13-01"), None);

        let midnight = date.and_time(NaiveTime::MIN);
        assert_eq!(
            ColumnType::DateTime.coerce("2020-01-31"),
            Some(Value::DateTime(midnight))
        );

        let precise = ColumnType::DateTime
            .coerce("2020-01-01T17:22:20.937752")
            .unwrap();
        assert!(matches!(precise, Value::DateTime(_)));

        let with_offset = ColumnType::DateTime.coerce("2020-01-01T12:00:00+02:00");
        let expected = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(with_offset, Some(Value::DateTime(expected)));
    }

    #[test]
    fn test_compare_mixed_numbers() {
        assert_eq!(Value::Int(2).compare(&Value::Float(2.5)), Some(Ordering::Less));
        assert_eq!(Value::Float(3.0).compare(&Value::Int(3)), Some(Ordering::Equal));
        assert_eq!(Value::Null.compare(&Value::Int(1)), None);
        assert_eq!(Value::Text("a".into()).compare(&Value::Int(1)), None);
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!(7);
        assert_eq!(ColumnType::Integer.from_json(&json), Some(Value::Int(7)));
        assert_eq!(ColumnType::Float.from_json(&json), Some(Value::Float(7.0)));
        assert_eq!(
            ColumnType::Integer.from_json(&serde_json::json!(null)),
            Some(Value::Null)
        );
        assert_eq!(ColumnType::Boolean.from_json(&json), None);
    }

    #[test]
    fn test_infer() {
        assert_eq!(ColumnType::infer(&serde_json::json!(1)), Some(ColumnType::Integer));
        assert_eq!(ColumnType::infer(&serde_json::json!(1.5)), Some(ColumnType::Float));
        assert_eq!(
            ColumnType::infer(&serde_json::json!("2020-01-01")),
            Some(ColumnType::Date)
        );
        assert_eq!(
            ColumnType::infer(&serde_json::json!("2020-01-01T00:00:00")),
            Some(ColumnType::DateTime)
        );
        assert_eq!(ColumnType::infer(&serde_json::json!("x")), Some(ColumnType::Text));
        assert_eq!(ColumnType::infer(&serde_json::json!(null)), None);
    }

    #[test]
    fn test_display_escapes_text() {
        assert_eq!(Value::Text("it's".into()).to_string(), "'it''s'");
        assert_eq!(Value::Null.to_string(), "NULL");
    }
}
