//! In-memory evaluation of compiled predicates.
//!
//! This is the reference semantics for [`Predicate`]: the in-memory
//! executor and the tests use it, and SQL rendering is expected to agree
//! with it on non-NULL data. Any comparison involving NULL is false
//! except `IS NULL`.

use std::cmp::Ordering;
use std::collections::HashMap;

use regex::Regex;

use super::ast::{CompareOp, Comparison, Operand, Predicate};
use super::value::{Row, Value};

/// Evaluates a predicate against rows.
///
/// LIKE patterns are compiled once when the evaluator is created.
#[derive(Debug)]
pub struct PredicateEvaluator<'a> {
    predicate: &'a Predicate,
    patterns: HashMap<String, Regex>,
}

impl<'a> PredicateEvaluator<'a> {
    /// Creates an evaluator for `predicate`.
    pub fn new(predicate: &'a Predicate) -> Self {
        let mut patterns = HashMap::new();
        collect_patterns(predicate, &mut patterns);
        Self {
            predicate,
            patterns,
        }
    }

    /// Returns true if the row satisfies the predicate.
    pub fn matches(&self, row: &Row) -> bool {
        self.evaluate(self.predicate, row)
    }

    /// Filters a slice of rows, returning only those that match.
    pub fn filter_rows<'b>(&self, rows: &'b [Row]) -> Vec<&'b Row> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }

    fn evaluate(&self, predicate: &Predicate, row: &Row) -> bool {
        match predicate {
            Predicate::Compare(comparison) => self.compare(comparison, row),
            Predicate::And(left, right) => self.evaluate(left, row) && self.evaluate(right, row),
            Predicate::Or(left, right) => self.evaluate(left, row) || self.evaluate(right, row),
            Predicate::Not(inner) => !self.evaluate(inner, row),
        }
    }

    fn compare(&self, comparison: &Comparison, row: &Row) -> bool {
        let value = row.get(&comparison.column).unwrap_or(&Value::Null);

        match (&comparison.op, &comparison.operand) {
            (CompareOp::Is, Operand::Scalar(Value::Null)) => value.is_null(),
            (CompareOp::Is | CompareOp::Eq, Operand::Scalar(expected)) => {
                value.compare(expected) == Some(Ordering::Equal)
            }
            (CompareOp::Gt, Operand::Scalar(bound)) => value.compare(bound) == Some(Ordering::Greater),
            (CompareOp::Gte, Operand::Scalar(bound)) => matches!(
                value.compare(bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            (CompareOp::Lt, Operand::Scalar(bound)) => value.compare(bound) == Some(Ordering::Less),
            (CompareOp::Lte, Operand::Scalar(bound)) => matches!(
                value.compare(bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
            (CompareOp::In, Operand::List(candidates)) => candidates
                .iter()
                .any(|c| value.compare(c) == Some(Ordering::Equal)),
            (CompareOp::Between, Operand::Range(low, high)) => {
                matches!(value.compare(low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(value.compare(high), Some(Ordering::Less | Ordering::Equal))
            }
            (CompareOp::Like, Operand::Scalar(pattern)) => self.like(value, pattern),
            (CompareOp::Like, Operand::List(patterns)) => {
                patterns.iter().any(|pattern| self.like(value, pattern))
            }
            _ => false,
        }
    }

    fn like(&self, value: &Value, pattern: &Value) -> bool {
        let (Some(text), Value::Text(pattern)) = (plain_text(value), pattern) else {
            return false;
        };
        self.patterns
            .get(pattern)
            .is_some_and(|regex| regex.is_match(&text))
    }
}

/// Text used when a non-text column is matched with LIKE.
fn plain_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Text(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(x) => Some(x.to_string()),
        Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
    }
}

fn collect_patterns(predicate: &Predicate, patterns: &mut HashMap<String, Regex>) {
    match predicate {
        Predicate::Compare(Comparison {
            op: CompareOp::Like,
            operand,
            ..
        }) => {
            let values: &[Value] = match operand {
                Operand::Scalar(value) => std::slice::from_ref(value),
                Operand::List(values) => values,
                Operand::Range(..) => &[],
            };
            for value in values {
                if let Value::Text(pattern) = value {
                    if !patterns.contains_key(pattern) {
                        if let Ok(regex) = like_to_regex(pattern) {
                            patterns.insert(pattern.clone(), regex);
                        }
                    }
                }
            }
        }
        Predicate::Compare(_) => {}
        Predicate::And(left, right) | Predicate::Or(left, right) => {
            collect_patterns(left, patterns);
            collect_patterns(right, patterns);
        }
        Predicate::Not(inner) => collect_patterns(inner, patterns),
    }
}

/// Converts a SQL LIKE pattern into an anchored regex.
///
/// `%` matches any run, `_` any single character, and a backslash makes
/// the next character literal.
pub fn like_to_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut out = String::from("(?s)^");
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    Regex::new(&out)
}
