//! Clause and predicate types for filter expressions.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::FilterError;
use super::value::Value;

/// Logical connector between clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    /// `:`
    And,
    /// `|`
    Or,
}

impl Connector {
    /// Maps a separator character to its connector.
    pub fn from_symbol(symbol: &str) -> Result<Self, FilterError> {
        match symbol {
            ":" => Ok(Connector::And),
            "|" => Ok(Connector::Or),
            other => Err(FilterError::invalid_connector(other)),
        }
    }

    /// The separator character for this connector.
    pub fn symbol(&self) -> char {
        match self {
            Connector::And => ':',
            Connector::Or => '|',
        }
    }

    /// Joins two predicates with this connector.
    pub fn join(&self, left: Predicate, right: Predicate) -> Predicate {
        match self {
            Connector::And => Predicate::and(left, right),
            Connector::Or => Predicate::or(left, right),
        }
    }
}

/// The fixed operator vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Is,
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    In,
    Between,
}

impl FilterOperator {
    /// All operators, in lexer priority order.
    pub const ALL: [FilterOperator; 9] = [
        FilterOperator::Between,
        FilterOperator::Like,
        FilterOperator::Lte,
        FilterOperator::Lt,
        FilterOperator::Gte,
        FilterOperator::Gt,
        FilterOperator::In,
        FilterOperator::Is,
        FilterOperator::Eq,
    ];

    /// The keyword as written in a filter expression.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Is => "is",
            FilterOperator::Eq => "eq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Like => "like",
            FilterOperator::In => "in",
            FilterOperator::Between => "between",
        }
    }
}

impl FromStr for FilterOperator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| FilterError::invalid_operator(s))
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized filter clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterClause {
    /// Connector to the previous field group, if the clause starts one.
    pub conjunctive: Option<Connector>,
    /// Field name; `None` continues the previous clause's field.
    pub field_name: Option<String>,
    /// Connector that preceded the operator.
    pub sep: Connector,
    /// Whether the operator is negated with `~`.
    pub inverted: bool,
    /// The operator.
    pub operator: FilterOperator,
    /// Raw operand text, quotes included.
    pub value: String,
}

impl FilterClause {
    /// Key into the operator table, e.g. `"~in"`.
    pub fn operator_key(&self) -> String {
        if self.inverted {
            format!("~{}", self.operator)
        } else {
            self.operator.to_string()
        }
    }
}

/// Comparison performed by a single predicate leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Is,
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    In,
    Between,
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operand {
    /// A single value.
    Scalar(Value),
    /// A list of values (`in`, multi-pattern `like`).
    List(Vec<Value>),
    /// Inclusive bounds.
    Range(Value, Value),
}

/// A single column comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Column name.
    pub column: String,
    /// Comparison operator.
    pub op: CompareOp,
    /// Right-hand side.
    pub operand: Operand,
}

/// A compiled boolean expression over named columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Predicate {
    /// Column comparison.
    Compare(Comparison),
    /// Logical AND of two predicates.
    And(Box<Predicate>, Box<Predicate>),
    /// Logical OR of two predicates.
    Or(Box<Predicate>, Box<Predicate>),
    /// Logical NOT of a predicate.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Creates a comparison leaf.
    pub fn compare(column: impl Into<String>, op: CompareOp, operand: Operand) -> Self {
        Predicate::Compare(Comparison {
            column: column.into(),
            op,
            operand,
        })
    }

    /// Creates an AND predicate from two predicates.
    pub fn and(left: Predicate, right: Predicate) -> Self {
        Predicate::And(Box::new(left), Box::new(right))
    }

    /// Creates an OR predicate from two predicates.
    pub fn or(left: Predicate, right: Predicate) -> Self {
        Predicate::Or(Box::new(left), Box::new(right))
    }

    /// Creates a NOT predicate.
    pub fn negate(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// Column names referenced by this predicate, in first-use order.
    pub fn columns(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_columns(&mut names);
        names
    }

    fn collect_columns<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Predicate::Compare(c) => {
                if !names.contains(&c.column.as_str()) {
                    names.push(&c.column);
                }
            }
            Predicate::And(l, r) | Predicate::Or(l, r) => {
                l.collect_columns(names);
                r.collect_columns(names);
            }
            Predicate::Not(inner) => inner.collect_columns(names),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let column = &self.column;
        match (&self.op, &self.operand) {
            (CompareOp::Between, Operand::Range(low, high)) => {
                write!(f, "{} BETWEEN {} AND {}", column, low, high)
            }
            (CompareOp::In, Operand::List(values)) => {
                write!(f, "{} IN ({})", column, join_values(values))
            }
            (CompareOp::Like, Operand::List(values)) => {
                write!(f, "{} LIKE ANY ({})", column, join_values(values))
            }
            (op, Operand::Scalar(value)) => {
                let symbol = match op {
                    CompareOp::Is => "IS",
                    CompareOp::Eq => "=",
                    CompareOp::Gt => ">",
                    CompareOp::Gte => ">=",
                    CompareOp::Lt => "<",
                    CompareOp::Lte => "<=",
                    CompareOp::Like => "LIKE",
                    CompareOp::In => "IN",
                    CompareOp::Between => "BETWEEN",
                };
                write!(f, "{} {} {}", column, symbol, value)
            }
            (op, operand) => write!(f, "{} {:?} {:?}", column, op, operand),
        }
    }
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare(c) => write!(f, "{}", c),
            Predicate::And(l, r) => write!(f, "({} AND {})", l, r),
            Predicate::Or(l, r) => write!(f, "({} OR {})", l, r),
            Predicate::Not(inner) => write!(f, "NOT {}", inner),
        }
    }
}
