//! Translation of parsed clauses into a compiled [`Predicate`].
//!
//! Clauses are grouped by field. Inside a group each clause is joined to
//! the ones before it with its own connector, left to right, so
//! `id:lte:5:gte:4|lt:6` becomes `(id <= 5 AND id >= 4) OR id < 6`. A
//! clause naming a different field, or naming the same field with a
//! different conjunctive, closes the group. Closed groups are then
//! combined with AND, left to right.

use super::ast::{CompareOp, Connector, FilterClause, FilterOperator, Operand, Predicate};
use super::error::{FilterError, FilterResult};
use super::parser::{FilterParser, ParseOptions};
use super::schema::{Column, ColumnResolver};
use super::value::{ColumnType, Value};

/// Operator table: key as written in the expression, comparison, negated.
///
/// Ordering comparisons and `between` have no negated form; their `~`
/// keys are absent on purpose.
const OPERATOR_TABLE: &[(&str, CompareOp, bool)] = &[
    ("is", CompareOp::Is, false),
    ("eq", CompareOp::Eq, false),
    ("gt", CompareOp::Gt, false),
    ("gte", CompareOp::Gte, false),
    ("lt", CompareOp::Lt, false),
    ("lte", CompareOp::Lte, false),
    ("like", CompareOp::Like, false),
    ("in", CompareOp::In, false),
    ("between", CompareOp::Between, false),
    ("~is", CompareOp::Is, true),
    ("~eq", CompareOp::Eq, true),
    ("~like", CompareOp::Like, true),
    ("~in", CompareOp::In, true),
];

/// An entry of the operator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorFn {
    op: CompareOp,
    negated: bool,
}

impl OperatorFn {
    /// Looks up an operator key such as `"gte"` or `"~in"`.
    pub fn lookup(key: &str) -> Option<Self> {
        OPERATOR_TABLE
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|&(_, op, negated)| Self { op, negated })
    }

    /// Applies the operator to a column and operand.
    pub fn apply(&self, column: &Column, operand: Operand) -> Predicate {
        let leaf = Predicate::compare(column.name.clone(), self.op, operand);
        if self.negated {
            Predicate::negate(leaf)
        } else {
            leaf
        }
    }
}

/// The clauses of one field group, folded as they arrive.
#[derive(Debug)]
struct Group {
    connector: Option<Connector>,
    expr: Option<Predicate>,
}

impl Group {
    fn new(connector: Option<Connector>) -> Self {
        Self {
            connector,
            expr: None,
        }
    }

    fn push(&mut self, connector: Connector, predicate: Predicate) {
        self.expr = Some(match self.expr.take() {
            None => predicate,
            Some(acc) => connector.join(acc, predicate),
        });
    }

    /// Moves a non-empty group into `flushed`; empty groups vanish.
    fn flush_into(self, flushed: &mut Vec<Predicate>) {
        if let Some(expr) = self.expr {
            flushed.push(expr);
        }
    }
}

/// Compiles clause lists against a column resolver.
pub struct Translator<'a, R: ColumnResolver + ?Sized> {
    resolver: &'a R,
}

impl<'a, R: ColumnResolver + ?Sized> Translator<'a, R> {
    /// Creates a translator that resolves fields with `resolver`.
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    /// Translates clauses into a predicate.
    ///
    /// Returns `Ok(None)` for an empty clause list.
    ///
    /// # Errors
    ///
    /// - `FilterError::MissingFieldName` if the first clause has no field
    /// - `FilterError::UnknownField` if a field does not resolve
    /// - `FilterError::TypeCoercion`, `BetweenBounds`, `EmptyList` for bad values
    /// - `FilterError::OperatorNotInvertible` for keys like `~gt`
    pub fn translate(&self, clauses: &[FilterClause]) -> FilterResult<Option<Predicate>> {
        let Some(first) = clauses.first() else {
            return Ok(None);
        };
        let mut current_field = first
            .field_name
            .clone()
            .ok_or(FilterError::MissingFieldName { position: 0 })?;

        let mut group = Group::new(first.conjunctive);
        let mut flushed = Vec::new();

        for clause in clauses {
            let mut join_with = clause.sep;

            if let Some(field) = &clause.field_name {
                if *field != current_field {
                    std::mem::replace(&mut group, Group::new(clause.conjunctive))
                        .flush_into(&mut flushed);
                    current_field = field.clone();
                } else if clause.conjunctive.is_some() && clause.conjunctive != group.connector {
                    std::mem::replace(&mut group, Group::new(clause.conjunctive))
                        .flush_into(&mut flushed);
                } else if let Some(conjunctive) = clause.conjunctive {
                    join_with = conjunctive;
                }
            }

            let column = self
                .resolver
                .resolve(&current_field)
                .ok_or_else(|| FilterError::unknown_field(current_field.clone()))?;

            let key = clause.operator_key();
            let operator = OperatorFn::lookup(&key)
                .ok_or(FilterError::OperatorNotInvertible { operator: key })?;
            let operand = coerce_operand(&column, clause)?;

            group.push(join_with, operator.apply(&column, operand));
        }
        group.flush_into(&mut flushed);

        let Some(predicate) = flushed.into_iter().reduce(Predicate::and) else {
            return Ok(None);
        };

        tracing::debug!(predicate = %predicate, "compiled filter");
        Ok(Some(predicate))
    }
}

/// Parses and translates a filter expression in one step (lenient mode).
///
/// # Example
///
/// ```
/// use query_filter::filter::{compile, ColumnType, Schema};
///
/// let schema = Schema::new().with_column("id", ColumnType::Integer);
/// let predicate = compile("id:lte:5:gte:4|lt:6", &schema).unwrap().unwrap();
/// assert_eq!(predicate.to_string(), "((id <= 5 AND id >= 4) OR id < 6)");
/// ```
pub fn compile<R: ColumnResolver + ?Sized>(
    input: &str,
    resolver: &R,
) -> FilterResult<Option<Predicate>> {
    compile_with(input, resolver, ParseOptions::default())
}

/// Parses and translates a filter expression with explicit parse options.
pub fn compile_with<R: ColumnResolver + ?Sized>(
    input: &str,
    resolver: &R,
    options: ParseOptions,
) -> FilterResult<Option<Predicate>> {
    let clauses = FilterParser::with_options(options).parse_expression(input)?;
    Translator::new(resolver).translate(&clauses)
}

/// Converts a clause's raw value into an operand for `column`.
fn coerce_operand(column: &Column, clause: &FilterClause) -> FilterResult<Operand> {
    let (inner, quoted) = strip_quotes(&clause.value);

    match clause.operator {
        FilterOperator::In => {
            let values = coerce_list(column, column.column_type, inner)?;
            Ok(Operand::List(values))
        }
        FilterOperator::Between => {
            let mut values = coerce_list(column, column.column_type, inner)?;
            if values.len() != 2 {
                return Err(FilterError::BetweenBounds {
                    field: column.name.clone(),
                    count: values.len(),
                });
            }
            let high = values.pop().unwrap_or(Value::Null);
            let low = values.pop().unwrap_or(Value::Null);
            Ok(Operand::Range(low, high))
        }
        // Patterns are text whatever the column type. An unquoted comma
        // list matches any of its patterns.
        FilterOperator::Like if !quoted && split_list(inner).len() > 1 => {
            let values = coerce_list(column, ColumnType::Text, inner)?;
            Ok(Operand::List(values))
        }
        FilterOperator::Like => Ok(Operand::Scalar(Value::Text(unescape(inner)))),
        FilterOperator::Is => {
            let text = unescape(inner);
            if !quoted && matches!(text.to_lowercase().as_str(), "null" | "none") {
                return Ok(Operand::Scalar(Value::Null));
            }
            coerce_scalar(column, column.column_type, &text).map(Operand::Scalar)
        }
        FilterOperator::Eq
        | FilterOperator::Gt
        | FilterOperator::Gte
        | FilterOperator::Lt
        | FilterOperator::Lte => {
            coerce_scalar(column, column.column_type, &unescape(inner)).map(Operand::Scalar)
        }
    }
}

fn coerce_scalar(column: &Column, column_type: ColumnType, text: &str) -> FilterResult<Value> {
    column_type
        .coerce(text)
        .ok_or_else(|| FilterError::type_coercion(column.name.clone(), text, column_type.name()))
}

fn coerce_list(column: &Column, column_type: ColumnType, inner: &str) -> FilterResult<Vec<Value>> {
    if inner.is_empty() {
        return Err(FilterError::EmptyList {
            field: column.name.clone(),
        });
    }
    split_list(inner)
        .iter()
        .map(|item| coerce_scalar(column, column_type, item))
        .collect()
}

/// Removes one pair of matching surrounding quotes.
///
/// Returns the inner text (escapes untouched) and whether quotes were
/// present.
fn strip_quotes(raw: &str) -> (&str, bool) {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return (&raw[1..raw.len() - 1], true);
        }
    }
    (raw, false)
}

/// Drops escaping backslashes: `\:` becomes `:`, `\\` becomes `\`.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Splits on unescaped commas, unescaping each element.
fn split_list(s: &str) -> Vec<String> {
    let mut items = vec![String::new()];
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    if let Some(last) = items.last_mut() {
                        last.push(escaped);
                    }
                }
            }
            ',' => items.push(String::new()),
            _ => {
                if let Some(last) = items.last_mut() {
                    last.push(c);
                }
            }
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_table_lookup() {
        assert!(OperatorFn::lookup("gte").is_some());
        assert!(OperatorFn::lookup("~in").is_some());
        assert!(OperatorFn::lookup("~gt").is_none());
        assert!(OperatorFn::lookup("~between").is_none());
        assert!(OperatorFn::lookup("regex").is_none());
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes(r#""abc""#), ("abc", true));
        assert_eq!(strip_quotes("'abc'"), ("abc", true));
        assert_eq!(strip_quotes("abc"), ("abc", false));
        assert_eq!(strip_quotes(r#""abc'"#), (r#""abc'"#, false));
        assert_eq!(strip_quotes("\""), ("\"", false));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"2020-01-01T17\:22\:20"), "2020-01-01T17:22:20");
        assert_eq!(unescape(r#"bu\"eno"#), "bu\"eno");
        assert_eq!(unescape(r"a\\b"), r"a\b");
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_list(r"a\,b,c"), vec!["a,b", "c"]);
        assert_eq!(split_list("single"), vec!["single"]);
        assert_eq!(split_list("a,,b"), vec!["a", "", "b"]);
    }
}
