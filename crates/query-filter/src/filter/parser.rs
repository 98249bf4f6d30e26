//! Clause parser: turns raw lexer tokens into [`FilterClause`] values.

use serde::{Deserialize, Serialize};

use super::ast::{Connector, FilterClause, FilterOperator};
use super::error::{FilterError, FilterResult};
use super::lexer::{Lexer, RawToken};

/// Parser behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Reject input that the lexer could not tokenize instead of
    /// silently dropping it.
    pub strict: bool,
}

/// Parser for filter expressions.
///
/// Parsing is purely structural: operators and connectors are validated
/// and empty captures become `None`, but field names are not propagated to
/// continuation clauses. That is left to the translator.
///
/// # Example
///
/// ```
/// use query_filter::filter::{Connector, FilterOperator, FilterParser};
///
/// let clauses = FilterParser::parse("age:gte:18|lt:13").unwrap();
/// assert_eq!(clauses.len(), 2);
/// assert_eq!(clauses[0].field_name.as_deref(), Some("age"));
/// assert_eq!(clauses[1].field_name, None);
/// assert_eq!(clauses[1].sep, Connector::Or);
/// assert_eq!(clauses[1].operator, FilterOperator::Lt);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterParser {
    options: ParseOptions,
}

impl FilterParser {
    /// Creates a parser with the given options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parses leniently: unrecognized input is skipped.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::MissingFieldName` if the first clause has no
    /// field name, and `FilterError::InvalidOperator` or
    /// `FilterError::InvalidConnector` for malformed tokens.
    pub fn parse(input: &str) -> FilterResult<Vec<FilterClause>> {
        Self::default().parse_expression(input)
    }

    /// Parses strictly: any unrecognized input is an error.
    ///
    /// # Errors
    ///
    /// As [`FilterParser::parse`], plus `FilterError::UnrecognizedInput`
    /// for the first span that produced no token.
    pub fn parse_strict(input: &str) -> FilterResult<Vec<FilterClause>> {
        Self::with_options(ParseOptions { strict: true }).parse_expression(input)
    }

    /// Parses an expression according to this parser's options.
    pub fn parse_expression(&self, input: &str) -> FilterResult<Vec<FilterClause>> {
        let scanned = Lexer::new(input).scan();

        if self.options.strict {
            if let Some(span) = scanned.skipped.into_iter().next() {
                return Err(FilterError::UnrecognizedInput {
                    fragment: span.fragment,
                    position: span.position,
                });
            }
        }

        Self::parse_tokens(&scanned.tokens)
    }

    /// Validates and normalizes an already tokenized expression.
    pub fn parse_tokens(tokens: &[RawToken]) -> FilterResult<Vec<FilterClause>> {
        let mut clauses = Vec::with_capacity(tokens.len());

        for (index, token) in tokens.iter().enumerate() {
            let clause = FilterClause::try_from(token)?;
            if index == 0 && clause.field_name.is_none() {
                return Err(FilterError::MissingFieldName {
                    position: token.position,
                });
            }
            clauses.push(clause);
        }

        Ok(clauses)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

impl TryFrom<&RawToken> for FilterClause {
    type Error = FilterError;

    fn try_from(token: &RawToken) -> Result<Self, Self::Error> {
        let conjunctive = non_empty(&token.conjunctive)
            .map(Connector::from_symbol)
            .transpose()?;
        let field_name = non_empty(&token.field_name).map(str::to_string);

        // A connector to a previous field group only makes sense on a
        // clause that names the new field.
        if conjunctive.is_some() && field_name.is_none() {
            return Err(FilterError::MissingFieldName {
                position: token.position,
            });
        }

        let sep = Connector::from_symbol(&token.sep)?;
        let operator: FilterOperator = token.operator.parse()?;

        let inverted = match non_empty(&token.inverter) {
            None => false,
            Some("~") => true,
            Some(other) => return Err(FilterError::invalid_operator(format!("{other}{operator}"))),
        };

        Ok(FilterClause {
            conjunctive,
            field_name,
            sep,
            inverted,
            operator,
            value: token.value.clone(),
        })
    }
}
