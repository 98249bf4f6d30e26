//! Query filter mini-language: lexer, clause parser and predicate translator.
//!
//! A filter expression is a flat sequence of clauses that compiles to a
//! typed boolean predicate over named columns. The predicate can be
//! evaluated in memory or rendered as parameterized SQL.
//!
//! # Syntax
//!
//! ```text
//! [conjunctive]field<sep>[~]operator:value
//! ```
//!
//! - `field:eq:7` - field equals 7
//! - `field:gte:7:lte:14` - both bounds; the second clause continues `field`
//! - `field:gt:7|lt:3` - either bound (`|` is OR, `:` is AND)
//! - `a:eq:1:b:eq:2` - a new field; field groups are always combined with AND
//! - `field:~in:a,b` - negation with `~` (only `is`, `eq`, `like`, `in`)
//! - `field:between:1,10` - inclusive range, exactly two bounds
//! - `field:like:"%a:b%"` - quoted values may contain separators
//! - `field:is:null` - NULL test
//!
//! ## Operators
//! `is`, `eq`, `gt`, `gte`, `lt`, `lte`, `like`, `in`, `between`
//!
//! # Example
//!
//! ```
//! use query_filter::filter::{compile, ColumnType, PredicateEvaluator, Row, Schema, Value};
//!
//! let schema = Schema::new()
//!     .with_column("id", ColumnType::Integer)
//!     .with_column("name", ColumnType::Text);
//!
//! let predicate = compile("id:lte:5:gte:4|lt:6", &schema).unwrap().unwrap();
//!
//! let mut row = Row::new();
//! row.insert("id".to_string(), Value::Int(3));
//! row.insert("name".to_string(), Value::Null);
//!
//! let evaluator = PredicateEvaluator::new(&predicate);
//! assert!(evaluator.matches(&row));
//! ```

mod ast;
mod error;
mod evaluator;
mod lexer;
mod parser;
mod schema;
mod sql;
mod translator;
mod value;

pub use ast::{
    CompareOp, Comparison, Connector, FilterClause, FilterOperator, Operand, Predicate,
};
pub use error::{FilterError, FilterErrorKind, FilterResult};
pub use evaluator::{like_to_regex, PredicateEvaluator};
pub use lexer::{Lexer, LexerResult, RawToken, SkippedSpan};
pub use parser::{FilterParser, ParseOptions};
pub use schema::{Column, ColumnResolver, Schema};
pub use sql::{quote_identifier, PlaceholderStyle, SqlFragment};
pub use translator::{compile, compile_with, OperatorFn, Translator};
pub use value::{ColumnType, Row, Value};


#[cfg(test)]
mod translator_tests;
