//! Output formatting utilities for the qf CLI.
//!
//! This module provides functions for formatting data as tables or JSON.
//! It is organized into submodules by what is being shown:
//!
//! - [`filters`] - Tokens, clauses and compiled predicates
//! - [`rows`] - Pages of rows and pagination headers
//! - [`helpers`] - Common formatting utilities (truncation, cells, headers)

mod filters;
pub mod helpers;
mod rows;

// Filters
pub use filters::{
    format_clauses_json, format_clauses_table, format_compiled_json, format_compiled_text,
    format_tokens_json, format_tokens_table,
};

// Rows
pub use rows::{format_link_headers, format_page_json, format_page_table};
