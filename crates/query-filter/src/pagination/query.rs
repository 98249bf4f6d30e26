//! The bounded query handed to a [`QueryExecutor`].

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::filter::{ColumnResolver, ParseOptions, Predicate};

/// Row filter passed to an executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryFilter {
    /// An already compiled predicate.
    Predicate(Predicate),
    /// A raw filter expression. The paginator compiles it against
    /// [`QueryExecutor::columns`] before the query runs.
    Text(String),
}

impl From<Predicate> for QueryFilter {
    fn from(predicate: Predicate) -> Self {
        QueryFilter::Predicate(predicate)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Maps the `desc` flag to a direction.
    pub fn from_desc(desc: bool) -> Self {
        if desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// Ordering on a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortOrder {
    /// Column to sort by.
    pub column: String,
    /// Direction.
    pub direction: SortDirection,
}

/// A filtered, ordered, bounded query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageQuery {
    /// Row filter, if any.
    pub filter: Option<QueryFilter>,
    /// Rows to skip.
    pub offset: u64,
    /// Maximum rows to return; `None` is unbounded.
    pub limit: Option<u64>,
    /// Ordering; `None` leaves the executor's natural order.
    pub order: Option<SortOrder>,
}

/// Runs counts and page fetches for the paginator.
///
/// Implement this for a database handle, an HTTP client or an in-memory
/// table. The two calls are issued concurrently and may observe
/// different snapshots of the data.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Row type returned by [`QueryExecutor::fetch`].
    type Row: Send;
    /// Error type for both calls.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Columns that text filters and sort keys are checked against.
    fn columns(&self) -> &dyn ColumnResolver;

    /// Parse options for text filters.
    fn parse_options(&self) -> ParseOptions {
        ParseOptions::default()
    }

    /// Counts rows matching `filter`.
    async fn count(&self, filter: Option<&QueryFilter>) -> Result<u64, Self::Error>;

    /// Fetches one page of rows.
    async fn fetch(&self, query: &PageQuery) -> Result<Vec<Self::Row>, Self::Error>;
}
