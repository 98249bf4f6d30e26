//! Offset/limit pagination over a [`QueryExecutor`].
//!
//! A [`Pagination`] is built per request from the request URL and a
//! [`PaginationConfig`]. It turns an optional filter into a bounded
//! [`PageQuery`], runs the count and the fetch through the executor and
//! derives `prev`/`next` links from the total count.
//!
//! # Example
//!
//! ```
//! use query_filter::filter::{ColumnType, Row, Schema, Value};
//! use query_filter::pagination::{MemoryTable, Pagination, PaginationConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Schema::new().with_column("id", ColumnType::Integer);
//! let rows = (1..=30)
//!     .map(|id| Row::from([("id".to_string(), Value::Int(id))]))
//!     .collect();
//! let table = MemoryTable::new(schema, rows);
//!
//! let pagination = Pagination::from_url("/users?limit=10", &PaginationConfig::default())?;
//! let page = pagination.paginate(&table, None).await?;
//! assert_eq!(page.count, 30);
//! assert_eq!(page.next.as_deref(), Some("/users?limit=10&offset=10"));
//! assert_eq!(page.prev, None);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod links;
mod memory;
mod paginator;
mod query;

pub use config::PaginationConfig;
pub use error::PaginationError;
pub use links::{format_link, LinkHeaders, LinkRel, RequestUrl, LINK_HEADER, TOTAL_COUNT_HEADER};
pub use memory::MemoryTable;
pub use paginator::{Page, PageParams, Pagination};
pub use query::{PageQuery, QueryExecutor, QueryFilter, SortDirection, SortOrder};
