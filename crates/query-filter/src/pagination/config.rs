//! Pagination defaults and bounds.

use serde::{Deserialize, Serialize};

/// Defaults and limits applied to incoming pagination parameters.
///
/// Loaded from the `[pagination]` table of a config file; missing keys
/// take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Offset used when the request has none.
    pub default_offset: u64,
    /// Limit used when the request has none. Zero or -1 means unbounded.
    pub default_limit: i64,
    /// Largest accepted offset, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_offset: Option<u64>,
    /// Largest accepted limit.
    pub max_limit: i64,
    /// Sort column used when the request has none. Empty means unsorted.
    pub default_sort: String,
    /// Whether sorting is descending by default.
    pub default_desc: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_offset: 0,
            default_limit: 25,
            max_offset: None,
            max_limit: 1000,
            default_sort: String::new(),
            default_desc: true,
        }
    }
}
