//! Request URLs and RFC 5988 `Link` headers.

use std::fmt;

use serde::Serialize;

use super::error::PaginationError;

/// Header carrying the total row count.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Header carrying navigation links.
pub const LINK_HEADER: &str = "link";

/// A request URL split into its base and decoded query parameters.
///
/// Parameter order is preserved so rebuilt links stay close to the
/// request that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrl {
    base: String,
    params: Vec<(String, String)>,
}

impl RequestUrl {
    /// Parses a URL or path with an optional query string.
    ///
    /// Any `#fragment` is dropped.
    pub fn parse(url: &str) -> Result<Self, PaginationError> {
        let url = url.split_once('#').map_or(url, |(before, _)| before);
        let (base, query) = url.split_once('?').unwrap_or((url, ""));
        let params: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| PaginationError::InvalidQuery(e.to_string()))?;

        Ok(Self {
            base: base.to_string(),
            params,
        })
    }

    /// The URL without its query string.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// First value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns a copy with `key` set to `value`.
    ///
    /// An existing parameter keeps its position and loses any duplicates;
    /// a new one is appended.
    pub fn with_param(&self, key: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        let mut params = Vec::with_capacity(self.params.len() + 1);
        let mut replaced = false;

        for (k, v) in &self.params {
            if k != key {
                params.push((k.clone(), v.clone()));
            } else if !replaced {
                params.push((k.clone(), value.clone()));
                replaced = true;
            }
        }
        if !replaced {
            params.push((key.to_string(), value));
        }

        Self {
            base: self.base.clone(),
            params,
        }
    }

    /// Returns a copy without any `key` parameters.
    pub fn without_param(&self, key: &str) -> Self {
        Self {
            base: self.base.clone(),
            params: self
                .params
                .iter()
                .filter(|(k, _)| k != key)
                .cloned()
                .collect(),
        }
    }

    /// Renders the URL with its query string re-encoded.
    pub fn render(&self) -> Result<String, PaginationError> {
        if self.params.is_empty() {
            return Ok(self.base.clone());
        }
        let query = serde_urlencoded::to_string(&self.params)
            .map_err(|e| PaginationError::InvalidQuery(e.to_string()))?;
        Ok(format!("{}?{}", self.base, query))
    }
}

/// Relation of a navigation link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRel {
    Prev,
    Next,
}

impl fmt::Display for LinkRel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkRel::Prev => f.write_str("prev"),
            LinkRel::Next => f.write_str("next"),
        }
    }
}

/// Formats one `Link` header entry: `<url>; rel="next"`.
pub fn format_link(url: &str, rel: LinkRel) -> String {
    format!("<{}>; rel=\"{}\"", url, rel)
}

/// Header values for link-based pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkHeaders {
    /// Total rows matching the filter.
    pub total_count: u64,
    /// `Link` entries, `prev` before `next`, only for links that exist.
    pub links: Vec<String>,
}

impl LinkHeaders {
    /// Builds headers from a count and optional link URLs.
    pub fn new(total_count: u64, prev: Option<&str>, next: Option<&str>) -> Self {
        let links = [(prev, LinkRel::Prev), (next, LinkRel::Next)]
            .into_iter()
            .filter_map(|(url, rel)| url.map(|url| format_link(url, rel)))
            .collect();
        Self { total_count, links }
    }

    /// Returns true if a link with the given relation is present.
    pub fn has(&self, rel: LinkRel) -> bool {
        let suffix = format!("rel=\"{}\"", rel);
        self.links.iter().any(|link| link.ends_with(&suffix))
    }

    /// Header name/value pairs ready to set on a response.
    ///
    /// The `link` header is always present; it is empty when there is
    /// nowhere to navigate.
    pub fn header_pairs(&self) -> [(&'static str, String); 2] {
        [
            (TOTAL_COUNT_HEADER, self.total_count.to_string()),
            (LINK_HEADER, self.links.join(",")),
        ]
    }
}
