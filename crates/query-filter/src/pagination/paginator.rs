//! Per-request pagination state and page assembly.

use serde::{Deserialize, Serialize};

use super::config::PaginationConfig;
use crate::filter::{compile_with, FilterError};
use super::error::PaginationError;
use super::links::{LinkHeaders, RequestUrl};
use super::query::{PageQuery, QueryExecutor, QueryFilter, SortDirection, SortOrder};

/// Pagination parameters as supplied by a caller.
///
/// Every field is optional; missing ones take the [`PaginationConfig`]
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageParams {
    /// Rows to skip.
    pub offset: Option<i64>,
    /// Page size; zero or -1 means unbounded.
    pub limit: Option<i64>,
    /// Raw filter expression.
    pub filter: Option<String>,
    /// Sort column.
    pub sort: Option<String>,
    /// Descending sort.
    pub desc: Option<bool>,
}

impl PageParams {
    /// Reads `offset`, `limit`, `filter`, `sort` and `desc` from a URL's
    /// query string. Other parameters are ignored.
    pub fn from_url(url: &RequestUrl) -> Result<Self, PaginationError> {
        let offset = url
            .param("offset")
            .map(|raw| {
                raw.trim().parse().map_err(|_| PaginationError::InvalidOffset {
                    value: raw.to_string(),
                })
            })
            .transpose()?;
        let limit = url
            .param("limit")
            .map(|raw| {
                raw.trim().parse().map_err(|_| PaginationError::InvalidLimit {
                    value: raw.to_string(),
                })
            })
            .transpose()?;
        let desc = url.param("desc").map(parse_flag).transpose()?;

        Ok(Self {
            offset,
            limit,
            filter: url.param("filter").map(str::to_string),
            sort: url.param("sort").map(str::to_string),
            desc,
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool, PaginationError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(PaginationError::InvalidQuery(format!(
            "desc must be a boolean, not '{}'",
            raw
        ))),
    }
}

/// One page of results with navigation links.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Total rows matching the filter.
    pub count: u64,
    /// URL of the next page, if there is one.
    pub next: Option<String>,
    /// URL of the previous page, if there is one.
    pub prev: Option<String>,
    /// Rows of this page.
    pub data: Vec<T>,
}

/// Validated pagination state for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    url: RequestUrl,
    offset: u64,
    limit: i64,
    sort: String,
    direction: SortDirection,
    filter: Option<String>,
}

impl Pagination {
    /// Builds pagination state from a request URL.
    ///
    /// # Errors
    ///
    /// - `PaginationError::InvalidQuery` if the query string cannot be decoded
    /// - `PaginationError::InvalidOffset` / `InvalidLimit` for out-of-range values
    ///
    /// # Example
    ///
    /// ```
    /// use query_filter::pagination::{Pagination, PaginationConfig};
    ///
    /// let config = PaginationConfig::default();
    /// let pagination = Pagination::from_url("/users?offset=10&limit=10", &config).unwrap();
    /// assert_eq!(pagination.next_url(30).unwrap().as_deref(), Some("/users?offset=20&limit=10"));
    /// assert_eq!(pagination.prev_url().unwrap().as_deref(), Some("/users?limit=10"));
    /// ```
    pub fn from_url(url: &str, config: &PaginationConfig) -> Result<Self, PaginationError> {
        let url = RequestUrl::parse(url)?;
        let params = PageParams::from_url(&url)?;
        Self::build(url, params, config)
    }

    /// Builds pagination state from explicit parameters.
    ///
    /// `url` is only used to construct navigation links.
    pub fn new(
        url: &str,
        params: PageParams,
        config: &PaginationConfig,
    ) -> Result<Self, PaginationError> {
        Self::build(RequestUrl::parse(url)?, params, config)
    }

    fn build(
        url: RequestUrl,
        params: PageParams,
        config: &PaginationConfig,
    ) -> Result<Self, PaginationError> {
        let offset = match params.offset {
            None => config.default_offset,
            Some(raw) => u64::try_from(raw).map_err(|_| PaginationError::InvalidOffset {
                value: raw.to_string(),
            })?,
        };
        if config.max_offset.is_some_and(|max| offset > max) {
            return Err(PaginationError::InvalidOffset {
                value: offset.to_string(),
            });
        }

        let limit = params.limit.unwrap_or(config.default_limit);
        if limit < -1 || limit > config.max_limit {
            return Err(PaginationError::InvalidLimit {
                value: limit.to_string(),
            });
        }

        let filter = params.filter.filter(|f| !f.trim().is_empty());

        Ok(Self {
            url,
            offset,
            limit,
            sort: params.sort.unwrap_or_else(|| config.default_sort.clone()),
            direction: SortDirection::from_desc(params.desc.unwrap_or(config.default_desc)),
            filter,
        })
    }

    /// Rows to skip.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Requested page size; zero or negative means unbounded.
    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Sort column; empty when unsorted.
    pub fn sort(&self) -> &str {
        &self.sort
    }

    /// Sort direction.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Raw filter expression from the request, if any.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// The request URL.
    pub fn url(&self) -> &RequestUrl {
        &self.url
    }

    fn page_size(&self) -> Option<u64> {
        u64::try_from(self.limit).ok().filter(|limit| *limit > 0)
    }

    /// Builds the bounded query for this request.
    ///
    /// `filter` takes precedence over the request's own `filter`
    /// parameter.
    pub fn page_query(&self, filter: Option<QueryFilter>) -> PageQuery {
        let filter = filter.or_else(|| self.filter.clone().map(QueryFilter::Text));
        let order = (!self.sort.is_empty()).then(|| SortOrder {
            column: self.sort.clone(),
            direction: self.direction,
        });

        PageQuery {
            filter,
            offset: self.offset,
            limit: self.page_size(),
            order,
        }
    }

    /// URL of the following page, or `None` on the last page or when
    /// the page size is unbounded.
    pub fn next_url(&self, count: u64) -> Result<Option<String>, PaginationError> {
        let Some(limit) = self.page_size() else {
            return Ok(None);
        };
        let next_offset = self.offset.saturating_add(limit);
        if next_offset >= count {
            return Ok(None);
        }

        self.url
            .with_param("limit", limit)
            .with_param("offset", next_offset)
            .render()
            .map(Some)
    }

    /// URL of the preceding page, or `None` on the first page.
    ///
    /// When the preceding page starts at zero the `offset` parameter is
    /// removed rather than set to 0.
    pub fn prev_url(&self) -> Result<Option<String>, PaginationError> {
        if self.offset == 0 {
            return Ok(None);
        }

        let url = match self.page_size() {
            Some(limit) if self.offset > limit => self
                .url
                .with_param("limit", limit)
                .with_param("offset", self.offset - limit),
            _ => self.url.without_param("offset"),
        };
        url.render().map(Some)
    }

    /// Builds the bounded query and checks it against `executor`'s columns.
    ///
    /// A text filter is compiled into a predicate, and the sort column
    /// must resolve.
    ///
    /// # Errors
    ///
    /// Returns the `FilterError` of a filter that does not compile or a
    /// sort column that does not exist.
    pub fn prepare<X: QueryExecutor + ?Sized>(
        &self,
        executor: &X,
        filter: Option<QueryFilter>,
    ) -> Result<PageQuery, FilterError> {
        let mut query = self.page_query(filter);
        let columns = executor.columns();

        query.filter = match query.filter.take() {
            Some(QueryFilter::Text(text)) => {
                compile_with(&text, columns, executor.parse_options())?.map(QueryFilter::Predicate)
            }
            other => other,
        };
        if let Some(order) = &query.order {
            if columns.resolve(&order.column).is_none() {
                return Err(FilterError::unknown_field(order.column.clone()));
            }
        }
        Ok(query)
    }

    /// Counts and fetches one page through `executor`.
    ///
    /// The count and fetch run concurrently. Filter and sort problems are
    /// returned as `PaginationError::Filter` before the executor is
    /// called; executor errors as `PaginationError::Executor`.
    pub async fn paginate<X: QueryExecutor>(
        &self,
        executor: &X,
        filter: Option<QueryFilter>,
    ) -> Result<Page<X::Row>, PaginationError<X::Error>> {
        let query = self.prepare(executor, filter)?;
        tracing::debug!(
            offset = query.offset,
            limit = ?query.limit,
            order = ?query.order,
            filtered = query.filter.is_some(),
            "paginating query"
        );

        let (count, data) = tokio::try_join!(
            executor.count(query.filter.as_ref()),
            executor.fetch(&query)
        )
        .map_err(PaginationError::Executor)?;

        let next = self.next_url(count).map_err(|e| e.widen())?;
        let prev = self.prev_url().map_err(|e| e.widen())?;
        tracing::debug!(count, rows = data.len(), "page assembled");

        Ok(Page {
            count,
            next,
            prev,
            data,
        })
    }

    /// Like [`Pagination::paginate`] but returns the navigation as
    /// `Link` header values.
    pub async fn paginate_links<X: QueryExecutor>(
        &self,
        executor: &X,
        filter: Option<QueryFilter>,
    ) -> Result<(Vec<X::Row>, LinkHeaders), PaginationError<X::Error>> {
        let page = self.paginate(executor, filter).await?;
        let headers = LinkHeaders::new(page.count, page.prev.as_deref(), page.next.as_deref());
        Ok((page.data, headers))
    }
}
