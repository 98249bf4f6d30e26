//! Query command implementation.
//!
//! Loads a JSON data set into an in-memory table and runs one paginated
//! request against it.

use std::path::PathBuf;

use query_filter::filter::{Row, Schema};
use query_filter::pagination::{
    LinkHeaders, MemoryTable, Page, PageParams, Pagination, RequestUrl,
};

use super::input::{read_objects, read_schema};
use super::{CommandContext, Result};
use crate::output::{format_link_headers, format_page_json, format_page_table};

/// Base URL for navigation links when no `--url` is given.
const DEFAULT_BASE_URL: &str = "/";

/// Options for the query command.
pub struct QueryOptions {
    /// JSON data file.
    pub data: PathBuf,
    /// TOML schema file; inferred from the data when absent.
    pub schema: Option<PathBuf>,
    /// Request URL carrying the pagination parameters.
    pub url: Option<String>,
    /// Filter expression.
    pub filter: Option<String>,
    /// Rows to skip.
    pub offset: Option<i64>,
    /// Page size.
    pub limit: Option<i64>,
    /// Sort column.
    pub sort: Option<String>,
    /// Sort ascending.
    pub asc: bool,
    /// Print headers instead of page metadata.
    pub links: bool,
}

impl QueryOptions {
    /// Builds the pagination state, from the URL when one is given.
    fn pagination(&self, ctx: &CommandContext) -> Result<Pagination> {
        if let Some(url) = &self.url {
            return Ok(Pagination::from_url(url, &ctx.pagination)?);
        }

        let params = PageParams {
            offset: self.offset,
            limit: self.limit,
            filter: self.filter.clone(),
            sort: self.sort.clone(),
            desc: self.asc.then_some(false),
        };
        let url = self.link_url(&params)?;
        Ok(Pagination::new(&url, params, &ctx.pagination)?)
    }

    /// Encodes the flags as a URL so navigation links carry them.
    fn link_url(&self, params: &PageParams) -> Result<String> {
        let mut url = RequestUrl::parse(DEFAULT_BASE_URL)?;
        if let Some(filter) = &params.filter {
            url = url.with_param("filter", filter);
        }
        if let Some(sort) = &params.sort {
            url = url.with_param("sort", sort);
        }
        if let Some(desc) = params.desc {
            url = url.with_param("desc", desc);
        }
        if let Some(offset) = params.offset {
            url = url.with_param("offset", offset);
        }
        if let Some(limit) = params.limit {
            url = url.with_param("limit", limit);
        }
        Ok(url.render()?)
    }
}

/// Loads the data file into a table.
fn load_table(ctx: &CommandContext, opts: &QueryOptions) -> Result<MemoryTable> {
    let schema: Option<Schema> = opts.schema.as_deref().map(read_schema).transpose()?;
    let objects = read_objects(&opts.data)?;
    let table = MemoryTable::from_json(&objects, schema)?.with_parse_options(ctx.parse_options);

    if ctx.verbose {
        let columns: Vec<String> = table
            .schema()
            .columns()
            .map(|c| format!("{}:{}", c.name, c.column_type))
            .collect();
        eprintln!("Loaded {} rows ({})", table.len(), columns.join(", "));
    }
    Ok(table)
}

/// Runs the query and returns the page.
///
/// Also returns the table's column names, in display order.
pub async fn run(ctx: &CommandContext, opts: &QueryOptions) -> Result<(Page<Row>, Vec<String>)> {
    let table = load_table(ctx, opts)?;
    let pagination = opts.pagination(ctx)?;
    tracing::debug!(
        offset = pagination.offset(),
        limit = pagination.limit(),
        sort = pagination.sort(),
        filter = ?pagination.filter(),
        "running query"
    );

    let page = pagination.paginate(&table, None).await?;
    let columns = table.schema().columns().map(|c| c.name).collect();
    Ok((page, columns))
}

/// Executes the query command.
pub async fn execute(ctx: &CommandContext, opts: &QueryOptions) -> Result<()> {
    let (page, columns) = run(ctx, opts).await?;

    if opts.links {
        let headers = LinkHeaders::new(page.count, page.prev.as_deref(), page.next.as_deref());
        if ctx.json_output {
            let output = serde_json::json!({
                "headers": headers,
                "data": page.data,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else if !ctx.quiet {
            print!("{}", format_link_headers(&headers));
            println!();
            let bare = Page {
                count: page.count,
                next: None,
                prev: None,
                data: page.data,
            };
            print!("{}", format_page_table(&bare, &columns, ctx.use_colors));
        }
    } else if ctx.json_output {
        println!("{}", format_page_json(&page)?);
    } else if !ctx.quiet {
        print!("{}", format_page_table(&page, &columns, ctx.use_colors));
    }

    Ok(())
}
