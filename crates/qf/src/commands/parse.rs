//! Parse command implementation.
//!
//! Shows the normalized clauses of a filter expression.

use query_filter::filter::FilterParser;

use super::{CommandContext, Result};
use crate::output::{format_clauses_json, format_clauses_table};

/// Executes the parse command.
pub fn execute(ctx: &CommandContext, filter: &str) -> Result<()> {
    let clauses = FilterParser::with_options(ctx.parse_options).parse_expression(filter)?;
    tracing::debug!(clauses = clauses.len(), "parsed filter");

    if ctx.json_output {
        println!("{}", format_clauses_json(&clauses)?);
    } else if !ctx.quiet {
        print!("{}", format_clauses_table(&clauses, ctx.use_colors));
    }

    Ok(())
}
