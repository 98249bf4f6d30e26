//! Tokens command implementation.
//!
//! Shows what the lexer makes of a filter expression, including input it
//! skipped.

use query_filter::filter::{FilterError, Lexer};

use super::{CommandContext, Result};
use crate::output::{format_tokens_json, format_tokens_table};

/// Executes the tokens command.
///
/// Skipped input is only an error in strict mode; otherwise it is listed
/// after the tokens.
pub fn execute(ctx: &CommandContext, filter: &str) -> Result<()> {
    let result = Lexer::new(filter).scan();
    tracing::debug!(
        tokens = result.tokens.len(),
        skipped = result.skipped.len(),
        "scanned filter"
    );

    if ctx.parse_options.strict {
        if let Some(span) = result.skipped.first() {
            return Err(FilterError::UnrecognizedInput {
                fragment: span.fragment.clone(),
                position: span.position,
            }
            .into());
        }
    }

    if ctx.json_output {
        println!("{}", format_tokens_json(&result)?);
    } else if !ctx.quiet {
        print!("{}", format_tokens_table(&result, ctx.use_colors));
    }

    Ok(())
}
