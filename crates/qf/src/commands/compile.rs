//! Compile command implementation.
//!
//! Compiles a filter expression against a schema file and renders the
//! result as a parameterized SQL `WHERE` body.

use std::path::PathBuf;

use query_filter::filter::{compile_with, PlaceholderStyle};

use super::input::read_schema;
use super::{CommandContext, Result};
use crate::cli::Placeholders;
use crate::output::{format_compiled_json, format_compiled_text};

/// Options for the compile command.
pub struct CompileOptions {
    /// Filter expression.
    pub filter: String,
    /// TOML schema file.
    pub schema: PathBuf,
    /// Placeholder syntax.
    pub placeholders: Placeholders,
}

impl From<Placeholders> for PlaceholderStyle {
    fn from(placeholders: Placeholders) -> Self {
        match placeholders {
            Placeholders::Pg => PlaceholderStyle::Postgres,
            Placeholders::Qmark => PlaceholderStyle::QuestionMark,
        }
    }
}

/// Executes the compile command.
pub fn execute(ctx: &CommandContext, opts: &CompileOptions) -> Result<()> {
    let schema = read_schema(&opts.schema)?;
    let predicate = compile_with(&opts.filter, &schema, ctx.parse_options)?;
    let sql = predicate
        .as_ref()
        .map(|p| p.to_sql(PlaceholderStyle::from(opts.placeholders)));

    if ctx.verbose {
        if let Some(predicate) = &predicate {
            eprintln!("Columns referenced: {}", predicate.columns().join(", "));
        }
    }

    if ctx.json_output {
        println!("{}", format_compiled_json(predicate.as_ref(), sql.as_ref())?);
    } else if !ctx.quiet {
        print!(
            "{}",
            format_compiled_text(predicate.as_ref(), sql.as_ref(), ctx.use_colors)
        );
    }

    Ok(())
}
