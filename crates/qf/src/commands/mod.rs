//! Command implementations for the qf CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod compile;
pub mod completions;
pub mod config;
pub mod input;
pub mod parse;
pub mod query;
pub mod tokens;

use query_filter::filter::{FilterError, ParseOptions};
use query_filter::pagination::{PaginationConfig, PaginationError};

use crate::cli::Cli;
use self::config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Filter parsing or compilation error.
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    /// Pagination error.
    #[error("pagination error: {0}")]
    Pagination(#[from] PaginationError<FilterError>),

    /// Schema or data file could not be used.
    #[error("invalid input: {0}")]
    Input(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<PaginationError> for CommandError {
    fn from(err: PaginationError) -> Self {
        CommandError::Pagination(err.widen())
    }
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
    /// Parser options for filter expressions.
    pub parse_options: ParseOptions,
    /// Pagination defaults and bounds.
    pub pagination: PaginationConfig,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and the loaded config.
    ///
    /// Flags win over the config file: `--no-color` disables colors even
    /// when `output.color = true`, and `--strict` enables strict parsing
    /// regardless of `filter.strict`.
    pub fn from_cli(cli: &Cli, config: &Config) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && config.output.color.unwrap_or(true),
            quiet: cli.quiet,
            verbose: cli.verbose,
            parse_options: ParseOptions {
                strict: cli.strict || config.filter.strict.unwrap_or(false),
            },
            pagination: config.pagination.clone(),
        }
    }
}
