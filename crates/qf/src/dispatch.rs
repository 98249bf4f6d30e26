//! Command dispatch module for routing CLI commands to their handlers.

use crate::cli::{Cli, Commands, ConfigCommands, Shell};
use crate::commands::{self, CommandContext, CommandError, Result};

/// Trait for executable CLI commands.
#[allow(async_fn_in_trait)]
pub trait CliCommand {
    /// Execute the command.
    async fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// A parsed command, borrowing its arguments from the CLI.
pub enum Dispatch<'a> {
    Tokens(&'a str),
    Parse(&'a str),
    Compile(commands::compile::CompileOptions),
    Query(commands::query::QueryOptions),
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> Dispatch<'a> {
    /// Creates a dispatch from the CLI command.
    pub fn from_cli(cli: &'a Cli) -> Self {
        match &cli.command {
            Some(Commands::Tokens { filter }) => Self::Tokens(filter),
            Some(Commands::Parse { filter }) => Self::Parse(filter),
            Some(Commands::Compile {
                filter,
                schema,
                placeholders,
            }) => Self::Compile(commands::compile::CompileOptions {
                filter: filter.clone(),
                schema: schema.clone(),
                placeholders: *placeholders,
            }),
            Some(Commands::Query {
                data,
                schema,
                url,
                filter,
                offset,
                limit,
                sort,
                asc,
                links,
            }) => Self::Query(commands::query::QueryOptions {
                data: data.clone(),
                schema: schema.clone(),
                url: url.clone(),
                filter: filter.clone(),
                offset: *offset,
                limit: *limit,
                sort: sort.clone(),
                asc: *asc,
                links: *links,
            }),
            Some(Commands::Config { command }) => Self::Config(command),
            Some(Commands::Completions { shell }) => Self::Completions(shell),
            None => Self::Help,
        }
    }

    /// Whether the command reads settings from the config file.
    ///
    /// Config and completion commands must keep working when the config
    /// file is broken.
    pub fn uses_config(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Completions(_) | Self::Help)
    }
}

impl CliCommand for Dispatch<'_> {
    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Self::Tokens(filter) => commands::tokens::execute(ctx, filter),
            Self::Parse(filter) => commands::parse::execute(ctx, filter),
            Self::Compile(opts) => commands::compile::execute(ctx, opts),
            Self::Query(opts) => commands::query::execute(ctx, opts).await,
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("qf - query filter CLI");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::execute_show(ctx),
        Some(ConfigCommands::Path) => commands::config::execute_path(ctx),
        Some(ConfigCommands::Init { force }) => commands::config::execute_init(ctx, *force),
    }
}
