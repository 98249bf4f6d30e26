//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the qf CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// qf - Inspect, compile and run query filter expressions
#[derive(Parser, Debug)]
#[command(name = "qf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Reject input that is not part of the filter language
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the raw tokens of a filter expression
    #[command(alias = "t")]
    Tokens {
        /// Filter expression (e.g., "age:gte:18|lt:13")
        filter: String,
    },

    /// Parse a filter expression into clauses
    #[command(alias = "p")]
    Parse {
        /// Filter expression
        filter: String,
    },

    /// Compile a filter expression against a schema and render it as SQL
    #[command(alias = "c")]
    Compile {
        /// Filter expression
        filter: String,

        /// TOML file mapping column names to types
        #[arg(short, long)]
        schema: PathBuf,

        /// Placeholder syntax for bind parameters
        #[arg(long, value_enum, default_value = "pg")]
        placeholders: Placeholders,
    },

    /// Filter, sort and paginate a JSON data set
    #[command(alias = "q")]
    Query {
        /// JSON file containing an array of objects
        #[arg(short, long)]
        data: PathBuf,

        /// TOML schema file (default: inferred from the data)
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Request URL carrying offset, limit, filter, sort and desc
        #[arg(long, conflicts_with_all = ["filter", "offset", "limit", "sort", "asc"])]
        url: Option<String>,

        /// Filter expression
        #[arg(short, long)]
        filter: Option<String>,

        /// Rows to skip
        #[arg(long, allow_negative_numbers = true)]
        offset: Option<i64>,

        /// Page size (0 or -1 for all rows)
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Column to sort by
        #[arg(long)]
        sort: Option<String>,

        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,

        /// Print X-Total-Count and Link headers instead of page metadata
        #[arg(long)]
        links: bool,
    },

    /// View or initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Placeholder styles for SQL output
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placeholders {
    /// Numbered placeholders ($1, $2, ...)
    Pg,
    /// Positional placeholders (?)
    Qmark,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show config file path
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["qf", "--json", "--strict", "-v", "tokens", "id:eq:1"]).unwrap();
        assert!(cli.json);
        assert!(cli.strict);
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["qf", "-v", "-q", "tokens", "id:eq:1"]).is_err());
    }

    #[test]
    fn test_parse_command() {
        let cli = Cli::try_parse_from(["qf", "parse", "age:gte:18|lt:13"]).unwrap();
        if let Some(Commands::Parse { filter }) = cli.command {
            assert_eq!(filter, "age:gte:18|lt:13");
        } else {
            panic!("Expected Parse command");
        }
    }

    #[test]
    fn test_compile_defaults_to_postgres_placeholders() {
        let cli = Cli::try_parse_from(["qf", "compile", "id:eq:1", "--schema", "schema.toml"]).unwrap();
        if let Some(Commands::Compile {
            schema,
            placeholders,
            ..
        }) = cli.command
        {
            assert_eq!(schema, PathBuf::from("schema.toml"));
            assert_eq!(placeholders, Placeholders::Pg);
        } else {
            panic!("Expected Compile command");
        }
    }

    #[test]
    fn test_compile_qmark_placeholders() {
        let cli = Cli::try_parse_from([
            "qf",
            "compile",
            "id:eq:1",
            "-s",
            "schema.toml",
            "--placeholders",
            "qmark",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Compile {
                placeholders: Placeholders::Qmark,
                ..
            })
        ));
    }

    #[test]
    fn test_query_command_flags() {
        let cli = Cli::try_parse_from([
            "qf", "query", "-d", "users.json", "-f", "id:lt:10", "--offset", "5", "-l", "-1",
            "--sort", "id", "--asc",
        ])
        .unwrap();
        if let Some(Commands::Query {
            data,
            filter,
            offset,
            limit,
            sort,
            asc,
            links,
            url,
            schema,
        }) = cli.command
        {
            assert_eq!(data, PathBuf::from("users.json"));
            assert_eq!(filter.as_deref(), Some("id:lt:10"));
            assert_eq!(offset, Some(5));
            assert_eq!(limit, Some(-1));
            assert_eq!(sort.as_deref(), Some("id"));
            assert!(asc);
            assert!(!links);
            assert!(url.is_none());
            assert!(schema.is_none());
        } else {
            panic!("Expected Query command");
        }
    }

    #[test]
    fn test_query_url_conflicts_with_flags() {
        let result = Cli::try_parse_from([
            "qf",
            "query",
            "-d",
            "users.json",
            "--url",
            "/users?limit=5",
            "--limit",
            "10",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_init_force() {
        let cli = Cli::try_parse_from(["qf", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                command: Some(ConfigCommands::Init { force: true })
            })
        ));
    }

    #[test]
    fn test_completions_command() {
        let cli = Cli::try_parse_from(["qf", "completions", "zsh"]).unwrap();
        if let Some(Commands::Completions { shell }) = cli.command {
            assert!(matches!(shell, Shell::Zsh));
        } else {
            panic!("Expected Completions command");
        }
    }
}
