//! Config command implementation.
//!
//! View and initialize configuration settings.
//! Config file is located at ~/.config/qf/config.toml.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use query_filter::pagination::PaginationConfig;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "QF_CONFIG";

/// Default config file contents.
const DEFAULT_CONFIG: &str = r#"# qf - query filter CLI configuration

# Config schema version (do not modify)
version = 1

# Filter parsing
[filter]
# strict = false            # Reject input that is not part of the filter language

# Pagination defaults and bounds
[pagination]
# default_offset = 0
# default_limit = 25        # Used when a request has no limit
# max_offset = 10000        # Unset means unbounded
# max_limit = 1000
# default_sort = ""         # Empty means unsorted
# default_desc = true

# Output preferences
[output]
# color = true
"#;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Filter settings.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Pagination settings.
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            filter: FilterConfig::default(),
            pagination: PaginationConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Filter configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Reject untokenizable input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Gets the config directory path.
/// Uses XDG-style paths: ~/.config/qf/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        let path = PathBuf::from(path);
        if let Some(parent) = path.parent() {
            return Ok(parent.to_path_buf());
        }
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("qf"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("qf"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Gets the config file path.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from disk.
///
/// A missing file yields the defaults.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    tracing::debug!(path = %path.display(), version = config.version, "loaded config");
    migrate_config(config)
}

/// Migrates config to current version if needed.
fn migrate_config(mut config: Config) -> Result<Config> {
    // Version 1 is the initial schema.
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        use owo_colors::OwoColorize;

        let header = "Configuration";
        if ctx.use_colors {
            println!("{}\n", header.green().bold());
        } else {
            println!("{}\n", header);
        }

        println!("File: {}", path.display());
        println!("Exists: {}\n", path.exists());

        if !path.exists() {
            println!("(No config file exists. Run 'qf config init' to create one.)\n");
        }

        let pagination = &config.pagination;
        println!("[filter]");
        println!("  strict: {}", config.filter.strict.unwrap_or(false));

        println!("\n[pagination]");
        println!("  default_offset: {}", pagination.default_offset);
        println!("  default_limit: {}", pagination.default_limit);
        match pagination.max_offset {
            Some(max) => println!("  max_offset: {}", max),
            None => println!("  max_offset: (unbounded)"),
        }
        println!("  max_limit: {}", pagination.max_limit);
        if pagination.default_sort.is_empty() {
            println!("  default_sort: (none)");
        } else {
            println!("  default_sort: {}", pagination.default_sort);
        }
        println!("  default_desc: {}", pagination.default_desc);

        println!("\n[output]");
        println!("  color: {}", config.output.color.unwrap_or(true));
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}

/// Writes the default config file.
///
/// Returns `true` if a file was written, `false` if one already existed
/// and `force` was not set.
fn write_default_config(force: bool) -> Result<bool> {
    let path = get_config_path()?;
    if path.exists() && !force {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CommandError::Config(format!("Failed to create config directory: {}", e)))?;
    }

    fs::write(&path, DEFAULT_CONFIG)
        .map_err(|e| CommandError::Config(format!("Failed to create config file: {}", e)))?;
    Ok(true)
}

/// Executes the config init command.
pub fn execute_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = get_config_path()?;
    let created = write_default_config(force)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": if created { "created" } else { "exists" },
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        if created {
            println!("Created default config at: {}", path.display());
        } else {
            println!(
                "Config already exists at: {} (use --force to overwrite)",
                path.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    /// Points `QF_CONFIG` at `path` for the duration of `f`.
    fn with_config_path<T>(path: &std::path::Path, f: impl FnOnce() -> T) -> T {
        let original = env::var(CONFIG_ENV).ok();
        env::set_var(CONFIG_ENV, path);

        let result = f();

        if let Some(val) = original {
            env::set_var(CONFIG_ENV, val);
        } else {
            env::remove_var(CONFIG_ENV);
        }
        result
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.filter.strict.is_none());
        assert!(config.output.color.is_none());
        assert_eq!(config.pagination, PaginationConfig::default());
    }

    #[test]
    fn test_default_config_file_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.version, 1);
        assert!(config.filter.strict.is_none());
        assert_eq!(config.pagination, PaginationConfig::default());
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
version = 1

[filter]
strict = true

[pagination]
default_limit = 10
max_limit = 100
max_offset = 500
default_sort = "created_at"
default_desc = false

[output]
color = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.filter.strict, Some(true));
        assert_eq!(config.pagination.default_limit, 10);
        assert_eq!(config.pagination.max_limit, 100);
        assert_eq!(config.pagination.max_offset, Some(500));
        assert_eq!(config.pagination.default_sort, "created_at");
        assert!(!config.pagination.default_desc);
        assert_eq!(config.pagination.default_offset, 0);
        assert_eq!(config.output.color, Some(false));
    }

    #[test]
    fn test_config_deserialization_empty() {
        let config: Config = toml::from_str("").unwrap();
        // Missing version defaults to current version
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.filter.strict.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.filter.strict = Some(true);
        config.output.color = Some(false);

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("version = 1"));
        assert!(toml_str.contains("[filter]"));
        assert!(toml_str.contains("strict = true"));
        assert!(toml_str.contains("[pagination]"));
        assert!(toml_str.contains("default_limit = 25"));
        assert!(toml_str.contains("color = false"));
    }

    #[test]
    fn test_migrate_config_preserves_data() {
        let mut config = Config::default();
        config.version = 0;
        config.filter.strict = Some(true);
        config.pagination.max_limit = 50;

        let migrated = migrate_config(config).unwrap();
        assert_eq!(migrated.version, CONFIG_VERSION);
        assert_eq!(migrated.filter.strict, Some(true));
        assert_eq!(migrated.pagination.max_limit, 50);
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");

        let resolved = with_config_path(&path, get_config_path).unwrap();
        assert_eq!(resolved, path);
    }

    #[test]
    #[serial]
    fn test_load_missing_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");

        let config = with_config_path(&path, load_config).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.pagination, PaginationConfig::default());
    }

    #[test]
    #[serial]
    fn test_load_invalid_config_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[pagination]\ndefault_limit = \"lots\"\n").unwrap();

        let result = with_config_path(&path, load_config);
        assert!(matches!(result, Err(CommandError::Config(_))));
    }

    #[test]
    #[serial]
    fn test_write_default_config_respects_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        with_config_path(&path, || {
            assert!(write_default_config(false).unwrap());
            assert!(path.exists());

            fs::write(&path, "version = 1\n[output]\ncolor = false\n").unwrap();
            assert!(!write_default_config(false).unwrap());
            assert_eq!(load_config().unwrap().output.color, Some(false));

            assert!(write_default_config(true).unwrap());
            assert!(load_config().unwrap().output.color.is_none());
        });
    }
}
