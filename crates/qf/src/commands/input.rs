//! Loading of schema and data files.

use std::fs;
use std::path::Path;

use query_filter::filter::Schema;

use super::{CommandError, Result};

/// A JSON object as read from a data file.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Reads a TOML schema file of `column = "type"` pairs.
pub fn read_schema(path: &Path) -> Result<Schema> {
    let content = fs::read_to_string(path)?;
    let schema: Schema = toml::from_str(&content).map_err(|e| {
        CommandError::Input(format!("Failed to parse schema {}: {}", path.display(), e))
    })?;

    if schema.is_empty() {
        return Err(CommandError::Input(format!(
            "Schema {} declares no columns",
            path.display()
        )));
    }

    tracing::debug!(path = %path.display(), columns = schema.len(), "loaded schema");
    Ok(schema)
}

/// Reads a JSON file holding an array of objects.
pub fn read_objects(path: &Path) -> Result<Vec<JsonObject>> {
    let content = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    let serde_json::Value::Array(items) = value else {
        return Err(CommandError::Input(format!(
            "{} must contain a JSON array of objects",
            path.display()
        )));
    };

    let objects = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(object) => Ok(object),
            other => Err(CommandError::Input(format!(
                "{}: element {} is not an object: {}",
                path.display(),
                index,
                other
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(path = %path.display(), rows = objects.len(), "loaded data");
    Ok(objects)
}
