//! Common helper functions for output formatting.

use owo_colors::OwoColorize;
use query_filter::filter::Value;

/// Widest cell shown in a table before truncation.
pub const MAX_CELL_WIDTH: usize = 32;

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Formats a value for a table cell: text unquoted, NULL empty.
pub fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Text(s) => s.clone(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        Value::Int(_) | Value::Float(_) => value.to_string(),
    }
}

/// Appends a header line, dimmed when colors are on.
pub fn push_header(output: &mut String, header: &str, use_colors: bool) {
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(header);
        output.push('\n');
    }
}

/// Pads `s` to `width` characters.
pub fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - len))
    }
}
