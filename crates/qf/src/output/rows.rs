//! Page and pagination header output formatting.

use owo_colors::OwoColorize;
use query_filter::filter::{Row, Value};
use query_filter::pagination::{LinkHeaders, Page};

use super::helpers::{format_cell, pad, push_header, truncate_str, MAX_CELL_WIDTH};

/// Formats a page as JSON: `{count, next, prev, data}`.
pub fn format_page_json(page: &Page<Row>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(page)
}

/// Formats the rows of a page as a table with a summary footer.
///
/// `columns` fixes the column order; values missing from a row show as
/// empty cells.
pub fn format_page_table(page: &Page<Row>, columns: &[String], use_colors: bool) -> String {
    let mut output = format_rows_table(&page.data, columns, use_colors);

    output.push('\n');
    let summary = format!("{} of {} rows", page.data.len(), page.count);
    if use_colors {
        output.push_str(&format!("{}\n", summary.dimmed()));
    } else {
        output.push_str(&summary);
        output.push('\n');
    }
    if let Some(prev) = &page.prev {
        output.push_str(&format!("prev: {}\n", prev));
    }
    if let Some(next) = &page.next {
        output.push_str(&format!("next: {}\n", next));
    }

    output
}

fn format_rows_table(rows: &[Row], columns: &[String], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No rows found.\n".to_string();
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    let value = row.get(column).unwrap_or(&Value::Null);
                    truncate_str(&format_cell(value), MAX_CELL_WIDTH)
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            cells
                .iter()
                .map(|row| row[index].chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();
    let header = join_padded(columns.iter().map(String::as_str), &widths);
    push_header(&mut output, &header, use_colors);

    for row in &cells {
        output.push_str(&join_padded(row.iter().map(String::as_str), &widths));
        output.push('\n');
    }

    output
}

fn join_padded<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| pad(cell, *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Formats pagination headers the way an HTTP response would carry them.
pub fn format_link_headers(headers: &LinkHeaders) -> String {
    headers
        .header_pairs()
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| format!("{}: {}\n", name, value))
        .collect()
}
