//! Token, clause and compiled predicate output formatting.

use owo_colors::OwoColorize;
use query_filter::filter::{FilterClause, LexerResult, Predicate, SqlFragment};
use serde::Serialize;

use super::helpers::{format_cell, push_header, truncate_str, MAX_CELL_WIDTH};

/// JSON output structure for the compile command.
#[derive(Serialize)]
pub struct CompiledOutput<'a> {
    /// Human-readable predicate, or `None` for an empty filter.
    pub expression: Option<String>,
    pub predicate: Option<&'a Predicate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<&'a SqlFragment>,
}

/// Formats lexer output as JSON.
pub fn format_tokens_json(result: &LexerResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

/// Formats lexer output as a table, followed by any skipped input.
pub fn format_tokens_table(result: &LexerResult, use_colors: bool) -> String {
    let mut output = String::new();

    if result.tokens.is_empty() {
        output.push_str("No tokens found.\n");
    } else {
        let header = format!(
            "{:<5} {:<5} {:<16} {:<4} {:<4} {:<8} {}",
            "Pos", "Conj", "Field", "Sep", "Inv", "Operator", "Value"
        );
        push_header(&mut output, &header, use_colors);

        for token in &result.tokens {
            output.push_str(&format!(
                "{:<5} {:<5} {:<16} {:<4} {:<4} {:<8} {}\n",
                token.position,
                token.conjunctive,
                truncate_str(&token.field_name, 16),
                token.sep,
                token.inverter,
                token.operator,
                token.value
            ));
        }
    }

    if !result.skipped.is_empty() {
        output.push('\n');
        let title = "Skipped input:";
        if use_colors {
            output.push_str(&format!("{}\n", title.yellow()));
        } else {
            output.push_str(title);
            output.push('\n');
        }
        for span in &result.skipped {
            output.push_str(&format!("  {:>5}  {:?}\n", span.position, span.fragment));
        }
    }

    output
}

/// Formats parsed clauses as JSON.
pub fn format_clauses_json(clauses: &[FilterClause]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(clauses)
}

/// Formats parsed clauses as a table.
///
/// Continuation clauses (no field name) show `...` in the field column.
pub fn format_clauses_table(clauses: &[FilterClause], use_colors: bool) -> String {
    if clauses.is_empty() {
        return "No clauses found.\n".to_string();
    }

    let mut output = String::new();
    let header = format!(
        "{:<4} {:<5} {:<16} {:<4} {:<9} {}",
        "#", "Conj", "Field", "Sep", "Operator", "Value"
    );
    push_header(&mut output, &header, use_colors);

    for (index, clause) in clauses.iter().enumerate() {
        let conjunctive = clause
            .conjunctive
            .map(|c| c.symbol().to_string())
            .unwrap_or_default();
        let field = match &clause.field_name {
            Some(name) => truncate_str(name, 16),
            None => "...".to_string(),
        };
        let operator = clause.operator_key();
        let operator = if clause.inverted && use_colors {
            format!("{:<9}", operator).red().to_string()
        } else {
            format!("{:<9}", operator)
        };

        output.push_str(&format!(
            "{:<4} {:<5} {:<16} {:<4} {} {}\n",
            index + 1,
            conjunctive,
            field,
            clause.sep.symbol(),
            operator,
            truncate_str(&clause.value, MAX_CELL_WIDTH)
        ));
    }

    output
}

/// Formats a compiled predicate and its SQL rendering as JSON.
pub fn format_compiled_json(
    predicate: Option<&Predicate>,
    sql: Option<&SqlFragment>,
) -> Result<String, serde_json::Error> {
    let output = CompiledOutput {
        expression: predicate.map(|p| p.to_string()),
        predicate,
        sql,
    };
    serde_json::to_string_pretty(&output)
}

/// Formats a compiled predicate and its SQL rendering as text.
pub fn format_compiled_text(
    predicate: Option<&Predicate>,
    sql: Option<&SqlFragment>,
    use_colors: bool,
) -> String {
    let Some(predicate) = predicate else {
        return "Empty filter: every row matches.\n".to_string();
    };

    let mut output = String::new();
    let label = |text: &str| {
        if use_colors {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    };

    output.push_str(&format!("{} {}\n", label("Predicate:"), predicate));

    if let Some(sql) = sql {
        output.push_str(&format!("{} {}\n", label("WHERE:"), sql.sql));
        if !sql.params.is_empty() {
            output.push_str(&format!("{}\n", label("Params:")));
            for (index, param) in sql.params.iter().enumerate() {
                let cell = match param {
                    query_filter::filter::Value::Text(_) => param.to_string(),
                    other => format_cell(other),
                };
                output.push_str(&format!("  {:>3}  {}\n", index + 1, cell));
            }
        }
    }

    output
}
