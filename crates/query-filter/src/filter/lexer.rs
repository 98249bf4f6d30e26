//! Lexer (tokenizer) for filter expressions.
//!
//! The whole grammar is one composite regular expression with named
//! groups. Each match becomes a [`RawToken`]; anything between matches is
//! not part of the language and is reported in [`LexerResult::skipped`].

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;

/// Composite token pattern.
///
/// Operator alternatives are ordered longest-first so `lt` never wins over
/// `lte`. The value is either a quoted string with backslash escapes or an
/// unquoted run that stops at a separator, a quote or whitespace.
const TOKEN_PATTERN: &str = r#"(?x)
    (?P<conjunctive>[:|]?)
    (?P<field_name>\w+)?
    (?P<sep>[:|])
    (?P<inverter>~)?
    (?P<operator>between|like|lte|lt|gte|gt|in|is|eq)
    :
    (?P<value>
        "(?:[^"\\]|\\.)*"
      | '(?:[^'\\]|\\.)*'
      | (?:\\.|[^:|'"\s\\])+
    )
"#;

static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn token_regex() -> &'static Regex {
    TOKEN_REGEX.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("token pattern is valid"))
}

/// One lexer match, exactly as captured.
///
/// Groups that did not participate in the match are empty strings; the
/// parser turns them into `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawToken {
    /// Connector to the previous field group (`:` or `|`), or empty.
    pub conjunctive: String,
    /// Field name, empty when the clause continues the previous field.
    pub field_name: String,
    /// Separator before the operator (`:` or `|`).
    pub sep: String,
    /// `~` when the operator is negated, else empty.
    pub inverter: String,
    /// Operator keyword.
    pub operator: String,
    /// Operand text, quotes included.
    pub value: String,
    /// Byte offset of the match in the input.
    pub position: usize,
}

impl RawToken {
    fn from_captures(caps: &Captures<'_>) -> Self {
        let group = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };

        Self {
            conjunctive: group("conjunctive"),
            field_name: group("field_name"),
            sep: group("sep"),
            inverter: group("inverter"),
            operator: group("operator"),
            value: group("value"),
            position: caps.get(0).map(|m| m.start()).unwrap_or_default(),
        }
    }

    /// Returns true if this token introduces a field rather than
    /// continuing the previous one.
    pub fn starts_field(&self) -> bool {
        !self.field_name.is_empty()
    }
}

/// Input that matched no token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSpan {
    /// The skipped text, trimmed of surrounding whitespace.
    pub fragment: String,
    /// Byte offset of the fragment in the input.
    pub position: usize,
}

/// Result of scanning a filter expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LexerResult {
    /// Tokens in input order.
    pub tokens: Vec<RawToken>,
    /// Non-whitespace spans that produced no token.
    pub skipped: Vec<SkippedSpan>,
}

/// Lexer for filter expressions.
pub struct Lexer<'a> {
    input: &'a str,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Scans the input, returning tokens together with any skipped spans.
    pub fn scan(&self) -> LexerResult {
        let mut result = LexerResult::default();
        let mut last_end = 0;

        for caps in token_regex().captures_iter(self.input) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            self.record_gap(last_end, whole.start(), &mut result.skipped);
            result.tokens.push(RawToken::from_captures(&caps));
            last_end = whole.end();
        }
        self.record_gap(last_end, self.input.len(), &mut result.skipped);

        for span in &result.skipped {
            tracing::debug!(
                fragment = %span.fragment,
                position = span.position,
                "skipping unrecognized filter input"
            );
        }

        result
    }

    /// Tokenizes the input, silently dropping anything that does not match.
    pub fn tokenize(&self) -> Vec<RawToken> {
        self.scan().tokens
    }

    fn record_gap(&self, start: usize, end: usize, skipped: &mut Vec<SkippedSpan>) {
        if start >= end {
            return;
        }
        let gap = &self.input[start..end];
        let fragment = gap.trim();
        if fragment.is_empty() {
            return;
        }
        let leading = gap.len() - gap.trim_start().len();
        skipped.push(SkippedSpan {
            fragment: fragment.to_string(),
            position: start + leading,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<RawToken> {
        Lexer::new(input).tokenize()
    }

    #[test]
    fn test_single_clause() {
        let tokens = tokenize("field:eq:7");
        assert_eq!(tokens.len(), 1);
        let t = &tokens[0];
        assert_eq!(t.conjunctive, "");
        assert_eq!(t.field_name, "field");
        assert_eq!(t.sep, ":");
        assert_eq!(t.inverter, "");
        assert_eq!(t.operator, "eq");
        assert_eq!(t.value, "7");
        assert_eq!(t.position, 0);
        assert!(t.starts_field());
    }

    #[test]
    fn test_longest_operator_wins() {
        let tokens = tokenize("field:lte:14:gte:7");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].operator, "lte");
        assert_eq!(tokens[1].operator, "gte");
    }

    #[test]
    fn test_continuation_uses_sep_for_connector() {
        let tokens = tokenize("field:gt:7|lt:14");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].conjunctive, "");
        assert_eq!(tokens[1].field_name, "");
        assert_eq!(tokens[1].sep, "|");
        assert_eq!(tokens[1].operator, "lt");
        assert_eq!(tokens[1].value, "14");
        assert!(!tokens[1].starts_field());
    }

    #[test]
    fn test_new_field_uses_conjunctive() {
        let tokens = tokenize("field:gte:7|other_field:lte:10");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].conjunctive, "|");
        assert_eq!(tokens[1].field_name, "other_field");
        assert_eq!(tokens[1].sep, ":");
    }

    #[test]
    fn test_inverter() {
        let tokens = tokenize("field:~in:a,b,c");
        assert_eq!(tokens[0].inverter, "~");
        assert_eq!(tokens[0].operator, "in");
        assert_eq!(tokens[0].value, "a,b,c");
    }

    #[test]
    fn test_quoted_value_keeps_separators() {
        let tokens =
            tokenize(r#"field:between:"2020-01-01T00:00:00,2020-01-31T00:00:00":other:eq:1"#);
        assert_eq!(tokens.len(), 2);
        assert_eq!(
            tokens[0].value,
            r#""2020-01-01T00:00:00,2020-01-31T00:00:00""#
        );
        assert_eq!(tokens[1].field_name, "other");
    }

    #[test]
    fn test_quoted_value_with_pipe_and_escape() {
        let tokens = tokenize(r#"field:like:"*mui|bu\"eno"|other_field:like:'x'"#);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].value, r#""*mui|bu\"eno""#);
        assert_eq!(tokens[1].conjunctive, "|");
        assert_eq!(tokens[1].value, "'x'");
    }

    #[test]
    fn test_escaped_separator_in_unquoted_value() {
        let tokens = tokenize(r"field:lt:2020-01-01T17\:22\:20");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value, r"2020-01-01T17\:22\:20");
    }

    #[test]
    fn test_query_prefix_is_skipped() {
        let result = Lexer::new("?filter=field:eq:7").scan();
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].field_name, "field");
        assert_eq!(
            result.skipped,
            vec![SkippedSpan {
                fragment: "?filter=".to_string(),
                position: 0
            }]
        );
    }

    #[test]
    fn test_unknown_operator_produces_no_token() {
        let result = Lexer::new("field:regex:abc").scan();
        assert!(result.tokens.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].fragment, "field:regex:abc");
    }

    #[test]
    fn test_missing_value_produces_no_token() {
        assert!(tokenize("field:eq").is_empty());
        assert!(tokenize("field:eq:").is_empty());
    }

    #[test]
    fn test_whitespace_is_not_skipped_input() {
        let result = Lexer::new("  field:eq:7  ").scan();
        assert_eq!(result.tokens.len(), 1);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_compound_expression() {
        let input = r#"field:gte:7|other_field:~in:a,b,c:another_field:between:"2020-01-01T17:22:20.937752,2020-01-31T17:22:20.937752":yet_another_field:eq:2020"#;
        let tokens = tokenize(input);
        assert_eq!(tokens.len(), 4);

        let fields: Vec<&str> = tokens.iter().map(|t| t.field_name.as_str()).collect();
        assert_eq!(
            fields,
            vec!["field", "other_field", "another_field", "yet_another_field"]
        );
        let conjunctives: Vec<&str> = tokens.iter().map(|t| t.conjunctive.as_str()).collect();
        assert_eq!(conjunctives, vec!["", "|", ":", ":"]);
        assert_eq!(tokens[3].value, "2020");
    }
}
