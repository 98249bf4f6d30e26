//! Error types for filter parsing and translation.

use thiserror::Error;

/// A specialized Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Broad classification of a [`FilterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterErrorKind {
    /// The expression is structurally invalid.
    Validation,
    /// A field name did not resolve to a column.
    UnknownField,
    /// A value could not be converted to the column's type.
    TypeCoercion,
}

/// Errors that can occur while parsing or translating a filter expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// Input that matched no token (strict mode only).
    #[error("unrecognized input '{fragment}' at position {position}")]
    UnrecognizedInput {
        /// The text that was skipped.
        fragment: String,
        /// Byte offset of the fragment in the input.
        position: usize,
    },

    /// An operator outside the supported vocabulary.
    #[error("invalid operator: {operator}")]
    InvalidOperator {
        /// The operator text.
        operator: String,
    },

    /// A connector character other than `:` or `|`.
    #[error("connector must be one of [':', '|'], not '{connector}'")]
    InvalidConnector {
        /// The offending connector text.
        connector: String,
    },

    /// A clause that needs a field name has none.
    #[error("missing field name at position {position}")]
    MissingFieldName {
        /// Byte offset of the clause in the input.
        position: usize,
    },

    /// The field does not resolve to a known column.
    #[error("unknown field: {field}")]
    UnknownField {
        /// The unresolved field name.
        field: String,
    },

    /// A value could not be parsed into the column's type.
    #[error("cannot convert '{value}' to {expected} for field {field}")]
    TypeCoercion {
        /// The field being filtered.
        field: String,
        /// The raw value.
        value: String,
        /// Name of the expected type.
        expected: String,
    },

    /// `between` received something other than two bounds.
    #[error("between on field {field} needs exactly 2 bounds, got {count}")]
    BetweenBounds {
        /// The field being filtered.
        field: String,
        /// Number of bounds supplied.
        count: usize,
    },

    /// A list operator received no elements.
    #[error("empty value list for field {field}")]
    EmptyList {
        /// The field being filtered.
        field: String,
    },

    /// The operator has no negated form.
    #[error("operator cannot be inverted: {operator}")]
    OperatorNotInvertible {
        /// The operator text.
        operator: String,
    },
}

impl FilterError {
    /// Creates an invalid operator error.
    pub fn invalid_operator(operator: impl Into<String>) -> Self {
        FilterError::InvalidOperator {
            operator: operator.into(),
        }
    }

    /// Creates an invalid connector error.
    pub fn invalid_connector(connector: impl Into<String>) -> Self {
        FilterError::InvalidConnector {
            connector: connector.into(),
        }
    }

    /// Creates an unknown field error.
    pub fn unknown_field(field: impl Into<String>) -> Self {
        FilterError::UnknownField {
            field: field.into(),
        }
    }

    /// Creates a type coercion error.
    pub fn type_coercion(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        FilterError::TypeCoercion {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Returns the class of this error.
    pub fn kind(&self) -> FilterErrorKind {
        match self {
            FilterError::UnrecognizedInput { .. }
            | FilterError::InvalidOperator { .. }
            | FilterError::InvalidConnector { .. }
            | FilterError::MissingFieldName { .. }
            | FilterError::OperatorNotInvertible { .. } => FilterErrorKind::Validation,
            FilterError::UnknownField { .. } => FilterErrorKind::UnknownField,
            FilterError::TypeCoercion { .. }
            | FilterError::BetweenBounds { .. }
            | FilterError::EmptyList { .. } => FilterErrorKind::TypeCoercion,
        }
    }

    /// HTTP status an API layer should answer with.
    ///
    /// Every filter error is the client's fault, so this is always 400.
    pub fn status_code(&self) -> u16 {
        400
    }
}
