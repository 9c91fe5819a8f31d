//! Error types for the document crate
//!
//! Covers:
//! - Model output that cannot be parsed or is missing sections
//! - Schema violations (empty fields, wrong cardinalities)
//! - Field accessor misuse (index out of range)
//! - Invalid generator inputs

/// Errors raised while parsing, validating or editing a [`Document`](crate::Document)
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Response text is not valid JSON (after fence stripping)
    #[error("response is not valid JSON: {0}")]
    Unparsable(#[from] serde_json::Error),

    /// A required top-level section is absent or empty
    #[error("response missing required field: {0}")]
    MissingField(String),

    /// The document does not conform to the schema
    #[error("schema violation: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),

    /// A typed accessor pointed past the end of a fixed-size array
    #[error("field index out of range: {field} (len {len})")]
    FieldOutOfRange {
        /// Accessor description
        field: String,
        /// Actual array length
        len: usize,
    },

    /// A direct edit tried to write an empty value into a required field
    #[error("field cannot be empty: {0}")]
    EmptyValue(String),

    /// Generator inputs failed validation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The static schema failed to compile
    #[error("schema compilation failed: {0}")]
    SchemaCompilation(String),
}

impl DocumentError {
    /// Whether this error describes bad model output, as opposed to
    /// bad caller input
    #[inline]
    #[must_use]
    pub fn is_model_output(&self) -> bool {
        matches!(
            self,
            Self::Unparsable(_) | Self::MissingField(_) | Self::SchemaViolation(_)
        )
    }
}
