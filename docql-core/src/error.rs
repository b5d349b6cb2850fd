//! Error types for docql-core.
//!
//! Every failure of the parse → translate → execute pipeline is one of these.
//! None of them is retried by the core.

use thiserror::Error;

/// docql error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocqlError {
    /// The query text does not match the grammar.
    #[error("Grammar error: {message} near '{fragment}'")]
    GrammarError { message: String, fragment: String },

    /// An operator reached translation without a backend mapping.
    #[error("Operator not supported: {0}")]
    UnsupportedOperator(String),

    /// A named parameter was referenced but never bound.
    #[error("Parameter '@{0}' is not bound")]
    UnboundParameter(String),

    /// `convert(value, type)` named a type that has no conversion.
    #[error("Conversion type not supported: {0}")]
    UnsupportedConversion(String),

    /// `convert(value, type)` named a known type the value cannot become.
    #[error("Cannot convert {value} to {target}")]
    ConversionError { value: String, target: String },

    /// Failure reported by the store driver.
    #[error("Store error: {0}")]
    StoreError(String),
}

impl DocqlError {
    pub fn grammar(message: impl Into<String>, fragment: impl Into<String>) -> Self {
        DocqlError::GrammarError {
            message: message.into(),
            fragment: fragment.into(),
        }
    }
}

/// Result type for docql operations
pub type DocqlResult<T> = Result<T, DocqlError>;

impl serde::Serialize for DocqlError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
