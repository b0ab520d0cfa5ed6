//! Codec error types.
//!
//! Encoding and decoding query strings never fail. Errors only arise when
//! bridging a [`UrlState`](crate::UrlState) to or from application types.

use thiserror::Error;

/// Typed conversion error.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The value is not a key/value mapping.
    #[error("URL state must be an object, found {found}")]
    NotAnObject {
        /// JSON kind that was found instead.
        found: &'static str,
    },

    /// Serializing an application value failed.
    #[error("Failed to serialize URL state")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    /// Deserializing into an application value failed.
    #[error("Failed to deserialize URL state")]
    Deserialize {
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAnObject { found } => {
                format!("Expected a set of named parameters but got a {found}.")
            }
            Self::Serialize { source } => {
                format!("The state could not be converted to URL parameters: {source}")
            }
            Self::Deserialize { source } => {
                format!("The URL parameters do not match the expected shape: {source}")
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NotAnObject { .. } => {
                Some("Wrap the value in an object, e.g. {\"key\": value}.".into())
            }
            Self::Serialize { .. } => None,
            Self::Deserialize { .. } => Some(
                "Query parameters decode as strings; declare numeric fields as strings or parse them after reading."
                    .into(),
            ),
        }
    }
}

/// Name of a JSON value's kind, for error messages.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Result type alias for codec conversions.
pub type Result<T> = std::result::Result<T, CodecError>;
