//! Synchronization error types.

use thiserror::Error;
use urlstate_codec::CodecError;

/// Error returned by hook and setter operations.
#[derive(Debug, Error)]
pub enum UrlStateError {
    /// The provider that owned the shared cell has been dropped.
    #[error("URL state provider is no longer mounted")]
    ProviderUnmounted,

    /// Typed state conversion failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl UrlStateError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::ProviderUnmounted => {
                "URL state was used after its provider was unmounted.".to_string()
            }
            Self::Codec(error) => error.user_message(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ProviderUnmounted => Some(
                "Keep the UrlStateProvider alive for as long as any hook or setter created from it."
                    .into(),
            ),
            Self::Codec(error) => error.suggestion(),
        }
    }
}

/// Result type alias for synchronization operations.
pub type Result<T> = std::result::Result<T, UrlStateError>;
