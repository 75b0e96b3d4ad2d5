//! Errors raised while computing a patch.

use thiserror::Error;

/// PatchError represents a contract violation in the input documents.
///
/// Equal documents are not an error: the differs return an empty patch.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("{path}: discriminator matches no known variant")]
    InvalidShape { path: String },

    #[error("{path}: key {key:?} cannot be used in a patch path")]
    InvalidKey { path: String, key: String },

    #[error("{path}: failed to serialize value: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed {kind} document: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl PatchError {
    /// Creates an invalid shape error.
    pub fn invalid_shape(path: impl Into<String>) -> Self {
        PatchError::InvalidShape { path: path.into() }
    }

    /// Creates an invalid key error.
    pub fn invalid_key(path: impl Into<String>, key: impl Into<String>) -> Self {
        PatchError::InvalidKey {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialize(path: impl Into<String>, source: serde_json::Error) -> Self {
        PatchError::Serialize {
            path: path.into(),
            source,
        }
    }

    /// Creates a malformed document error.
    pub fn malformed(kind: &'static str, source: serde_json::Error) -> Self {
        PatchError::Malformed { kind, source }
    }
}

/// Renders a typed value as a document value, attributing failures to `path`.
pub(crate) fn to_document<T: serde::Serialize + ?Sized>(
    path: &crate::pointer::Pointer,
    value: &T,
) -> Result<serde_json::Value, PatchError> {
    serde_json::to_value(value).map_err(|e| PatchError::serialize(path.as_str(), e))
}
