//! Error types for Nodal Core

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::limits::ValidationError;

/// Result type alias using Nodal's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Which end of an edge a reference error is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Nodal error types
///
/// A missing node is not an error: lookups return `None` and traversal from
/// an unknown node returns no neighbors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Dangling {endpoint} reference: node {id} does not exist")]
    Reference { endpoint: Endpoint, id: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn reference(endpoint: Endpoint, id: impl Into<String>) -> Self {
        Self::Reference {
            endpoint,
            id: id.into(),
        }
    }

    /// Wrap a storage-layer failure, keeping it as the error source
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Box::new(err))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_message_names_endpoint() {
        let err = Error::reference(Endpoint::Target, "01ARZ3NDEKTSV4RRFFQ69G5FAV");
        assert!(err.is_reference());
        assert_eq!(
            err.to_string(),
            "Dangling target reference: node 01ARZ3NDEKTSV4RRFFQ69G5FAV does not exist"
        );
    }

    #[test]
    fn test_storage_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = Error::storage(io);
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "disk gone");
    }
}
