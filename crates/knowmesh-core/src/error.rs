//! Error types for Knowmesh

use thiserror::Error;

/// Result type alias using Knowmesh's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Knowmesh error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Knowledge store errors (E100-E199)
    #[error("Knowledge store query failed: {0}")]
    StoreQueryFailed(String),

    // Project registry errors (E200-E299)
    #[error("Project registry lookup failed for '{0}': {1}")]
    RegistryLookupFailed(String, String),

    // Graph errors (E300-E399)
    #[error("Relationship '{0}' references node '{1}' which is not in the graph")]
    DanglingRelationship(String, String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    Parse(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::StoreQueryFailed(_) => "E100",
            Self::RegistryLookupFailed(..) => "E200",
            Self::DanglingRelationship(..) => "E300",
            Self::ConfigError(_) => "E600",
            Self::InvalidInput(_) => "E800",
            Self::Parse(_) | Self::Json(_) => "E801",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::StoreQueryFailed(_) => {
                Some("Check that the knowledge store is reachable".to_string())
            }
            Self::RegistryLookupFailed(project, _) => {
                Some(format!("Check that project '{}' is registered", project))
            }
            Self::DanglingRelationship(_, node) => {
                Some(format!("Add node '{}' to the graph before linking it", node))
            }
            Self::ConfigError(_) => Some("knowmesh config list".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_query_failed() {
        let error = Error::StoreQueryFailed("connection refused".to_string());
        assert_eq!(error.code(), "E100");
        assert!(error.suggestion().is_some());
        assert!(error.to_string().contains("connection refused"));
    }

    #[test]
    fn test_registry_lookup_failed() {
        let error = Error::RegistryLookupFailed("proj1".to_string(), "timeout".to_string());
        assert_eq!(error.code(), "E200");
        assert_eq!(
            error.suggestion(),
            Some("Check that project 'proj1' is registered".to_string())
        );
        assert!(error.to_string().contains("timeout"));
    }

    #[test]
    fn test_dangling_relationship() {
        let error = Error::DanglingRelationship("rel-1".to_string(), "missing".to_string());
        assert_eq!(error.code(), "E300");
        assert!(error.to_string().contains("missing"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error: Error = io.into();
        assert_eq!(error.code(), "E9999");
        assert_eq!(error.suggestion(), None);
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: Error = json_err.into();
        assert_eq!(error.code(), "E801");
    }
}
