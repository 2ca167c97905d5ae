//! Error types for the Drive catalog.

use std::fmt;

use thiserror::Error;

/// What a failed listing call was enumerating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    /// Child folders of the root folder.
    Folders,
    /// Files inside one item folder.
    FilesInFolder,
}

impl fmt::Display for ListingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingScope::Folders => write!(f, "folders"),
            ListingScope::FilesInFolder => write!(f, "files in folder"),
        }
    }
}

/// Common error type for the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A required configuration value is absent.
    #[error("{0}")]
    ConfigMissing(String),

    /// The storage client could not be built from the configured credentials.
    #[error("Unable to create Drive client: {0}")]
    ClientInitFailed(String),

    /// A listing query against the storage service failed.
    #[error("error listing {scope}: {message}")]
    ListingFailed {
        /// What was being listed.
        scope: ListingScope,
        /// Underlying failure.
        message: String,
    },

    /// The metadata file could not be downloaded or converted to text.
    #[error("error reading metadata: {0}")]
    MetadataReadFailed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// Build a listing failure for the given scope.
    pub fn listing(scope: ListingScope, message: impl fmt::Display) -> Self {
        CatalogError::ListingFailed {
            scope,
            message: message.to_string(),
        }
    }
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_missing_display() {
        let err = CatalogError::ConfigMissing("Google credentials not configured".to_string());
        assert_eq!(err.to_string(), "Google credentials not configured");
    }

    #[test]
    fn test_client_init_failed_display() {
        let err = CatalogError::ClientInitFailed("missing field `private_key`".to_string());
        assert_eq!(
            err.to_string(),
            "Unable to create Drive client: missing field `private_key`"
        );
    }

    #[test]
    fn test_listing_failed_display() {
        let err = CatalogError::listing(ListingScope::Folders, "HTTP 404");
        assert_eq!(err.to_string(), "error listing folders: HTTP 404");

        let err = CatalogError::listing(ListingScope::FilesInFolder, "timed out");
        assert_eq!(err.to_string(), "error listing files in folder: timed out");
    }

    #[test]
    fn test_metadata_read_failed_display() {
        let err = CatalogError::MetadataReadFailed("pandoc exited with status 1".to_string());
        assert_eq!(
            err.to_string(),
            "error reading metadata: pandoc exited with status 1"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CatalogError = io_err.into();
        assert!(matches!(err, CatalogError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }
}
