//! Google Drive access for the catalog.
//!
//! This module provides:
//! - The [`StorageService`] trait the catalog builder walks folders through
//! - A Drive v3 REST implementation ([`DriveClient`])
//! - Credential parsing and OAuth2 token minting ([`auth`])
//! - An in-memory implementation for tests ([`MockStorage`])

pub mod auth;
mod client;
mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

pub use auth::{Credentials, TokenProvider};
pub use client::{DriveClient, GoogleDriveConnector, FOLDER_MIME_TYPE};
pub use mock::{MockConnector, MockStorage};

/// A child folder of the root folder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriveEntry {
    /// Drive file id of the folder.
    pub id: String,
    /// Display name of the folder.
    pub name: String,
}

impl DriveEntry {
    /// Create a new entry.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A file inside an item folder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Drive file id.
    pub id: String,
    /// File name.
    pub name: String,
    /// Declared MIME type.
    #[serde(default)]
    pub mime_type: String,
}

impl DriveFile {
    /// Create a new file record.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Errors raised while talking to the storage service.
#[derive(Error, Debug)]
pub enum DriveError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// An access token could not be obtained.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Read-only access to a folder hierarchy.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// List non-trashed child folders of `parent_id`, in service order.
    async fn list_folders(&self, parent_id: &str) -> Result<Vec<DriveEntry>, DriveError>;

    /// List non-trashed files directly inside `folder_id`, in service order.
    async fn list_files(&self, folder_id: &str) -> Result<Vec<DriveFile>, DriveError>;

    /// Download the full content of a file.
    async fn download(&self, file_id: &str) -> Result<Bytes, DriveError>;
}

#[async_trait]
impl<T: StorageService + ?Sized> StorageService for Arc<T> {
    async fn list_folders(&self, parent_id: &str) -> Result<Vec<DriveEntry>, DriveError> {
        (**self).list_folders(parent_id).await
    }

    async fn list_files(&self, folder_id: &str) -> Result<Vec<DriveFile>, DriveError> {
        (**self).list_files(folder_id).await
    }

    async fn download(&self, file_id: &str) -> Result<Bytes, DriveError> {
        (**self).download(file_id).await
    }
}

/// Builds an authenticated [`StorageService`] from a credentials blob.
///
/// One storage handle is built per request; implementations hold whatever
/// can be shared across requests (HTTP client, endpoints).
pub trait DriveConnector: Send + Sync {
    /// Construct a storage handle, failing with `ClientInitFailed` on bad credentials.
    fn connect(&self, credentials_json: &str) -> crate::Result<Box<dyn StorageService>>;
}
