//! In-memory storage service for testing.
//!
//! ```ignore
//! let storage = MockStorage::new()
//!     .with_folder("root", "item-1", "First item")
//!     .with_file("item-1", "f1", "metadata.txt", "text/plain")
//!     .with_content("f1", "title: Hello");
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use super::{DriveConnector, DriveEntry, DriveError, DriveFile, StorageService};
use crate::{CatalogError, Result};

/// Configurable in-memory folder tree.
///
/// Unknown folders list as empty; unknown files fail to download with 404.
/// Every call is recorded as `"<operation>:<id>"`.
#[derive(Debug, Default)]
pub struct MockStorage {
    folders: HashMap<String, Vec<DriveEntry>>,
    files: HashMap<String, Vec<DriveFile>>,
    contents: HashMap<String, Bytes>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child folder under `parent_id`.
    pub fn with_folder(mut self, parent_id: &str, id: &str, name: &str) -> Self {
        self.folders
            .entry(parent_id.to_string())
            .or_default()
            .push(DriveEntry::new(id, name));
        self
    }

    /// Add a file inside `folder_id`.
    pub fn with_file(mut self, folder_id: &str, id: &str, name: &str, mime_type: &str) -> Self {
        self.files
            .entry(folder_id.to_string())
            .or_default()
            .push(DriveFile::new(id, name, mime_type));
        self
    }

    /// Set the downloadable content of a file.
    pub fn with_content(mut self, file_id: &str, content: impl Into<Bytes>) -> Self {
        self.contents.insert(file_id.to_string(), content.into());
        self
    }

    /// Make every call naming `id` (as parent, folder or file) fail with HTTP 500.
    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, operation: &str, id: &str) -> std::result::Result<(), DriveError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{operation}:{id}"));
        }
        if self.failing.contains(id) {
            return Err(DriveError::Status {
                status: 500,
                message: format!("simulated failure for {id}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StorageService for MockStorage {
    async fn list_folders(
        &self,
        parent_id: &str,
    ) -> std::result::Result<Vec<DriveEntry>, DriveError> {
        self.record("list_folders", parent_id)?;
        Ok(self.folders.get(parent_id).cloned().unwrap_or_default())
    }

    async fn list_files(&self, folder_id: &str) -> std::result::Result<Vec<DriveFile>, DriveError> {
        self.record("list_files", folder_id)?;
        Ok(self.files.get(folder_id).cloned().unwrap_or_default())
    }

    async fn download(&self, file_id: &str) -> std::result::Result<Bytes, DriveError> {
        self.record("download", file_id)?;
        self.contents
            .get(file_id)
            .cloned()
            .ok_or_else(|| DriveError::Status {
                status: 404,
                message: format!("File not found: {file_id}."),
            })
    }
}

/// Connector handing out a shared [`MockStorage`].
#[derive(Debug, Clone)]
pub struct MockConnector {
    storage: Arc<MockStorage>,
    reject_with: Option<String>,
    connected_with: Arc<Mutex<Vec<String>>>,
}

impl MockConnector {
    /// Create a connector that always connects to `storage`.
    pub fn new(storage: Arc<MockStorage>) -> Self {
        Self {
            storage,
            reject_with: None,
            connected_with: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every connection attempt fail with `ClientInitFailed(reason)`.
    pub fn rejecting(mut self, reason: &str) -> Self {
        self.reject_with = Some(reason.to_string());
        self
    }

    /// Credentials passed to `connect` so far.
    pub fn connections(&self) -> Vec<String> {
        self.connected_with
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

impl DriveConnector for MockConnector {
    fn connect(&self, credentials_json: &str) -> Result<Box<dyn StorageService>> {
        if let Ok(mut connected) = self.connected_with.lock() {
            connected.push(credentials_json.to_string());
        }
        if let Some(reason) = &self.reject_with {
            return Err(CatalogError::ClientInitFailed(reason.clone()));
        }
        Ok(Box::new(self.storage.clone()))
    }
}
