//! Walks a root folder and assembles one item per child folder.

use tracing::{debug, info, warn};

use super::classify::classify_files;
use super::metadata::{parse_metadata, MetadataMap};
use super::{CatalogOptions, Item};
use crate::drive::{DriveEntry, DriveFile, StorageService};
use crate::error::ListingScope;
use crate::extract::ExtractorRegistry;
use crate::{CatalogError, Result};

/// What happened to one item folder.
#[derive(Debug)]
pub enum ItemOutcome {
    /// The folder produced a complete record.
    Built(Item),
    /// The folder was dropped from the catalog.
    Skipped {
        /// The folder that failed.
        folder: DriveEntry,
        /// Why it failed.
        error: CatalogError,
    },
}

/// Builds the catalog for one request.
pub struct CatalogBuilder<'a> {
    storage: &'a dyn StorageService,
    extractors: &'a ExtractorRegistry,
    options: CatalogOptions,
}

impl<'a> CatalogBuilder<'a> {
    /// Create a builder over an authenticated storage handle.
    pub fn new(
        storage: &'a dyn StorageService,
        extractors: &'a ExtractorRegistry,
        options: CatalogOptions,
    ) -> Self {
        Self {
            storage,
            extractors,
            options,
        }
    }

    /// List the item folders directly under `root_folder_id`.
    pub async fn list_item_folders(&self, root_folder_id: &str) -> Result<Vec<DriveEntry>> {
        self.storage
            .list_folders(root_folder_id)
            .await
            .map_err(|e| CatalogError::listing(ListingScope::Folders, e))
    }

    /// Build every item under `root_folder_id`, in listing order.
    ///
    /// Fails only when the root listing fails; folders that cannot be
    /// processed are logged and left out.
    pub async fn build(&self, root_folder_id: &str) -> Result<Vec<Item>> {
        let folders = self.list_item_folders(root_folder_id).await?;
        info!(root_folder_id, folders = folders.len(), "Building catalog");

        let mut items = Vec::with_capacity(folders.len());
        let mut skipped = 0usize;

        for folder in folders {
            match self.process_folder(folder).await {
                ItemOutcome::Built(item) => items.push(item),
                ItemOutcome::Skipped { folder, error } => {
                    skipped += 1;
                    warn!(
                        folder_id = %folder.id,
                        folder_name = %folder.name,
                        error = %error,
                        "Skipping item folder"
                    );
                }
            }
        }

        info!(items = items.len(), skipped, "Catalog built");
        Ok(items)
    }

    /// Turn one item folder into an outcome.
    pub async fn process_folder(&self, folder: DriveEntry) -> ItemOutcome {
        match self.build_item(&folder).await {
            Ok(item) => ItemOutcome::Built(item),
            Err(error) => ItemOutcome::Skipped { folder, error },
        }
    }

    async fn build_item(&self, folder: &DriveEntry) -> Result<Item> {
        let files = self
            .storage
            .list_files(&folder.id)
            .await
            .map_err(|e| CatalogError::listing(ListingScope::FilesInFolder, e))?;

        let classified = classify_files(&files, &self.options);
        debug!(
            folder_name = %folder.name,
            files = files.len(),
            images = classified.image_urls.len(),
            videos = classified.video_urls.len(),
            has_metadata = classified.metadata.is_some(),
            "Classified item folder"
        );

        let mut item = self.options.empty_item();
        item.image_urls = classified.image_urls;
        if let Some(video_urls) = item.video_urls.as_mut() {
            *video_urls = classified.video_urls;
        }

        if let Some(file) = classified.metadata {
            let metadata = self.read_metadata(file).await?;
            item.apply_metadata(&metadata);
        }

        Ok(item)
    }

    async fn read_metadata(&self, file: &DriveFile) -> Result<MetadataMap> {
        let content = self
            .storage
            .download(&file.id)
            .await
            .map_err(|e| CatalogError::MetadataReadFailed(e.to_string()))?;

        let text = self
            .extractors
            .extract(&file.name, &content)
            .await
            .map_err(|e| match e {
                CatalogError::MetadataReadFailed(_) => e,
                other => CatalogError::MetadataReadFailed(other.to_string()),
            })?;

        Ok(parse_metadata(&text))
    }
}
