//! API handlers.

pub mod catalog;

pub use catalog::*;

use std::sync::Arc;

use crate::catalog::CatalogOptions;
use crate::config::CatalogConfig;
use crate::drive::DriveConnector;
use crate::extract::ExtractorRegistry;

/// Shared application state.
pub struct AppState {
    /// Root folder and credentials configuration.
    pub catalog: CatalogConfig,
    /// Which files are recognized.
    pub options: CatalogOptions,
    /// Builds a storage handle per request.
    pub connector: Arc<dyn DriveConnector>,
    /// Metadata text extractors.
    pub extractors: ExtractorRegistry,
}

impl AppState {
    /// Create application state from the catalog configuration.
    pub fn new(catalog: &CatalogConfig, connector: Arc<dyn DriveConnector>) -> Self {
        Self {
            catalog: catalog.clone(),
            options: CatalogOptions::from(catalog),
            connector,
            extractors: ExtractorRegistry::from_config(catalog),
        }
    }

    /// Replace the metadata extractors.
    pub fn with_extractors(mut self, extractors: ExtractorRegistry) -> Self {
        self.extractors = extractors;
        self
    }
}
