//! Drive Catalog
//!
//! Serves a read-only JSON catalog built from a Google Drive folder tree:
//! one record per subfolder of a root folder, with fields parsed from a
//! `metadata.txt` (or `metadata.docx`) file and links to the images and
//! videos stored alongside it.

pub mod catalog;
pub mod config;
pub mod drive;
pub mod error;
pub mod extract;
pub mod logging;
pub mod web;

pub use catalog::{CatalogBuilder, CatalogOptions, Item, ItemOutcome};
pub use config::Config;
pub use drive::{DriveConnector, DriveEntry, DriveError, DriveFile, StorageService};
pub use error::{CatalogError, ListingScope, Result};
pub use extract::{ExtractorRegistry, TextExtractor};
pub use web::WebServer;
