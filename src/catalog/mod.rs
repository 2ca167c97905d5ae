//! Catalog construction.
//!
//! A root folder holds one subfolder per item. Each item folder contains an
//! optional metadata file with `key: value` lines plus any number of media
//! files. This module turns that layout into [`Item`] records:
//! - [`metadata`]: parsing the metadata text
//! - [`classify`]: sorting files into metadata, images and videos
//! - [`builder`]: walking the folders and assembling items

pub mod builder;
pub mod classify;
pub mod metadata;

use serde::Serialize;

use crate::config::CatalogConfig;

pub use builder::{CatalogBuilder, ItemOutcome};
pub use classify::{
    classify, classify_files, image_url, is_image, is_video, video_url, Classified, FileKind,
    IMAGE_MIME_TYPES, METADATA_DOCX, METADATA_TXT, VIDEO_MIME_TYPES,
};
pub use metadata::{parse_metadata, MetadataMap};

/// One catalog record, built from one item folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub code: String,
    pub image_urls: Vec<String>,
    /// Present only when videos are recognized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_urls: Option<Vec<String>>,
}

impl Item {
    /// Copy the known metadata keys into the record.
    pub fn apply_metadata(&mut self, metadata: &MetadataMap) {
        let field = |key: &str| metadata.get(key).cloned().unwrap_or_default();
        self.title = field("title");
        self.subtitle = field("subtitle");
        self.description = field("description");
        self.code = field("code");
    }
}

/// Which files the catalog recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Recognize videos and emit `videoUrls`.
    pub include_videos: bool,
    /// Accept `metadata.docx` in addition to `metadata.txt`.
    pub docx_metadata: bool,
}

impl CatalogOptions {
    /// Images and `metadata.txt` only.
    pub fn basic() -> Self {
        Self {
            include_videos: false,
            docx_metadata: false,
        }
    }

    /// Images, videos, `metadata.txt` and `metadata.docx`.
    pub fn extended() -> Self {
        Self {
            include_videos: true,
            docx_metadata: true,
        }
    }

    /// Returns true if `name` is a reserved metadata file name.
    pub fn is_metadata_file(&self, name: &str) -> bool {
        name == METADATA_TXT || (self.docx_metadata && name == METADATA_DOCX)
    }

    /// An empty record shaped for these options.
    pub fn empty_item(&self) -> Item {
        Item {
            video_urls: self.include_videos.then(Vec::new),
            ..Item::default()
        }
    }
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self::extended()
    }
}

impl From<&CatalogConfig> for CatalogOptions {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            include_videos: config.include_videos,
            docx_metadata: config.docx_metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_json_extended() {
        let mut item = CatalogOptions::extended().empty_item();
        item.title = "Vase".to_string();
        item.image_urls.push(image_url("a"));

        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({
                "title": "Vase",
                "subtitle": "",
                "description": "",
                "code": "",
                "imageUrls": ["https://drive.google.com/uc?export=view&id=a"],
                "videoUrls": []
            })
        );
    }

    #[test]
    fn test_item_json_basic_omits_videos() {
        let item = CatalogOptions::basic().empty_item();
        let value = serde_json::to_value(&item).unwrap();

        assert_eq!(value["imageUrls"], json!([]));
        assert!(value.get("videoUrls").is_none());
    }

    #[test]
    fn test_apply_metadata() {
        let metadata = parse_metadata("Title: T\nsubtitle: S\ndescription: D\ncode: C\nprice: 10");
        let mut item = Item::default();
        item.apply_metadata(&metadata);

        assert_eq!(item.title, "T");
        assert_eq!(item.subtitle, "S");
        assert_eq!(item.description, "D");
        assert_eq!(item.code, "C");
    }

    #[test]
    fn test_apply_metadata_missing_keys() {
        let mut item = Item::default();
        item.apply_metadata(&parse_metadata("title: Only title"));

        assert_eq!(item.title, "Only title");
        assert!(item.subtitle.is_empty());
        assert!(item.code.is_empty());
    }

    #[test]
    fn test_options_from_config() {
        let config = CatalogConfig {
            include_videos: false,
            docx_metadata: true,
            ..CatalogConfig::default()
        };
        let options = CatalogOptions::from(&config);

        assert!(!options.include_videos);
        assert!(options.is_metadata_file("metadata.docx"));
        assert!(options.is_metadata_file("metadata.txt"));
        assert!(!options.is_metadata_file("metadata.md"));
    }
}
