//! File classification and media URL derivation.

use super::CatalogOptions;
use crate::drive::DriveFile;

/// Reserved name of the plain-text metadata file.
pub const METADATA_TXT: &str = "metadata.txt";

/// Reserved name of the document metadata file.
pub const METADATA_DOCX: &str = "metadata.docx";

/// MIME types recognized as images.
pub const IMAGE_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
];

/// MIME types recognized as videos.
pub const VIDEO_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/mpeg",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-ms-wmv",
    "video/webm",
    "video/ogg",
    "video/3gpp",
    "video/x-flv",
];

/// Role of a file within an item folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Metadata source.
    Metadata,
    /// Image shown in `imageUrls`.
    Image,
    /// Video shown in `videoUrls`.
    Video,
    /// Not part of the item record.
    Ignored,
}

/// Returns true if the MIME type is a recognized image type.
pub fn is_image(mime_type: &str) -> bool {
    IMAGE_MIME_TYPES.contains(&mime_type)
}

/// Returns true if the MIME type is a recognized video type.
pub fn is_video(mime_type: &str) -> bool {
    VIDEO_MIME_TYPES.contains(&mime_type)
}

/// Public view link for an image.
pub fn image_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?export=view&id={file_id}")
}

/// Embedded player link for a video.
pub fn video_url(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{file_id}/preview")
}

/// Classify one file. Name matching for metadata takes precedence over MIME type.
pub fn classify(file: &DriveFile, options: &CatalogOptions) -> FileKind {
    if options.is_metadata_file(&file.name) {
        FileKind::Metadata
    } else if is_image(&file.mime_type) {
        FileKind::Image
    } else if options.include_videos && is_video(&file.mime_type) {
        FileKind::Video
    } else {
        FileKind::Ignored
    }
}

/// Result of classifying an item folder's files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified<'a> {
    /// Metadata source; the last matching file in listing order.
    pub metadata: Option<&'a DriveFile>,
    /// Image URLs in listing order.
    pub image_urls: Vec<String>,
    /// Video URLs in listing order.
    pub video_urls: Vec<String>,
}

/// Partition a folder listing into metadata source and media URLs.
pub fn classify_files<'a>(files: &'a [DriveFile], options: &CatalogOptions) -> Classified<'a> {
    let mut classified = Classified::default();

    for file in files {
        match classify(file, options) {
            FileKind::Metadata => classified.metadata = Some(file),
            FileKind::Image => classified.image_urls.push(image_url(&file.id)),
            FileKind::Video => classified.video_urls.push(video_url(&file.id)),
            FileKind::Ignored => {}
        }
    }

    classified
}
