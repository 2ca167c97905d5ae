//! Conversion of downloaded metadata files to plain text.
//!
//! Extractors are registered by file-name suffix in an [`ExtractorRegistry`].
//! Files with no registered suffix are decoded as UTF-8.

mod converter;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::CatalogConfig;
use crate::Result;

pub use converter::ExternalConverter;

/// Turns raw file bytes into text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract the text of `content`, which was downloaded as `file_name`.
    ///
    /// Failures are reported as `MetadataReadFailed`.
    async fn extract(&self, file_name: &str, content: &[u8]) -> Result<String>;
}

/// Decodes bytes as UTF-8, replacing invalid sequences.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, _file_name: &str, content: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(content).into_owned())
    }
}

/// Extractors keyed by lower-case file-name suffix.
#[derive(Clone)]
pub struct ExtractorRegistry {
    by_suffix: Vec<(String, Arc<dyn TextExtractor>)>,
    fallback: Arc<dyn TextExtractor>,
}

impl ExtractorRegistry {
    /// Registry with only the plain-text fallback.
    pub fn new() -> Self {
        Self {
            by_suffix: Vec::new(),
            fallback: Arc::new(PlainTextExtractor),
        }
    }

    /// Registry matching the catalog configuration.
    ///
    /// Registers the external converter for `.docx` when document metadata is enabled.
    pub fn from_config(config: &CatalogConfig) -> Self {
        let registry = Self::new();
        if config.docx_metadata {
            registry.register(".docx", ExternalConverter::pandoc(&config.converter))
        } else {
            registry
        }
    }

    /// Register an extractor for a suffix (case-insensitive). Later registrations win.
    pub fn register(mut self, suffix: &str, extractor: impl TextExtractor + 'static) -> Self {
        self.by_suffix.insert(0, (suffix.to_lowercase(), Arc::new(extractor)));
        self
    }

    /// Extractor for a file name.
    fn for_file(&self, file_name: &str) -> &dyn TextExtractor {
        let name = file_name.to_lowercase();
        self.by_suffix
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix.as_str()))
            .map(|(_, extractor)| extractor.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    /// Extract text from `content` with the extractor registered for `file_name`.
    pub async fn extract(&self, file_name: &str, content: &[u8]) -> Result<String> {
        self.for_file(file_name).extract(file_name, content).await
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suffixes: Vec<&str> = self.by_suffix.iter().map(|(s, _)| s.as_str()).collect();
        f.debug_struct("ExtractorRegistry")
            .field("suffixes", &suffixes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::METADATA_DOCX;
    use crate::CatalogError;

    struct Upper;

    #[async_trait]
    impl TextExtractor for Upper {
        async fn extract(&self, _file_name: &str, content: &[u8]) -> Result<String> {
            Ok(String::from_utf8_lossy(content).to_uppercase())
        }
    }

    struct Failing;

    #[async_trait]
    impl TextExtractor for Failing {
        async fn extract(&self, file_name: &str, _content: &[u8]) -> Result<String> {
            Err(CatalogError::MetadataReadFailed(format!("cannot read {file_name}")))
        }
    }

    #[tokio::test]
    async fn test_plain_text_fallback() {
        let registry = ExtractorRegistry::new();
        let text = registry.extract("metadata.txt", b"title: A").await.unwrap();
        assert_eq!(text, "title: A");
    }

    #[tokio::test]
    async fn test_plain_text_invalid_utf8() {
        let text = PlainTextExtractor
            .extract("metadata.txt", &[b't', 0xff, b'x'])
            .await
            .unwrap();
        assert_eq!(text, "t\u{fffd}x");
    }

    #[tokio::test]
    async fn test_suffix_match_is_case_insensitive() {
        let registry = ExtractorRegistry::new().register(".DOCX", Upper);

        let text = registry.extract("Metadata.DOCX", b"title: a").await.unwrap();
        assert_eq!(text, "TITLE: A");

        let text = registry.extract("METADATA.docx", b"b").await.unwrap();
        assert_eq!(text, "B");

        let text = registry.extract("metadata.txt", b"title: a").await.unwrap();
        assert_eq!(text, "title: a");
    }

    #[tokio::test]
    async fn test_later_registration_wins() {
        let registry = ExtractorRegistry::new()
            .register(".docx", Failing)
            .register(".docx", Upper);

        let text = registry.extract("metadata.docx", b"x").await.unwrap();
        assert_eq!(text, "X");
    }

    #[tokio::test]
    async fn test_extractor_error_propagates() {
        let registry = ExtractorRegistry::new().register(".docx", Failing);
        let err = registry.extract("metadata.docx", b"").await.unwrap_err();
        assert!(matches!(err, CatalogError::MetadataReadFailed(_)));
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = CatalogConfig {
            converter: "/nonexistent/converter-binary".to_string(),
            ..CatalogConfig::default()
        };
        let err = ExtractorRegistry::from_config(&config)
            .extract(METADATA_DOCX, b"title: a")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::MetadataReadFailed(_)));

        let config = CatalogConfig {
            docx_metadata: false,
            ..config
        };
        let text = ExtractorRegistry::from_config(&config)
            .extract(METADATA_DOCX, b"title: a")
            .await
            .unwrap();
        assert_eq!(text, "title: a");
    }
}
