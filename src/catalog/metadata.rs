//! `key: value` metadata parsing.

use std::collections::HashMap;

/// Mapping from lower-cased key to value.
pub type MetadataMap = HashMap<String, String>;

/// Parse `key: value` lines into a mapping.
///
/// Each non-blank line is split at its first colon; keys are trimmed and
/// lower-cased, values trimmed. Lines without a colon are skipped and a
/// repeated key keeps its last value. Never fails.
pub fn parse_metadata(content: &str) -> MetadataMap {
    let mut metadata = MetadataMap::new();

    for line in content.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            metadata.insert(key.trim().to_lowercase(), value.trim().to_string());
        }
    }

    metadata
}
