//! Drive v3 REST client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use super::{
    Credentials, DriveConnector, DriveEntry, DriveError, DriveFile, StorageService, TokenProvider,
};
use crate::config::DriveConfig;
use crate::{CatalogError, Result};

/// MIME type Drive uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// User agent string for Drive requests.
const USER_AGENT: &str = concat!("drive-catalog/", env!("CARGO_PKG_VERSION"));

const FOLDER_FIELDS: &str = "files(id, name)";
const FILE_FIELDS: &str = "files(id, name, mimeType)";

#[derive(Debug, Deserialize)]
struct FileList<T> {
    #[serde(default = "Vec::new")]
    files: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Escape a value for use inside a single-quoted Drive query literal.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Query selecting the non-trashed child folders of `parent_id`.
pub(crate) fn folders_query(parent_id: &str) -> String {
    format!(
        "'{}' in parents and mimeType='{}' and trashed=false",
        escape_query_value(parent_id),
        FOLDER_MIME_TYPE
    )
}

/// Query selecting every non-trashed file directly inside `folder_id`.
pub(crate) fn files_query(folder_id: &str) -> String {
    format!(
        "'{}' in parents and trashed=false",
        escape_query_value(folder_id)
    )
}

/// Authenticated Drive v3 client.
pub struct DriveClient {
    http: Client,
    api_base: Url,
    page_size: u32,
    tokens: TokenProvider,
}

impl DriveClient {
    /// Create a client for the given credentials.
    pub fn new(http: Client, config: &DriveConfig, credentials: Credentials) -> Result<Self> {
        let api_base = Url::parse(&config.api_base_url).map_err(|e| {
            CatalogError::ClientInitFailed(format!("invalid API base URL: {e}"))
        })?;
        if api_base.cannot_be_a_base() {
            return Err(CatalogError::ClientInitFailed(format!(
                "invalid API base URL: {}",
                config.api_base_url
            )));
        }

        let tokens = TokenProvider::new(http.clone(), credentials)?;

        Ok(Self {
            http,
            api_base,
            page_size: config.page_size,
            tokens,
        })
    }

    /// Build `{api_base}/files[/{id}]`.
    fn files_url(&self, file_id: Option<&str>) -> std::result::Result<Url, DriveError> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                DriveError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase)
            })?;
            segments.pop_if_empty().push("files");
            if let Some(id) = file_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn get(&self, url: Url) -> std::result::Result<reqwest::Response, DriveError> {
        let token = self.tokens.access_token().await?;
        let response = self.http.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());
        Err(DriveError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn list<T: DeserializeOwned>(
        &self,
        query: String,
        fields: &str,
    ) -> std::result::Result<Vec<T>, DriveError> {
        let mut url = self.files_url(None)?;
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("fields", fields)
            .append_pair("pageSize", &self.page_size.to_string());

        tracing::debug!(%query, "Listing Drive files");

        let bytes = self.get(url).await?.bytes().await?;
        let list: FileList<T> =
            serde_json::from_slice(&bytes).map_err(|e| DriveError::Decode(e.to_string()))?;
        Ok(list.files)
    }
}

#[async_trait]
impl StorageService for DriveClient {
    async fn list_folders(
        &self,
        parent_id: &str,
    ) -> std::result::Result<Vec<DriveEntry>, DriveError> {
        self.list(folders_query(parent_id), FOLDER_FIELDS).await
    }

    async fn list_files(&self, folder_id: &str) -> std::result::Result<Vec<DriveFile>, DriveError> {
        self.list(files_query(folder_id), FILE_FIELDS).await
    }

    async fn download(&self, file_id: &str) -> std::result::Result<Bytes, DriveError> {
        let mut url = self.files_url(Some(file_id))?;
        url.query_pairs_mut().append_pair("alt", "media");

        tracing::debug!(file_id, "Downloading Drive file");

        Ok(self.get(url).await?.bytes().await?)
    }
}

/// Connector producing [`DriveClient`]s that share one HTTP connection pool.
pub struct GoogleDriveConnector {
    http: Client,
    config: DriveConfig,
}

impl GoogleDriveConnector {
    /// Create a connector with timeouts from configuration.
    pub fn new(config: &DriveConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                CatalogError::ClientInitFailed(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }
}

impl DriveConnector for GoogleDriveConnector {
    fn connect(&self, credentials_json: &str) -> Result<Box<dyn StorageService>> {
        let credentials = Credentials::from_json(credentials_json)?;
        let client = DriveClient::new(self.http.clone(), &self.config, credentials)?;
        Ok(Box::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folders_query() {
        assert_eq!(
            folders_query("root123"),
            concat!(
                "'root123' in parents and ",
                "mimeType='application/vnd.google-apps.folder' and trashed=false"
            )
        );
    }

    #[test]
    fn test_files_query() {
        assert_eq!(files_query("abc"), "'abc' in parents and trashed=false");
    }

    #[test]
    fn test_query_value_escaping() {
        assert_eq!(escape_query_value("it's"), "it\\'s");
        assert_eq!(escape_query_value("a\\b"), "a\\\\b");
        assert_eq!(
            files_query("x' or '1'='1"),
            "'x\\' or \\'1\\'=\\'1' in parents and trashed=false"
        );
    }

    #[test]
    fn test_connector_rejects_bad_credentials() {
        let connector = GoogleDriveConnector::new(&DriveConfig::default()).unwrap();
        let result = connector.connect("{");
        assert!(matches!(result, Err(CatalogError::ClientInitFailed(_))));
    }

    #[test]
    fn test_connector_rejects_bad_base_url() {
        let config = DriveConfig {
            api_base_url: "not a url".to_string(),
            ..DriveConfig::default()
        };
        let connector = GoogleDriveConnector::new(&config).unwrap();
        let credentials = r#"{
            "type": "authorized_user",
            "client_id": "i",
            "client_secret": "s",
            "refresh_token": "r"
        }"#;

        match connector.connect(credentials) {
            Err(CatalogError::ClientInitFailed(msg)) => {
                assert!(msg.contains("invalid API base URL"))
            }
            _ => panic!("Expected ClientInitFailed"),
        }
    }
}
