//! Catalog endpoint handlers.

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::catalog::{CatalogBuilder, Item};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::CatalogError;

/// Name of the query parameter overriding the root folder.
pub const FOLDER_ID_PARAM: &str = "folderId";

/// Query parameters for the catalog endpoint.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Overrides the configured root folder for this request.
    pub folder_id: Option<String>,
}

impl CatalogQuery {
    /// Parse a raw query string. Only the first `folderId` counts; unknown
    /// and repeated parameters are ignored.
    pub fn parse(raw: Option<&str>) -> Self {
        let folder_id = raw.and_then(|raw| {
            url::form_urlencoded::parse(raw.as_bytes())
                .find(|(key, _)| key == FOLDER_ID_PARAM)
                .map(|(_, value)| value.into_owned())
        });
        Self { folder_id }
    }
}

/// Successful catalog response.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    /// One record per item folder, in listing order.
    pub items: Vec<Item>,
}

/// GET <endpoint> - Build the catalog for the requested root folder.
#[tracing::instrument(
    name = "catalog_request",
    skip_all,
    fields(folder_id = tracing::field::Empty)
)]
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<CatalogResponse>, ApiError> {
    let query = CatalogQuery::parse(raw_query.as_deref());
    let root_folder_id = query
        .folder_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .or_else(|| state.catalog.root_folder_id())
        .ok_or_else(|| ApiError::bad_request("Folder ID is required"))?;
    tracing::Span::current().record("folder_id", root_folder_id);

    let credentials = state.catalog.credentials().ok_or_else(|| {
        CatalogError::ConfigMissing("Google credentials not configured".to_string())
    })?;

    let storage = state.connector.connect(credentials)?;
    let items = CatalogBuilder::new(storage.as_ref(), &state.extractors, state.options)
        .build(root_folder_id)
        .await?;

    Ok(Json(CatalogResponse { items }))
}

/// OPTIONS <endpoint> - CORS preflight without an `Origin` header.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method on the catalog endpoint.
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

/// Unknown paths.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}
