//! Reqwest client for the Marvel mirror API.
//!
//! The API key is process-wide configuration injected at construction, sent
//! as an `apiKey` query parameter on every request. All calls share one
//! bounded-timeout `reqwest::Client`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use comicvault_core::{EntityKind, UpstreamId};

use super::{ListingParams, UpstreamError, UpstreamRecord, UpstreamSource};
use crate::config::UpstreamConfig;

/// Client for the upstream comics/characters API.
pub struct MarvelClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl MarvelClient {
    /// Create a new upstream client.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be constructed.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        })
    }

    /// Execute a GET against `path`, forwarding `query` plus the API key,
    /// and return the response body as JSON.
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, UpstreamError> {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("apiKey", self.api_key.expose_secret())])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            // Keep the payload so the caller can forward it verbatim; fall
            // back to wrapping non-JSON bodies as a plain string.
            let body = serde_json::from_str(&text)
                .unwrap_or_else(|_| serde_json::Value::String(text.clone()));
            tracing::warn!(
                status = %status,
                path = %path,
                "upstream returned non-success status"
            );
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl UpstreamSource for MarvelClient {
    #[instrument(skip(self), fields(kind = %kind, id = %id))]
    async fn fetch_entity(
        &self,
        kind: EntityKind,
        id: &UpstreamId,
    ) -> Result<UpstreamRecord, UpstreamError> {
        let value = self.fetch_raw(kind, id).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn fetch_raw(
        &self,
        kind: EntityKind,
        id: &UpstreamId,
    ) -> Result<serde_json::Value, UpstreamError> {
        self.get_json(&format!("/{kind}/{id}"), &[]).await
    }

    async fn list(
        &self,
        kind: EntityKind,
        params: &ListingParams,
    ) -> Result<serde_json::Value, UpstreamError> {
        let (path, search_key) = match kind {
            EntityKind::Comic => ("/comics", "title"),
            EntityKind::Character => ("/characters", "name"),
        };

        let mut query = Vec::new();
        if let Some(search) = &params.search {
            query.push((search_key, search.clone()));
        }
        if let Some(limit) = params.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(skip) = params.skip {
            query.push(("skip", skip.to_string()));
        }

        self.get_json(path, &query).await
    }

    async fn comics_for_character(
        &self,
        character_id: &UpstreamId,
    ) -> Result<serde_json::Value, UpstreamError> {
        self.get_json(&format!("/comics/{character_id}"), &[]).await
    }
}
