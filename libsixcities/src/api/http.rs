//! reqwest-backed API client

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use super::{classify_failure, routes, ApiClient, ApiResult, Endpoint, TOKEN_HEADER};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::storage::{current_token, TokenStorage};
use crate::types::{AuthInfo, CommentData, LoginData, Offer, Review};

/// HTTP client for the Six Cities REST API
///
/// The session token is read from `storage` before every request and sent
/// in the `X-Token` header. Token eviction on 401 is the store's job.
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    storage: Arc<dyn TokenStorage>,
}

impl std::fmt::Debug for HttpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpApiClient")
            .field("base_url", &self.base_url)
            .field("storage", &self.storage.backend_name())
            .finish()
    }
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig, storage: Arc<dyn TokenStorage>) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            storage,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match current_token(self.storage.as_ref()) {
            Some(token) => builder.header(TOKEN_HEADER, token),
            None => builder,
        }
    }

    /// Send a request and return the raw body of a 2xx response
    async fn send(&self, endpoint: Endpoint, builder: RequestBuilder) -> ApiResult<Vec<u8>> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        tracing::debug!("{} responded with {}", endpoint, status);

        if status.is_success() {
            let body = response.bytes().await.map_err(classify_transport)?;
            return Ok(body.to_vec());
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_failure(
            status.as_u16(),
            &body,
            endpoint.message_strategy(),
        ))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        builder: RequestBuilder,
    ) -> ApiResult<T> {
        let body = self.send(endpoint, builder).await?;
        decode(&body)
    }

    async fn fetch_list<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        builder: RequestBuilder,
    ) -> ApiResult<Vec<T>> {
        let body = self.send(endpoint, builder).await?;
        decode_list(&body)
    }
}

fn classify_transport(error: reqwest::Error) -> ApiError {
    if error.is_builder() {
        ApiError::Client(error.to_string())
    } else if error.is_decode() {
        ApiError::Decode(error.to_string())
    } else {
        ApiError::Network(error.to_string())
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// An empty or `null` body decodes to an empty list
fn decode_list<T: DeserializeOwned>(body: &[u8]) -> ApiResult<Vec<T>> {
    let trimmed = body.trim_ascii();
    if trimmed.is_empty() || trimmed == b"null" {
        return Ok(Vec::new());
    }
    decode(trimmed)
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn offers(&self) -> ApiResult<Vec<Offer>> {
        let request = self.client.get(self.url(&routes::offers()));
        self.fetch_list(Endpoint::Offers, request).await
    }

    async fn offer(&self, id: &str) -> ApiResult<Offer> {
        let request = self.client.get(self.url(&routes::offer(id)?));
        self.fetch(Endpoint::Offer, request).await
    }

    async fn nearby_offers(&self, id: &str) -> ApiResult<Vec<Offer>> {
        let request = self.client.get(self.url(&routes::nearby_offers(id)?));
        self.fetch_list(Endpoint::NearbyOffers, request).await
    }

    async fn comments(&self, offer_id: &str) -> ApiResult<Vec<Review>> {
        let request = self.client.get(self.url(&routes::comments(offer_id)?));
        self.fetch_list(Endpoint::Comments, request).await
    }

    async fn post_comment(&self, offer_id: &str, comment: &CommentData) -> ApiResult<Review> {
        let request = self
            .client
            .post(self.url(&routes::comments(offer_id)?))
            .json(comment);
        self.fetch(Endpoint::PostComment, request).await
    }

    async fn favorites(&self) -> ApiResult<Vec<Offer>> {
        let request = self.client.get(self.url(&routes::favorites()));
        self.fetch_list(Endpoint::Favorites, request).await
    }

    async fn set_favorite(&self, offer_id: &str, is_favorite: bool) -> ApiResult<Offer> {
        let request = self
            .client
            .post(self.url(&routes::favorite_status(offer_id, is_favorite)?));
        self.fetch(Endpoint::SetFavorite, request).await
    }

    async fn check_auth(&self) -> ApiResult<AuthInfo> {
        let request = self.client.get(self.url(&routes::login()));
        self.fetch(Endpoint::CheckAuth, request).await
    }

    async fn login(&self, credentials: &LoginData) -> ApiResult<AuthInfo> {
        let request = self
            .client
            .post(self.url(&routes::login()))
            .json(credentials);
        self.fetch(Endpoint::Login, request).await
    }
}
