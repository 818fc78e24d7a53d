//! Remote API seam
//!
//! Dispatchers never talk HTTP directly: they call an [`ApiClient`], which
//! the store receives at construction time. Production code uses
//! [`HttpApiClient`]; tests inject [`mock::MockApi`].
//!
//! # Endpoints
//!
//! | Method | Path                       | Returns       |
//! |--------|----------------------------|---------------|
//! | GET    | `/offers`                  | `Vec<Offer>`  |
//! | GET    | `/offers/{id}`             | `Offer`       |
//! | GET    | `/offers/{id}/nearby`      | `Vec<Offer>`  |
//! | GET    | `/comments/{id}`           | `Vec<Review>` |
//! | POST   | `/comments/{id}`           | `Review`      |
//! | GET    | `/favorite`                | `Vec<Offer>`  |
//! | POST   | `/favorite/{id}/{0 or 1}`  | `Offer`       |
//! | GET    | `/login`                   | `AuthInfo`    |
//! | POST   | `/login`                   | `AuthInfo`    |

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::{AuthInfo, CommentData, LoginData, Offer, Review};

pub mod http;

// Mock client is available for all builds (not just tests) to support integration tests
pub mod mock;

pub use http::HttpApiClient;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Header carrying the session token
pub const TOKEN_HEADER: &str = "X-Token";

pub const LOGIN_FALLBACK_MESSAGE: &str = "Failed to login. Please check your credentials.";
pub const REVIEW_FALLBACK_MESSAGE: &str = "Failed to submit review. Please try again.";

/// One method per remote operation
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn offers(&self) -> ApiResult<Vec<Offer>>;

    async fn offer(&self, id: &str) -> ApiResult<Offer>;

    async fn nearby_offers(&self, id: &str) -> ApiResult<Vec<Offer>>;

    async fn comments(&self, offer_id: &str) -> ApiResult<Vec<Review>>;

    async fn post_comment(&self, offer_id: &str, comment: &CommentData) -> ApiResult<Review>;

    async fn favorites(&self) -> ApiResult<Vec<Offer>>;

    /// Mark (`true`) or unmark (`false`) an offer as favorite; returns the updated offer
    async fn set_favorite(&self, offer_id: &str, is_favorite: bool) -> ApiResult<Offer>;

    /// Validate the stored session token
    async fn check_auth(&self) -> ApiResult<AuthInfo>;

    async fn login(&self, credentials: &LoginData) -> ApiResult<AuthInfo>;
}

/// Identifies a remote operation, for logging and for the mock client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Offers,
    Offer,
    NearbyOffers,
    Comments,
    PostComment,
    Favorites,
    SetFavorite,
    CheckAuth,
    Login,
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::Offers => "offers/fetchOffers",
            Endpoint::Offer => "offer/fetchOffer",
            Endpoint::NearbyOffers => "offer/fetchNearbyOffers",
            Endpoint::Comments => "offer/fetchReviews",
            Endpoint::PostComment => "offer/submitReview",
            Endpoint::Favorites => "favorites/fetchFavorites",
            Endpoint::SetFavorite => "favorites/toggleFavorite",
            Endpoint::CheckAuth => "auth/checkAuth",
            Endpoint::Login => "auth/login",
        }
    }

    /// Strategy used to pull a message out of an error response
    pub fn message_strategy(&self) -> MessageStrategy {
        match self {
            Endpoint::Login => MessageStrategy::Detailed {
                fallback: LOGIN_FALLBACK_MESSAGE,
            },
            Endpoint::PostComment => MessageStrategy::Detailed {
                fallback: REVIEW_FALLBACK_MESSAGE,
            },
            _ => MessageStrategy::MessageField,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Request paths relative to the API base URL
///
/// Ids are percent-encoded into a single path segment, so `/`, `?` and `#`
/// in an id never reach another endpoint. Ids that are empty or a dot
/// segment are rejected before any request is built.
pub mod routes {
    use std::borrow::Cow;

    use super::ApiResult;
    use crate::error::ApiError;

    fn segment(id: &str) -> ApiResult<Cow<'_, str>> {
        match id {
            "" | "." | ".." => Err(ApiError::Client(format!("Invalid offer id '{}'", id))),
            _ => Ok(urlencoding::encode(id)),
        }
    }

    pub fn offers() -> String {
        "/offers".to_string()
    }

    pub fn offer(id: &str) -> ApiResult<String> {
        Ok(format!("/offers/{}", segment(id)?))
    }

    pub fn nearby_offers(id: &str) -> ApiResult<String> {
        Ok(format!("/offers/{}/nearby", segment(id)?))
    }

    pub fn comments(offer_id: &str) -> ApiResult<String> {
        Ok(format!("/comments/{}", segment(offer_id)?))
    }

    pub fn favorites() -> String {
        "/favorite".to_string()
    }

    pub fn favorite_status(offer_id: &str, is_favorite: bool) -> ApiResult<String> {
        Ok(format!(
            "/favorite/{}/{}",
            segment(offer_id)?,
            u8::from(is_favorite)
        ))
    }

    pub fn login() -> String {
        "/login".to_string()
    }
}

/// How to find a human-readable message in a non-2xx response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStrategy {
    /// Only the `message` field is consulted
    MessageField,
    /// Form submissions. On 400 the body is searched in several places
    /// before `fallback` is used; other statuses behave like `MessageField`.
    Detailed { fallback: &'static str },
}

/// Turn a non-2xx response into an [`ApiError`]
pub fn classify_failure(status: u16, body: &str, strategy: MessageStrategy) -> ApiError {
    let value: Option<Value> = serde_json::from_str(body).ok();

    let message = match strategy {
        MessageStrategy::Detailed { fallback } if status == 400 => value
            .as_ref()
            .and_then(detailed_message)
            .or_else(|| Some(fallback.to_string())),
        _ => value.as_ref().and_then(message_field),
    };

    match message {
        Some(message) => ApiError::Server { status, message },
        None => ApiError::Status(status),
    }
}

fn non_empty(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn message_field(body: &Value) -> Option<String> {
    body.get("message").and_then(non_empty)
}

/// Named fields, then the first validation entry, then any string field
fn detailed_message(body: &Value) -> Option<String> {
    for key in ["message", "error", "details"] {
        if let Some(message) = body.get(key).and_then(non_empty) {
            return Some(message);
        }
    }

    for key in ["details", "errors"] {
        let first = body
            .get(key)
            .and_then(Value::as_array)
            .and_then(|entries| entries.first());
        if let Some(message) = first.and_then(validation_entry_message) {
            return Some(message);
        }
    }

    body.as_object()?.values().find_map(non_empty)
}

fn validation_entry_message(entry: &Value) -> Option<String> {
    if let Some(message) = non_empty(entry) {
        return Some(message);
    }

    let from_list = entry
        .get("messages")
        .and_then(Value::as_array)
        .and_then(|messages| messages.iter().find_map(non_empty));

    from_list.or_else(|| entry.get("message").and_then(non_empty))
}
