//! Store state
//!
//! One struct per domain slice, composed under fixed keys in [`RootState`].
//! All transitions happen through the reducers (see `reducer/`).
//!
//! Collections sit behind `Arc`. A reducer installs a new `Arc` whenever it
//! changes a collection and passes the old one through otherwise, so cloning
//! a snapshot is cheap and pointer equality means unchanged contents.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::{AuthInfo, Offer, Review};

/// Offers list for the main page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffersState {
    pub offers: Arc<Vec<Offer>>,

    /// Selected city name, empty when no city is selected
    pub city: String,

    pub is_loading: bool,
    pub error: Option<String>,
}

/// Single offer page: the offer, its neighbours and its reviews
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferState {
    pub current_offer: Option<Offer>,
    pub nearby_offers: Arc<Vec<Offer>>,
    pub reviews: Arc<Vec<Review>>,
    pub is_loading_offer: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesState {
    pub favorites: Arc<Vec<Offer>>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Session status
///
/// `Unknown` holds only until the first session check settles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationStatus {
    #[default]
    Unknown,
    #[serde(rename = "AUTH")]
    Authenticated,
    #[serde(rename = "NO_AUTH")]
    Unauthenticated,
}

impl std::fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorizationStatus::Unknown => write!(f, "unknown"),
            AuthorizationStatus::Authenticated => write!(f, "authenticated"),
            AuthorizationStatus::Unauthenticated => write!(f, "unauthenticated"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub authorization_status: AuthorizationStatus,
    pub user: Option<AuthInfo>,
}

/// Root state tree
///
/// This is the single source of truth held by the [`Store`](super::Store).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootState {
    pub offers: OffersState,
    pub offer: OfferState,
    pub favorites: FavoritesState,
    pub auth: AuthState,
}

impl RootState {
    pub fn new() -> Self {
        Self::default()
    }
}
