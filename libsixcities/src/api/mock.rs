//! Mock API client for testing
//!
//! An in-memory stand-in for the remote service. It keeps a small catalog
//! of offers, reviews and a session, supports per-endpoint failures and
//! delays, and records every call so tests can assert on traffic.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;

use super::{ApiClient, ApiResult, Endpoint};
use crate::error::ApiError;
use crate::types::{AuthInfo, CommentData, LoginData, Offer, Review, ReviewUser};

#[derive(Default)]
struct MockState {
    offers: Vec<Offer>,
    nearby: HashMap<String, Vec<String>>,
    comments: HashMap<String, Vec<Review>>,
    favorites: HashSet<String>,
    account: Option<AuthInfo>,
    session: Option<AuthInfo>,
    failures: HashMap<Endpoint, ApiError>,
    delays: HashMap<Endpoint, Duration>,
    calls: Vec<Endpoint>,
    next_review_id: usize,
}

/// Mock API client
pub struct MockApi {
    state: Mutex<MockState>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    /// An empty catalog with no registered account
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
        }
    }

    /// Seed the offers catalog. Offers flagged as favorite start in the favorites set.
    pub fn with_offers(self, offers: Vec<Offer>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.favorites = offers
                .iter()
                .filter(|offer| offer.is_favorite)
                .map(|offer| offer.id.clone())
                .collect();
            state.offers = offers;
        }
        self
    }

    /// Declare which offers `GET /offers/{id}/nearby` returns
    pub fn with_nearby(self, id: &str, nearby_ids: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .nearby
            .insert(id.to_string(), nearby_ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_reviews(self, offer_id: &str, reviews: Vec<Review>) -> Self {
        self.state
            .lock()
            .unwrap()
            .comments
            .insert(offer_id.to_string(), reviews);
        self
    }

    /// Register the account `login` accepts
    pub fn with_account(self, account: AuthInfo) -> Self {
        self.state.lock().unwrap().account = Some(account);
        self
    }

    /// Register an account and start with an active session for it
    pub fn with_session(self, account: AuthInfo) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.session = Some(account.clone());
            state.account = Some(account);
        }
        self
    }

    /// Make every call to `endpoint` fail with `error`
    pub fn fail(&self, endpoint: Endpoint, error: ApiError) {
        self.state.lock().unwrap().failures.insert(endpoint, error);
    }

    /// Remove a failure installed with [`MockApi::fail`]
    pub fn recover(&self, endpoint: Endpoint) {
        self.state.lock().unwrap().failures.remove(&endpoint);
    }

    /// Delay every call to `endpoint` (simulates network latency)
    pub fn delay(&self, endpoint: Endpoint, delay: Duration) {
        self.state.lock().unwrap().delays.insert(endpoint, delay);
    }

    /// End the server-side session, as if the token expired
    pub fn expire_session(&self) {
        self.state.lock().unwrap().session = None;
    }

    /// Endpoints called so far, in call order
    pub fn calls(&self) -> Vec<Endpoint> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.calls().iter().filter(|e| **e == endpoint).count()
    }

    /// Record the call, wait out any configured delay, then apply failures
    async fn enter(&self, endpoint: Endpoint) -> ApiResult<()> {
        let delay = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(endpoint);
            state.delays.get(&endpoint).copied()
        };

        if let Some(delay) = delay {
            sleep(delay).await;
        }

        match self.state.lock().unwrap().failures.get(&endpoint) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn not_found(id: &str) -> ApiError {
        ApiError::Server {
            status: 404,
            message: format!("Offer with id {} not found.", id),
        }
    }
}

impl MockState {
    fn require_session(&self) -> ApiResult<AuthInfo> {
        self.session.clone().ok_or(ApiError::Status(401))
    }

    fn view(&self, offer: &Offer) -> Offer {
        let mut offer = offer.clone();
        offer.is_favorite = self.favorites.contains(&offer.id);
        offer
    }

    fn find(&self, id: &str) -> Option<Offer> {
        self.offers
            .iter()
            .find(|offer| offer.id == id)
            .map(|offer| self.view(offer))
    }
}

#[async_trait]
impl ApiClient for MockApi {
    async fn offers(&self) -> ApiResult<Vec<Offer>> {
        self.enter(Endpoint::Offers).await?;
        let state = self.state.lock().unwrap();
        Ok(state.offers.iter().map(|offer| state.view(offer)).collect())
    }

    async fn offer(&self, id: &str) -> ApiResult<Offer> {
        self.enter(Endpoint::Offer).await?;
        let state = self.state.lock().unwrap();
        state.find(id).ok_or_else(|| Self::not_found(id))
    }

    async fn nearby_offers(&self, id: &str) -> ApiResult<Vec<Offer>> {
        self.enter(Endpoint::NearbyOffers).await?;
        let state = self.state.lock().unwrap();
        if state.find(id).is_none() {
            return Err(Self::not_found(id));
        }
        let ids = state.nearby.get(id).cloned().unwrap_or_default();
        Ok(ids.iter().filter_map(|nearby| state.find(nearby)).collect())
    }

    async fn comments(&self, offer_id: &str) -> ApiResult<Vec<Review>> {
        self.enter(Endpoint::Comments).await?;
        let state = self.state.lock().unwrap();
        Ok(state.comments.get(offer_id).cloned().unwrap_or_default())
    }

    async fn post_comment(&self, offer_id: &str, comment: &CommentData) -> ApiResult<Review> {
        self.enter(Endpoint::PostComment).await?;
        let mut state = self.state.lock().unwrap();
        let user = state.require_session()?;
        if state.find(offer_id).is_none() {
            return Err(Self::not_found(offer_id));
        }

        state.next_review_id += 1;
        let review = Review {
            id: format!("review-{}", state.next_review_id),
            user: ReviewUser {
                name: user.name,
                avatar_url: user.avatar_url,
                is_pro: user.is_pro,
            },
            rating: comment.rating,
            comment: comment.comment.clone(),
            date: chrono::Utc::now().to_rfc3339(),
        };
        state
            .comments
            .entry(offer_id.to_string())
            .or_default()
            .push(review.clone());
        Ok(review)
    }

    async fn favorites(&self) -> ApiResult<Vec<Offer>> {
        self.enter(Endpoint::Favorites).await?;
        let state = self.state.lock().unwrap();
        state.require_session()?;
        Ok(state
            .offers
            .iter()
            .filter(|offer| state.favorites.contains(&offer.id))
            .map(|offer| state.view(offer))
            .collect())
    }

    async fn set_favorite(&self, offer_id: &str, is_favorite: bool) -> ApiResult<Offer> {
        self.enter(Endpoint::SetFavorite).await?;
        let mut state = self.state.lock().unwrap();
        state.require_session()?;
        if state.find(offer_id).is_none() {
            return Err(Self::not_found(offer_id));
        }

        if is_favorite {
            state.favorites.insert(offer_id.to_string());
        } else {
            state.favorites.remove(offer_id);
        }
        state.find(offer_id).ok_or_else(|| Self::not_found(offer_id))
    }

    async fn check_auth(&self) -> ApiResult<AuthInfo> {
        self.enter(Endpoint::CheckAuth).await?;
        self.state.lock().unwrap().require_session()
    }

    async fn login(&self, credentials: &LoginData) -> ApiResult<AuthInfo> {
        self.enter(Endpoint::Login).await?;
        let mut state = self.state.lock().unwrap();
        let account = state
            .account
            .clone()
            .filter(|account| account.email == credentials.email && !credentials.password.is_empty())
            .ok_or_else(|| ApiError::Server {
                status: 400,
                message: "Incorrect email or password".to_string(),
            })?;
        state.session = Some(account.clone());
        Ok(account)
    }
}
