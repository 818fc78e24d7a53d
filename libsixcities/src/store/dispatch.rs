//! Async dispatchers
//!
//! Each dispatcher applies `Pending` before awaiting anything, performs
//! exactly one API call and applies exactly one terminal action. Failures
//! never escape as errors: they become the rejection message on the slice
//! and in the returned [`Settled`].

use std::future::Future;
use uuid::Uuid;

use super::actions::{Action, Failure, Phase, Settled};
use super::Store;
use crate::api::ApiResult;
use crate::error::ApiError;
use crate::types::{AuthInfo, CommentData, LoginData, Offer, Review};

impl Store {
    /// Load every offer
    pub async fn fetch_offers(&self) -> Settled<Vec<Offer>> {
        self.run(Action::FetchOffers, self.api().offers()).await
    }

    pub async fn fetch_offer(&self, id: &str) -> Settled<Offer> {
        self.run(Action::FetchOffer, self.api().offer(id)).await
    }

    pub async fn fetch_nearby_offers(&self, id: &str) -> Settled<Vec<Offer>> {
        self.run(Action::FetchNearbyOffers, self.api().nearby_offers(id))
            .await
    }

    pub async fn fetch_reviews(&self, id: &str) -> Settled<Vec<Review>> {
        self.run(Action::FetchReviews, self.api().comments(id)).await
    }

    /// Post a review. The data is sent as given; validate it first.
    pub async fn submit_review(&self, id: &str, review: &CommentData) -> Settled<Review> {
        self.run(Action::SubmitReview, self.api().post_comment(id, review))
            .await
    }

    /// Validate the stored token against the server
    pub async fn check_auth(&self) -> Settled<AuthInfo> {
        self.run_then(Action::CheckAuth, self.api().check_auth(), |user| {
            self.persist_token(user)
        })
        .await
    }

    pub async fn login(&self, credentials: &LoginData) -> Settled<AuthInfo> {
        self.run_then(Action::Login, self.api().login(credentials), |user| {
            self.persist_token(user)
        })
        .await
    }

    pub async fn fetch_favorites(&self) -> Settled<Vec<Offer>> {
        self.run(Action::FetchFavorites, self.api().favorites()).await
    }

    /// Set the favorite flag of an offer; every collection holding it is updated
    pub async fn toggle_favorite(&self, id: &str, is_favorite: bool) -> Settled<Offer> {
        self.run(
            Action::ToggleFavorite,
            self.api().set_favorite(id, is_favorite),
        )
        .await
    }

    pub fn set_city(&self, city: &str) {
        self.dispatch(Action::SetCity(city.to_string()));
    }

    /// Forget the session locally: drop the token and mark the user signed out
    pub fn logout(&self) {
        self.forget_token();
        self.dispatch(Action::Logout);
    }

    async fn run<T, F>(&self, wrap: fn(Phase<T>) -> Action, request: F) -> Settled<T>
    where
        T: Clone,
        F: Future<Output = ApiResult<T>>,
    {
        self.run_then(wrap, request, |_| {}).await
    }

    /// Drive one request through its lifecycle
    ///
    /// `on_fulfilled` runs before the fulfilled action is applied, so
    /// subscribers reacting to it observe its side effects.
    async fn run_then<T, F>(
        &self,
        wrap: fn(Phase<T>) -> Action,
        request: F,
        on_fulfilled: impl FnOnce(&T),
    ) -> Settled<T>
    where
        T: Clone,
        F: Future<Output = ApiResult<T>>,
    {
        let request_id = Uuid::new_v4();
        let pending = wrap(Phase::Pending);
        let name = pending.name();
        tracing::debug!("{} started (request {})", name, request_id);
        self.apply(Some(request_id), pending);

        let outcome = match &self.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(ApiError::Cancelled),
                    result = request => result,
                }
            }
            None => request.await,
        };

        let (phase, result) = match outcome {
            Ok(payload) => {
                on_fulfilled(&payload);
                tracing::debug!("{} fulfilled (request {})", name, request_id);
                (Phase::Fulfilled(payload.clone()), Ok(payload))
            }
            Err(ApiError::Cancelled) => {
                tracing::debug!("{} aborted (request {})", name, request_id);
                (Phase::Aborted, Err(Failure::Aborted))
            }
            Err(error) => {
                if error.is_unauthorized() {
                    tracing::info!("{} was unauthorized, evicting session token", name);
                    self.forget_token();
                }
                let message = error.to_string();
                tracing::warn!("{} rejected: {}", name, message);
                (Phase::Rejected(message), Err(Failure::Rejected(error)))
            }
        };

        self.apply(Some(request_id), wrap(phase));
        Settled { request_id, result }
    }

    fn persist_token(&self, user: &AuthInfo) {
        if let Err(e) = self.storage().save(&user.token) {
            tracing::warn!("Failed to store session token: {}", e);
        }
    }

    fn forget_token(&self) {
        if let Err(e) = self.storage().remove() {
            tracing::warn!("Failed to remove session token: {}", e);
        }
    }
}
