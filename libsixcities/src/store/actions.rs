//! Actions for the reducer pattern
//!
//! Every state transition is triggered by an [`Action`]. Remote operations
//! carry a [`Phase`] describing where in its lifecycle the request is.

use uuid::Uuid;

use crate::error::{ApiError, SixCitiesError};
use crate::types::{AuthInfo, Offer, Review};

/// Lifecycle of one remote request
///
/// A dispatcher emits `Pending` when it is invoked and exactly one of the
/// other three once the request settles.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Pending,
    Fulfilled(T),
    /// Human-readable failure message
    Rejected(String),
    /// The caller cancelled before the response arrived
    Aborted,
}

impl<T> Phase<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Pending => "pending",
            Phase::Fulfilled(_) => "fulfilled",
            Phase::Rejected(_) => "rejected",
            Phase::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Phase::Pending)
    }
}

/// Actions that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // === Synchronous ===
    /// Select the city used to filter the offers list
    SetCity(String),

    /// Sign out locally
    Logout,

    // === Remote operations ===
    FetchOffers(Phase<Vec<Offer>>),
    FetchOffer(Phase<Offer>),
    FetchNearbyOffers(Phase<Vec<Offer>>),
    FetchReviews(Phase<Vec<Review>>),
    SubmitReview(Phase<Review>),
    CheckAuth(Phase<AuthInfo>),
    Login(Phase<AuthInfo>),
    FetchFavorites(Phase<Vec<Offer>>),
    /// The payload is the offer as returned by the server after the change
    ToggleFavorite(Phase<Offer>),
}

impl Action {
    /// Action type, e.g. `offers/fetchOffers`
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetCity(_) => "offers/setCity",
            Action::Logout => "auth/logout",
            Action::FetchOffers(_) => "offers/fetchOffers",
            Action::FetchOffer(_) => "offer/fetchOffer",
            Action::FetchNearbyOffers(_) => "offer/fetchNearbyOffers",
            Action::FetchReviews(_) => "offer/fetchReviews",
            Action::SubmitReview(_) => "offer/submitReview",
            Action::CheckAuth(_) => "auth/checkAuth",
            Action::Login(_) => "auth/login",
            Action::FetchFavorites(_) => "favorites/fetchFavorites",
            Action::ToggleFavorite(_) => "favorites/toggleFavorite",
        }
    }

    /// Lifecycle phase name, `None` for synchronous actions
    pub fn phase(&self) -> Option<&'static str> {
        match self {
            Action::SetCity(_) | Action::Logout => None,
            Action::FetchOffers(p) => Some(p.name()),
            Action::FetchOffer(p) => Some(p.name()),
            Action::FetchNearbyOffers(p) => Some(p.name()),
            Action::FetchReviews(p) => Some(p.name()),
            Action::SubmitReview(p) => Some(p.name()),
            Action::CheckAuth(p) => Some(p.name()),
            Action::Login(p) => Some(p.name()),
            Action::FetchFavorites(p) => Some(p.name()),
            Action::ToggleFavorite(p) => Some(p.name()),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.phase() {
            Some(phase) => write!(f, "{}/{}", self.name(), phase),
            None => f.write_str(self.name()),
        }
    }
}

/// How a dispatched request ended, when it did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// The classified error; its message is what the slice recorded
    Rejected(ApiError),
    Aborted,
}

/// Settled result handed back to the caller of a dispatcher
///
/// The same outcome has already been applied to the store by the time the
/// caller sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Settled<T> {
    pub request_id: Uuid,
    pub result: Result<T, Failure>,
}

impl<T> Settled<T> {
    pub fn is_fulfilled(&self) -> bool {
        self.result.is_ok()
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.result, Err(Failure::Rejected(_)))
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.result, Err(Failure::Aborted))
    }

    pub fn payload(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    /// Rejection message, as recorded on the slice
    pub fn error(&self) -> Option<String> {
        self.api_error().map(ApiError::to_string)
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match &self.result {
            Err(Failure::Rejected(error)) => Some(error),
            _ => None,
        }
    }

    pub fn into_payload(self) -> Option<T> {
        self.result.ok()
    }

    /// Convert into a plain `Result`; an aborted request becomes `ApiError::Cancelled`
    pub fn into_result(self) -> Result<T, SixCitiesError> {
        self.result.map_err(|failure| match failure {
            Failure::Rejected(error) => SixCitiesError::Api(error),
            Failure::Aborted => SixCitiesError::Api(ApiError::Cancelled),
        })
    }
}

/// Published on the store's event bus after an action has been applied
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEvent {
    /// Set for lifecycle actions emitted by a dispatcher
    pub request_id: Option<Uuid>,
    pub action: Action,
}
