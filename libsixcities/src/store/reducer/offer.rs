//! Single offer page slice

use std::sync::Arc;

use super::{mirror, MirrorPolicy};
use crate::store::actions::{Action, Phase};
use crate::store::state::OfferState;

pub fn reduce(state: OfferState, action: &Action) -> OfferState {
    match action {
        Action::FetchOffer(phase) => match phase {
            Phase::Pending => OfferState {
                is_loading_offer: true,
                error: None,
                ..state
            },
            Phase::Fulfilled(offer) => OfferState {
                current_offer: Some(offer.clone()),
                is_loading_offer: false,
                error: None,
                ..state
            },
            // A failed fetch means "not found": drop whatever was shown before
            Phase::Rejected(message) => OfferState {
                current_offer: None,
                is_loading_offer: false,
                error: Some(message.clone()),
                ..state
            },
            Phase::Aborted => OfferState {
                is_loading_offer: false,
                ..state
            },
        },

        Action::FetchNearbyOffers(Phase::Fulfilled(offers)) => OfferState {
            nearby_offers: Arc::new(offers.clone()),
            ..state
        },
        Action::FetchNearbyOffers(Phase::Rejected(_)) => OfferState {
            nearby_offers: Arc::default(),
            ..state
        },

        Action::FetchReviews(Phase::Fulfilled(reviews)) => OfferState {
            reviews: Arc::new(reviews.clone()),
            ..state
        },
        Action::FetchReviews(Phase::Rejected(_)) => OfferState {
            reviews: Arc::default(),
            ..state
        },

        Action::SubmitReview(Phase::Fulfilled(review)) => {
            if state.reviews.iter().any(|r| r.id == review.id) {
                return state;
            }
            let mut reviews = state.reviews.to_vec();
            reviews.push(review.clone());
            OfferState {
                reviews: Arc::new(reviews),
                ..state
            }
        }

        Action::ToggleFavorite(Phase::Fulfilled(updated)) => {
            let current_offer = match state.current_offer {
                Some(ref offer) if offer.id == updated.id => Some(updated.clone()),
                other => other,
            };
            OfferState {
                nearby_offers: mirror(&state.nearby_offers, updated, MirrorPolicy::Replace),
                current_offer,
                ..state
            }
        }

        _ => state,
    }
}
