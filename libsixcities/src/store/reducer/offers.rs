//! Offers list slice

use std::sync::Arc;

use super::{mirror, MirrorPolicy};
use crate::store::actions::{Action, Phase};
use crate::store::state::OffersState;

pub fn reduce(state: OffersState, action: &Action) -> OffersState {
    match action {
        Action::SetCity(city) => OffersState {
            city: city.clone(),
            ..state
        },

        Action::FetchOffers(phase) => match phase {
            Phase::Pending => OffersState {
                is_loading: true,
                error: None,
                ..state
            },
            // Replaced wholesale: the last payload wins
            Phase::Fulfilled(offers) => OffersState {
                offers: Arc::new(offers.clone()),
                is_loading: false,
                error: None,
                ..state
            },
            Phase::Rejected(message) => OffersState {
                is_loading: false,
                error: Some(message.clone()),
                ..state
            },
            Phase::Aborted => OffersState {
                is_loading: false,
                ..state
            },
        },

        Action::ToggleFavorite(Phase::Fulfilled(updated)) => OffersState {
            offers: mirror(&state.offers, updated, MirrorPolicy::Replace),
            ..state
        },

        _ => state,
    }
}
