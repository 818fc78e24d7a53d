//! Favorites slice

use std::sync::Arc;

use super::{mirror, MirrorPolicy};
use crate::store::actions::{Action, Phase};
use crate::store::state::FavoritesState;

pub fn reduce(state: FavoritesState, action: &Action) -> FavoritesState {
    match action {
        Action::FetchFavorites(phase) => match phase {
            Phase::Pending => FavoritesState {
                is_loading: true,
                error: None,
                ..state
            },
            Phase::Fulfilled(favorites) => FavoritesState {
                favorites: Arc::new(favorites.clone()),
                is_loading: false,
                error: None,
            },
            Phase::Rejected(message) => FavoritesState {
                is_loading: false,
                error: Some(message.clone()),
                ..state
            },
            Phase::Aborted => FavoritesState {
                is_loading: false,
                ..state
            },
        },

        Action::ToggleFavorite(Phase::Fulfilled(updated)) => FavoritesState {
            favorites: mirror(&state.favorites, updated, MirrorPolicy::Membership),
            ..state
        },

        _ => state,
    }
}
