//! Pure reducer functions for state transitions
//!
//! Each slice reducer is a total function `(SliceState, &Action) -> SliceState`.
//! Actions a slice does not handle return the state unchanged. Reducers do no
//! I/O: requests, token persistence and logging happen in the dispatchers.

pub mod auth;
pub mod favorites;
pub mod offer;
pub mod offers;

use std::sync::Arc;

use super::actions::Action;
use super::state::RootState;
use crate::types::Offer;

/// Root reducer: applies every slice reducer to its own key
pub fn reduce(state: RootState, action: &Action) -> RootState {
    RootState {
        offers: offers::reduce(state.offers, action),
        offer: offer::reduce(state.offer, action),
        favorites: favorites::reduce(state.favorites, action),
        auth: auth::reduce(state.auth, action),
    }
}

/// What to do with an updated offer in a collection that holds offers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorPolicy {
    /// Replace the entry with the same id; leave the collection alone if absent
    Replace,
    /// Favorites collection: keep the entry only while it is a favorite,
    /// appending it when it is not there yet
    Membership,
}

/// Mirror an updated offer into a collection, matched by id
pub fn replace_or_remove(collection: &[Offer], updated: &Offer, policy: MirrorPolicy) -> Vec<Offer> {
    if policy == MirrorPolicy::Membership && !updated.is_favorite {
        return collection
            .iter()
            .filter(|offer| offer.id != updated.id)
            .cloned()
            .collect();
    }

    let mut found = false;
    let mut result: Vec<Offer> = collection
        .iter()
        .map(|offer| {
            if offer.id == updated.id {
                found = true;
                updated.clone()
            } else {
                offer.clone()
            }
        })
        .collect();

    if !found && policy == MirrorPolicy::Membership {
        result.push(updated.clone());
    }

    result
}

/// [`replace_or_remove`] over a shared collection
///
/// Returns the same `Arc` when the update does not touch the collection.
pub fn mirror(collection: &Arc<Vec<Offer>>, updated: &Offer, policy: MirrorPolicy) -> Arc<Vec<Offer>> {
    let present = collection.iter().any(|offer| offer.id == updated.id);
    let appends = policy == MirrorPolicy::Membership && updated.is_favorite;
    if !present && !appends {
        return Arc::clone(collection);
    }
    Arc::new(replace_or_remove(collection, updated, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::actions::Phase;
    use crate::types::fixtures;

    fn ids(offers: &[Offer]) -> Vec<&str> {
        offers.iter().map(|o| o.id.as_str()).collect()
    }

    #[test]
    fn test_replace_keeps_position() {
        let collection = vec![fixtures::offer("1"), fixtures::offer("2"), fixtures::offer("3")];
        let updated = fixtures::favorite("2", true);

        let result = replace_or_remove(&collection, &updated, MirrorPolicy::Replace);
        assert_eq!(ids(&result), ["1", "2", "3"]);
        assert!(result[1].is_favorite);
    }

    #[test]
    fn test_replace_ignores_missing_id() {
        let collection = vec![fixtures::offer("1")];
        let result = replace_or_remove(&collection, &fixtures::favorite("9", true), MirrorPolicy::Replace);
        assert_eq!(result, collection);
    }

    #[test]
    fn test_membership_appends_new_favorite() {
        let collection = vec![fixtures::favorite("1", true)];
        let result = replace_or_remove(&collection, &fixtures::favorite("2", true), MirrorPolicy::Membership);
        assert_eq!(ids(&result), ["1", "2"]);
    }

    #[test]
    fn test_membership_removes_unfavorited() {
        let collection = vec![fixtures::favorite("1", true), fixtures::favorite("2", true)];
        let result = replace_or_remove(&collection, &fixtures::favorite("1", false), MirrorPolicy::Membership);
        assert_eq!(ids(&result), ["2"]);

        // Removing an absent entry is a no-op
        let result = replace_or_remove(&result, &fixtures::favorite("7", false), MirrorPolicy::Membership);
        assert_eq!(ids(&result), ["2"]);
    }

    #[test]
    fn test_mirror_keeps_untouched_collection_shared() {
        let collection = Arc::new(vec![fixtures::offer("1")]);

        let same = mirror(&collection, &fixtures::favorite("9", true), MirrorPolicy::Replace);
        assert!(Arc::ptr_eq(&same, &collection));

        let same = mirror(&collection, &fixtures::favorite("9", false), MirrorPolicy::Membership);
        assert!(Arc::ptr_eq(&same, &collection));

        let changed = mirror(&collection, &fixtures::favorite("1", true), MirrorPolicy::Replace);
        assert!(!Arc::ptr_eq(&changed, &collection));
        assert!(changed[0].is_favorite);
    }

    #[test]
    fn test_unrelated_action_keeps_collections_shared() {
        let mut state = RootState::new();
        state.offers.offers = vec![fixtures::offer("1")].into();
        let offers = Arc::clone(&state.offers.offers);

        let state = reduce(state, &Action::SetCity("Paris".to_string()));
        let state = reduce(
            state,
            &Action::FetchFavorites(Phase::Fulfilled(vec![fixtures::favorite("2", true)])),
        );
        assert!(Arc::ptr_eq(&state.offers.offers, &offers));
    }

    #[test]
    fn test_reducer_is_pure() {
        let state = RootState::new();
        let before = state.clone();

        let next = reduce(state.clone(), &Action::SetCity("Paris".to_string()));

        assert_eq!(state, before);
        assert_eq!(next.offers.city, "Paris");
    }

    #[test]
    fn test_toggle_favorite_mirrors_every_collection() {
        let mut state = RootState::new();
        state.offers.offers = vec![fixtures::offer("1"), fixtures::offer("2")].into();
        state.offer.current_offer = Some(fixtures::offer("2"));
        state.offer.nearby_offers = vec![fixtures::offer("3"), fixtures::offer("2")].into();
        state.favorites.favorites = vec![fixtures::favorite("5", true)].into();

        let state = reduce(
            state,
            &Action::ToggleFavorite(Phase::Fulfilled(fixtures::favorite("2", true))),
        );

        assert!(state.offers.offers[1].is_favorite);
        assert!(state.offer.current_offer.as_ref().unwrap().is_favorite);
        assert!(state.offer.nearby_offers[1].is_favorite);
        assert_eq!(ids(&state.favorites.favorites), ["5", "2"]);

        let state = reduce(
            state,
            &Action::ToggleFavorite(Phase::Fulfilled(fixtures::favorite("2", false))),
        );

        assert!(!state.offers.offers[1].is_favorite);
        assert!(!state.offer.current_offer.as_ref().unwrap().is_favorite);
        assert!(!state.offer.nearby_offers[1].is_favorite);
        assert_eq!(ids(&state.favorites.favorites), ["5"]);
    }

    #[test]
    fn test_unhandled_lifecycle_phases_leave_state_alone() {
        let mut state = RootState::new();
        state.offers.offers = vec![fixtures::offer("1")].into();
        let before = state.clone();

        let state = reduce(state, &Action::ToggleFavorite(Phase::Pending));
        let state = reduce(
            state,
            &Action::ToggleFavorite(Phase::Rejected("Server error: 500".to_string())),
        );
        let state = reduce(state, &Action::SubmitReview(Phase::Pending));

        assert_eq!(state, before);
    }
}
