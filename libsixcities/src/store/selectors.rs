//! Read projections over the state tree
//!
//! Plain selectors borrow straight from [`RootState`]. Derived views that
//! filter, sort or group live in [`Selectors`] and are memoized: each one
//! keeps its last input and output and recomputes only when a different
//! collection (or city or sort option) comes in.

use chrono::{DateTime, FixedOffset};
use std::cmp::Reverse;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::state::{AuthorizationStatus, RootState};
use crate::types::{AuthInfo, Offer, Review, SortOption};

/// Reviews shown on the offer page
pub const MAX_REVIEWS: usize = 10;

/// Nearby offers shown on the offer page
pub const MAX_NEARBY_OFFERS: usize = 3;

// === Plain selectors ===

pub fn offers(state: &RootState) -> &[Offer] {
    &state.offers.offers
}

pub fn city(state: &RootState) -> &str {
    &state.offers.city
}

pub fn is_offers_loading(state: &RootState) -> bool {
    state.offers.is_loading
}

pub fn offers_error(state: &RootState) -> Option<&str> {
    state.offers.error.as_deref()
}

pub fn current_offer(state: &RootState) -> Option<&Offer> {
    state.offer.current_offer.as_ref()
}

pub fn nearby_offers(state: &RootState) -> &[Offer] {
    &state.offer.nearby_offers
}

pub fn reviews(state: &RootState) -> &[Review] {
    &state.offer.reviews
}

pub fn is_offer_loading(state: &RootState) -> bool {
    state.offer.is_loading_offer
}

pub fn offer_error(state: &RootState) -> Option<&str> {
    state.offer.error.as_deref()
}

pub fn favorites(state: &RootState) -> &[Offer] {
    &state.favorites.favorites
}

pub fn is_favorites_loading(state: &RootState) -> bool {
    state.favorites.is_loading
}

pub fn favorites_error(state: &RootState) -> Option<&str> {
    state.favorites.error.as_deref()
}

pub fn authorization_status(state: &RootState) -> AuthorizationStatus {
    state.auth.authorization_status
}

pub fn user(state: &RootState) -> Option<&AuthInfo> {
    state.auth.user.as_ref()
}

pub fn is_authenticated(state: &RootState) -> bool {
    state.auth.authorization_status == AuthorizationStatus::Authenticated
}

// === Memoization ===

/// Input comparison for [`Memoized`]
///
/// Shared collections compare by pointer. Reducers install a new `Arc`
/// whenever contents change, so a hit never walks the collection.
pub trait SameInput {
    fn same_input(&self, other: &Self) -> bool;
}

impl<T> SameInput for Arc<T> {
    fn same_input(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl SameInput for String {
    fn same_input(&self, other: &Self) -> bool {
        self == other
    }
}

impl SameInput for SortOption {
    fn same_input(&self, other: &Self) -> bool {
        self == other
    }
}

impl<A: SameInput, B: SameInput> SameInput for (A, B) {
    fn same_input(&self, other: &Self) -> bool {
        self.0.same_input(&other.0) && self.1.same_input(&other.1)
    }
}

impl<A: SameInput, B: SameInput, C: SameInput> SameInput for (A, B, C) {
    fn same_input(&self, other: &Self) -> bool {
        self.0.same_input(&other.0) && self.1.same_input(&other.1) && self.2.same_input(&other.2)
    }
}

/// Single-entry cache around a pure derivation
pub struct Memoized<I, O> {
    compute: fn(&I) -> O,
    cache: Mutex<Option<(I, Arc<O>)>>,
    recomputations: AtomicUsize,
}

impl<I, O> Memoized<I, O>
where
    I: Clone + SameInput,
{
    pub fn new(compute: fn(&I) -> O) -> Self {
        Self {
            compute,
            cache: Mutex::new(None),
            recomputations: AtomicUsize::new(0),
        }
    }

    /// Return the cached output if `input` is the last input, otherwise recompute
    pub fn select(&self, input: &I) -> Arc<O> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());

        if let Some((last_input, output)) = cache.as_ref() {
            if last_input.same_input(input) {
                return Arc::clone(output);
            }
        }

        let output = Arc::new((self.compute)(input));
        self.recomputations.fetch_add(1, Ordering::Relaxed);
        *cache = Some((input.clone(), Arc::clone(&output)));
        output
    }

    /// How many times the derivation has run
    pub fn recomputations(&self) -> usize {
        self.recomputations.load(Ordering::Relaxed)
    }
}

type CityInput = (Arc<Vec<Offer>>, String);
type SortedCityInput = (Arc<Vec<Offer>>, String, SortOption);

/// Offers grouped by city name, in first-seen order
pub type OffersByCity = Vec<(String, Vec<Offer>)>;

/// Memoized derived views
pub struct Selectors {
    pub city_offers: Memoized<CityInput, Vec<Offer>>,
    pub sorted_city_offers: Memoized<SortedCityInput, Vec<Offer>>,
    pub favorite_count: Memoized<Arc<Vec<Offer>>, usize>,
    pub favorites_by_city: Memoized<Arc<Vec<Offer>>, OffersByCity>,
    pub sorted_reviews: Memoized<Arc<Vec<Review>>, Vec<Review>>,
    pub nearby_for_display: Memoized<Arc<Vec<Offer>>, Vec<Offer>>,
}

impl Default for Selectors {
    fn default() -> Self {
        Self::new()
    }
}

impl Selectors {
    pub fn new() -> Self {
        Self {
            city_offers: Memoized::new(|(offers, city)| filter_by_city(offers, city)),
            sorted_city_offers: Memoized::new(|(offers, city, sort)| {
                let mut offers = filter_by_city(offers, city);
                sort.apply(&mut offers);
                offers
            }),
            favorite_count: Memoized::new(|favorites| favorites.len()),
            favorites_by_city: Memoized::new(|favorites| group_by_city(favorites)),
            sorted_reviews: Memoized::new(|reviews| newest_reviews(reviews, MAX_REVIEWS)),
            nearby_for_display: Memoized::new(|nearby| {
                nearby.iter().take(MAX_NEARBY_OFFERS).cloned().collect()
            }),
        }
    }

    /// Offers in the selected city; every offer when no city is selected
    pub fn city_offers(&self, state: &RootState) -> Arc<Vec<Offer>> {
        self.city_offers
            .select(&(Arc::clone(&state.offers.offers), state.offers.city.clone()))
    }

    /// City offers ordered by `sort`
    pub fn sorted_city_offers(&self, state: &RootState, sort: SortOption) -> Arc<Vec<Offer>> {
        self.sorted_city_offers.select(&(
            Arc::clone(&state.offers.offers),
            state.offers.city.clone(),
            sort,
        ))
    }

    pub fn favorite_count(&self, state: &RootState) -> usize {
        *self.favorite_count.select(&state.favorites.favorites)
    }

    pub fn favorites_by_city(&self, state: &RootState) -> Arc<OffersByCity> {
        self.favorites_by_city.select(&state.favorites.favorites)
    }

    /// The newest reviews first, at most [`MAX_REVIEWS`]
    pub fn sorted_reviews(&self, state: &RootState) -> Arc<Vec<Review>> {
        self.sorted_reviews.select(&state.offer.reviews)
    }

    pub fn nearby_for_display(&self, state: &RootState) -> Arc<Vec<Offer>> {
        self.nearby_for_display.select(&state.offer.nearby_offers)
    }
}

fn filter_by_city(offers: &[Offer], city: &str) -> Vec<Offer> {
    if city.is_empty() {
        return offers.to_vec();
    }
    offers
        .iter()
        .filter(|offer| offer.city.name == city)
        .cloned()
        .collect()
}

fn group_by_city(offers: &[Offer]) -> OffersByCity {
    let mut groups: OffersByCity = Vec::new();
    for offer in offers {
        match groups.iter_mut().find(|(city, _)| *city == offer.city.name) {
            Some((_, group)) => group.push(offer.clone()),
            None => groups.push((offer.city.name.clone(), vec![offer.clone()])),
        }
    }
    groups
}

fn parse_date(date: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(date).ok()
}

/// Sort newest first; reviews with unparseable dates go last
fn newest_reviews(reviews: &[Review], limit: usize) -> Vec<Review> {
    let mut sorted = reviews.to_vec();
    sorted.sort_by_key(|review| Reverse(parse_date(&review.date)));
    sorted.truncate(limit);
    sorted
}
