//! Store integration tests against the mock API client

use std::sync::Arc;
use std::time::Duration;

use libsixcities::api::mock::MockApi;
use libsixcities::api::Endpoint;
use libsixcities::store::{selectors, Action, AuthorizationStatus, Phase};
use libsixcities::types::{City, Location, ReviewUser};
use libsixcities::{
    ApiError, AuthInfo, CommentData, FileTokenStorage, LoginData, MemoryTokenStorage, Offer,
    Review, SortOption, Store, TokenStorage,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn location() -> Location {
    Location {
        latitude: 50.938361,
        longitude: 6.959974,
        zoom: 13,
    }
}

fn offer(id: &str, city: &str, price: u32, rating: f64) -> Offer {
    Offer {
        id: id.to_string(),
        title: format!("Listing {}", id),
        kind: "room".to_string(),
        price,
        rating,
        preview_image: format!("img/{}.jpg", id),
        is_premium: false,
        is_favorite: false,
        city: City {
            name: city.to_string(),
            location: location(),
        },
        location: location(),
        images: Vec::new(),
        bedrooms: None,
        max_adults: None,
        goods: Vec::new(),
        description: None,
        host: None,
    }
}

fn account() -> AuthInfo {
    AuthInfo {
        email: "angelina@example.com".to_string(),
        token: "YW5nZWxpbmFAZXhhbXBsZS5jb20=".to_string(),
        name: "Angelina".to_string(),
        avatar_url: "img/avatar-angelina.jpg".to_string(),
        is_pro: true,
    }
}

fn review(id: &str, date: &str) -> Review {
    Review {
        id: id.to_string(),
        user: ReviewUser {
            name: "Isaac".to_string(),
            avatar_url: "img/avatar-isaac.jpg".to_string(),
            is_pro: false,
        },
        rating: 5,
        comment: "Bright rooms and a short walk to the cathedral and the river.".to_string(),
        date: date.to_string(),
    }
}

fn catalog() -> MockApi {
    MockApi::new()
        .with_offers(vec![
            offer("1", "Cologne", 180, 4.2),
            offer("2", "Cologne", 90, 4.8),
            offer("3", "Paris", 300, 3.9),
            offer("4", "Cologne", 120, 4.5),
        ])
        .with_nearby("1", &["2", "4"])
        .with_account(account())
}

fn credentials() -> LoginData {
    LoginData::new("angelina@example.com", "secret1")
}

#[tokio::test]
async fn test_browse_city_sorted() {
    let store = Store::new(Arc::new(catalog()), Arc::new(MemoryTokenStorage::new()));

    store.set_city("Cologne");
    assert!(store.fetch_offers().await.is_fulfilled());

    let state = store.state();
    let sorted = store
        .selectors()
        .sorted_city_offers(&state, SortOption::PriceLowToHigh);
    let ids: Vec<_> = sorted.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, ["2", "4", "1"]);

    let top = store.selectors().sorted_city_offers(&state, SortOption::TopRated);
    assert_eq!(top[0].id, "2");
}

#[tokio::test]
async fn test_offer_page_concurrent_fetches() {
    let api = catalog();
    // Make the main offer the slowest sibling
    api.delay(Endpoint::Offer, Duration::from_millis(50));
    let store = Store::new(Arc::new(api), Arc::new(MemoryTokenStorage::new()));

    let (offer, nearby, reviews) = tokio::join!(
        store.fetch_offer("1"),
        store.fetch_nearby_offers("1"),
        store.fetch_reviews("1"),
    );
    assert!(offer.is_fulfilled());
    assert!(nearby.is_fulfilled());
    assert!(reviews.is_fulfilled());

    let state = store.state();
    assert_eq!(state.offer.current_offer.as_ref().map(|o| o.id.as_str()), Some("1"));
    assert_eq!(state.offer.nearby_offers.len(), 2);
    assert!(state.offer.reviews.is_empty());
    assert!(!state.offer.is_loading_offer);
}

#[tokio::test]
async fn test_session_round_trip_with_file_storage() {
    let temp_dir = TempDir::new().unwrap();
    let storage = Arc::new(FileTokenStorage::new(
        temp_dir.path().join("six-cities").join("six-cities-token"),
    ));
    let store = Store::new(Arc::new(catalog()), storage.clone());

    assert_eq!(
        store.select(selectors::authorization_status),
        AuthorizationStatus::Unknown
    );

    let check = store.check_auth().await;
    assert!(check.api_error().map(ApiError::is_unauthorized).unwrap_or(false));
    assert_eq!(
        store.select(selectors::authorization_status),
        AuthorizationStatus::Unauthenticated
    );

    let login = store.login(&credentials()).await;
    assert_eq!(login.payload().map(|u| u.name.as_str()), Some("Angelina"));
    assert!(storage.load().unwrap().is_some());
    assert!(storage.path().exists());

    store.logout();
    assert!(!storage.path().exists());
    assert!(store.select(|s| selectors::user(s).is_none()));
}

#[tokio::test]
async fn test_expired_session_evicts_token_and_keeps_data() {
    let api = Arc::new(catalog());
    let storage = Arc::new(MemoryTokenStorage::new());
    let store = Store::new(api.clone(), storage.clone());

    store.login(&credentials()).await;
    store.fetch_favorites().await;
    store.toggle_favorite("3", true).await;
    assert_eq!(store.selectors().favorite_count(&store.state()), 1);

    api.expire_session();
    let settled = store.fetch_favorites().await;
    assert_eq!(settled.error().as_deref(), Some("Server error: 401"));
    assert!(storage.load().unwrap().is_none());

    // Prior data is left alone on rejection
    let favorites = store.state().favorites;
    assert_eq!(favorites.favorites.len(), 1);
    assert_eq!(favorites.error.as_deref(), Some("Server error: 401"));
}

#[tokio::test]
async fn test_favorite_flag_consistent_across_collections() {
    let store = Store::new(Arc::new(catalog()), Arc::new(MemoryTokenStorage::new()));
    store.login(&credentials()).await;
    store.fetch_offers().await;
    store.fetch_offer("2").await;
    store.fetch_nearby_offers("1").await;
    store.fetch_favorites().await;

    for is_favorite in [true, false, true] {
        let settled = store.toggle_favorite("2", is_favorite).await;
        assert!(settled.is_fulfilled());

        let state = store.state();
        let everywhere = state
            .offers
            .offers
            .iter()
            .chain(state.offer.nearby_offers.iter())
            .chain(state.offer.current_offer.iter())
            .filter(|o| o.id == "2");
        for copy in everywhere {
            assert_eq!(copy.is_favorite, is_favorite);
        }
        assert_eq!(
            state.favorites.favorites.iter().any(|o| o.id == "2"),
            is_favorite
        );
    }
}

#[tokio::test]
async fn test_offer_page_shows_ten_newest_reviews() {
    // Twelve reviews in scrambled order, one with a date that does not parse
    let mut reviews: Vec<Review> = (1..=11)
        .rev()
        .map(|day| review(&format!("r{}", day), &format!("2024-05-{:02}T08:30:00.000Z", day)))
        .collect();
    reviews.swap(0, 6);
    reviews.insert(3, review("undated", "last spring"));

    let api = Arc::new(catalog().with_reviews("1", reviews));
    let store = Store::new(api, Arc::new(MemoryTokenStorage::new()));

    assert!(store.fetch_reviews("1").await.is_fulfilled());
    let state = store.state();
    assert_eq!(state.offer.reviews.len(), 12);

    let shown = store.selectors().sorted_reviews(&state);
    let ids: Vec<_> = shown.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["r11", "r10", "r9", "r8", "r7", "r6", "r5", "r4", "r3", "r2"]);

    // Same snapshot, no second sort
    store.selectors().sorted_reviews(&store.state());
    assert_eq!(store.selectors().sorted_reviews.recomputations(), 1);
}

#[tokio::test]
async fn test_review_submission_then_refetch() {
    let api = Arc::new(catalog().with_session(account()));
    let store = Store::new(api.clone(), Arc::new(MemoryTokenStorage::new()));

    let comment = CommentData::new(
        4,
        "Quiet street, friendly host and the tram stop is right around the corner.",
    );
    comment.validate().unwrap();

    let posted = store.submit_review("1", &comment).await;
    assert!(posted.is_fulfilled());
    assert_eq!(store.state().offer.reviews.len(), 1);

    // The refetch replaces the list wholesale, no duplicates
    store.fetch_reviews("1").await;
    let state = store.state();
    assert_eq!(state.offer.reviews.len(), 1);
    assert_eq!(store.selectors().sorted_reviews(&state)[0].rating, 4);
    assert_eq!(api.call_count(Endpoint::PostComment), 1);
}

#[tokio::test]
async fn test_cancellation_scoped_to_handle() {
    let api = catalog();
    api.delay(Endpoint::Offers, Duration::from_millis(100));
    let store = Store::new(Arc::new(api), Arc::new(MemoryTokenStorage::new()));

    let token = CancellationToken::new();
    let page = store.with_cancellation(token.clone());
    let mut events = store.subscribe();

    let (aborted, completed, _) = tokio::join!(page.fetch_offers(), store.fetch_offers(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
    });

    assert!(aborted.is_aborted());
    assert!(completed.is_fulfilled());
    assert_eq!(store.state().offers.offers.len(), 4);

    let mut aborted_events = 0;
    while let Ok(event) = events.try_recv() {
        if event.action == Action::FetchOffers(Phase::Aborted) {
            assert_eq!(event.request_id, Some(aborted.request_id));
            aborted_events += 1;
        }
    }
    assert_eq!(aborted_events, 1);
}
