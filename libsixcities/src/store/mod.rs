//! Root store
//!
//! The store owns the state tree and applies actions to it one at a time.
//! Async dispatchers (see `dispatch.rs`) are methods on [`Store`]; they talk
//! to the injected [`ApiClient`] and feed lifecycle actions back through
//! [`Store::dispatch`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libsixcities::api::mock::MockApi;
//! use libsixcities::{MemoryTokenStorage, Store};
//!
//! # async fn example() {
//! let store = Store::new(Arc::new(MockApi::new()), Arc::new(MemoryTokenStorage::new()));
//!
//! let mut events = store.subscribe();
//! let settled = store.fetch_offers().await;
//! assert!(settled.is_fulfilled());
//!
//! while let Ok(event) = events.try_recv() {
//!     println!("{}", event.action);
//! }
//! # }
//! ```

pub mod actions;
mod dispatch;
pub mod reducer;
pub mod selectors;
pub mod state;

pub use actions::{Action, Failure, Phase, Settled, StoreEvent};
pub use selectors::Selectors;
pub use state::{AuthState, AuthorizationStatus, FavoritesState, OfferState, OffersState, RootState};

use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::storage::TokenStorage;

/// Buffered events per subscriber before a lagging one starts losing them
const EVENT_CAPACITY: usize = 100;

struct StoreInner {
    state: Mutex<RootState>,
    api: Arc<dyn ApiClient>,
    storage: Arc<dyn TokenStorage>,
    events: broadcast::Sender<StoreEvent>,
    selectors: Selectors,
}

/// Handle to the shared store
///
/// Cloning is cheap and every clone sees the same state. A handle made with
/// [`Store::with_cancellation`] additionally aborts its in-flight requests
/// when its token fires.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
    cancel: Option<CancellationToken>,
}

impl Store {
    pub fn new(api: Arc<dyn ApiClient>, storage: Arc<dyn TokenStorage>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(RootState::default()),
                api,
                storage,
                events,
                selectors: Selectors::new(),
            }),
            cancel: None,
        }
    }

    /// Apply an action to the state tree
    pub fn dispatch(&self, action: Action) {
        self.apply(None, action);
    }

    pub(crate) fn apply(&self, request_id: Option<Uuid>, action: Action) {
        let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
        let current = std::mem::take(&mut *state);
        *state = reducer::reduce(current, &action);

        tracing::trace!("Applied {}", action);

        // Sent under the lock so subscribers see events in application order.
        // No subscribers is not an error.
        let _ = self.inner.events.send(StoreEvent { request_id, action });
    }

    /// Snapshot of the whole state tree
    pub fn state(&self) -> RootState {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Run a projection against a snapshot of the state
    ///
    /// The lock is released before `selector` runs, so the projection may
    /// dispatch. It sees the state as it was when the snapshot was taken.
    pub fn select<R>(&self, selector: impl FnOnce(&RootState) -> R) -> R {
        selector(&self.state())
    }

    /// Memoized derived views shared by every handle
    pub fn selectors(&self) -> &Selectors {
        &self.inner.selectors
    }

    /// Receive every applied action from now on
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    /// A handle over the same state whose requests abort when `token` is cancelled
    pub fn with_cancellation(&self, token: CancellationToken) -> Store {
        Store {
            inner: Arc::clone(&self.inner),
            cancel: Some(token),
        }
    }

    pub fn api(&self) -> &Arc<dyn ApiClient> {
        &self.inner.api
    }

    pub fn storage(&self) -> &Arc<dyn TokenStorage> {
        &self.inner.storage
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("storage", &self.inner.storage.backend_name())
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}
