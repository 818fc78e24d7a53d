//! Six Cities - state core for the rental listings client
//!
//! This library holds everything below the view layer: the wire types,
//! the API client seam, token storage, per-domain slice reducers, the
//! async dispatchers that drive them, memoized selectors, and the root
//! store that ties them together.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use api::{ApiClient, HttpApiClient};
pub use config::Config;
pub use error::{ApiError, Result, SixCitiesError};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use store::{Action, Phase, RootState, Settled, Store};
pub use types::{AuthInfo, CommentData, LoginData, Offer, Review, SortOption};
