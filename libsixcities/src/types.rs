//! Core data types for Six Cities
//!
//! These mirror the JSON documents exchanged with the remote API. Field names
//! are camelCase on the wire.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Result, SixCitiesError};

/// Cities the service lists offers for, in display order
pub const CITIES: [&str; 6] = [
    "Paris",
    "Cologne",
    "Brussels",
    "Amsterdam",
    "Hamburg",
    "Dusseldorf",
];

/// Minimum trimmed length of a review comment
pub const MIN_COMMENT_LENGTH: usize = 50;

/// Maximum trimmed length of a review comment
pub const MAX_COMMENT_LENGTH: usize = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Host {
    pub name: String,
    pub avatar_url: String,
    #[serde(default)]
    pub is_pro: bool,
}

/// A bookable listing
///
/// The list endpoints return the short form; `GET /offers/{id}` adds the
/// detail fields, which default to empty when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: u32,
    pub rating: f64,
    #[serde(default)]
    pub preview_image: String,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub is_favorite: bool,
    pub city: City,
    pub location: Location,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_adults: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub goods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Host>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUser {
    pub name: String,
    pub avatar_url: String,
    #[serde(default)]
    pub is_pro: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub user: ReviewUser,
    pub rating: u8,
    pub comment: String,
    /// ISO-8601 timestamp
    pub date: String,
}

/// Session information returned by `GET /login` and `POST /login`
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    pub email: String,
    pub token: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub is_pro: bool,
}

impl std::fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInfo")
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .field("name", &self.name)
            .field("avatar_url", &self.avatar_url)
            .field("is_pro", &self.is_pro)
            .finish()
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

impl LoginData {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into().trim().to_string(),
        }
    }
}

impl std::fmt::Debug for LoginData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginData")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /comments/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentData {
    pub rating: u8,
    pub comment: String,
}

impl CommentData {
    /// Build a comment, trimming surrounding whitespace
    pub fn new(rating: u8, comment: impl AsRef<str>) -> Self {
        Self {
            rating,
            comment: comment.as_ref().trim().to_string(),
        }
    }

    /// Check the rating range and comment length accepted by the server
    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.rating) {
            return Err(SixCitiesError::InvalidInput(format!(
                "Rating must be between 1 and 5 (got {})",
                self.rating
            )));
        }

        let length = self.comment.trim().chars().count();
        if !(MIN_COMMENT_LENGTH..=MAX_COMMENT_LENGTH).contains(&length) {
            return Err(SixCitiesError::InvalidInput(format!(
                "Comment must be between {} and {} characters (got {})",
                MIN_COMMENT_LENGTH, MAX_COMMENT_LENGTH, length
            )));
        }

        Ok(())
    }
}

/// Ordering applied to the city offers list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOption {
    /// Server order
    #[default]
    Popular,
    PriceLowToHigh,
    PriceHighToLow,
    TopRated,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::Popular,
        SortOption::PriceLowToHigh,
        SortOption::PriceHighToLow,
        SortOption::TopRated,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortOption::Popular => "Popular",
            SortOption::PriceLowToHigh => "Price: low to high",
            SortOption::PriceHighToLow => "Price: high to low",
            SortOption::TopRated => "Top rated first",
        }
    }

    /// Sort offers in place. The sort is stable, so ties keep server order.
    pub fn apply(&self, offers: &mut [Offer]) {
        match self {
            SortOption::Popular => {}
            SortOption::PriceLowToHigh => offers.sort_by_key(|offer| offer.price),
            SortOption::PriceHighToLow => offers.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOption::TopRated => offers.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        }
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let option = SortOption::ALL
            .into_iter()
            .find(|option| option.label().to_lowercase() == normalized);
        if let Some(option) = option {
            return Ok(option);
        }

        match normalized.as_str() {
            "popular" => Ok(SortOption::Popular),
            "price-asc" | "price" => Ok(SortOption::PriceLowToHigh),
            "price-desc" => Ok(SortOption::PriceHighToLow),
            "top-rated" | "rating" => Ok(SortOption::TopRated),
            _ => Err(format!(
                "Invalid sort option: '{}'. Valid options: popular, price-asc, price-desc, top-rated",
                s
            )),
        }
    }
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
