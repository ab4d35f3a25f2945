//! Data models for the recipe book
//!
//! Stored documents (`User`, `Recipe`, `Feedback`) are serialized with the
//! field names the browser client reads: `_id` for the identifier and
//! camelCase for everything else. Request payloads are explicit structs so
//! that every endpoint's required and optional inputs are enumerated.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A registered user
///
/// Users are created on first login with a given (username, email) pair and
/// are never deleted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,

    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Relative reference to the uploaded picture, e.g. `/uploads/17...-ab12cd.png`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_pic: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// A submitted recipe
///
/// Immutable once created except for `views`, which grows by one on every
/// detail-page read.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    /// Display name of the author
    pub user: String,

    /// Weak reference to the authoring [`User`], not checked for existence
    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub category: String,

    /// Either `/uploads/<file>` or an external image URL
    #[serde(default)]
    pub image: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub ingredients: String,

    #[serde(default)]
    pub steps: String,

    #[serde(default)]
    pub views: u64,

    pub created_at: DateTime<Utc>,
}

/// A comment left on a recipe
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    #[serde(rename = "_id")]
    pub id: String,

    pub recipe_id: String,

    pub user: String,

    pub comment: String,

    pub created_at: DateTime<Utc>,
}

/// Request payload for `POST /api/login`
///
/// # Example
/// ```json
/// { "username": "sindhu", "email": "sindhu@example.com" }
/// ```
#[derive(Deserialize, Debug, Default)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Fields accepted when submitting a recipe
///
/// Arrives either as multipart text fields or as a JSON object with the same
/// names. Everything is optional at this level; `name` is checked by
/// [`NewRecipe::validate`].
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub name: Option<String>,
    pub user: Option<String>,
    pub user_id: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<String>,
    pub steps: Option<String>,
}

impl NewRecipe {
    /// Assigns a text form field by name, ignoring unknown fields
    pub fn set_field(&mut self, name: &str, value: String) {
        let slot = match name {
            "name" => &mut self.name,
            "user" => &mut self.user,
            "userId" => &mut self.user_id,
            "category" => &mut self.category,
            "imageUrl" => &mut self.image_url,
            "description" => &mut self.description,
            "ingredients" => &mut self.ingredients,
            "steps" => &mut self.steps,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Checks that the recipe has a non-empty name
    pub fn validate(&self) -> Result<(), crate::error::StoreError> {
        match non_empty(self.name.as_deref()) {
            Some(_) => Ok(()),
            None => Err(crate::error::StoreError::Validation("name required")),
        }
    }
}

/// Request payload for `POST /api/recipes/{id}/feedback`
#[derive(Deserialize, Debug, Default)]
pub struct FeedbackRequest {
    pub user: Option<String>,
    pub comment: Option<String>,
}

/// Query parameters for `GET /api/recipes/top`
///
/// `limit` is kept as raw text and interpreted by [`TopParams::limit`].
#[derive(Deserialize, Debug, Default)]
pub struct TopParams {
    pub limit: Option<String>,
}

/// Number of recipes returned by the top list when no usable limit is given
pub const DEFAULT_TOP_LIMIT: usize = 6;

impl TopParams {
    /// Reads the leading integer of `limit`, so `"3abc"` is 3 and `"2.5"` is 2.
    /// Missing, non-numeric or zero limits fall back to the default; negative
    /// limits use their magnitude.
    pub fn limit(&self) -> usize {
        self.limit
            .as_deref()
            .and_then(leading_integer)
            .map(|n| n.unsigned_abs() as usize)
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_TOP_LIMIT)
    }
}

/// Parses an optionally signed run of digits at the start of `raw`,
/// ignoring leading whitespace and anything after the digits
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return None;
    }

    // Saturate instead of failing on absurdly long inputs
    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

/// Response body for `GET /api/user/{id}`
#[derive(Serialize, Deserialize, Debug)]
pub struct UserProfile {
    pub user: User,
    pub recipes: Vec<Recipe>,
}

/// Response body for `GET /api/recipes/{id}`
#[derive(Serialize, Deserialize, Debug)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub feedbacks: Vec<Feedback>,
}

/// Response body for `POST /api/user/{id}/upload`
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePicResponse {
    pub message: String,
    pub profile_pic: String,
}

/// Returns the input when it holds at least one character
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Generates a new 24-character hex document id
///
/// Layout: 8 hex digits of Unix seconds, 10 digits of per-process
/// randomness, 6 digits of a wrapping per-process counter.
pub fn new_object_id() -> String {
    static PROCESS_TAG: OnceLock<u64> = OnceLock::new();
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

    let tag = *PROCESS_TAG.get_or_init(|| rand::rng().random::<u64>() & 0xff_ffff_ffff);
    let counter = COUNTER
        .get_or_init(|| AtomicU32::new(rand::rng().random::<u32>() & 0xff_ffff))
        .fetch_add(1, Ordering::Relaxed)
        & 0xff_ffff;
    let secs = Utc::now().timestamp() as u32;

    format!("{secs:08x}{tag:010x}{counter:06x}")
}

/// Whether `value` has the shape of an id produced by [`new_object_id`]
pub fn is_object_id(value: &str) -> bool {
    value.len() == 24 && value.bytes().all(|b| b.is_ascii_hexdigit())
}
