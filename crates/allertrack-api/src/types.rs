// Wire types for the allergen tracker backend.
//
// These mirror the server's JSON shapes exactly. Domain invariants (for
// example "days and date are both present or both absent") are NOT
// enforced here -- `allertrack-core` normalizes rows during conversion.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ── Allergen state ───────────────────────────────────────────────────

/// One allergen row as the server reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllergenRow {
    /// Allergen name, unique within a snapshot.
    pub name: String,

    /// Whole days since the last recorded exposure, or `None` if no
    /// exposure has ever been recorded.
    pub days_since_exposure: Option<u32>,

    /// Calendar date of the last exposure; present iff
    /// `days_since_exposure` is present (server-side invariant).
    #[serde(default)]
    pub last_exposure_date: Option<NaiveDate>,

    /// Foods historically mapped to this allergen. Display-only.
    #[serde(default)]
    pub foods: Vec<String>,
}

/// Full-replacement allergen state, from `GET /api/allergens` or from a
/// live `update` frame (the frame carries an extra `type` tag which is
/// checked before deserializing into this type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub allergens: Vec<AllergenRow>,
    /// When the server computed this state.
    pub last_updated: DateTime<Utc>,
}

/// Receipt from `POST /api/refresh`.
///
/// The response deliberately does not carry the new snapshot; a follow-up
/// `GET /api/allergens` is required to observe the recomputed state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecomputeReceipt {
    pub status: String,
    pub message: String,
    pub last_updated: DateTime<Utc>,
}

// ── Feed log ─────────────────────────────────────────────────────────

/// One historical feed entry. Read-only, never mutated client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntryRow {
    pub timestamp: DateTime<Utc>,
    pub foods: Vec<String>,
}

/// Response from `GET /api/feeds`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedLogResponse {
    pub entries: Vec<FeedEntryRow>,
    #[serde(default)]
    pub total_count: u64,
}

// ── Health ───────────────────────────────────────────────────────────

/// Response from `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

// ── Meal logging (external collaborators, boundary only) ─────────────

/// A food with the allergens the backend maps it to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItemRow {
    pub name: String,
    #[serde(default)]
    pub allergens: Vec<String>,
}

/// One component of an analyzed meal photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealComponentRow {
    pub foods: Vec<FoodItemRow>,
}

/// Response from `POST /api/meals/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub components: Vec<MealComponentRow>,
    #[serde(default)]
    pub notes: String,
}

/// Request body for `POST /api/meals/submit`: one food-name list per
/// meal component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub components: Vec<Vec<String>>,
}

/// One persisted entry from a meal submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealEntryRow {
    pub entry_id: String,
    pub foods: Vec<String>,
}

/// Response from `POST /api/meals/submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub status: String,
    pub entries: Vec<MealEntryRow>,
    pub timestamp: DateTime<Utc>,
}

/// Response from `GET /api/meals/suggestions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<FoodItemRow>,
}
