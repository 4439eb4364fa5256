// ── Domain model ──
//
// Clean-room types the UI layers consume. Wire rows from allertrack-api
// are normalized into these via convert.rs; the "days known iff date
// known" rule is carried by the ExposureAge enum rather than re-checked
// at every use site.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

// ── Allergen exposure ────────────────────────────────────────────────

/// How long since an allergen was last encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExposureAge {
    /// At least one exposure on record.
    Known {
        /// Whole days since the last exposure.
        days: u32,
        /// Calendar date of the last exposure.
        last_exposure: NaiveDate,
    },
    /// No exposure has ever been recorded.
    Unknown,
}

impl ExposureAge {
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known { .. })
    }

    pub fn days(&self) -> Option<u32> {
        match self {
            Self::Known { days, .. } => Some(*days),
            Self::Unknown => None,
        }
    }

    pub fn last_exposure(&self) -> Option<NaiveDate> {
        match self {
            Self::Known { last_exposure, .. } => Some(*last_exposure),
            Self::Unknown => None,
        }
    }
}

/// One tracked allergen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllergenExposure {
    /// Allergen name; unique key within a snapshot.
    pub name: String,
    /// Time since the last recorded exposure.
    pub age: ExposureAge,
    /// Foods historically mapped to this allergen. Display-only,
    /// order-irrelevant.
    pub foods: Vec<String>,
}

/// Full-replacement state of all tracked allergens at one computed
/// timestamp.
///
/// Snapshots are replaced wholesale, never merged field-by-field, so a
/// consumer can never observe a stale food list paired with a fresh
/// exposure count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExposureSnapshot {
    pub allergens: Vec<AllergenExposure>,
    /// When the server computed this state.
    pub computed_at: DateTime<Utc>,
}

impl ExposureSnapshot {
    /// Look up one allergen by name.
    pub fn get(&self, name: &str) -> Option<&AllergenExposure> {
        self.allergens.iter().find(|a| a.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.allergens.is_empty()
    }
}

// ── Feed history ─────────────────────────────────────────────────────

/// Immutable historical feed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    pub timestamp: DateTime<Utc>,
    pub foods: Vec<String>,
}

// ── Meal logging drafts ──────────────────────────────────────────────

/// A food with the allergens the backend maps it to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodItem {
    pub name: String,
    pub allergens: Vec<String>,
}

/// One component of a draft meal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealComponent {
    pub foods: Vec<FoodItem>,
}

/// Client-local draft produced by photo analysis.
///
/// Lives only through the capture -> review -> submit workflow and is
/// consumed on submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealDraft {
    pub components: Vec<MealComponent>,
    pub notes: String,
}

impl MealDraft {
    /// Flatten the draft into the submission shape: one food-name list
    /// per component.
    pub fn submission(&self) -> Vec<Vec<String>> {
        self.components
            .iter()
            .map(|c| c.foods.iter().map(|f| f.name.clone()).collect())
            .collect()
    }
}

/// Outcome of a successful meal submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealReceipt {
    /// Persisted entry IDs, one per submitted component.
    pub entry_ids: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_submission_flattens_to_food_names() {
        let draft = MealDraft {
            components: vec![
                MealComponent {
                    foods: vec![
                        FoodItem {
                            name: "egg".into(),
                            allergens: vec!["egg".into()],
                        },
                        FoodItem {
                            name: "toast".into(),
                            allergens: vec!["wheat".into()],
                        },
                    ],
                },
                MealComponent {
                    foods: vec![FoodItem {
                        name: "yogurt".into(),
                        allergens: vec!["dairy".into()],
                    }],
                },
            ],
            notes: String::new(),
        };

        assert_eq!(
            draft.submission(),
            vec![
                vec!["egg".to_owned(), "toast".to_owned()],
                vec!["yogurt".to_owned()]
            ]
        );
    }

    #[test]
    fn exposure_age_accessors() {
        let known = ExposureAge::Known {
            days: 4,
            last_exposure: NaiveDate::from_ymd_opt(2026, 8, 20).expect("date"),
        };
        assert!(known.is_known());
        assert_eq!(known.days(), Some(4));

        assert_eq!(ExposureAge::Unknown.days(), None);
        assert_eq!(ExposureAge::Unknown.last_exposure(), None);
    }
}
