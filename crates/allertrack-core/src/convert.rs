// ── Wire-to-domain conversion ──
//
// Normalizes allertrack-api rows into domain types. This is the single
// place where the exposure invariant ("days known iff date known") is
// enforced: rows that violate it are normalized to Unknown with a
// warning, so downstream code never sees a half-known age.

use std::collections::HashSet;

use allertrack_api::types::{
    AllergenRow, AnalyzeResponse, FeedEntryRow, FoodItemRow, MealComponentRow, SnapshotResponse,
    SubmitResponse,
};
use tracing::{debug, warn};

use crate::model::{
    AllergenExposure, ExposureAge, ExposureSnapshot, FeedEntry, FoodItem, MealComponent,
    MealDraft, MealReceipt,
};

impl From<AllergenRow> for AllergenExposure {
    fn from(row: AllergenRow) -> Self {
        let age = match (row.days_since_exposure, row.last_exposure_date) {
            (Some(days), Some(last_exposure)) => ExposureAge::Known {
                days,
                last_exposure,
            },
            (None, None) => ExposureAge::Unknown,
            (days, date) => {
                warn!(
                    allergen = %row.name,
                    ?days,
                    ?date,
                    "inconsistent exposure row, treating as unknown"
                );
                ExposureAge::Unknown
            }
        };

        Self {
            name: row.name,
            age,
            foods: row.foods,
        }
    }
}

impl From<SnapshotResponse> for ExposureSnapshot {
    /// Build a snapshot, dropping duplicate allergen names (first row
    /// wins) so the "one entry per allergen" rule holds.
    fn from(resp: SnapshotResponse) -> Self {
        let mut seen = HashSet::new();
        let allergens = resp
            .allergens
            .into_iter()
            .filter(|row| {
                let fresh = seen.insert(row.name.clone());
                if !fresh {
                    debug!(allergen = %row.name, "duplicate allergen row dropped");
                }
                fresh
            })
            .map(AllergenExposure::from)
            .collect();

        Self {
            allergens,
            computed_at: resp.last_updated,
        }
    }
}

impl From<FeedEntryRow> for FeedEntry {
    fn from(row: FeedEntryRow) -> Self {
        Self {
            timestamp: row.timestamp,
            foods: row.foods,
        }
    }
}

impl From<FoodItemRow> for FoodItem {
    fn from(row: FoodItemRow) -> Self {
        Self {
            name: row.name,
            allergens: row.allergens,
        }
    }
}

impl From<MealComponentRow> for MealComponent {
    fn from(row: MealComponentRow) -> Self {
        Self {
            foods: row.foods.into_iter().map(FoodItem::from).collect(),
        }
    }
}

impl From<AnalyzeResponse> for MealDraft {
    fn from(resp: AnalyzeResponse) -> Self {
        Self {
            components: resp.components.into_iter().map(MealComponent::from).collect(),
            notes: resp.notes,
        }
    }
}

impl From<SubmitResponse> for MealReceipt {
    fn from(resp: SubmitResponse) -> Self {
        Self {
            entry_ids: resp.entries.into_iter().map(|e| e.entry_id).collect(),
            timestamp: resp.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn row(name: &str, days: Option<u32>, date: Option<&str>) -> AllergenRow {
        AllergenRow {
            name: name.to_owned(),
            days_since_exposure: days,
            last_exposure_date: date.map(|d| d.parse().expect("date")),
            foods: Vec::new(),
        }
    }

    #[test]
    fn consistent_rows_convert_directly() {
        let known = AllergenExposure::from(row("peanut", Some(3), Some("2026-08-21")));
        assert_eq!(
            known.age,
            ExposureAge::Known {
                days: 3,
                last_exposure: NaiveDate::from_ymd_opt(2026, 8, 21).expect("date"),
            }
        );

        let unknown = AllergenExposure::from(row("sesame", None, None));
        assert_eq!(unknown.age, ExposureAge::Unknown);
    }

    #[test]
    fn half_known_rows_normalize_to_unknown() {
        // Days without a date, and a date without days: both invalid per
        // the exposure invariant.
        let no_date = AllergenExposure::from(row("fish", Some(7), None));
        assert_eq!(no_date.age, ExposureAge::Unknown);

        let no_days = AllergenExposure::from(row("soy", None, Some("2026-08-01")));
        assert_eq!(no_days.age, ExposureAge::Unknown);
    }

    #[test]
    fn duplicate_allergen_names_keep_first_row() {
        let resp = SnapshotResponse {
            allergens: vec![
                row("egg", Some(1), Some("2026-08-23")),
                row("egg", Some(9), Some("2026-08-15")),
                row("wheat", None, None),
            ],
            last_updated: "2026-08-24T10:00:00Z".parse().expect("timestamp"),
        };

        let snapshot = ExposureSnapshot::from(resp);
        assert_eq!(snapshot.allergens.len(), 2);
        assert_eq!(snapshot.get("egg").expect("egg").age.days(), Some(1));
    }
}
