//! `suggestions` -- print the food/allergen suggestion table.

use tabled::Tabled;

use allertrack_core::{FoodItem, Tracker};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct SuggestionRow {
    #[tabled(rename = "Food")]
    food: String,
    #[tabled(rename = "Allergens")]
    allergens: String,
}

impl From<&FoodItem> for SuggestionRow {
    fn from(item: &FoodItem) -> Self {
        Self {
            food: item.name.clone(),
            allergens: item.allergens.join(", "),
        }
    }
}

pub async fn handle(tracker: &Tracker, global: &GlobalOpts) -> Result<(), CliError> {
    let suggestions = tracker.food_suggestions().await?;

    let out = output::render(global.output, &suggestions, |items| {
        items.iter().map(SuggestionRow::from).collect()
    })?;
    output::print(&out);
    Ok(())
}
