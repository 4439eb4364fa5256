// allertrack-core: Reactive data layer between allertrack-api and consumers.

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod store;
pub mod timefmt;
pub mod tracker;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::TrackerConfig;
pub use error::CoreError;
pub use store::{SnapshotStore, SnapshotStream};
pub use tracker::{Tracker, ViewState};

pub use model::{
    AllergenExposure, ExposureAge, ExposureSnapshot, FeedEntry, FoodItem, MealComponent,
    MealDraft, MealReceipt,
};

// Re-export the api types consumers need for channel and policy tuning.
pub use allertrack_api::{LinkState, ReconnectPolicy};
