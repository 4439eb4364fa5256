// allertrack-api: Async client for the allergen tracker backend (HTTP + live sync).

pub mod client;
pub mod error;
pub mod live;
pub mod transport;
pub mod types;

pub use client::AllergenClient;
pub use error::Error;
pub use live::{LinkState, LiveHandle, ReconnectPolicy};
