pub mod client;
pub mod types;

pub use client::JellyfinClient;
pub use types::{JellyfinItem, JellyfinItemsPage, JellyfinLibrary, JellyfinUser, MIN_DURATION_TICKS, TICKS_PER_SECOND};
