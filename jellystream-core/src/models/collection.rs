use serde::{Deserialize, Serialize};

use super::enums::ItemType;
use super::id::{CollectionId, CollectionItemId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub boxset_external_id: Option<String>,
}

/// A single item within a collection, carrying everything needed to
/// schedule it directly without a round trip to the media server
/// (spec §3: "embeds all fields needed to schedule it directly").
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CollectionItem {
    pub id: CollectionItemId,
    pub collection_id: CollectionId,
    pub sort_order: i32,
    pub external_item_id: String,
    pub item_type: ItemType,
    pub title: String,
    pub series_name: Option<String>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub library_id: Option<String>,
    pub duration_seconds: i64,
    /// JSON array of genre strings.
    pub genres: serde_json::Value,
    pub description: Option<String>,
    pub content_rating: Option<String>,
    pub air_date: Option<String>,
    pub file_path: Option<String>,
    pub thumbnail_path: Option<String>,
}

impl CollectionItem {
    #[must_use]
    pub fn genre_list(&self) -> Vec<String> {
        self.genres
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}
