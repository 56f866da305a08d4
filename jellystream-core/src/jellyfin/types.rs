//! Wire types for the subset of the Jellyfin HTTP API JellyStream consumes.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JellyfinUser {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JellyfinLibrary {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "CollectionType")]
    pub collection_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JellyfinLibrariesResponse {
    #[serde(rename = "Items")]
    pub items: Vec<JellyfinLibrary>,
}

/// One item as returned by `/Users/{id}/Items`, with just the fields spec
/// §4.2 asks the query to request.
#[derive(Debug, Clone, Deserialize)]
pub struct JellyfinItem {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub item_type: String,
    #[serde(rename = "RunTimeTicks")]
    pub run_time_ticks: Option<i64>,
    #[serde(rename = "Genres", default)]
    pub genres: Vec<String>,
    #[serde(rename = "SeriesName")]
    pub series_name: Option<String>,
    #[serde(rename = "ParentIndexNumber")]
    pub parent_index_number: Option<i32>,
    #[serde(rename = "IndexNumber")]
    pub index_number: Option<i32>,
    #[serde(rename = "Path")]
    pub path: Option<String>,
    #[serde(rename = "ParentId")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JellyfinItemsPage {
    #[serde(rename = "Items")]
    pub items: Vec<JellyfinItem>,
    #[serde(rename = "TotalRecordCount")]
    pub total_record_count: i64,
}

pub const TICKS_PER_SECOND: i64 = 10_000_000;
pub const MIN_DURATION_TICKS: i64 = 300_000_000;
