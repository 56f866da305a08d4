use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::ScheduledItemType;
use super::id::{ChannelId, ScheduleEntryId};

/// One programme slot on one channel (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScheduleEntry {
    pub id: ScheduleEntryId,
    pub channel_id: ChannelId,
    pub title: String,
    pub series_name: Option<String>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub external_media_item_id: String,
    pub library_id: Option<String>,
    pub item_type: ScheduledItemType,
    pub genres: serde_json::Value,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
    pub file_path: Option<String>,
    pub description: Option<String>,
    pub content_rating: Option<String>,
    pub thumbnail_path: Option<String>,
    pub air_date: Option<String>,
}

impl ScheduleEntry {
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

    /// Elapsed seconds into this entry as of `now` (spec §4.4); never negative.
    #[must_use]
    pub fn offset_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.start_time).num_seconds().max(0)
    }

    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start_time <= instant && instant < self.end_time
    }

    #[must_use]
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.end_time - now).num_seconds().max(0)
    }
}

/// A freshly filled slot not yet persisted, produced by the generator before
/// it is written in the same transaction as its siblings.
#[derive(Debug, Clone)]
pub struct NewScheduleEntry {
    pub channel_id: ChannelId,
    pub title: String,
    pub series_name: Option<String>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub external_media_item_id: String,
    pub library_id: Option<String>,
    pub item_type: ScheduledItemType,
    pub genres: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
    pub file_path: Option<String>,
    pub description: Option<String>,
    pub content_rating: Option<String>,
    pub thumbnail_path: Option<String>,
    pub air_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::id::ChannelId;

    fn entry(start: DateTime<Utc>, end: DateTime<Utc>) -> ScheduleEntry {
        ScheduleEntry {
            id: ScheduleEntryId::new(1),
            channel_id: ChannelId::new(1),
            title: "Test".into(),
            series_name: None,
            season_number: None,
            episode_number: None,
            external_media_item_id: "abc".into(),
            library_id: None,
            item_type: ScheduledItemType::Movie,
            genres: serde_json::json!(["Sci-Fi"]),
            start_time: start,
            end_time: end,
            duration_seconds: (end - start).num_seconds(),
            file_path: None,
            description: None,
            content_rating: None,
            thumbnail_path: None,
            air_date: None,
        }
    }

    #[test]
    fn offset_seconds_is_never_negative() {
        let start = Utc::now();
        let end = start + chrono::Duration::seconds(3600);
        let e = entry(start, end);
        assert_eq!(e.offset_seconds(start - chrono::Duration::seconds(10)), 0);
        assert_eq!(e.offset_seconds(start + chrono::Duration::seconds(30)), 30);
    }

    #[test]
    fn contains_is_half_open() {
        let start = Utc::now();
        let end = start + chrono::Duration::seconds(1800);
        let e = entry(start, end);
        assert!(e.contains(start));
        assert!(!e.contains(end));
    }
}
