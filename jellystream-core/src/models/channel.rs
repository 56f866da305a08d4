use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{FilterContentType, FilterType, LibraryCollectionType, ScheduleType};
use super::id::{ChannelId, CollectionId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub channel_number: Option<String>,
    pub enabled: bool,
    pub schedule_type: ScheduleType,
    pub schedule_generated_through: Option<DateTime<Utc>>,
}

impl Channel {
    /// Fill cursor per spec §4.3 step 3: resume from the watermark if it
    /// lies in the future, otherwise start from now.
    #[must_use]
    pub fn fill_cursor(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.schedule_generated_through {
            Some(watermark) if watermark > now => watermark,
            _ => now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChannelLibrary {
    pub id: i64,
    pub channel_id: ChannelId,
    pub library_id: String,
    pub library_name: String,
    pub collection_type: LibraryCollectionType,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChannelGenreFilter {
    pub id: i64,
    pub channel_id: ChannelId,
    pub genre: String,
    pub content_type: FilterContentType,
    pub filter_type: FilterType,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChannelCollectionSource {
    pub id: i64,
    pub channel_id: ChannelId,
    pub collection_id: CollectionId,
}

/// The channel's source bindings grouped the way the pool builder (§4.2)
/// consumes them.
#[derive(Debug, Clone, Default)]
pub struct ChannelSources {
    pub libraries: Vec<ChannelLibrary>,
    pub include_filters: Vec<ChannelGenreFilter>,
    pub exclude_filters: Vec<ChannelGenreFilter>,
    pub collections: Vec<ChannelCollectionSource>,
}

impl ChannelSources {
    #[must_use]
    pub fn from_filters(
        libraries: Vec<ChannelLibrary>,
        filters: Vec<ChannelGenreFilter>,
        collections: Vec<ChannelCollectionSource>,
    ) -> Self {
        let (include_filters, exclude_filters) = filters
            .into_iter()
            .partition(|f| matches!(f.filter_type, FilterType::Include));
        Self {
            libraries,
            include_filters,
            exclude_filters,
            collections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_cursor_resumes_from_future_watermark() {
        let now = Utc::now();
        let channel = Channel {
            id: ChannelId::new(1),
            name: "Test".into(),
            channel_number: None,
            enabled: true,
            schedule_type: ScheduleType::GenreAuto,
            schedule_generated_through: Some(now + chrono::Duration::hours(2)),
        };
        assert!(channel.fill_cursor(now) > now);
    }

    #[test]
    fn fill_cursor_resets_when_watermark_in_past() {
        let now = Utc::now();
        let channel = Channel {
            id: ChannelId::new(1),
            name: "Test".into(),
            channel_number: None,
            enabled: true,
            schedule_type: ScheduleType::GenreAuto,
            schedule_generated_through: Some(now - chrono::Duration::hours(2)),
        };
        assert_eq!(channel.fill_cursor(now), now);
    }
}
