use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::models::{
    Channel, ChannelCollectionSource, ChannelGenreFilter, ChannelId, ChannelLibrary, ChannelSources,
};
use crate::Result;

#[derive(Clone)]
pub struct ChannelRepository {
    pool: PgPool,
}

impl ChannelRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: ChannelId) -> Result<Channel> {
        let row = sqlx::query(
            r"
            SELECT id, name, channel_number, enabled, schedule_type, schedule_generated_through
            FROM channels
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Channel::from_row(&row)?)
    }

    pub async fn list_enabled(&self) -> Result<Vec<Channel>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, channel_number, enabled, schedule_type, schedule_generated_through
            FROM channels
            WHERE enabled = TRUE
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| Ok(Channel::from_row(row)?)).collect()
    }

    /// Channels the maintainer may extend (spec §4.7 step 1).
    pub async fn list_enabled_genre_auto(&self) -> Result<Vec<Channel>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, channel_number, enabled, schedule_type, schedule_generated_through
            FROM channels
            WHERE enabled = TRUE AND schedule_type = 'genre_auto'
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| Ok(Channel::from_row(row)?)).collect()
    }

    pub async fn update_watermark(&self, id: ChannelId, watermark: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE channels SET schedule_generated_through = $2 WHERE id = $1")
            .bind(id)
            .bind(watermark)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn clear_watermark(&self, id: ChannelId) -> Result<()> {
        sqlx::query("UPDATE channels SET schedule_generated_through = NULL WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_sources(&self, channel_id: ChannelId) -> Result<ChannelSources> {
        let libraries = sqlx::query(
            r"SELECT id, channel_id, library_id, library_name, collection_type
               FROM channel_libraries WHERE channel_id = $1",
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| Ok(ChannelLibrary::from_row(row)?))
        .collect::<Result<Vec<_>>>()?;

        let filters = sqlx::query(
            r"SELECT id, channel_id, genre, content_type, filter_type
               FROM channel_genre_filters WHERE channel_id = $1",
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| Ok(ChannelGenreFilter::from_row(row)?))
        .collect::<Result<Vec<_>>>()?;

        let collections = sqlx::query(
            r"SELECT id, channel_id, collection_id
               FROM channel_collection_sources WHERE channel_id = $1",
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| Ok(ChannelCollectionSource::from_row(row)?))
        .collect::<Result<Vec<_>>>()?;

        Ok(ChannelSources::from_filters(libraries, filters, collections))
    }
}
