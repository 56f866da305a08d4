use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::models::{ChannelId, NewScheduleEntry, ScheduleEntry, ScheduleEntryId};
use crate::Result;

#[derive(Clone)]
pub struct ScheduleEntryRepository {
    pool: PgPool,
}

const SELECT_COLUMNS: &str = r"
    id, channel_id, title, series_name, season_number, episode_number,
    external_media_item_id, library_id, item_type, genres,
    start_time, end_time, duration_seconds, file_path, description,
    content_rating, thumbnail_path, air_date";

impl ScheduleEntryRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: ScheduleEntryId) -> Result<ScheduleEntry> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM schedule_entries WHERE id = $1");
        let row = sqlx::query(&sql).bind(id).fetch_one(&self.pool).await?;
        Ok(ScheduleEntry::from_row(&row)?)
    }

    /// The entry covering `now`, if any (spec §4.4: `start_time <= now < end_time`).
    pub async fn current_entry(&self, channel_id: ChannelId, now: DateTime<Utc>) -> Result<Option<ScheduleEntry>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM schedule_entries \
             WHERE channel_id = $1 AND start_time <= $2 AND end_time > $2 \
             ORDER BY start_time LIMIT 1"
        );
        let row = sqlx::query(&sql).bind(channel_id).bind(now).fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(Some(ScheduleEntry::from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn entries_in_window(
        &self,
        channel_id: ChannelId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<ScheduleEntry>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM schedule_entries \
             WHERE channel_id = $1 AND start_time < $3 AND end_time > $2 \
             ORDER BY start_time ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(channel_id)
            .bind(window_start)
            .bind(window_end)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|row| Ok(ScheduleEntry::from_row(row)?)).collect()
    }

    pub async fn max_end_time(&self, channel_id: ChannelId) -> Result<Option<DateTime<Utc>>> {
        let max: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(end_time) FROM schedule_entries WHERE channel_id = $1")
                .bind(channel_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(max)
    }

    pub async fn delete_all_for_channel(&self, channel_id: ChannelId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM schedule_entries WHERE channel_id = $1")
            .bind(channel_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Insert a freshly-generated run of entries and advance the channel's
    /// watermark atomically (spec §4.3 step 6: "Persist all new entries in
    /// one transaction ... commit").
    pub async fn insert_batch_and_advance_watermark(
        &self,
        channel_id: ChannelId,
        entries: &[NewScheduleEntry],
    ) -> Result<Vec<ScheduleEntry>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(entries.len());

        for entry in entries {
            let sql = format!(
                "INSERT INTO schedule_entries (\
                    channel_id, title, series_name, season_number, episode_number, \
                    external_media_item_id, library_id, item_type, genres, \
                    start_time, end_time, duration_seconds, file_path, description, \
                    content_rating, thumbnail_path, air_date\
                 ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17) \
                 RETURNING {SELECT_COLUMNS}"
            );
            let row = sqlx::query(&sql)
                .bind(entry.channel_id)
                .bind(&entry.title)
                .bind(&entry.series_name)
                .bind(entry.season_number)
                .bind(entry.episode_number)
                .bind(&entry.external_media_item_id)
                .bind(&entry.library_id)
                .bind(entry.item_type)
                .bind(serde_json::json!(entry.genres))
                .bind(entry.start_time)
                .bind(entry.end_time)
                .bind(entry.duration_seconds)
                .bind(&entry.file_path)
                .bind(&entry.description)
                .bind(&entry.content_rating)
                .bind(&entry.thumbnail_path)
                .bind(&entry.air_date)
                .fetch_one(&mut *tx)
                .await?;
            inserted.push(ScheduleEntry::from_row(&row)?);
        }

        let watermark = entries.last().expect("checked non-empty above").end_time;
        sqlx::query("UPDATE channels SET schedule_generated_through = $2 WHERE id = $1")
            .bind(channel_id)
            .bind(watermark)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(inserted)
    }
}
