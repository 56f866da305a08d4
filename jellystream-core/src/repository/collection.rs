use sqlx::{FromRow, PgPool};

use crate::models::{Collection, CollectionId, CollectionItem};
use crate::Result;

#[derive(Clone)]
pub struct CollectionRepository {
    pool: PgPool,
}

impl CollectionRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: CollectionId) -> Result<Collection> {
        let row = sqlx::query("SELECT id, name, boxset_external_id FROM collections WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(Collection::from_row(&row)?)
    }

    pub async fn get_items(&self, collection_id: CollectionId) -> Result<Vec<CollectionItem>> {
        let rows = sqlx::query(
            r"
            SELECT id, collection_id, sort_order, external_item_id, item_type, title,
                   series_name, season_number, episode_number, library_id, duration_seconds,
                   genres, description, content_rating, air_date, file_path, thumbnail_path
            FROM collection_items
            WHERE collection_id = $1
            ORDER BY sort_order ASC
            ",
        )
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| Ok(CollectionItem::from_row(row)?)).collect()
    }
}
