//! Explicit dependency bundle threaded through the schedule generator, pool
//! builder, and HTTP handlers, replacing the module-level singletons the
//! original implementation relied on (spec §9 redesign note).

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::jellyfin::JellyfinClient;
use crate::repository::{ChannelRepository, CollectionRepository, ScheduleEntryRepository};

#[derive(Clone)]
pub struct Context {
    pub config: Arc<Config>,
    pub jellyfin: Arc<JellyfinClient>,
    pub channels: ChannelRepository,
    pub collections: CollectionRepository,
    pub schedule_entries: ScheduleEntryRepository,
}

impl Context {
    #[must_use]
    pub fn new(config: Arc<Config>, pool: PgPool) -> Self {
        let jellyfin = Arc::new(JellyfinClient::new(&config.media_server));
        Self {
            config,
            jellyfin,
            channels: ChannelRepository::new(pool.clone()),
            collections: CollectionRepository::new(pool.clone()),
            schedule_entries: ScheduleEntryRepository::new(pool),
        }
    }
}
