//! Schedule generator (component E, spec §4.3).

use chrono::{Duration as ChronoDuration, Utc};
use rand::seq::SliceRandom;
use tracing::{info, instrument};

use crate::context::Context;
use crate::models::{Candidate, CandidateSource, ChannelId, NewScheduleEntry};
use crate::pool::build_pool;
use crate::sidecar::{apply_path_map, enrich, ItemLocation, SidecarEnrichment};
use crate::Result;

/// `generate(channel_id, days) -> entries_created` (spec §4.3).
#[instrument(skip(ctx), fields(channel_id = %channel_id, days))]
pub async fn generate(ctx: &Context, channel_id: ChannelId, days: i64) -> Result<usize> {
    let channel = ctx.channels.get(channel_id).await?;
    let pool = build_pool(ctx, channel_id).await?;

    if pool.is_empty() {
        info!("empty candidate pool, zero entries emitted");
        return Ok(0);
    }

    let now = Utc::now();
    let cursor_start = channel.fill_cursor(now);
    let fill_until = cursor_start + ChronoDuration::seconds(days.saturating_mul(86_400));
    let path_rule = ctx.config.path_map_rule();

    let entries = fill_entries(channel_id, pool, cursor_start, fill_until, path_rule.as_ref());

    let inserted = ctx
        .schedule_entries
        .insert_batch_and_advance_watermark(channel_id, &entries)
        .await?;

    info!(entries_created = inserted.len(), "schedule generation complete");
    Ok(inserted.len())
}

/// Delete all entries for the channel, clear its watermark, and regenerate
/// from now (spec §4.3 "Reset-and-regenerate variant").
pub async fn reset_and_generate(ctx: &Context, channel_id: ChannelId, days: i64) -> Result<usize> {
    ctx.schedule_entries.delete_all_for_channel(channel_id).await?;
    ctx.channels.clear_watermark(channel_id).await?;
    generate(ctx, channel_id, days).await
}

fn fill_entry(
    channel_id: ChannelId,
    candidate: &Candidate,
    cursor: chrono::DateTime<Utc>,
    path_rule: Option<&crate::config::PathMapRule>,
) -> NewScheduleEntry {
    let (file_path, sidecar) = resolve_and_enrich(candidate, path_rule);

    let genres = if candidate.genres.is_empty() {
        sidecar.genres.clone().unwrap_or_default()
    } else {
        candidate.genres.clone()
    };

    let end_time = cursor + ChronoDuration::seconds(candidate.duration_seconds);

    NewScheduleEntry {
        channel_id,
        title: candidate.title.clone(),
        series_name: candidate.series_name.clone(),
        season_number: candidate.season_number,
        episode_number: candidate.episode_number,
        external_media_item_id: candidate.external_id.clone(),
        library_id: candidate.library_id.clone(),
        item_type: candidate.item_type,
        genres,
        start_time: cursor,
        end_time,
        duration_seconds: candidate.duration_seconds,
        file_path,
        description: sidecar.description,
        content_rating: sidecar.content_rating,
        thumbnail_path: sidecar.thumbnail_path,
        air_date: sidecar.air_date,
    }
}

/// Walk the shuffled candidate pool from `cursor_start` until `fill_until`,
/// re-shuffling whenever the pool is exhausted (spec §4.3 steps 4-5).
fn fill_entries(
    channel_id: ChannelId,
    mut pool: Vec<Candidate>,
    cursor_start: chrono::DateTime<Utc>,
    fill_until: chrono::DateTime<Utc>,
    path_rule: Option<&crate::config::PathMapRule>,
) -> Vec<NewScheduleEntry> {
    let mut rng = rand::thread_rng();
    pool.shuffle(&mut rng);
    let mut index = 0usize;

    let mut cursor = cursor_start;
    let mut entries = Vec::new();

    while cursor < fill_until {
        if index >= pool.len() {
            pool.shuffle(&mut rng);
            index = 0;
        }
        let candidate = &pool[index];
        index += 1;

        if candidate.duration_seconds < 30 {
            continue;
        }

        let entry = fill_entry(channel_id, candidate, cursor, path_rule);
        cursor = entry.end_time;
        entries.push(entry);
    }

    entries
}

fn resolve_and_enrich(
    candidate: &Candidate,
    path_rule: Option<&crate::config::PathMapRule>,
) -> (Option<String>, SidecarEnrichment) {
    match &candidate.source {
        CandidateSource::Collection { path, enrichment } => {
            let mapped = path.as_deref().map(|p| apply_path_map(p, path_rule));
            (mapped, enrichment.clone().unwrap_or_default())
        }
        CandidateSource::Library { path } => {
            let Some(raw_path) = path else {
                return (None, SidecarEnrichment::default());
            };
            let mapped = apply_path_map(raw_path, path_rule);
            let location = match candidate.item_type {
                crate::models::ScheduledItemType::Movie => ItemLocation::Movie {
                    video_path: mapped.clone().into(),
                },
                crate::models::ScheduledItemType::Episode => ItemLocation::Episode {
                    video_path: mapped.clone().into(),
                },
            };
            let sidecar = enrich(SidecarEnrichment::default(), &location);
            (Some(mapped), sidecar)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate(external_id: &str, duration_seconds: i64, genres: &[&str]) -> Candidate {
        Candidate {
            external_id: external_id.to_string(),
            title: format!("Title {external_id}"),
            series_name: None,
            season_number: None,
            episode_number: None,
            item_type: ScheduledItemType::Movie,
            duration_seconds,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            library_id: Some("lib-1".to_string()),
            source: CandidateSource::Library {
                path: Some(format!("/media/{external_id}.mkv")),
            },
        }
    }

    fn start() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 27, 0, 0, 0).unwrap()
    }

    #[test]
    fn fill_entries_is_gapless_and_non_overlapping() {
        let pool = vec![
            candidate("a", 3600, &["Action"]),
            candidate("b", 1800, &["Comedy"]),
            candidate("c", 5400, &[]),
        ];
        let cursor_start = start();
        let fill_until = cursor_start + ChronoDuration::hours(24);
        let entries = fill_entries(ChannelId::new(1), pool, cursor_start, fill_until, None);

        assert!(!entries.is_empty());
        assert_eq!(entries[0].start_time, cursor_start);
        for pair in entries.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time, "schedule must be gapless");
        }
        assert!(entries.last().unwrap().end_time >= fill_until);
    }

    #[test]
    fn fill_entries_skips_candidates_shorter_than_thirty_seconds() {
        let pool = vec![candidate("short", 10, &[]), candidate("long", 7200, &[])];
        let cursor_start = start();
        let fill_until = cursor_start + ChronoDuration::hours(2);
        let entries = fill_entries(ChannelId::new(1), pool, cursor_start, fill_until, None);

        assert!(entries.iter().all(|e| e.duration_seconds >= 30));
        assert!(entries.iter().all(|e| e.external_media_item_id == "long"));
    }

    #[test]
    fn fill_entries_reshuffles_and_reuses_pool_once_exhausted() {
        let pool = vec![candidate("only", 1800, &[])];
        let cursor_start = start();
        let fill_until = cursor_start + ChronoDuration::hours(5);
        let entries = fill_entries(ChannelId::new(1), pool, cursor_start, fill_until, None);

        assert_eq!(entries.len(), 10);
        assert!(entries.iter().all(|e| e.external_media_item_id == "only"));
    }

    #[test]
    fn fill_entries_stamps_the_requested_channel_id() {
        let pool = vec![candidate("a", 3600, &[])];
        let cursor_start = start();
        let fill_until = cursor_start + ChronoDuration::hours(1);
        let channel_id = ChannelId::new(42);
        let entries = fill_entries(channel_id, pool, cursor_start, fill_until, None);

        assert!(entries.iter().all(|e| e.channel_id == channel_id));
    }

    #[test]
    fn fill_entry_falls_back_to_sidecar_genres_when_candidate_has_none() {
        let c = candidate("a", 3600, &[]);
        let entry = fill_entry(ChannelId::new(1), &c, start(), None);
        assert!(entry.genres.is_empty());
    }

    #[test]
    fn fill_entry_prefers_candidate_genres_over_sidecar() {
        let c = candidate("a", 3600, &["Drama"]);
        let entry = fill_entry(ChannelId::new(1), &c, start(), None);
        assert_eq!(entry.genres, vec!["Drama".to_string()]);
    }
}
