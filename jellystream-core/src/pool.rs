//! Content pool builder (component D, spec §4.2).

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;

use tracing::warn;

use crate::context::Context;
use crate::jellyfin::{JellyfinItem, MIN_DURATION_TICKS, TICKS_PER_SECOND};
use crate::models::{
    Candidate, CandidateSource, ChannelGenreFilter, ChannelId, CollectionId, CollectionItem,
    FilterContentType, ItemType, ScheduledItemType,
};
use crate::sidecar::SidecarEnrichment;
use crate::Result;

const MAX_COLLECTION_DEPTH: u32 = 3;

/// Resolve a channel's configured sources into a deduplicated candidate set
/// (spec §4.2).
pub async fn build_pool(ctx: &Context, channel_id: ChannelId) -> Result<Vec<Candidate>> {
    let sources = ctx.channels.get_sources(channel_id).await?;

    let mut pool = Vec::new();

    for lib in &sources.libraries {
        match fetch_library_candidates(ctx, &lib.library_id, &sources.include_filters).await {
            Ok(mut items) => pool.append(&mut items),
            Err(e) => warn!(library_id = %lib.library_id, error = %e, "skipping library pool source"),
        }
    }

    for source in &sources.collections {
        match fetch_collection_candidates(ctx, source.collection_id, &sources.include_filters, 0).await {
            Ok(mut items) => pool.append(&mut items),
            Err(e) => warn!(collection_id = %source.collection_id, error = %e, "skipping collection pool source"),
        }
    }

    let mut seen = HashSet::new();
    pool.retain(|c| seen.insert(c.external_id.clone()));

    let exclude_genres: Vec<String> = sources.exclude_filters.iter().map(|f| f.genre.clone()).collect();
    if !exclude_genres.is_empty() {
        pool.retain(|c| !c.genres_intersect(&exclude_genres));
    }

    Ok(pool)
}

fn include_item_types_for(content_type: FilterContentType) -> &'static str {
    match content_type {
        FilterContentType::Movie => "Movie",
        FilterContentType::Episode => "Episode",
        FilterContentType::Both => "Movie,Episode",
    }
}

async fn fetch_library_candidates(
    ctx: &Context,
    library_id: &str,
    include_filters: &[ChannelGenreFilter],
) -> Result<Vec<Candidate>> {
    let mut out = Vec::new();

    if include_filters.is_empty() {
        let items = ctx.jellyfin.get_all_items(library_id, true, "Movie,Episode", &[]).await?;
        for item in &items {
            if let Some(candidate) = item_to_library_candidate(item, library_id) {
                out.push(candidate);
            }
        }
        return Ok(out);
    }

    let mut groups: HashMap<FilterContentType, Vec<String>> = HashMap::new();
    for filter in include_filters {
        groups.entry(filter.content_type).or_default().push(filter.genre.clone());
    }

    for (content_type, genres) in groups {
        let include_item_types = include_item_types_for(content_type);
        let items = ctx
            .jellyfin
            .get_all_items(library_id, true, include_item_types, &genres)
            .await?;
        for item in &items {
            if let Some(candidate) = item_to_library_candidate(item, library_id) {
                out.push(candidate);
            }
        }
    }

    Ok(out)
}

fn item_to_library_candidate(item: &JellyfinItem, library_id: &str) -> Option<Candidate> {
    let ticks = item.run_time_ticks.unwrap_or(0);
    if ticks < MIN_DURATION_TICKS {
        return None;
    }
    let item_type = match item.item_type.as_str() {
        "Movie" => ScheduledItemType::Movie,
        "Episode" => ScheduledItemType::Episode,
        _ => return None,
    };
    Some(Candidate {
        external_id: item.id.clone(),
        title: item.name.clone(),
        series_name: item.series_name.clone(),
        season_number: item.parent_index_number,
        episode_number: item.index_number,
        item_type,
        duration_seconds: ticks / TICKS_PER_SECOND,
        genres: item.genres.clone(),
        library_id: Some(library_id.to_string()),
        source: CandidateSource::Library { path: item.path.clone() },
    })
}

fn collection_item_to_candidate(item: &CollectionItem) -> Candidate {
    let item_type = match item.item_type {
        ItemType::Movie => ScheduledItemType::Movie,
        ItemType::Episode => ScheduledItemType::Episode,
        _ => unreachable!("caller filters to Movie/Episode before calling this"),
    };
    let enrichment = SidecarEnrichment {
        description: item.description.clone(),
        content_rating: item.content_rating.clone(),
        air_date: item.air_date.clone(),
        genres: Some(item.genre_list()),
        thumbnail_path: item.thumbnail_path.clone(),
    };
    Candidate {
        external_id: item.external_item_id.clone(),
        title: item.title.clone(),
        series_name: item.series_name.clone(),
        season_number: item.season_number,
        episode_number: item.episode_number,
        item_type,
        duration_seconds: item.duration_seconds,
        genres: item.genre_list(),
        library_id: item.library_id.clone(),
        source: CandidateSource::Collection {
            path: item.file_path.clone(),
            enrichment: Some(enrichment),
        },
    }
}

/// Resolve one collection source into candidates, recursing into nested
/// collections up to `MAX_COLLECTION_DEPTH` (spec §4.2 step 2, §9 open
/// question: the depth limit is empirical and implementation-defined).
fn fetch_collection_candidates<'a>(
    ctx: &'a Context,
    collection_id: CollectionId,
    include_filters: &'a [ChannelGenreFilter],
    depth: u32,
) -> Pin<Box<dyn Future<Output = Result<Vec<Candidate>>> + Send + 'a>> {
    Box::pin(async move {
        if depth > MAX_COLLECTION_DEPTH {
            return Ok(Vec::new());
        }

        let items = ctx.collections.get_items(collection_id).await?;
        let mut out = Vec::new();

        for item in &items {
            match item.item_type {
                ItemType::Movie | ItemType::Episode => {
                    if item.duration_seconds >= 30 {
                        out.push(collection_item_to_candidate(item));
                    }
                }
                ItemType::Series | ItemType::Season => {
                    let episodes = ctx
                        .jellyfin
                        .get_all_items(&item.external_item_id, true, "Episode", &[])
                        .await?;
                    for ep in &episodes {
                        let library = item.library_id.as_deref().unwrap_or_default();
                        if let Some(candidate) = item_to_library_candidate(ep, library) {
                            out.push(candidate);
                        }
                    }
                }
                ItemType::Collection => {
                    if let Ok(nested_id) = item.external_item_id.parse::<i64>() {
                        let mut nested =
                            fetch_collection_candidates(ctx, CollectionId::new(nested_id), include_filters, depth + 1)
                                .await?;
                        out.append(&mut nested);
                    }
                }
            }
        }

        // Lenient include rule (spec §4.2 step 2): items with no genres pass
        // through (hand-curated); items with genres must intersect the
        // union of include-filter genres.
        if !include_filters.is_empty() {
            let include_genres: Vec<String> = include_filters.iter().map(|f| f.genre.clone()).collect();
            out.retain(|c| c.genres.is_empty() || c.genres_intersect(&include_genres));
        }

        Ok(out)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::FilterType;

    fn filter(genre: &str, content_type: FilterContentType, filter_type: FilterType) -> ChannelGenreFilter {
        ChannelGenreFilter {
            id: 1,
            channel_id: ChannelId::new(1),
            genre: genre.to_string(),
            content_type,
            filter_type,
        }
    }

    #[test]
    fn include_item_types_maps_content_type() {
        assert_eq!(include_item_types_for(FilterContentType::Movie), "Movie");
        assert_eq!(include_item_types_for(FilterContentType::Episode), "Episode");
        assert_eq!(include_item_types_for(FilterContentType::Both), "Movie,Episode");
    }

    #[test]
    fn item_to_library_candidate_rejects_short_duration() {
        let item = JellyfinItem {
            id: "a".into(),
            name: "A".into(),
            item_type: "Movie".into(),
            run_time_ticks: Some(100_000_000),
            genres: vec![],
            series_name: None,
            parent_index_number: None,
            index_number: None,
            path: None,
            parent_id: None,
        };
        assert!(item_to_library_candidate(&item, "lib").is_none());
    }

    #[test]
    fn item_to_library_candidate_accepts_long_enough_movie() {
        let item = JellyfinItem {
            id: "a".into(),
            name: "A".into(),
            item_type: "Movie".into(),
            run_time_ticks: Some(36_000_000_000),
            genres: vec!["Sci-Fi".into()],
            series_name: None,
            parent_index_number: None,
            index_number: None,
            path: Some("/media/a.mkv".into()),
            parent_id: None,
        };
        let candidate = item_to_library_candidate(&item, "lib").unwrap();
        assert_eq!(candidate.duration_seconds, 3600);
        assert_eq!(candidate.item_type, ScheduledItemType::Movie);
    }

    #[test]
    fn exclude_filters_referenced_in_build_pool_subtract_union() {
        let excludes = vec![filter("Horror", FilterContentType::Both, FilterType::Exclude)];
        let exclude_genres: Vec<String> = excludes.iter().map(|f| f.genre.clone()).collect();
        assert_eq!(exclude_genres, vec!["Horror".to_string()]);
    }
}
