//! Source resolution and fallback (spec §4.6), plus the "collection
//! verification" check invoked on demand by the CRUD layer.

use std::path::Path;

use jellystream_core::config::PathMapRule;
use jellystream_core::jellyfin::JellyfinClient;
use jellystream_core::models::ScheduleEntry;
use jellystream_core::sidecar::apply_path_map;
use tracing::{debug, warn};

/// Resolve the transcoder input for a schedule entry: prefer a local file
/// (cheapest, supports `-ss` seeking directly), fall back to a media-server
/// direct-stream URL over HTTP (spec §4.6 steps 1-2).
pub fn resolve_source(entry: &ScheduleEntry, jellyfin: &JellyfinClient) -> String {
    if let Some(path) = &entry.file_path {
        if !path.is_empty() && Path::new(path).exists() {
            debug!(path, "resolved source from local file");
            return path.clone();
        }
    }
    let url = jellyfin.direct_stream_url(&entry.external_media_item_id);
    warn!(external_media_item_id = %entry.external_media_item_id, "local file unavailable, falling back to HTTP source");
    url
}

/// One item's on-disk verification outcome (spec §4.6 "Collection verification" table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    NoPath,
    Ok,
    Moved { new_path: String },
    Deleted,
}

/// Verify a collection item's stored path against the filesystem, consulting
/// the media server if the stored path is missing.
pub async fn verify_item_path(
    stored_path: Option<&str>,
    external_item_id: &str,
    jellyfin: &JellyfinClient,
    path_rule: Option<&PathMapRule>,
) -> VerificationStatus {
    let Some(stored_path) = stored_path.filter(|p| !p.is_empty()) else {
        return VerificationStatus::NoPath;
    };

    if Path::new(stored_path).exists() {
        return VerificationStatus::Ok;
    }

    match jellyfin.get_item_info(external_item_id).await {
        Ok(item) => match item.path {
            Some(raw_path) if !raw_path.is_empty() => {
                let mapped = apply_path_map(&raw_path, path_rule);
                if Path::new(&mapped).exists() {
                    VerificationStatus::Moved { new_path: mapped }
                } else {
                    VerificationStatus::Deleted
                }
            }
            _ => VerificationStatus::Deleted,
        },
        Err(_) => VerificationStatus::Deleted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_stored_path_is_no_path() {
        assert_eq!(
            verify_item_path(None, "x", &fake_client(), None).await,
            VerificationStatus::NoPath
        );
    }

    #[tokio::test]
    async fn empty_stored_path_is_no_path() {
        assert_eq!(
            verify_item_path(Some(""), "x", &fake_client(), None).await,
            VerificationStatus::NoPath
        );
    }

    fn fake_client() -> JellyfinClient {
        JellyfinClient::new(&jellystream_core::config::MediaServerConfig {
            url: "http://jf.invalid".to_string(),
            api_key: "key".to_string(),
            user_id: "user-1".to_string(),
        })
    }
}
