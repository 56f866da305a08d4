//! Schedule generation and tuner/EPG registration endpoints (spec §6).

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use jellystream_core::models::ChannelId;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::{AppError, AppResult};
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateScheduleQuery {
    #[serde(default = "default_days")]
    pub days: i64,
    #[serde(default)]
    pub reset: bool,
}

fn default_days() -> i64 {
    7
}

#[derive(Debug, Serialize)]
pub struct GenerateScheduleResponse {
    pub entries_created: usize,
}

pub async fn generate_schedule(
    Path(channel_id): Path<i64>,
    Query(query): Query<GenerateScheduleQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    if query.days <= 0 {
        return Err(AppError::bad_request("days must be a positive integer"));
    }
    let channel_id = ChannelId::new(channel_id);
    let entries_created = if query.reset {
        jellystream_core::schedule::reset_and_generate(&state.ctx, channel_id, query.days).await?
    } else {
        jellystream_core::schedule::generate(&state.ctx, channel_id, query.days).await?
    };
    Ok(Json(GenerateScheduleResponse { entries_created }))
}

/// `POST /api/channels/{id}/register-livetv` — register a tuner host and
/// listing provider pointing at this channel's M3U/XMLTV endpoints. Partial
/// failures are rolled back before returning (spec §7).
pub async fn register_livetv(
    Path(channel_id): Path<i64>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let channel_id = ChannelId::new(channel_id);
    let channel = state.ctx.channels.get(channel_id).await?;
    let base = state.config.public_url.trim_end_matches('/');
    let tuner_url = format!("{base}/api/livetv/m3u/all");
    let xmltv_url = format!("{base}/api/livetv/xmltv/all");
    let friendly_name = format!("JellyStream - {}", channel.name);

    let tuner = state.ctx.jellyfin.register_tuner_host(&tuner_url, &friendly_name).await;
    let tuner = match tuner {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "register-livetv: tuner host registration failed");
            return Err(AppError::bad_gateway("tuner host registration failed"));
        }
    };

    let listing = state
        .ctx
        .jellyfin
        .register_listing_provider(&xmltv_url, &friendly_name)
        .await;
    if let Err(e) = listing {
        warn!(error = %e, "register-livetv: listing provider registration failed, rolling back tuner host");
        if let Some(tuner_id) = tuner.get("Id").and_then(|v| v.as_str()) {
            let _ = state.ctx.jellyfin.unregister_tuner_host(tuner_id).await;
        }
        return Err(AppError::bad_gateway("listing provider registration failed; tuner host rolled back"));
    }

    Ok(Json(serde_json::json!({ "tuner": tuner, "listing": listing.unwrap() })))
}

/// `DELETE /api/channels/{id}/register-livetv` — tear down both bindings.
/// The channel id in the path is kept for symmetry with the POST route and
/// audit logging, even though unregistration is keyed on the ids the media
/// server assigned.
pub async fn unregister_livetv(
    Path(channel_id): Path<i64>,
    Query(query): Query<UnregisterQuery>,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let mut failures = Vec::new();

    if let Some(tuner_id) = &query.tuner_host_id {
        if !matches!(state.ctx.jellyfin.unregister_tuner_host(tuner_id).await, Ok(true)) {
            failures.push("tuner_host");
        }
    }
    if let Some(provider_id) = &query.listing_provider_id {
        if !matches!(
            state.ctx.jellyfin.unregister_listing_provider(provider_id).await,
            Ok(true)
        ) {
            failures.push("listing_provider");
        }
    }

    if failures.is_empty() {
        Ok(axum::http::StatusCode::NO_CONTENT)
    } else {
        warn!(channel_id = %channel_id, failed_legs = ?failures, "register-livetv teardown incomplete");
        Err(AppError::bad_gateway(format!("failed to unregister: {}", failures.join(", "))))
    }
}

#[derive(Debug, Deserialize)]
pub struct UnregisterQuery {
    pub tuner_host_id: Option<String>,
    pub listing_provider_id: Option<String>,
}
