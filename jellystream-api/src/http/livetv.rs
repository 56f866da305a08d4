//! Playlist, EPG, thumbnail and stream endpoints (spec §6).

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use jellystream_core::models::ChannelId;
use jellystream_stream::{ContinuousGenerator, StartError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};

use super::error::{AppError, AppResult};
use super::state::AppState;
use crate::emitters::{m3u, xmltv};

pub async fn m3u_all(State(state): State<AppState>) -> AppResult<Response> {
    let channels = state.ctx.channels.list_enabled().await?;
    let body = m3u::render_m3u(&channels, &state.config.public_url);
    Ok(mpegurl_response(body))
}

pub async fn m3u_one(Path(channel_id): Path<i64>, State(state): State<AppState>) -> AppResult<Response> {
    let channel = state.ctx.channels.get(ChannelId::new(channel_id)).await?;
    let body = m3u::render_m3u(std::slice::from_ref(&channel), &state.config.public_url);
    Ok(mpegurl_response(body))
}

fn mpegurl_response(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/x-mpegURL")],
        body,
    )
        .into_response()
}

pub async fn xmltv_all(State(state): State<AppState>) -> AppResult<Response> {
    let channels = state.ctx.channels.list_enabled().await?;
    let (window_start, window_end) = xmltv::window(Utc::now());
    let mut channels_with_entries = Vec::with_capacity(channels.len());
    for channel in channels {
        let entries = state
            .ctx
            .schedule_entries
            .entries_in_window(channel.id, window_start, window_end)
            .await?;
        channels_with_entries.push((channel, entries));
    }
    let body = xmltv::render_xmltv(&channels_with_entries, &state.config.public_url);
    Ok(xml_response(body))
}

pub async fn xmltv_one(Path(channel_id): Path<i64>, State(state): State<AppState>) -> AppResult<Response> {
    let channel_id = ChannelId::new(channel_id);
    let channel = state.ctx.channels.get(channel_id).await?;
    let (window_start, window_end) = xmltv::window(Utc::now());
    let entries = state
        .ctx
        .schedule_entries
        .entries_in_window(channel_id, window_start, window_end)
        .await?;
    let body = xmltv::render_xmltv(&[(channel, entries)], &state.config.public_url);
    Ok(xml_response(body))
}

fn xml_response(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/xml")], body).into_response()
}

pub async fn thumbnail(
    Path(entry_id): Path<i64>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let entry = state
        .ctx
        .schedule_entries
        .get(jellystream_core::models::ScheduleEntryId::new(entry_id))
        .await?;
    let Some(path) = entry.thumbnail_path.filter(|p| !p.is_empty()) else {
        return Err(AppError::not_found("no thumbnail for this entry"));
    };
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::not_found("thumbnail file missing on disk"))?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}

/// `HEAD /api/livetv/stream/{channel_id}` — probe without spawning a transcoder.
pub async fn stream_probe(Path(channel_id): Path<i64>, State(state): State<AppState>) -> AppResult<Response> {
    let channel_id = ChannelId::new(channel_id);
    let channel = state.ctx.channels.get(channel_id).await?;
    if !channel.enabled {
        return Err(AppError::forbidden("channel is disabled"));
    }
    let current = state
        .ctx
        .schedule_entries
        .current_entry(channel_id, Utc::now())
        .await?;
    if current.is_none() {
        return Err(AppError::not_found("no schedule entry covers the current instant"));
    }
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "video/mp2t")],
    )
        .into_response())
}

/// `GET /api/livetv/stream/{channel_id}` — endless MPEG-TS (spec §4.4).
pub async fn stream(Path(channel_id): Path<i64>, State(state): State<AppState>) -> AppResult<Response> {
    let channel_id = ChannelId::new(channel_id);
    let channel = state.ctx.channels.get(channel_id).await?;
    if !channel.enabled {
        return Err(AppError::forbidden("channel is disabled"));
    }

    let generator = ContinuousGenerator::new(state.ctx.clone(), channel_id, state.generator_config.clone());
    let (first_child, entry) = match generator.start().await {
        Ok(pair) => pair,
        Err(StartError::NoEntryScheduled) => {
            return Err(AppError::not_found("no schedule entry covers the current instant"));
        }
        Err(StartError::TranscoderMissing(path)) => {
            warn!(ffmpeg_path = %path, "transcoder binary unavailable");
            return Err(AppError::service_unavailable("transcoder is unavailable"));
        }
    };

    info!(channel_id = %channel_id, entry_id = %entry.id, "stream connection started");

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(generator.run(first_child, tx));

    let body = Body::from_stream(UnboundedReceiverStream::new(rx));
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp2t")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .map_err(|_| AppError::internal("failed to build streaming response"))?
        .into_response())
}
