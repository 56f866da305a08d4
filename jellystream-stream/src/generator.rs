//! The continuous stream generator (spec §4.4, §9 "explicit state machine").
//!
//! Modelled as `{LookingForEntry, Transcoding, Gapping, Failing}` with
//! explicit transitions on child exit, client cancel, and clock tick,
//! instead of one deeply nested loop.

use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use jellystream_core::context::Context;
use jellystream_core::models::{ChannelId, ScheduleEntry};
use tokio::io::AsyncReadExt;
use tokio::process::Child;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{Result, StreamError};
use crate::probe::probe_preferred_audio;
use crate::source::resolve_source;
use crate::transcoder::{build_args, kill_and_reap, spawn};

/// Tuning knobs the generator needs from `StreamConfig`, passed by value so
/// the generator doesn't hold a `Config` reference across awaits.
#[derive(Clone)]
pub struct GeneratorConfig {
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub preferred_audio_language: String,
    pub gap_poll_seconds: u64,
    pub chunk_size_bytes: usize,
}

/// Why the very first spawn attempt failed — these map directly to the
/// initial-call status codes in spec §4.4 (404 / 503); subsequent failures
/// mid-stream are handled internally by the generator loop and never
/// surface to the caller.
pub enum StartError {
    NoEntryScheduled,
    TranscoderMissing(String),
}

enum State {
    LookingForEntry,
    Transcoding(Box<Child>),
    Gapping,
    Failing { retry_seconds: u64 },
    Cancelled,
}

pub struct ContinuousGenerator {
    ctx: Context,
    channel_id: ChannelId,
    config: GeneratorConfig,
}

impl ContinuousGenerator {
    #[must_use]
    pub fn new(ctx: Context, channel_id: ChannelId, config: GeneratorConfig) -> Self {
        Self { ctx, channel_id, config }
    }

    /// Find the current entry and spawn the first transcoder, surfacing the
    /// two error conditions the HTTP layer must translate to a status code
    /// before any response bytes are sent.
    pub async fn start(&self) -> std::result::Result<(Child, ScheduleEntry), StartError> {
        let now = Utc::now();
        let entry = self
            .ctx
            .schedule_entries
            .current_entry(self.channel_id, now)
            .await
            .ok()
            .flatten()
            .ok_or(StartError::NoEntryScheduled)?;

        match self.spawn_for_entry(&entry, now).await {
            Ok(child) => Ok((child, entry)),
            Err(StreamError::TranscoderMissing(path)) => Err(StartError::TranscoderMissing(path)),
            Err(_) => Err(StartError::NoEntryScheduled),
        }
    }

    async fn spawn_for_entry(&self, entry: &ScheduleEntry, now: chrono::DateTime<Utc>) -> Result<Child> {
        let offset_seconds = entry.offset_seconds(now);
        let source = resolve_source(entry, &self.ctx.jellyfin);
        let audio_idx =
            probe_preferred_audio(&self.config.ffprobe_path, &source, &self.config.preferred_audio_language).await;
        let args = build_args(offset_seconds, &source, audio_idx);
        spawn(&self.config.ffmpeg_path, &args)
    }

    /// Drive the state machine forever, forwarding MPEG-TS bytes to `tx`.
    /// Returns when the receiver is dropped (client disconnected).
    pub async fn run(self, first_child: Child, tx: mpsc::UnboundedSender<std::io::Result<Bytes>>) {
        let mut state = State::Transcoding(Box::new(first_child));
        loop {
            state = match state {
                State::LookingForEntry => self.look_for_entry().await,
                State::Gapping => {
                    sleep(Duration::from_secs(self.config.gap_poll_seconds)).await;
                    State::LookingForEntry
                }
                State::Failing { retry_seconds } => {
                    sleep(Duration::from_secs(retry_seconds)).await;
                    State::LookingForEntry
                }
                State::Transcoding(child) => self.drive_transcoding(*child, &tx).await,
                State::Cancelled => break,
            };
        }
        info!(channel_id = %self.channel_id, "continuous generator stopped");
    }

    async fn look_for_entry(&self) -> State {
        let now = Utc::now();
        match self.ctx.schedule_entries.current_entry(self.channel_id, now).await {
            Ok(Some(entry)) => {
                let remaining = entry.remaining_seconds(now) as u64;
                match self.spawn_for_entry(&entry, now).await {
                    Ok(child) => State::Transcoding(Box::new(child)),
                    Err(e) => {
                        warn!(channel_id = %self.channel_id, error = %e, "failed to spawn transcoder, retrying");
                        State::Failing { retry_seconds: remaining.min(30) }
                    }
                }
            }
            Ok(None) => State::Gapping,
            Err(e) => {
                warn!(channel_id = %self.channel_id, error = %e, "failed to look up current schedule entry");
                State::Gapping
            }
        }
    }

    async fn drive_transcoding(&self, mut child: Child, tx: &mpsc::UnboundedSender<std::io::Result<Bytes>>) -> State {
        let Some(mut stdout) = child.stdout.take() else {
            kill_and_reap(&mut child).await;
            return State::LookingForEntry;
        };

        let mut buf = vec![0u8; self.config.chunk_size_bytes];
        loop {
            match stdout.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(Ok(Bytes::copy_from_slice(&buf[..n]))).is_err() {
                        kill_and_reap(&mut child).await;
                        return State::Cancelled;
                    }
                }
                Err(e) => {
                    warn!(channel_id = %self.channel_id, error = %e, "transcoder stdout read failed");
                    break;
                }
            }
        }

        kill_and_reap(&mut child).await;
        sleep(Duration::from_millis(200)).await;
        State::LookingForEntry
    }
}
