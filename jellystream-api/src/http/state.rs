use std::sync::Arc;

use jellystream_core::config::Config;
use jellystream_core::context::Context;
use jellystream_stream::GeneratorConfig;

#[derive(Clone)]
pub struct AppState {
    pub ctx: Context,
    pub config: Arc<Config>,
    pub generator_config: GeneratorConfig,
}

impl AppState {
    #[must_use]
    pub fn new(ctx: Context, config: Arc<Config>) -> Self {
        let generator_config = GeneratorConfig {
            ffmpeg_path: config.stream.ffmpeg_path.clone(),
            ffprobe_path: config.stream.ffprobe_path.clone(),
            preferred_audio_language: config.stream.preferred_audio_language.clone(),
            gap_poll_seconds: config.stream.gap_poll_seconds,
            chunk_size_bytes: config.stream.chunk_size_bytes,
        };
        Self { ctx, config, generator_config }
    }
}
