use thiserror::Error;

/// Error taxonomy for the stream proxy (spec §7 table).
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("no schedule entry covers the current instant")]
    ScheduleGap,

    #[error("channel is disabled")]
    ChannelDisabled,

    #[error("transcoder binary not found: {0}")]
    TranscoderMissing(String),

    #[error("source resolution failed: {0}")]
    SourceResolutionFailed(String),

    #[error("core error: {0}")]
    Core(#[from] jellystream_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;
