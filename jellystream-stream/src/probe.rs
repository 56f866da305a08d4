//! Preferred-audio probing (spec §4.5). Runs `ffprobe` against a source and
//! picks the audio stream whose language tag matches the configured
//! preference, falling back to "use the first audio track" on any failure.

use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    #[serde(default)]
    codec_type: String,
    #[serde(default)]
    tags: Option<FfprobeTags>,
}

#[derive(Debug, Deserialize, Default)]
struct FfprobeTags {
    #[serde(default, alias = "LANGUAGE")]
    language: Option<String>,
}

/// Probe `source` for its audio streams and return the index (relative to
/// the audio-only stream order, as consumed by `-map 0:a:{idx}`) of the
/// stream whose language tag matches `preferred_language`. `None` means
/// "use the first audio track" — returned on timeout, parse failure, or no
/// match, per spec §4.5.
pub async fn probe_preferred_audio(ffprobe_path: &str, source: &str, preferred_language: &str) -> Option<usize> {
    let run = Command::new(ffprobe_path)
        .args(["-v", "quiet", "-print_format", "json", "-show_streams", "-select_streams", "a"])
        .arg(source)
        .output();

    let output = match timeout(PROBE_TIMEOUT, run).await {
        Ok(Ok(output)) if output.status.success() => output,
        Ok(Ok(output)) => {
            warn!(status = %output.status, "ffprobe exited non-zero, using first audio track");
            return None;
        }
        Ok(Err(e)) => {
            warn!(error = %e, "failed to spawn ffprobe, using first audio track");
            return None;
        }
        Err(_) => {
            warn!("ffprobe probe timed out after {PROBE_TIMEOUT:?}, using first audio track");
            return None;
        }
    };

    let parsed: FfprobeOutput = match serde_json::from_slice(&output.stdout) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "failed to parse ffprobe output, using first audio track");
            return None;
        }
    };

    let audio_streams: Vec<&FfprobeStream> = parsed.streams.iter().filter(|s| s.codec_type == "audio").collect();
    debug!(count = audio_streams.len(), "probed audio streams");

    audio_streams.iter().position(|s| {
        s.tags
            .as_ref()
            .and_then(|t| t.language.as_deref())
            .is_some_and(|lang| language_matches(lang, preferred_language))
    })
}

/// Case-insensitive match, also comparing the first two letters so
/// ISO-639-1 (`en`) and ISO-639-2 (`eng`) codes are interchangeable.
fn language_matches(candidate: &str, preferred: &str) -> bool {
    let candidate = candidate.to_lowercase();
    let preferred = preferred.to_lowercase();
    if candidate == preferred {
        return true;
    }
    candidate.len() >= 2 && preferred.len() >= 2 && candidate[..2] == preferred[..2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_matches_exact() {
        assert!(language_matches("eng", "eng"));
    }

    #[test]
    fn language_matches_case_insensitive() {
        assert!(language_matches("ENG", "eng"));
    }

    #[test]
    fn language_matches_iso_639_1_against_iso_639_2() {
        assert!(language_matches("en", "eng"));
        assert!(language_matches("eng", "en"));
    }

    #[test]
    fn language_does_not_match_unrelated_code() {
        assert!(!language_matches("fre", "eng"));
    }

    #[test]
    fn ffprobe_output_parses_language_tag() {
        let json = r#"{"streams":[{"codec_type":"audio","tags":{"language":"jpn"}},{"codec_type":"audio","tags":{"language":"eng"}}]}"#;
        let parsed: FfprobeOutput = serde_json::from_str(json).unwrap();
        let audio: Vec<&FfprobeStream> = parsed.streams.iter().filter(|s| s.codec_type == "audio").collect();
        let idx = audio.iter().position(|s| {
            s.tags.as_ref().and_then(|t| t.language.as_deref()).is_some_and(|l| language_matches(l, "eng"))
        });
        assert_eq!(idx, Some(1));
    }
}
