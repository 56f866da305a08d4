//! The transcoder process supervisor (spec §4.4). Wraps one `ffmpeg` child
//! process producing an MPEG-TS byte stream on stdout, owned exclusively by
//! the connection that spawned it.

use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::error::{Result, StreamError};

/// Build the `ffmpeg` argument list for one programme slot (spec §4.4):
/// seek before input, select the video stream and the chosen (or first)
/// audio stream, scale to 1080p preserving aspect ratio, H.264/AAC encode
/// tuned for low-latency continuous output, MPEG-TS to stdout.
#[must_use]
pub fn build_args(offset_seconds: i64, source: &str, audio_idx: Option<usize>) -> Vec<String> {
    let audio_map = format!("0:a:{}", audio_idx.unwrap_or(0));
    vec![
        "-ss".to_string(),
        offset_seconds.max(0).to_string(),
        "-i".to_string(),
        source.to_string(),
        "-map".to_string(),
        "0:v:0".to_string(),
        "-map".to_string(),
        audio_map,
        "-vf".to_string(),
        "scale=-2:1080".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-tune".to_string(),
        "zerolatency".to_string(),
        "-crf".to_string(),
        "20".to_string(),
        "-maxrate".to_string(),
        "8000k".to_string(),
        "-bufsize".to_string(),
        "4000k".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        "-ac".to_string(),
        "2".to_string(),
        "-f".to_string(),
        "mpegts".to_string(),
        "-loglevel".to_string(),
        "warning".to_string(),
        "pipe:1".to_string(),
    ]
}

/// Spawn `ffmpeg` with the given arguments, stdout piped for the MPEG-TS
/// body and stderr piped so a startup failure can be logged.
pub fn spawn(ffmpeg_path: &str, args: &[String]) -> Result<Child> {
    debug!(ffmpeg_path, argc = args.len(), "spawning transcoder");
    Command::new(ffmpeg_path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StreamError::TranscoderMissing(ffmpeg_path.to_string())
            } else {
                StreamError::Io(e)
            }
        })
}

/// Kill and reap a transcoder child, idempotent if it already exited
/// (spec §4.4 "kill it (idempotent), reap").
pub async fn kill_and_reap(child: &mut Child) {
    let _ = child.kill().await;
    let _ = child.wait().await;
    info!("transcoder process reaped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_args_seeks_before_input() {
        let args = build_args(1798, "/media/a.mkv", None);
        let ss_pos = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss_pos + 1], "1798");
        let i_pos = args.iter().position(|a| a == "-i").unwrap();
        assert!(i_pos > ss_pos, "-ss must precede -i for fast seeking");
    }

    #[test]
    fn build_args_clamps_negative_offset_to_zero() {
        let args = build_args(-5, "/media/a.mkv", None);
        let ss_pos = args.iter().position(|a| a == "-ss").unwrap();
        assert_eq!(args[ss_pos + 1], "0");
    }

    #[test]
    fn build_args_maps_chosen_audio_stream() {
        let args = build_args(0, "/media/a.mkv", Some(2));
        assert!(args.windows(2).any(|w| w == ["-map", "0:a:2"]));
    }

    #[test]
    fn build_args_defaults_to_first_audio_stream() {
        let args = build_args(0, "/media/a.mkv", None);
        assert!(args.windows(2).any(|w| w == ["-map", "0:a:0"]));
    }

    #[test]
    fn build_args_outputs_mpegts_to_stdout() {
        let args = build_args(0, "/media/a.mkv", None);
        assert!(args.windows(2).any(|w| w == ["-f", "mpegts"]));
        assert_eq!(args.last().unwrap(), "pipe:1");
    }

    #[tokio::test]
    async fn spawn_reports_transcoder_missing_for_bad_path() {
        let err = spawn("definitely-not-a-real-binary-xyz", &[]).unwrap_err();
        assert!(matches!(err, StreamError::TranscoderMissing(_)));
    }
}
