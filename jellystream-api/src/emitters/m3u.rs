//! M3U playlist emitter (spec §4.8).

use std::fmt::Write as _;

use jellystream_core::models::Channel;

/// Render an `#EXTM3U` playlist for the given (already-filtered-to-enabled)
/// channels.
#[must_use]
pub fn render_m3u(channels: &[Channel], public_base_url: &str) -> String {
    let base = public_base_url.trim_end_matches('/');
    let mut out = String::from("#EXTM3U\n");

    for channel in channels {
        let number = display_number(channel);
        let _ = writeln!(
            out,
            "#EXTINF:-1 tvg-id=\"{}\" tvg-name=\"{}\" tvg-chno=\"{}\" group-title=\"JellyStream\",{} {}",
            channel.id, channel.name, number, number, channel.name
        );
        let _ = writeln!(out, "{base}/api/livetv/stream/{}", channel.id);
    }

    out
}

fn display_number(channel: &Channel) -> String {
    channel
        .channel_number
        .clone()
        .unwrap_or_else(|| format!("100.{}", channel.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jellystream_core::models::{ChannelId, ScheduleType};

    fn channel(id: i64, number: Option<&str>, name: &str) -> Channel {
        Channel {
            id: ChannelId::new(id),
            name: name.to_string(),
            channel_number: number.map(str::to_string),
            enabled: true,
            schedule_type: ScheduleType::GenreAuto,
            schedule_generated_through: None,
        }
    }

    #[test]
    fn renders_header_and_entries() {
        let channels = vec![channel(7, Some("7"), "Sci-Fi Channel")];
        let m3u = render_m3u(&channels, "http://jellystream.example.lan:8080/");
        assert!(m3u.starts_with("#EXTM3U\n"));
        assert!(m3u.contains("tvg-id=\"7\""));
        assert!(m3u.contains("tvg-chno=\"7\""));
        assert!(m3u.contains("http://jellystream.example.lan:8080/api/livetv/stream/7"));
    }

    #[test]
    fn falls_back_to_default_channel_number() {
        let channels = vec![channel(42, None, "Unnumbered")];
        let m3u = render_m3u(&channels, "http://base");
        assert!(m3u.contains("tvg-chno=\"100.42\""));
    }
}
