//! XMLTV EPG emitter (spec §4.8).

use std::fmt::Write as _;

use chrono::{DateTime, Duration, Utc};
use jellystream_core::models::{Channel, ScheduleEntry, ScheduledItemType};

/// The programme window XMLTV is rendered for: three hours in the past
/// through seven days ahead of `now`.
#[must_use]
pub fn window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (now - Duration::hours(3), now + Duration::days(7))
}

/// Render a full XMLTV document for a set of channels, each paired with its
/// schedule entries already narrowed to [`window`] and ordered by start time.
#[must_use]
pub fn render_xmltv(channels_with_entries: &[(Channel, Vec<ScheduleEntry>)], public_base_url: &str) -> String {
    let base = public_base_url.trim_end_matches('/');
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<!DOCTYPE tv SYSTEM \"xmltv.dtd\">\n");
    out.push_str("<tv generator-info-name=\"JellyStream\">\n");

    for (channel, _) in channels_with_entries {
        let _ = writeln!(out, "  <channel id=\"{}\">", channel.id);
        let _ = writeln!(out, "    <display-name>{}</display-name>", xml_escape(&channel.name));
        out.push_str("  </channel>\n");
    }

    for (channel, entries) in channels_with_entries {
        for entry in entries {
            render_programme(&mut out, channel, entry, base);
        }
    }

    out.push_str("</tv>\n");
    out
}

fn render_programme(out: &mut String, channel: &Channel, entry: &ScheduleEntry, base: &str) {
    let _ = writeln!(
        out,
        "  <programme start=\"{}\" stop=\"{}\" channel=\"{}\">",
        format_xmltv_time(entry.start_time),
        format_xmltv_time(entry.end_time),
        channel.id
    );

    let title = entry.series_name.as_deref().unwrap_or(&entry.title);
    let _ = writeln!(out, "    <title>{}</title>", xml_escape(title));

    if entry.series_name.is_some() {
        let _ = writeln!(out, "    <sub-title>{}</sub-title>", xml_escape(&entry.title));
    }

    if let Some(description) = &entry.description {
        let _ = writeln!(out, "    <desc lang=\"en\">{}</desc>", xml_escape(description));
    }

    if let Some(thumbnail) = &entry.thumbnail_path {
        if !thumbnail.is_empty() {
            let _ = writeln!(out, "    <icon src=\"{base}/api/livetv/thumbnail/{}\"/>", entry.id);
        }
    }

    if let Some(air_date) = &entry.air_date {
        let digits: String = air_date.chars().filter(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            let _ = writeln!(out, "    <date>{digits}</date>");
        }
    }

    let _ = writeln!(out, "    <category>{}</category>", category_label(entry.item_type));
    for genre in entry.genre_list() {
        let _ = writeln!(out, "    <category>{}</category>", xml_escape(&genre));
    }

    if let (Some(season), Some(episode)) = (entry.season_number, entry.episode_number) {
        let _ = writeln!(
            out,
            "    <episode-num system=\"xmltv_ns\">{}.{}.</episode-num>",
            (season - 1).max(0),
            (episode - 1).max(0)
        );
    }

    if let Some(rating) = &entry.content_rating {
        out.push_str("    <rating system=\"MPAA\">\n");
        let _ = writeln!(out, "      <value>{}</value>", xml_escape(rating));
        out.push_str("    </rating>\n");
    }

    out.push_str("  </programme>\n");
}

fn category_label(item_type: ScheduledItemType) -> &'static str {
    match item_type {
        ScheduledItemType::Movie => "Movie",
        ScheduledItemType::Episode => "Episode",
    }
}

fn format_xmltv_time(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%d%H%M%S +0000").to_string()
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use jellystream_core::models::{ChannelId, ScheduleEntryId, ScheduleType};
    use chrono::TimeZone;

    fn channel() -> Channel {
        Channel {
            id: ChannelId::new(1),
            name: "Cartoons & Co.".into(),
            channel_number: Some("1".into()),
            enabled: true,
            schedule_type: ScheduleType::GenreAuto,
            schedule_generated_through: None,
        }
    }

    fn episode_entry(start: DateTime<Utc>, end: DateTime<Utc>) -> ScheduleEntry {
        ScheduleEntry {
            id: ScheduleEntryId::new(5),
            channel_id: ChannelId::new(1),
            title: "Pilot".into(),
            series_name: Some("Example Show".into()),
            season_number: Some(1),
            episode_number: Some(1),
            external_media_item_id: "ext-1".into(),
            library_id: Some("lib-1".into()),
            item_type: ScheduledItemType::Episode,
            genres: serde_json::json!(["Comedy"]),
            start_time: start,
            end_time: end,
            duration_seconds: (end - start).num_seconds(),
            file_path: None,
            description: Some("A show about \"testing\" & friends".into()),
            content_rating: Some("TV-PG".into()),
            thumbnail_path: Some("thumb.jpg".into()),
            air_date: Some("2020-01-02".into()),
        }
    }

    #[test]
    fn window_spans_three_hours_back_and_seven_days_forward() {
        let now = Utc.with_ymd_and_hms(2026, 7, 27, 12, 0, 0).unwrap();
        let (start, end) = window(now);
        assert_eq!(start, now - Duration::hours(3));
        assert_eq!(end, now + Duration::days(7));
    }

    #[test]
    fn renders_episode_with_subtitle_and_zero_based_episode_num() {
        let start = Utc.with_ymd_and_hms(2026, 7, 27, 0, 0, 0).unwrap();
        let end = start + Duration::minutes(30);
        let xml = render_xmltv(&[(channel(), vec![episode_entry(start, end)])], "http://base");
        assert!(xml.contains("<title>Example Show</title>"));
        assert!(xml.contains("<sub-title>Pilot</sub-title>"));
        assert!(xml.contains("<episode-num system=\"xmltv_ns\">0.0.</episode-num>"));
        assert!(xml.contains("&amp;"));
        assert!(xml.contains("<icon src=\"http://base/api/livetv/thumbnail/5\"/>"));
        assert!(xml.contains("<date>20200102</date>"));
        assert!(xml.contains("<rating system=\"MPAA\">"));
    }

    #[test]
    fn movie_entry_has_no_subtitle() {
        let start = Utc.with_ymd_and_hms(2026, 7, 27, 0, 0, 0).unwrap();
        let end = start + Duration::hours(2);
        let mut entry = episode_entry(start, end);
        entry.series_name = None;
        entry.season_number = None;
        entry.episode_number = None;
        entry.item_type = ScheduledItemType::Movie;
        let xml = render_xmltv(&[(channel(), vec![entry])], "http://base");
        assert!(!xml.contains("<sub-title>"));
        assert!(!xml.contains("episode-num"));
        assert!(xml.contains("<category>Movie</category>"));
    }
}
