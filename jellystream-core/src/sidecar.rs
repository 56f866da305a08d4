//! `.nfo` sidecar metadata and poster/thumbnail lookup (spec §4.1).

use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::config::PathMapRule;

/// Identifies what kind of item a sidecar lookup is for, carrying just
/// enough filesystem context to build the candidate paths in the spec's
/// lookup tables.
#[derive(Debug, Clone)]
pub enum ItemLocation {
    Movie { video_path: PathBuf },
    Series { series_root: PathBuf },
    Season {
        series_root: PathBuf,
        season_dir: PathBuf,
        season_number: u32,
    },
    Episode { video_path: PathBuf },
}

fn basename_without_ext(video_path: &Path) -> PathBuf {
    let dir = video_path.parent().unwrap_or_else(|| Path::new(""));
    let stem = video_path.file_stem().unwrap_or_default();
    dir.join(stem)
}

/// NFO candidate paths, first hit wins (spec §4.1 table).
fn nfo_candidates(location: &ItemLocation) -> Vec<PathBuf> {
    match location {
        ItemLocation::Movie { video_path } => {
            let dir = video_path.parent().unwrap_or_else(|| Path::new(""));
            let basename = basename_without_ext(video_path);
            vec![dir.join("movie.nfo"), with_ext(&basename, "nfo")]
        }
        ItemLocation::Series { series_root } => vec![series_root.join("tvshow.nfo")],
        ItemLocation::Season { series_root, .. } => vec![series_root.join("tvshow.nfo")],
        ItemLocation::Episode { video_path } => {
            let basename = basename_without_ext(video_path);
            vec![with_ext(&basename, "nfo")]
        }
    }
}

/// Thumbnail candidate paths, first existing file wins (spec §4.1 table).
fn thumbnail_candidates(location: &ItemLocation) -> Vec<PathBuf> {
    match location {
        ItemLocation::Movie { video_path } => {
            let dir = video_path.parent().unwrap_or_else(|| Path::new(""));
            let basename = basename_without_ext(video_path);
            vec![
                dir.join("folder.jpg"),
                with_ext(&basename, "jpg"),
                with_suffixed_ext(&basename, "-thumb", "jpg"),
            ]
        }
        ItemLocation::Series { series_root } => {
            vec![series_root.join("folder.jpg"), series_root.join("poster.jpg")]
        }
        ItemLocation::Season {
            series_root,
            season_dir,
            season_number,
        } => vec![
            series_root.join(format!("season{season_number:02}-poster.jpg")),
            season_dir.join("folder.jpg"),
            series_root.join("folder.jpg"),
        ],
        ItemLocation::Episode { video_path } => {
            let dir = video_path.parent().unwrap_or_else(|| Path::new(""));
            let basename = basename_without_ext(video_path);
            vec![
                with_suffixed_ext(&basename, "-thumb", "jpg"),
                with_ext(&basename, "jpg"),
                dir.join("folder.jpg"),
            ]
        }
    }
}

fn with_ext(base: &Path, ext: &str) -> PathBuf {
    let mut p = base.as_os_str().to_owned();
    p.push(".");
    p.push(ext);
    PathBuf::from(p)
}

fn with_suffixed_ext(base: &Path, suffix: &str, ext: &str) -> PathBuf {
    let mut p = base.as_os_str().to_owned();
    p.push(suffix);
    p.push(".");
    p.push(ext);
    PathBuf::from(p)
}

/// Rewrite a media-server-reported path through the single configured
/// prefix rule; paths that don't match the prefix pass through unchanged.
#[must_use]
pub fn apply_path_map(raw: &str, rule: Option<&PathMapRule>) -> String {
    match rule {
        Some(rule) if raw.starts_with(&rule.jellyfin_prefix) => {
            format!("{}{}", rule.local_prefix, &raw[rule.jellyfin_prefix.len()..])
        }
        _ => raw.to_string(),
    }
}

#[must_use]
pub fn locate_nfo(location: &ItemLocation) -> Option<PathBuf> {
    nfo_candidates(location).into_iter().find(|p| p.is_file())
}

#[must_use]
pub fn locate_thumbnail(location: &ItemLocation) -> Option<PathBuf> {
    thumbnail_candidates(location).into_iter().find(|p| p.is_file())
}

/// Fields this module can contribute to a candidate/schedule entry. `None`
/// means "not yet known"; the caller's own values always win over NFO data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidecarEnrichment {
    pub description: Option<String>,
    pub content_rating: Option<String>,
    pub air_date: Option<String>,
    pub genres: Option<Vec<String>>,
    pub thumbnail_path: Option<String>,
}

/// Parse the handful of elements JellyStream cares about out of an NFO
/// file. Malformed XML yields an empty result rather than an error, per
/// spec §4.1 ("parse errors yield an empty result").
fn parse_nfo(path: &Path) -> SidecarEnrichment {
    let Ok(bytes) = std::fs::read(path) else {
        return SidecarEnrichment::default();
    };
    parse_nfo_bytes(&bytes)
}

fn parse_nfo_bytes(bytes: &[u8]) -> SidecarEnrichment {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut result = SidecarEnrichment::default();
    let mut genres: Vec<String> = Vec::new();
    let mut premiered: Option<String> = None;
    let mut year: Option<String> = None;
    let mut current: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                current = Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Text(t)) => {
                let Ok(text) = t.unescape() else {
                    continue;
                };
                let text = text.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                match current.as_deref() {
                    Some("plot") => result.description = Some(text),
                    Some("mpaa") => result.content_rating = Some(text),
                    Some("aired") => result.air_date = Some(text),
                    Some("premiered") => premiered = Some(text),
                    Some("year") => year = Some(text),
                    Some("genre") => genres.push(text),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(_) => return SidecarEnrichment::default(),
            _ => {}
        }
        buf.clear();
    }

    if result.air_date.is_none() {
        result.air_date = premiered.or(year);
    }
    if !genres.is_empty() {
        result.genres = Some(genres);
    }
    result
}

/// Apply NFO + thumbnail lookup to `existing`, preserving any field the
/// caller already set (contract in spec §4.1: "the caller wins over NFO").
#[must_use]
pub fn enrich(existing: SidecarEnrichment, location: &ItemLocation) -> SidecarEnrichment {
    let mut result = existing;

    if let Some(nfo_path) = locate_nfo(location) {
        let parsed = parse_nfo(&nfo_path);
        if result.description.is_none() {
            result.description = parsed.description;
        }
        if result.content_rating.is_none() {
            result.content_rating = parsed.content_rating;
        }
        if result.air_date.is_none() {
            result.air_date = parsed.air_date;
        }
        if result.genres.as_ref().map_or(true, Vec::is_empty) {
            result.genres = parsed.genres;
        }
    }

    if result.thumbnail_path.is_none() {
        result.thumbnail_path = locate_thumbnail(location)
            .map(|p| p.to_string_lossy().into_owned());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn path_map_rewrites_matching_prefix() {
        let rule = PathMapRule {
            jellyfin_prefix: "/media".into(),
            local_prefix: "/mnt/nas".into(),
        };
        assert_eq!(
            apply_path_map("/media/movies/a.mkv", Some(&rule)),
            "/mnt/nas/movies/a.mkv"
        );
    }

    #[test]
    fn path_map_leaves_non_matching_untouched() {
        let rule = PathMapRule {
            jellyfin_prefix: "/media".into(),
            local_prefix: "/mnt/nas".into(),
        };
        assert_eq!(apply_path_map("/other/a.mkv", Some(&rule)), "/other/a.mkv");
    }

    #[test]
    fn parse_nfo_extracts_plot_mpaa_genres() {
        let xml = br#"<movie>
            <plot>A great movie.</plot>
            <mpaa>PG-13</mpaa>
            <aired>2020-01-02</aired>
            <genre>Sci-Fi</genre>
            <genre>Action</genre>
        </movie>"#;
        let result = parse_nfo_bytes(xml);
        assert_eq!(result.description.as_deref(), Some("A great movie."));
        assert_eq!(result.content_rating.as_deref(), Some("PG-13"));
        assert_eq!(result.air_date.as_deref(), Some("2020-01-02"));
        assert_eq!(result.genres, Some(vec!["Sci-Fi".to_string(), "Action".to_string()]));
    }

    #[test]
    fn parse_nfo_falls_back_through_date_fields() {
        let xml = br#"<movie><premiered>2019-05-01</premiered></movie>"#;
        let result = parse_nfo_bytes(xml);
        assert_eq!(result.air_date.as_deref(), Some("2019-05-01"));
    }

    #[test]
    fn malformed_xml_yields_empty_result() {
        let xml = b"<movie><plot>unterminated";
        let result = parse_nfo_bytes(xml);
        assert_eq!(result, SidecarEnrichment::default());
    }

    #[test]
    fn missing_file_yields_empty_enrichment() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("a.mkv");
        let location = ItemLocation::Movie { video_path: video };
        let result = enrich(SidecarEnrichment::default(), &location);
        assert_eq!(result.description, None);
    }

    #[test]
    fn enrich_preserves_caller_fields_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let video = dir.path().join("a.mkv");
        fs::write(&video, b"fake").unwrap();
        fs::write(
            dir.path().join("movie.nfo"),
            br#"<movie><plot>NFO plot</plot><genre>Drama</genre></movie>"#,
        )
        .unwrap();
        fs::write(dir.path().join("folder.jpg"), b"jpeg").unwrap();

        let location = ItemLocation::Movie { video_path: video };
        let existing = SidecarEnrichment {
            description: Some("caller description".to_string()),
            ..Default::default()
        };

        let once = enrich(existing, &location);
        assert_eq!(once.description.as_deref(), Some("caller description"));
        assert_eq!(once.genres, Some(vec!["Drama".to_string()]));
        assert!(once.thumbnail_path.is_some());

        let twice = enrich(once.clone(), &location);
        assert_eq!(once, twice);
    }
}
