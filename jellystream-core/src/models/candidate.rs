use super::enums::ScheduledItemType;
use crate::sidecar::SidecarEnrichment;

/// Where a candidate came from, carried as a variant rather than a
/// dictionary-key check on a "pre-enriched" flag (spec §9 redesign note:
/// "dynamic item dicts -> tagged variants").
#[derive(Debug, Clone)]
pub enum CandidateSource {
    /// Came from a library query; still needs sidecar enrichment at fill
    /// time (§4.3 step 5).
    Library { path: Option<String> },
    /// Came from a curated collection; already carries whatever enrichment
    /// the collection item had stored, so the fill loop skips sidecar I/O.
    Collection {
        path: Option<String>,
        enrichment: Option<SidecarEnrichment>,
    },
}

impl CandidateSource {
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            CandidateSource::Library { path } | CandidateSource::Collection { path, .. } => {
                path.as_deref()
            }
        }
    }

    #[must_use]
    pub fn is_pre_enriched(&self) -> bool {
        matches!(self, CandidateSource::Collection { .. })
    }
}

/// One schedulable candidate programme circulating through the pool builder
/// and generator.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub external_id: String,
    pub title: String,
    pub series_name: Option<String>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub item_type: ScheduledItemType,
    pub duration_seconds: i64,
    pub genres: Vec<String>,
    pub library_id: Option<String>,
    pub source: CandidateSource,
}

impl Candidate {
    #[must_use]
    pub fn genres_intersect(&self, other: &[String]) -> bool {
        self.genres.iter().any(|g| {
            other
                .iter()
                .any(|o| o.eq_ignore_ascii_case(g))
        })
    }
}
