use chrono::{DateTime, Utc};

use crate::item::{ItemKind, LocationType, MediaItem};

/// Locally cached catalog metadata for a collection member.
///
/// This is the only data available for a member with no upstream presence;
/// placeholder items are synthesized from it verbatim.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogEntry {
    pub name: String,
    pub sort_name: Option<String>,
    pub kind: ItemKind,
    pub overview: Option<String>,
    pub added_at: Option<DateTime<Utc>>,
    pub community_rating: Option<f32>,
    pub production_year: Option<i32>,
    pub image_url: Option<String>,
}

impl CatalogEntry {
    /// Synthesize a placeholder item under the given virtual token. The
    /// result carries no playback-capable fields.
    pub fn to_placeholder(&self, token: impl Into<String>) -> MediaItem {
        MediaItem {
            id: token.into(),
            name: self.name.clone(),
            sort_name: self.sort_name.clone(),
            kind: self.kind,
            overview: self.overview.clone(),
            date_created: self.added_at,
            community_rating: self.community_rating,
            production_year: self.production_year,
            location_type: LocationType::Virtual,
            image_url: self.image_url.clone(),
        }
    }
}
