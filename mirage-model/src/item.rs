use chrono::{DateTime, Utc};

/// The kind of media entity an item record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    Movie,
    Series,
    Episode,
    BoxSet,
    #[default]
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

/// Where an item's content lives.
///
/// `Virtual` marks a placeholder: an entry synthesized from locally cached
/// catalog metadata with no playable content upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocationType {
    #[default]
    FileSystem,
    Virtual,
}

/// A displayable item record in the client-facing protocol.
///
/// For native items `id` is the upstream server's own id, so client actions
/// against it resolve upstream without translation. For placeholders `id` is
/// a virtual token and `location_type` is [`LocationType::Virtual`]; no
/// playback-capable fields exist on placeholders.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "PascalCase")
)]
pub struct MediaItem {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub sort_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "Type", default))]
    pub kind: ItemKind,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub overview: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub date_created: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub community_rating: Option<f32>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub production_year: Option<i32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub location_type: LocationType,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub image_url: Option<String>,
}

impl MediaItem {
    pub fn is_placeholder(&self) -> bool {
        self.location_type == LocationType::Virtual
    }

    /// The key used for name ordering: the explicit sort name when the
    /// catalog provides one, the display name otherwise. Lowercased so
    /// ordering is case-insensitive.
    pub fn sort_key_name(&self) -> String {
        self.sort_name
            .as_deref()
            .unwrap_or(&self.name)
            .to_lowercase()
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_pascal_case() {
        let item = MediaItem {
            id: "8f3c1a2b".into(),
            name: "Stalker".into(),
            sort_name: None,
            kind: ItemKind::Movie,
            overview: None,
            date_created: None,
            community_rating: Some(8.1),
            production_year: Some(1979),
            location_type: LocationType::FileSystem,
            image_url: None,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["Id"], "8f3c1a2b");
        assert_eq!(value["Type"], "Movie");
        assert_eq!(value["ProductionYear"], 1979);
        assert_eq!(value["LocationType"], "FileSystem");
        assert!(value.get("Overview").is_none());
    }

    #[test]
    fn unknown_kind_deserializes() {
        let value = serde_json::json!({
            "Id": "x",
            "Name": "y",
            "Type": "MusicVideo",
        });
        let item: MediaItem = serde_json::from_value(value).unwrap();
        assert_eq!(item.kind, ItemKind::Unknown);
    }

    #[test]
    fn sort_key_prefers_sort_name() {
        let mut item = MediaItem {
            id: "a".into(),
            name: "The Mirror".into(),
            sort_name: Some("Mirror".into()),
            kind: ItemKind::Movie,
            overview: None,
            date_created: None,
            community_rating: None,
            production_year: None,
            location_type: LocationType::FileSystem,
            image_url: None,
        };
        assert_eq!(item.sort_key_name(), "mirror");
        item.sort_name = None;
        assert_eq!(item.sort_key_name(), "the mirror");
    }
}
