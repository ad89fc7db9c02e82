/// Library categories as the client protocol names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CollectionType {
    Movies,
    TvShows,
    Music,
    BoxSets,
    #[default]
    #[cfg_attr(feature = "serde", serde(other))]
    Mixed,
}

/// A top-level library as presented to clients.
///
/// Native views carry the upstream server's own id; virtual views carry a
/// virtual token and always report a boxset-like collection type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "PascalCase")
)]
pub struct View {
    pub id: String,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub collection_type: CollectionType,
}
