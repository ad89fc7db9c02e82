//! Convenience re-exports for downstream crates.

pub use crate::catalog::CatalogEntry;
pub use crate::error::ModelError;
pub use crate::ids::CollectionId;
pub use crate::item::{ItemKind, LocationType, MediaItem};
pub use crate::page::Page;
pub use crate::query::{
    ItemFilter, ItemsQuery, PageSpec, SortField, SortOrder, SortSpec,
};
pub use crate::view::{CollectionType, View};
