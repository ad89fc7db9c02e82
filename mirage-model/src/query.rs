//! Query parameter types for paginated item listings.
//!
//! Field and value spellings follow the client protocol (`StartIndex`,
//! `SortBy=DateCreated`, ...); parsing is lenient about case and accepts the
//! short aliases clients commonly send.

/// Fields the sort engine can order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    #[default]
    SortName,
    DateCreated,
    CommunityRating,
    ProductionYear,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sortname" | "name" | "title" => Some(SortField::SortName),
            "datecreated" | "dateadded" | "added" => Some(SortField::DateCreated),
            "communityrating" | "rating" => Some(SortField::CommunityRating),
            "productionyear" | "year" => Some(SortField::ProductionYear),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::SortName => "SortName",
            SortField::DateCreated => "DateCreated",
            SortField::CommunityRating => "CommunityRating",
            SortField::ProductionYear => "ProductionYear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ascending" | "asc" => Some(SortOrder::Ascending),
            "descending" | "desc" => Some(SortOrder::Descending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "Ascending",
            SortOrder::Descending => "Descending",
        }
    }
}

/// A complete sort instruction: field plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

/// Filters this layer can answer from its own data. Anything else in the
/// `Filter` parameter concerns upstream state and is ignored here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemFilter {
    /// Keep only items backed by real upstream content.
    IsPresent,
    /// Keep only placeholder items.
    IsPlaceholder,
}

impl ItemFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ispresent" => Some(ItemFilter::IsPresent),
            "isplaceholder" | "ismissing" => Some(ItemFilter::IsPlaceholder),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemFilter::IsPresent => "IsPresent",
            ItemFilter::IsPlaceholder => "IsPlaceholder",
        }
    }
}

/// The page window requested by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageSpec {
    pub start_index: usize,
    pub limit: Option<usize>,
}

/// Raw query parameters of a `/views/{id}/items` request.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ItemsQuery {
    #[cfg_attr(feature = "serde", serde(default, rename = "StartIndex"))]
    pub start_index: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default, rename = "Limit"))]
    pub limit: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default, rename = "SortBy"))]
    pub sort_by: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, rename = "SortOrder"))]
    pub sort_order: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, rename = "Filter"))]
    pub filter: Option<String>,
}

impl ItemsQuery {
    /// Sort instruction with protocol defaults: name ascending.
    pub fn sort_spec(&self) -> SortSpec {
        SortSpec {
            field: self
                .sort_by
                .as_deref()
                .and_then(SortField::parse)
                .unwrap_or_default(),
            order: self
                .sort_order
                .as_deref()
                .and_then(SortOrder::parse)
                .unwrap_or_default(),
        }
    }

    pub fn page_spec(&self) -> PageSpec {
        PageSpec {
            start_index: self.start_index.unwrap_or(0),
            limit: self.limit,
        }
    }

    /// Recognized filters, normalized: sorted and deduplicated so equivalent
    /// requests produce identical cache signatures.
    pub fn filters(&self) -> Vec<ItemFilter> {
        let mut filters: Vec<ItemFilter> = self
            .filter
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|part| ItemFilter::parse(part.trim()))
            .collect();
        filters.sort();
        filters.dedup();
        filters
    }
}
