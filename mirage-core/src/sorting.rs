//! Deterministic sorting and pagination over a materialized candidate set.
//!
//! Correct order cannot be determined from a partial fetch of a
//! hand-assembled virtual set, so the whole set is sorted before any window
//! is sliced; the view cache keeps that work from repeating per page.

use std::cmp::Ordering;

use mirage_model::{ItemFilter, MediaItem, PageSpec, SortField, SortOrder, SortSpec};

/// Keep only candidates matching every requested filter.
pub fn filter_candidates(items: Vec<MediaItem>, filters: &[ItemFilter]) -> Vec<MediaItem> {
    if filters.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| filters.iter().all(|filter| matches(item, filter)))
        .collect()
}

fn matches(item: &MediaItem, filter: &ItemFilter) -> bool {
    match filter {
        ItemFilter::IsPresent => !item.is_placeholder(),
        ItemFilter::IsPlaceholder => item.is_placeholder(),
    }
}

/// Sort the candidate set in place.
///
/// The comparator is total: requested field first, item id second, so paging
/// is stable across repeated calls against an unchanged set. Items missing
/// the sort field go last in either direction.
pub fn sort_candidates(items: &mut [MediaItem], spec: &SortSpec) {
    items.sort_by(|a, b| compare(a, b, spec));
}

fn compare(a: &MediaItem, b: &MediaItem, spec: &SortSpec) -> Ordering {
    let primary = match spec.field {
        SortField::SortName => directed(a.sort_key_name().cmp(&b.sort_key_name()), spec.order),
        SortField::DateCreated => {
            directed_option(&a.date_created, &b.date_created, spec.order, Ord::cmp)
        }
        SortField::CommunityRating => directed_option(
            &a.community_rating,
            &b.community_rating,
            spec.order,
            f32::total_cmp,
        ),
        SortField::ProductionYear => {
            directed_option(&a.production_year, &b.production_year, spec.order, Ord::cmp)
        }
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn directed(ordering: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Ascending => ordering,
        SortOrder::Descending => ordering.reverse(),
    }
}

fn directed_option<T>(
    a: &Option<T>,
    b: &Option<T>,
    order: SortOrder,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => directed(cmp(a, b), order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Slice a page window out of a sorted candidate set.
///
/// The returned total is the size of the whole set, independent of the
/// requested window.
pub fn slice_page(items: &[MediaItem], page: &PageSpec) -> (Vec<MediaItem>, usize) {
    let total = items.len();
    let start = page.start_index.min(total);
    let end = match page.limit {
        Some(limit) => start.saturating_add(limit).min(total),
        None => total,
    };
    (items[start..end].to_vec(), total)
}

/// The full engine contract: filter, sort, slice.
pub fn apply(
    items: Vec<MediaItem>,
    spec: &SortSpec,
    filters: &[ItemFilter],
    page: &PageSpec,
) -> (Vec<MediaItem>, usize) {
    let mut items = filter_candidates(items, filters);
    sort_candidates(&mut items, spec);
    slice_page(&items, page)
}
