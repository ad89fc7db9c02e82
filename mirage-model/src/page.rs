/// A paged result envelope in the client-facing protocol.
///
/// `total_record_count` is always the size of the post-filter candidate set,
/// never the size of the returned window.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "PascalCase")
)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_record_count: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub start_index: u64,
}

impl<T> Page<T> {
    /// A page holding the complete result set, unwindowed.
    pub fn complete(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            total_record_count: total,
            start_index: 0,
        }
    }

    pub fn windowed(items: Vec<T>, total_record_count: u64, start_index: u64) -> Self {
        Self {
            items,
            total_record_count,
            start_index,
        }
    }
}
