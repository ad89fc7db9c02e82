use std::collections::HashSet;
use std::time::Duration;

/// Where native views land relative to virtual views in the merged
/// top-level list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewOrder {
    /// Virtual views first, then native.
    Before,
    /// Native views first, then virtual.
    #[default]
    After,
}

impl ViewOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "before" => Some(ViewOrder::Before),
            "after" => Some(ViewOrder::After),
            _ => None,
        }
    }
}

/// Immutable runtime options of the proxy layer.
///
/// Composed once at startup from the configuration surface and passed by
/// value into the compositor and router, so behavior branches read one
/// struct instead of scattered flags.
#[derive(Debug, Clone)]
pub struct ProxyOptions {
    /// Master switch; when off, every request passes through untouched.
    pub enabled: bool,
    /// Include native libraries in the merged view list. When off, clients
    /// see only virtual views at the top level.
    pub merge_native_libraries: bool,
    /// Native view ids to include when merging. Empty means all.
    pub native_view_selection: HashSet<String>,
    pub native_view_order: ViewOrder,
    /// Include members with no upstream presence as placeholders. When off,
    /// such members are dropped entirely: not counted, not paginated.
    pub show_missing_placeholders: bool,
    pub cache_ttl: Duration,
    /// Worker-pool width capping concurrent upstream hydration fetches.
    pub hydration_width: usize,
    pub chunk_timeout: Duration,
    /// Overall per-request deadline enforced by the router.
    pub request_deadline: Duration,
}

impl Default for ProxyOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            merge_native_libraries: true,
            native_view_selection: HashSet::new(),
            native_view_order: ViewOrder::default(),
            show_missing_placeholders: true,
            cache_ttl: Duration::from_secs(30),
            hydration_width: 8,
            chunk_timeout: Duration::from_secs(5),
            request_deadline: Duration::from_secs(30),
        }
    }
}
