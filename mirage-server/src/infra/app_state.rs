use std::{fmt, sync::Arc};

use mirage_core::{
    cache::ViewCache, compositor::ViewCompositor, hydrator::ItemHydrator,
    membership::MembershipReader, options::ProxyOptions, upstream::UpstreamClient,
};

/// Shared state of every request handler.
///
/// The options struct is immutable for the life of the process; the view
/// cache is the only mutable state, and it manages its own synchronization.
#[derive(Clone)]
pub struct AppState {
    pub options: ProxyOptions,
    pub upstream: Arc<dyn UpstreamClient>,
    pub compositor: Arc<ViewCompositor>,
    pub cache: Arc<ViewCache>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire the proxy core together from immutable options.
    pub fn new(
        options: ProxyOptions,
        upstream: Arc<dyn UpstreamClient>,
        membership: Arc<dyn MembershipReader>,
    ) -> Self {
        let hydrator = ItemHydrator::new(
            Arc::clone(&upstream),
            options.hydration_width,
            options.chunk_timeout,
        );
        let compositor = Arc::new(ViewCompositor::new(
            Arc::clone(&upstream),
            membership,
            hydrator,
        ));
        Self {
            options,
            upstream,
            compositor,
            cache: Arc::new(ViewCache::new()),
        }
    }
}
