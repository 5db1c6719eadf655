use runtime::pool::run_in_batches;
use tracing::info;

use crate::cache::BoundaryCache;
use crate::fetch::Fetch;
use crate::source::RegionKey;

/// In-flight window used when warming the cache.
pub const DEFAULT_PRELOAD_WINDOW: usize = 5;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PreloadReport {
    pub loaded: usize,
    pub failed: Vec<String>,
}

/// Best-effort cache warmer.
///
/// Loads `keys` in order, `window` at a time. Individual failures are already
/// logged by [`BoundaryCache::load`]; here they are only counted.
pub async fn preload<F: Fetch>(
    cache: &BoundaryCache<F>,
    keys: Vec<RegionKey>,
    window: usize,
) -> PreloadReport {
    let results = run_in_batches(keys, window, move |key| async move {
        let outcome = cache.load(&key).await.map(|_| ());
        (key, outcome)
    })
    .await;

    let mut report = PreloadReport::default();
    for (key, outcome) in results {
        match outcome {
            Ok(()) => report.loaded += 1,
            Err(_) => report.failed.push(key.cache_key()),
        }
    }
    info!(
        loaded = report.loaded,
        failed = report.failed.len(),
        "boundary preload finished"
    );
    report
}
