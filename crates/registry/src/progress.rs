use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use depot_backend::blob::ProgressFn;

/// Observer of upload progress: `(transferred_bytes, total_bytes)`.
pub type ProgressObserver = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Wraps an observer so reported progress never regresses.
///
/// The transport may re-report lower totals across retries; this is a
/// best-effort UI side channel, so regressions are clamped to the highest
/// value seen rather than surfaced.
pub struct MonotonicProgress {
    high_water: Arc<AtomicU64>,
    observer: ProgressObserver,
}

impl MonotonicProgress {
    #[must_use]
    pub fn new(observer: ProgressObserver) -> Self {
        Self {
            high_water: Arc::new(AtomicU64::new(0)),
            observer,
        }
    }

    /// Convert into the callback shape blob stores accept.
    #[must_use]
    pub fn into_progress_fn(self) -> ProgressFn {
        let Self {
            high_water,
            observer,
        } = self;
        Arc::new(move |transferred, total| {
            let clamped = high_water
                .fetch_max(transferred, Ordering::SeqCst)
                .max(transferred);
            observer(clamped, total);
        })
    }
}
