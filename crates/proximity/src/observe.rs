//! Optional event and timing hooks.
//!
//! The engine never needs an observer; callers that plot intermediate state or
//! report timings inject one per run. All methods default to no-ops and must be
//! cheap: `edge` fires once per discovered edge from inside the hot loop.

use std::time::{Duration, Instant};

use crate::types::Point;

/// Coarse stages of a run, reported through [`Observer::stage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Validation and x-sorting of the input.
    Prepare,
    /// Band index construction.
    Index,
    /// One clusterer sweep (whole run, or one partition worker).
    Sweep,
    /// Folding registries and fusion requests into sizes.
    Reduce,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Prepare => "prepare",
            Stage::Index => "index",
            Stage::Sweep => "sweep",
            Stage::Reduce => "reduce",
        }
    }
}

/// Run observer. Shared across partition workers, hence `Sync`.
pub trait Observer: Sync {
    /// A non-empty band `key` covering `y ∈ [y_lo, y_hi)` holds `count` points.
    fn band(&self, _key: i64, _y_lo: f64, _y_hi: f64, _count: usize) {}

    /// An edge that merged two components inside one registry.
    fn edge(&self, _a: Point, _b: Point) {}

    /// A cross-partition edge recorded as a fusion request.
    fn fusion(&self, _partition: usize, _a: Point, _b: Point) {}

    /// Time spent in `stage`. `Sweep` fires once per worker.
    fn stage(&self, _stage: Stage, _elapsed: Duration) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Run `f` and report its wall time as `stage`.
pub(crate) fn timed<T, O: Observer + ?Sized>(observer: &O, stage: Stage, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    observer.stage(stage, start.elapsed());
    out
}
