//! Engine: validated input in, component sizes out.
//!
//! - `cluster_sizes`: the whole pipeline with the default (no-op) observer.
//! - `Prepared`: validated, x-sorted points plus their band index, for callers
//!   that want to drive a specific strategy or partition plan.
//!
//! Degenerate thresholds never reach the band index: `d < 0` gives
//! singletons, `d == 0` groups exactly coincident points.

use std::collections::HashMap;

use crate::band::BandIndex;
use crate::error::{Error, Result};
use crate::observe::{timed, NoopObserver, Observer, Stage};
use crate::partition::{run_partitioned, PartitionPlan};
use crate::reduce::reduce;
use crate::sweep::{run_sequential, SweepCtx};
use crate::types::{ClusterCfg, Point, Radius};

/// Inputs at least this large are sorted with rayon.
#[cfg(feature = "parallel")]
const PAR_SORT_MIN: usize = 1 << 14;

/// Component sizes of the `<= d` proximity graph, largest first.
///
/// ```
/// use proximity::{cluster_sizes, ClusterCfg, Point};
/// let pts = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 3.0)];
/// assert_eq!(cluster_sizes(&pts, 1.5, &ClusterCfg::default()).unwrap(), vec![2, 1]);
/// ```
pub fn cluster_sizes(points: &[Point], d: f64, cfg: &ClusterCfg) -> Result<Vec<usize>> {
    cluster_sizes_observed(points, d, cfg, &NoopObserver)
}

/// As [`cluster_sizes`], reporting events and stage timings to `observer`.
pub fn cluster_sizes_observed(
    points: &[Point],
    d: f64,
    cfg: &ClusterCfg,
    observer: &dyn Observer,
) -> Result<Vec<usize>> {
    check(points, d, cfg)?;
    if points.is_empty() {
        return Ok(Vec::new());
    }
    if d < 0.0 {
        return Ok(vec![1; points.len()]);
    }
    if d == 0.0 {
        return Ok(timed(observer, Stage::Reduce, || coincident_sizes(points)));
    }

    let prepared = Prepared::with_observer(points, d, cfg, observer)?;
    let workers = cfg.resolved_workers();
    if workers > 1 {
        let plan = prepared.balanced_plan(workers);
        if plan.len() > 1 {
            return prepared.partitioned(&plan, observer);
        }
        tracing::debug!(workers, "key span too narrow to split, running sequentially");
    }
    Ok(prepared.sequential(observer))
}

/// Validated, x-sorted points and their band index.
#[derive(Clone, Debug)]
pub struct Prepared {
    points: Vec<Point>,
    radius: Radius,
    index: BandIndex,
    cfg: ClusterCfg,
}

impl Prepared {
    /// Validate, sort and index `points` for a strictly positive `d`.
    pub fn new(points: &[Point], d: f64, cfg: &ClusterCfg) -> Result<Self> {
        Self::with_observer(points, d, cfg, &NoopObserver)
    }

    pub fn with_observer(
        points: &[Point],
        d: f64,
        cfg: &ClusterCfg,
        observer: &dyn Observer,
    ) -> Result<Self> {
        check(points, d, cfg)?;
        if d <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "distance",
                message: "a band index needs a positive distance",
            });
        }
        let points = timed(observer, Stage::Prepare, || sorted_by_x(points));
        let height = d / f64::from(cfg.band_divisions);
        let index = timed(observer, Stage::Index, || BandIndex::build(&points, height));
        tracing::debug!(
            points = points.len(),
            bands = index.band_count(),
            height,
            "indexed"
        );
        Ok(Self {
            points,
            radius: Radius::new(d),
            index,
            cfg: *cfg,
        })
    }

    /// Points in id order (sorted by x, then y).
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn index(&self) -> &BandIndex {
        &self.index
    }

    pub fn radius(&self) -> Radius {
        self.radius
    }

    pub fn ctx<'a>(&'a self, observer: &'a dyn Observer) -> SweepCtx<'a> {
        SweepCtx {
            points: &self.points,
            index: &self.index,
            radius: self.radius,
            reach: self.cfg.reach(),
            bridge_fanout: self.cfg.bridge_fanout,
            observer,
        }
    }

    /// Density-balanced plan for up to `workers` ranges.
    pub fn balanced_plan(&self, workers: usize) -> PartitionPlan {
        PartitionPlan::balanced(&self.index, workers, self.cfg.reach())
    }

    /// Plan with ranges starting at the given band keys.
    pub fn plan_from_cuts(&self, cuts: &[i64]) -> Result<PartitionPlan> {
        PartitionPlan::from_cuts(&self.index, cuts, self.cfg.reach())
    }

    /// Single-threaded sweep over every band.
    pub fn sequential(&self, observer: &dyn Observer) -> Vec<usize> {
        let outcome = timed(observer, Stage::Sweep, || run_sequential(self.ctx(observer)));
        debug_assert_eq!(outcome.unresolved, 0, "sweep left points unresolved");
        debug_assert!(outcome.fusions.is_empty());
        timed(observer, Stage::Reduce, || outcome.registry.sorted_sizes())
    }

    /// One worker per range of `plan`, then the boundary merge.
    pub fn partitioned(&self, plan: &PartitionPlan, observer: &dyn Observer) -> Result<Vec<usize>> {
        let parts = run_partitioned(self.ctx(observer), plan)?;
        debug_assert!(parts.iter().all(|p| p.outcome.unresolved == 0));
        Ok(timed(observer, Stage::Reduce, || reduce(self.points.len(), &parts)))
    }
}

fn check(points: &[Point], d: f64, cfg: &ClusterCfg) -> Result<()> {
    if d.is_nan() {
        return Err(Error::InvalidParameter {
            name: "distance",
            message: "must not be NaN",
        });
    }
    if cfg.band_divisions == 0 {
        return Err(Error::InvalidParameter {
            name: "band_divisions",
            message: "must be at least 1",
        });
    }
    if points.len() >= u32::MAX as usize {
        return Err(Error::InvalidParameter {
            name: "points",
            message: "more points than 32-bit registry slots",
        });
    }
    if let Some(index) = points.iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
        return Err(Error::NonFiniteCoordinate { index });
    }
    Ok(())
}

fn by_x_then_y(a: &Point, b: &Point) -> std::cmp::Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

fn sorted_by_x(points: &[Point]) -> Vec<Point> {
    let mut sorted = points.to_vec();
    sort_points(&mut sorted);
    sorted
}

#[cfg(feature = "parallel")]
fn sort_points(points: &mut [Point]) {
    use rayon::slice::ParallelSliceMut;
    if points.len() >= PAR_SORT_MIN {
        points.par_sort_unstable_by(by_x_then_y);
    } else {
        points.sort_unstable_by(by_x_then_y);
    }
}

#[cfg(not(feature = "parallel"))]
fn sort_points(points: &mut [Point]) {
    points.sort_unstable_by(by_x_then_y);
}

/// Sizes of groups of exactly coincident points (`-0.0` equals `0.0`).
fn coincident_sizes(points: &[Point]) -> Vec<usize> {
    let mut groups: HashMap<(u64, u64), usize> = HashMap::new();
    for p in points {
        *groups
            .entry(((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits()))
            .or_default() += 1;
    }
    let mut sizes: Vec<usize> = groups.into_values().collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes
}
