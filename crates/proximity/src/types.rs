//! Shared value types: points, the distance threshold, and run configuration.
//!
//! - `Point`: plain 2D coordinate; identity is its position in the x-sorted input.
//! - `Radius`: the threshold `d` with the squared values the hot loops compare against.
//! - `ClusterCfg`: knobs that change how the work is split, never the result.

use nalgebra::Vector2;

/// 2D point.
pub type Point = Vector2<f64>;

/// Outcome of comparing two points against the threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Proximity {
    /// `dist <= d`: the points share an edge.
    Hit,
    /// `d < dist <= 2d`: no edge, but a bridge candidate.
    Ring,
    /// Farther than `2d`.
    Far,
}

/// Distance threshold with cached squares (no `sqrt` in the comparisons).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Radius {
    pub d: f64,
    pub d2: f64,
    pub ring2: f64,
}

impl Radius {
    #[inline]
    pub fn new(d: f64) -> Self {
        Self {
            d,
            d2: d * d,
            ring2: 4.0 * d * d,
        }
    }

    #[inline]
    pub fn classify(&self, a: Point, b: Point) -> Proximity {
        let dist2 = dist2(a, b);
        if dist2 <= self.d2 {
            Proximity::Hit
        } else if dist2 <= self.ring2 {
            Proximity::Ring
        } else {
            Proximity::Far
        }
    }

    #[inline]
    pub fn within(&self, a: Point, b: Point) -> bool {
        dist2(a, b) <= self.d2
    }
}

/// Squared Euclidean distance.
#[inline]
pub fn dist2(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Run configuration.
///
/// None of these fields change the computed sizes; they only change how the
/// work is split and how early components merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClusterCfg {
    /// Worker threads for the partitioned clusterer. `0` uses the available
    /// parallelism; `1` runs the sequential clusterer.
    pub workers: usize,
    /// Bands per distance: band height is `d / band_divisions` and a window
    /// spans `band_divisions + 1` bands above the driver band.
    pub band_divisions: u32,
    /// Nearest bridge candidates kept per side (above/below) of a driver.
    /// `0` disables bridging.
    pub bridge_fanout: usize,
}

impl Default for ClusterCfg {
    fn default() -> Self {
        Self {
            workers: 1,
            band_divisions: 1,
            bridge_fanout: 2,
        }
    }
}

impl ClusterCfg {
    /// Worker count with `0` resolved against the machine.
    pub fn resolved_workers(&self) -> usize {
        if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.workers
        }
    }

    /// Bands above the driver band that a window spans.
    ///
    /// `floor(y / h)` can round two points exactly `d` apart into keys
    /// `band_divisions + 1` apart, so the window carries one extra band.
    #[inline]
    pub fn reach(&self) -> i64 {
        i64::from(self.band_divisions) + 1
    }
}
