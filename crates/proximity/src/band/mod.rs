//! Band index: horizontal slices of the plane used to bound neighbour search.
//!
//! Purpose
//! - Split the x-sorted points into bands keyed by `floor(y / h)`, each band
//!   holding its ids in x order, so a neighbour query only looks at a few
//!   adjacent bands and a short x interval inside each of them.
//!
//! Model
//! - With `h = d / m`, two points at distance `<= d` have keys at most `m`
//!   apart in exact arithmetic, and at most `m + 1` apart once `y / h` is
//!   rounded. A driver in band `k` therefore scans bands `k ..= k + m + 1`
//!   (pairs across bands are always owned by the lower band).
//! - The index is built once and never mutated; the evolving per-run state
//!   (which points are grouped/isolated, how far each band has been seen)
//!   lives in `state::BandState`.
//!
//! Code cross-refs: `scan::NeighborScanner`, `state::{BandState, BandStore}`.

pub mod scan;
pub mod state;

use std::collections::BTreeMap;

use crate::types::Point;

pub use scan::{Cursor, NeighborScanner, WindowCursors};
pub use state::{BandState, BandStates, BandStore, Layered};

/// Band key of a y coordinate (saturating at the `i64` range).
#[inline]
pub fn band_key(y: f64, height: f64) -> i64 {
    (y / height).floor() as i64
}

/// Inclusive range of band keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyRange {
    pub lo: i64,
    pub hi: i64,
}

impl KeyRange {
    #[inline]
    pub fn new(lo: i64, hi: i64) -> Self {
        Self { lo, hi }
    }
    #[inline]
    pub fn contains(&self, key: i64) -> bool {
        self.lo <= key && key <= self.hi
    }
    /// Number of keys covered (wide enough for any pair of `i64`).
    #[inline]
    pub fn width(&self) -> i128 {
        i128::from(self.hi) - i128::from(self.lo) + 1
    }
}

/// Immutable band index over x-sorted points.
#[derive(Clone, Debug)]
pub struct BandIndex {
    height: f64,
    bands: BTreeMap<i64, Vec<usize>>,
    len: usize,
}

impl BandIndex {
    /// Build bands of `height` over `points`, which must already be sorted by x.
    ///
    /// Ids inside each band keep the input order, so every band is x-ordered.
    pub fn build(points: &[Point], height: f64) -> Self {
        let mut bands: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (id, p) in points.iter().enumerate() {
            bands.entry(band_key(p.y, height)).or_default().push(id);
        }
        Self {
            height,
            bands,
            len: points.len(),
        }
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn key_of(&self, p: Point) -> i64 {
        band_key(p.y, self.height)
    }

    /// Ids of band `key` in x order, if the band is non-empty.
    #[inline]
    pub fn band(&self, key: i64) -> Option<&[usize]> {
        self.bands.get(&key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.bands.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &[usize])> + '_ {
        self.bands.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Non-empty bands whose key lies in `range`.
    pub fn bands_in(&self, range: KeyRange) -> impl Iterator<Item = (i64, &[usize])> + '_ {
        self.bands
            .range(range.lo..=range.hi)
            .map(|(k, v)| (*k, v.as_slice()))
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Smallest and largest non-empty key.
    pub fn key_span(&self) -> Option<KeyRange> {
        let lo = *self.bands.keys().next()?;
        let hi = *self.bands.keys().next_back()?;
        Some(KeyRange::new(lo, hi))
    }

    /// Points whose band falls into `range`.
    pub fn count_in(&self, range: KeyRange) -> usize {
        self.bands_in(range).map(|(_, ids)| ids.len()).sum()
    }

    /// y interval `[lo, hi)` covered by band `key`.
    pub fn bounds(&self, key: i64) -> (f64, f64) {
        let lo = key as f64 * self.height;
        (lo, lo + self.height)
    }
}

#[cfg(test)]
mod tests;
