//! Neighbour scanner with monotonic per-band cursors.
//!
//! A cursor is an id threshold: every id below it is known to satisfy
//! `x < x_driver - d` for the current driver and therefore for every later
//! driver of the same band sweep (drivers come in x order). Ids are positions
//! in the x-sorted point array, so id order is x order and retiring is a walk
//! from the front of the family.

use std::collections::BTreeSet;

use crate::types::Point;

/// Id threshold; ids below the wrapped value are retired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor(pub usize);

/// The two cursor families kept for one scanned band during one band sweep.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowCursors {
    pub grouped: Cursor,
    pub isolated: Cursor,
}

/// Candidate filter on the x axis: `[x - d, x + d]`.
///
/// This is necessary but not sufficient; callers confirm an edge with the
/// squared-distance test.
#[derive(Clone, Copy, Debug)]
pub struct NeighborScanner<'a> {
    points: &'a [Point],
    d: f64,
}

impl<'a> NeighborScanner<'a> {
    pub fn new(points: &'a [Point], d: f64) -> Self {
        Self { points, d }
    }

    /// Advance `cursor` past members with `x < at.x - d`, then yield members
    /// up to `x <= at.x + d`.
    pub fn scan<'s>(
        &'s self,
        family: &'s BTreeSet<usize>,
        cursor: &mut Cursor,
        at: Point,
    ) -> impl Iterator<Item = usize> + 's
    where
        'a: 's,
    {
        self.retire(family, cursor, at.x - self.d);
        let hi = at.x + self.d;
        let points: &'s [Point] = self.points;
        family
            .range(cursor.0..)
            .copied()
            .take_while(move |&id| points[id].x <= hi)
    }

    fn retire(&self, family: &BTreeSet<usize>, cursor: &mut Cursor, lo: f64) {
        for &id in family.range(cursor.0..) {
            if self.points[id].x < lo {
                cursor.0 = id + 1;
            } else {
                break;
            }
        }
    }
}
