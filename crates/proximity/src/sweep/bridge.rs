//! Bridge candidates: ring points on either side of a driver.
//!
//! A point within `2d` of the driver but farther than `d` can still be within
//! `d` of a ring point on the other side. Testing the nearest few cross pairs
//! merges those components while both are in view, before either band is
//! driven. Every union here is a genuine edge, so the fanout only trades work
//! for earlier merges.

use std::cmp::Ordering;

/// A ring point seen while scanning band `key`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub id: usize,
    pub key: i64,
    pub dist2: f64,
}

/// Ring candidates split by side of the driver.
#[derive(Clone, Debug, Default)]
pub struct Bridges {
    pub below: Vec<Candidate>,
    pub above: Vec<Candidate>,
}

impl Bridges {
    pub fn clear(&mut self) {
        self.below.clear();
        self.above.clear();
    }

    /// Record a candidate; `above` is relative to the driver's y.
    pub fn push(&mut self, candidate: Candidate, above: bool) {
        if above {
            self.above.push(candidate);
        } else {
            self.below.push(candidate);
        }
    }

    /// Keep the `fanout` nearest candidates per side.
    pub fn truncate_nearest(&mut self, fanout: usize) {
        keep_nearest(&mut self.below, fanout);
        keep_nearest(&mut self.above, fanout);
    }

    /// Cross pairs `(below, above)`.
    pub fn pairs(&self) -> impl Iterator<Item = (Candidate, Candidate)> + '_ {
        self.below
            .iter()
            .flat_map(move |b| self.above.iter().map(move |a| (*b, *a)))
    }

    pub fn has_pairs(&self) -> bool {
        !self.below.is_empty() && !self.above.is_empty()
    }
}

fn by_distance(a: &Candidate, b: &Candidate) -> Ordering {
    a.dist2.total_cmp(&b.dist2).then(a.id.cmp(&b.id))
}

fn keep_nearest(list: &mut Vec<Candidate>, fanout: usize) {
    if list.len() > fanout {
        if fanout > 0 {
            list.select_nth_unstable_by(fanout - 1, by_distance);
        }
        list.truncate(fanout);
    }
    list.sort_unstable_by(by_distance);
}
