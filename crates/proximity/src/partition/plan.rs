//! Partition plans: contiguous band-key ranges, one per worker.
//!
//! Rules
//! - Ranges cover `[min_key, max_key]` without gaps, in ascending order.
//! - Every range is at least `2 * reach` keys wide. Then a driver's window
//!   (`k ..= k + reach`) never crosses more than one boundary, and a range's
//!   top drivers never touch its own boundary bands.
//! - Balanced plans close a range once roughly `n / workers` points are in
//!   it, so dense regions get narrower ranges.

use crate::band::{BandIndex, KeyRange};
use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionPlan {
    ranges: Vec<KeyRange>,
    reach: i64,
}

impl PartitionPlan {
    /// One range over every band (empty plan for an empty index).
    pub fn single(index: &BandIndex, reach: i64) -> Self {
        Self {
            ranges: index.key_span().into_iter().collect(),
            reach,
        }
    }

    /// Up to `workers` ranges with roughly equal point counts.
    pub fn balanced(index: &BandIndex, workers: usize, reach: i64) -> Self {
        let Some(span) = index.key_span() else {
            return Self::single(index, reach);
        };
        let min_width = min_width(reach);
        let fit = usize::try_from(span.width() / min_width).unwrap_or(usize::MAX);
        let workers = workers.clamp(1, fit.max(1));
        if workers == 1 {
            return Self::single(index, reach);
        }

        let target = index.len().div_ceil(workers);
        let mut ranges = Vec::with_capacity(workers);
        let mut lo = span.lo;
        let mut acc = 0usize;
        for (key, ids) in index.iter() {
            acc += ids.len();
            let wide_enough = KeyRange::new(lo, key).width() >= min_width;
            let room_above = i128::from(span.hi) - i128::from(key) >= min_width;
            if ranges.len() + 1 < workers && acc >= target && wide_enough && room_above {
                ranges.push(KeyRange::new(lo, key));
                lo = key + 1;
                acc = 0;
            }
        }
        ranges.push(KeyRange::new(lo, span.hi));
        Self { ranges, reach }
    }

    /// Ranges starting at each of `cuts` (ascending keys inside the span).
    pub fn from_cuts(index: &BandIndex, cuts: &[i64], reach: i64) -> Result<Self> {
        let Some(span) = index.key_span() else {
            return if cuts.is_empty() {
                Ok(Self::single(index, reach))
            } else {
                Err(Error::InvalidPartition("cuts given for an empty index".into()))
            };
        };
        let mut ranges = Vec::with_capacity(cuts.len() + 1);
        let mut lo = span.lo;
        for &cut in cuts {
            if cut <= lo || cut > span.hi {
                return Err(Error::InvalidPartition(format!(
                    "cut {cut} outside ({lo}, {}]",
                    span.hi
                )));
            }
            ranges.push(KeyRange::new(lo, cut - 1));
            lo = cut;
        }
        ranges.push(KeyRange::new(lo, span.hi));
        let plan = Self { ranges, reach };
        plan.check()?;
        Ok(plan)
    }

    fn check(&self) -> Result<()> {
        if self.ranges.len() < 2 {
            return Ok(());
        }
        let min_width = min_width(self.reach);
        for r in &self.ranges {
            if r.width() < min_width {
                return Err(Error::InvalidPartition(format!(
                    "range [{}, {}] narrower than {min_width} keys",
                    r.lo, r.hi
                )));
            }
        }
        Ok(())
    }

    pub fn ranges(&self) -> &[KeyRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn reach(&self) -> i64 {
        self.reach
    }
}

#[inline]
fn min_width(reach: i64) -> i128 {
    2 * i128::from(reach.max(1))
}
