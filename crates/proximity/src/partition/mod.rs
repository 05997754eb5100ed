//! Partitioned clusterer: one worker thread per contiguous band-key range.
//!
//! Purpose
//! - Split the sweep across workers without re-testing pairs and without
//!   losing components that straddle a range boundary.
//!
//! Model
//! - Worker `p` owns range `[lo_p, hi_p]`: a private registry over its own
//!   points (slots numbered by ascending id) and private band states.
//! - The lowest `reach` bands of range `p > 0` are its boundary bands. Their
//!   state sits in a `Handoff` shared with worker `p - 1`, whose top drivers
//!   scan up into them.
//! - Order inside worker `p`:
//!   1. top pass: drivers in `[hi_p - reach + 1, hi_p]` under handoff `p + 1`,
//!      then the turn passes up;
//!   2. interior bands;
//!   3. bottom pass: boundary bands, once handoff `p` has been passed up.
//!   Waits only ever point down, so worker 0 never waits and the chain cannot
//!   cycle.
//! - Edges to points of another range become fusion requests for `reduce`.
//!
//! Code cross-refs: `sweep::Sweep` (per-range driver), `handoff::Handoff`,
//! `plan::PartitionPlan`, `reduce::reduce`.

mod handoff;
mod plan;

use std::time::Instant;

use crate::band::{BandStates, KeyRange, Layered};
use crate::error::{Error, Result};
use crate::observe::Stage;
use crate::reduce::PartitionResult;
use crate::sweep::{Slots, Sweep, SweepCtx, SweepOutcome};

pub use handoff::{Abandoned, Handoff, Turn};
pub use plan::PartitionPlan;

use handoff::AbandonOnDrop;

/// Everything a worker owns before it starts.
struct WorkerInput {
    partition: usize,
    range: KeyRange,
    members: Vec<usize>,
    own: BandStates,
}

/// Run one worker per range of `plan` and collect their results.
///
/// Fails with [`Error::WorkerPanicked`] if any worker panics (or could not
/// finish because the worker below it panicked). No partial result is
/// returned.
pub fn run_partitioned(ctx: SweepCtx<'_>, plan: &PartitionPlan) -> Result<Vec<PartitionResult>> {
    let index = ctx.index;
    let reach = ctx.reach;

    let mut slot_of = vec![u32::MAX; index.len()];
    let mut inputs = Vec::with_capacity(plan.len());
    let mut handoffs = Vec::with_capacity(plan.len().saturating_sub(1));
    for (partition, &range) in plan.ranges().iter().enumerate() {
        let mut members: Vec<usize> = index
            .bands_in(range)
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        members.sort_unstable();
        for (slot, &id) in members.iter().enumerate() {
            slot_of[id] = slot as u32;
        }

        let mut own = BandStates::for_keys(index.bands_in(range).map(|(k, _)| k));
        if partition > 0 {
            let boundary = own.split_below(range.lo.saturating_add(reach));
            handoffs.push(Handoff::new(boundary));
        }
        inputs.push(WorkerInput {
            partition,
            range,
            members,
            own,
        });
    }
    tracing::debug!(
        partitions = plan.len(),
        points = index.len(),
        "partitioned run"
    );

    let slot_of = slot_of.as_slice();
    let handoffs = handoffs.as_slice();
    let joined: Vec<Result<PartitionResult>> = std::thread::scope(|s| {
        let handles: Vec<_> = inputs
            .into_iter()
            .map(|input| {
                let p = input.partition;
                // Handoff `q - 1` guards the boundary bands of range `q`.
                let lower = p.checked_sub(1).map(|q| &handoffs[q]);
                let upper = handoffs.get(p);
                s.spawn(move || run_worker(ctx, input, slot_of, lower, upper))
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(partition, h)| {
                h.join()
                    .unwrap_or_else(|_| Err(Error::WorkerPanicked { partition }))
            })
            .collect()
    });

    let mut results = Vec::with_capacity(joined.len());
    for r in joined {
        results.push(r?);
    }
    Ok(results)
}

fn run_worker(
    ctx: SweepCtx<'_>,
    input: WorkerInput,
    slot_of: &[u32],
    lower: Option<&Handoff>,
    upper: Option<&Handoff>,
) -> Result<PartitionResult> {
    let _abandon = AbandonOnDrop(upper);
    let start = Instant::now();
    let WorkerInput {
        partition,
        range,
        members,
        mut own,
    } = input;
    let reach = ctx.reach;

    let top_from = if upper.is_some() {
        range.hi.saturating_sub(reach - 1)
    } else {
        i64::MAX
    };
    let bottom_to = if lower.is_some() {
        range.lo.saturating_add(reach - 1)
    } else {
        i64::MIN
    };
    let keys: Vec<i64> = ctx.index.bands_in(range).map(|(k, _)| k).collect();
    let (top, rest): (Vec<i64>, Vec<i64>) = keys.into_iter().partition(|&k| k >= top_from);
    let (bottom, interior): (Vec<i64>, Vec<i64>) = rest.into_iter().partition(|&k| k <= bottom_to);

    let slots = Slots::Table {
        slot_of,
        members: &members,
    };
    let mut sweep = Sweep::new(ctx, range, partition, slots, members.len());

    if let Some(h) = upper {
        h.lower_turn(|shared| {
            let mut store = Layered {
                own: &mut own,
                shared,
            };
            for &key in &top {
                sweep.drive_band(key, &mut store);
            }
        });
    }

    for &key in &interior {
        sweep.drive_band(key, &mut own);
    }

    if let Some(h) = lower {
        h.upper_turn(|shared| {
            let mut store = Layered {
                own: &mut own,
                shared,
            };
            for &key in &bottom {
                sweep.drive_band(key, &mut store);
            }
        })
        .map_err(|Abandoned| Error::WorkerPanicked {
            partition: partition - 1,
        })?;
    }

    let outcome: SweepOutcome = sweep.finish();
    ctx.observer.stage(Stage::Sweep, start.elapsed());
    tracing::debug!(
        partition,
        lo = range.lo,
        hi = range.hi,
        points = members.len(),
        fusions = outcome.fusions.len(),
        components = outcome.registry.components(),
        "worker done"
    );
    Ok(PartitionResult { outcome, members })
}
