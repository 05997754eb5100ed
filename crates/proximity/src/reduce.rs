//! Boundary merge: fold partition registries and fusion requests into sizes.
//!
//! Each partition's registry only knows its own points. The reducer replays
//! every local `slot → root` link into one global arena, then applies the
//! fusion requests. A fusion is resolved through the *current* roots of both
//! ends, so the order in which partitions finished (or in which requests are
//! applied) cannot change the resulting equivalence classes.

use crate::registry::Registry;
use crate::sweep::{Fusion, SweepOutcome};

/// One finished partition: its outcome and the global id of each slot.
#[derive(Clone, Debug)]
pub struct PartitionResult {
    pub outcome: SweepOutcome,
    pub members: Vec<usize>,
}

/// Global arena the partitions are folded into.
#[derive(Clone, Debug)]
pub struct Reducer {
    registry: Registry,
    applied: usize,
}

impl Reducer {
    /// Reducer over `n` global ids.
    pub fn new(n: usize) -> Self {
        Self {
            registry: Registry::singletons(n),
            applied: 0,
        }
    }

    /// Replay a partition's local components.
    pub fn absorb(&mut self, part: &PartitionResult) {
        let local = &part.outcome.registry;
        for (slot, &id) in part.members.iter().enumerate() {
            if !local.is_registered(slot) {
                continue;
            }
            let root = local.root(slot);
            if root != slot {
                self.registry.union(part.members[root], id);
            }
        }
    }

    /// Apply cross-partition unions.
    pub fn apply<'f>(&mut self, fusions: impl IntoIterator<Item = &'f Fusion>) {
        for f in fusions {
            self.registry.union(f.local, f.foreign);
            self.applied += 1;
        }
    }

    /// Fusion requests applied so far.
    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn components(&self) -> usize {
        self.registry.components()
    }

    /// Sizes, largest first.
    pub fn finish(self) -> Vec<usize> {
        self.registry.sorted_sizes()
    }
}

/// Reduce finished partitions over `n` points to sorted sizes.
pub fn reduce(n: usize, parts: &[PartitionResult]) -> Vec<usize> {
    let mut reducer = Reducer::new(n);
    for part in parts {
        reducer.absorb(part);
    }
    for part in parts {
        reducer.apply(&part.outcome.fusions);
    }
    tracing::debug!(
        partitions = parts.len(),
        fusions = reducer.applied(),
        components = reducer.components(),
        "reduced"
    );
    reducer.finish()
}
