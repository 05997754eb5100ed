//! Band sweep: the sequential clusterer and the per-partition worker core.
//!
//! Purpose
//! - Drive every point of an owned key range through
//!   `Unseen → ScanningGroups → ScanningIsolated → Bridging → Resolved`,
//!   unioning true-distance neighbours into a private registry.
//!
//! Model
//! - Bands are driven one at a time; inside a band, drivers come in x order,
//!   so each (driver band, scanned band) pair gets monotonic cursors.
//! - A driver in band `k` scans bands `k ..= k + reach`. In its own band it
//!   only considers ids after itself; upper bands are scanned over the whole
//!   `[x-d, x+d]` interval. Every unordered pair is therefore owned by exactly
//!   one driver: the earlier one inside a band, the lower one across bands.
//! - Candidates already in the driver's component are skipped without a
//!   distance test.
//! - Points of bands outside the owned range are foreign: hits on them become
//!   fusion requests, and they are never registered here.
//!
//! Code cross-refs: `band::{NeighborScanner, BandStore}`, `registry::Registry`,
//! `partition` (drives the same `Sweep` per key range), `reduce`.

mod bridge;

use crate::band::{BandIndex, BandStore, BandStates, KeyRange, NeighborScanner, WindowCursors};
use crate::observe::Observer;
use crate::registry::Registry;
use crate::types::{dist2, Point, Proximity, Radius};

pub use bridge::{Bridges, Candidate};

/// Per-point lifecycle inside one sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Unseen,
    ScanningGroups,
    ScanningIsolated,
    Bridging,
    Resolved,
}

impl Lifecycle {
    fn successor(self) -> Option<Lifecycle> {
        match self {
            Lifecycle::Unseen => Some(Lifecycle::ScanningGroups),
            Lifecycle::ScanningGroups => Some(Lifecycle::ScanningIsolated),
            Lifecycle::ScanningIsolated => Some(Lifecycle::Bridging),
            Lifecycle::Bridging => Some(Lifecycle::Resolved),
            Lifecycle::Resolved => None,
        }
    }
}

/// Deferred union between a local root and a point owned by another partition.
///
/// Both fields are global ids; the reducer resolves them through current roots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fusion {
    pub local: usize,
    pub foreign: usize,
}

/// Read-only context shared by every sweep of a run.
#[derive(Clone, Copy)]
pub struct SweepCtx<'a> {
    pub points: &'a [Point],
    pub index: &'a BandIndex,
    pub radius: Radius,
    pub reach: i64,
    pub bridge_fanout: usize,
    pub observer: &'a dyn Observer,
}

/// Global id → registry slot.
#[derive(Clone, Copy, Debug)]
pub enum Slots<'a> {
    /// Slot equals id (one sweep owns every point).
    Identity,
    /// Partition slice: `slot_of[id]` for owned ids, `members[slot]` back.
    Table {
        slot_of: &'a [u32],
        members: &'a [usize],
    },
}

impl Slots<'_> {
    #[inline]
    fn slot(&self, id: usize) -> usize {
        match self {
            Slots::Identity => id,
            Slots::Table { slot_of, .. } => slot_of[id] as usize,
        }
    }

    #[inline]
    fn member(&self, slot: usize) -> usize {
        match self {
            Slots::Identity => slot,
            Slots::Table { members, .. } => members[slot],
        }
    }
}

/// Result of one sweep: the private registry plus deferred cross-partition unions.
#[derive(Clone, Debug)]
pub struct SweepOutcome {
    pub registry: Registry,
    pub fusions: Vec<Fusion>,
    pub unresolved: usize,
}

/// One clusterer over an owned key range.
pub struct Sweep<'a> {
    ctx: SweepCtx<'a>,
    scanner: NeighborScanner<'a>,
    owned: KeyRange,
    partition: usize,
    slots: Slots<'a>,
    registry: Registry,
    lifecycle: Vec<Lifecycle>,
    fusions: Vec<Fusion>,
    bridges: Bridges,
    scratch: Vec<usize>,
}

impl<'a> Sweep<'a> {
    /// Sweep over `owned` with `n_slots` registry slots.
    pub fn new(
        ctx: SweepCtx<'a>,
        owned: KeyRange,
        partition: usize,
        slots: Slots<'a>,
        n_slots: usize,
    ) -> Self {
        Self {
            scanner: NeighborScanner::new(ctx.points, ctx.radius.d),
            ctx,
            owned,
            partition,
            slots,
            registry: Registry::new(n_slots),
            lifecycle: vec![Lifecycle::Unseen; n_slots],
            fusions: Vec::new(),
            bridges: Bridges::default(),
            scratch: Vec::new(),
        }
    }

    /// Drive every point of band `key` in x order.
    pub fn drive_band<S: BandStore + ?Sized>(&mut self, key: i64, store: &mut S) {
        let index = self.ctx.index;
        let Some(members) = index.band(key) else {
            return;
        };
        debug_assert!(self.owned.contains(key), "driving foreign band {key}");
        let (y_lo, y_hi) = index.bounds(key);
        self.ctx.observer.band(key, y_lo, y_hi, members.len());

        let top = key.saturating_add(self.ctx.reach);
        let mut window: Vec<(i64, WindowCursors)> = index
            .bands_in(KeyRange::new(key, top))
            .map(|(w, _)| (w, WindowCursors::default()))
            .collect();
        for (pos, &id) in members.iter().enumerate() {
            self.drive_point(id, pos, key, &mut window, store);
        }
    }

    fn drive_point<S: BandStore + ?Sized>(
        &mut self,
        id: usize,
        pos: usize,
        key: i64,
        window: &mut [(i64, WindowCursors)],
        store: &mut S,
    ) {
        let slot = self.slots.slot(id);

        // Unseen → ScanningGroups: the driver is classified on its own if no
        // earlier scan saw it.
        if let Some(band) = store.band_mut(key) {
            if band.frontier <= pos {
                debug_assert_eq!(band.frontier, pos, "unclassified points before driver");
                band.frontier = pos + 1;
                band.classify(id, false);
            }
        }
        self.registry.register(slot);
        self.advance(slot, Lifecycle::ScanningGroups);
        self.bridges.clear();

        let mut joined = self.scan_groups(id, key, window, store);

        self.advance(slot, Lifecycle::ScanningIsolated);
        joined |= self.scan_isolated(id, key, window, store);
        if joined {
            if let Some(band) = store.band_mut(key) {
                band.promote(id);
            }
        }

        self.advance(slot, Lifecycle::Bridging);
        self.bridge(store);

        self.advance(slot, Lifecycle::Resolved);
    }

    fn scan_groups<S: BandStore + ?Sized>(
        &mut self,
        id: usize,
        key: i64,
        window: &mut [(i64, WindowCursors)],
        store: &mut S,
    ) -> bool {
        let at = self.ctx.points[id];
        let slot = self.slots.slot(id);
        let mut joined = false;
        let mut hits = std::mem::take(&mut self.scratch);
        for (w, cursors) in window.iter_mut() {
            let w = *w;
            let Some(band) = store.band_mut(w) else {
                continue;
            };
            hits.clear();
            hits.extend(
                self.scanner
                    .scan(&band.grouped, &mut cursors.grouped, at)
                    .filter(|&j| w != key || j > id),
            );
            let local = self.owned.contains(w);
            for &j in &hits {
                if local {
                    let sj = self.slots.slot(j);
                    self.registry.register(sj);
                    if self.registry.same(slot, sj) {
                        continue;
                    }
                }
                match self.ctx.radius.classify(at, self.ctx.points[j]) {
                    Proximity::Hit => {
                        self.link(id, j, local);
                        joined = true;
                    }
                    Proximity::Ring => self.note_bridge(at, j, w, local),
                    Proximity::Far => {}
                }
            }
        }
        self.scratch = hits;
        joined
    }

    fn scan_isolated<S: BandStore + ?Sized>(
        &mut self,
        id: usize,
        key: i64,
        window: &mut [(i64, WindowCursors)],
        store: &mut S,
    ) -> bool {
        let points = self.ctx.points;
        let index = self.ctx.index;
        let at = points[id];
        let slot = self.slots.slot(id);
        let (lo, hi) = (at.x - self.ctx.radius.d, at.x + self.ctx.radius.d);
        let mut joined = false;
        let mut hits = std::mem::take(&mut self.scratch);
        for (w, cursors) in window.iter_mut() {
            let w = *w;
            let (Some(band), Some(members)) = (store.band_mut(w), index.band(w)) else {
                continue;
            };
            let local = self.owned.contains(w);

            hits.clear();
            hits.extend(
                self.scanner
                    .scan(&band.isolated, &mut cursors.isolated, at)
                    .filter(|&j| w != key || j > id),
            );
            for &j in &hits {
                if local {
                    let sj = self.slots.slot(j);
                    self.registry.register(sj);
                    if self.registry.same(slot, sj) {
                        band.promote(j);
                        continue;
                    }
                }
                match self.ctx.radius.classify(at, points[j]) {
                    Proximity::Hit => {
                        band.promote(j);
                        self.link(id, j, local);
                        joined = true;
                    }
                    Proximity::Ring => self.note_bridge(at, j, w, local),
                    Proximity::Far => {}
                }
            }

            // First sight: classify everything that entered `x <= x_i + d`.
            while let Some(&f) = members.get(band.frontier) {
                let pf = points[f];
                if pf.x > hi {
                    break;
                }
                band.frontier += 1;
                if local {
                    self.registry.register(self.slots.slot(f));
                }
                if pf.x < lo || f == id {
                    band.classify(f, false);
                    continue;
                }
                match self.ctx.radius.classify(at, pf) {
                    Proximity::Hit => {
                        band.classify(f, true);
                        self.link(id, f, local);
                        joined = true;
                    }
                    Proximity::Ring => {
                        band.classify(f, false);
                        self.note_bridge(at, f, w, local);
                    }
                    Proximity::Far => band.classify(f, false),
                }
            }
        }
        self.scratch = hits;
        joined
    }

    /// Cross-test the nearest ring candidates below and above the driver.
    fn bridge<S: BandStore + ?Sized>(&mut self, store: &mut S) {
        if self.ctx.bridge_fanout == 0 {
            return;
        }
        let mut bridges = std::mem::take(&mut self.bridges);
        bridges.truncate_nearest(self.ctx.bridge_fanout);
        if bridges.has_pairs() {
            for (b, a) in bridges.pairs() {
                let (sb, sa) = (self.slots.slot(b.id), self.slots.slot(a.id));
                if self.registry.same(sb, sa) {
                    continue;
                }
                let (pb, pa) = (self.ctx.points[b.id], self.ctx.points[a.id]);
                if self.ctx.radius.within(pb, pa) {
                    self.registry.union(sb, sa);
                    self.ctx.observer.edge(pb, pa);
                    for c in [b, a] {
                        if let Some(band) = store.band_mut(c.key) {
                            band.promote(c.id);
                        }
                    }
                }
            }
        }
        self.bridges = bridges;
    }

    /// Record a genuine edge `(i, j)`; `i` is always local.
    fn link(&mut self, i: usize, j: usize, local: bool) {
        let (pi, pj) = (self.ctx.points[i], self.ctx.points[j]);
        let si = self.slots.slot(i);
        if local {
            if self.registry.union(si, self.slots.slot(j)).is_some() {
                self.ctx.observer.edge(pi, pj);
            }
        } else {
            let root = self.registry.find(si);
            self.fusions.push(Fusion {
                local: self.slots.member(root),
                foreign: j,
            });
            self.ctx.observer.fusion(self.partition, pi, pj);
        }
    }

    fn note_bridge(&mut self, at: Point, j: usize, key: i64, local: bool) {
        if !local || self.ctx.bridge_fanout == 0 {
            return;
        }
        let pj = self.ctx.points[j];
        self.bridges.push(
            Candidate {
                id: j,
                key,
                dist2: dist2(at, pj),
            },
            pj.y > at.y,
        );
    }

    fn advance(&mut self, slot: usize, next: Lifecycle) {
        let cur = &mut self.lifecycle[slot];
        debug_assert_eq!(cur.successor(), Some(next), "bad lifecycle step from {cur:?}");
        *cur = next;
    }

    pub fn lifecycle(&self, id: usize) -> Lifecycle {
        self.lifecycle[self.slots.slot(id)]
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn finish(self) -> SweepOutcome {
        let unresolved = self
            .lifecycle
            .iter()
            .filter(|&&l| l != Lifecycle::Resolved)
            .count();
        SweepOutcome {
            registry: self.registry,
            fusions: self.fusions,
            unresolved,
        }
    }
}

/// Single-threaded clusterer over every band of `ctx.index`.
pub fn run_sequential(ctx: SweepCtx<'_>) -> SweepOutcome {
    let index = ctx.index;
    let Some(span) = index.key_span() else {
        return Sweep::new(ctx, KeyRange::new(0, -1), 0, Slots::Identity, 0).finish();
    };
    let mut store = BandStates::for_keys(index.keys());
    let mut sweep = Sweep::new(ctx, span, 0, Slots::Identity, index.len());
    for key in index.keys() {
        sweep.drive_band(key, &mut store);
    }
    sweep.finish()
}

#[cfg(test)]
mod tests;
