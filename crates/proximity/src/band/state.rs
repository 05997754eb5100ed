//! Per-run band state: grouped/isolated families and the classification frontier.

use std::collections::{BTreeMap, BTreeSet};

/// Mutable state of one band during a run.
///
/// - `frontier`: position in the band's id list up to which points have been
///   classified. Only moves forward.
/// - `grouped`: classified points known to share an edge with someone.
/// - `isolated`: classified points with no edge found so far.
///
/// Every classified point sits in exactly one family; points only move
/// isolated → grouped.
#[derive(Clone, Debug, Default)]
pub struct BandState {
    pub frontier: usize,
    pub grouped: BTreeSet<usize>,
    pub isolated: BTreeSet<usize>,
}

impl BandState {
    /// Move `id` from isolated to grouped. Returns `true` if it was isolated.
    pub fn promote(&mut self, id: usize) -> bool {
        if self.isolated.remove(&id) {
            self.grouped.insert(id);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn classify(&mut self, id: usize, grouped: bool) {
        if grouped {
            self.grouped.insert(id);
        } else {
            self.isolated.insert(id);
        }
    }

    #[inline]
    pub fn classified(&self) -> usize {
        self.grouped.len() + self.isolated.len()
    }
}

/// Lookup of band state by key.
pub trait BandStore {
    fn band_mut(&mut self, key: i64) -> Option<&mut BandState>;
}

/// Band states keyed by band key.
#[derive(Clone, Debug, Default)]
pub struct BandStates {
    bands: BTreeMap<i64, BandState>,
}

impl BandStates {
    /// Fresh states for the given keys.
    pub fn for_keys(keys: impl IntoIterator<Item = i64>) -> Self {
        Self {
            bands: keys.into_iter().map(|k| (k, BandState::default())).collect(),
        }
    }

    /// Remove and return the states with key `< key`.
    pub fn split_below(&mut self, key: i64) -> BandStates {
        let upper = self.bands.split_off(&key);
        let lower = std::mem::replace(&mut self.bands, upper);
        BandStates { bands: lower }
    }

    pub fn get(&self, key: i64) -> Option<&BandState> {
        self.bands.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.bands.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

impl BandStore for BandStates {
    #[inline]
    fn band_mut(&mut self, key: i64) -> Option<&mut BandState> {
        self.bands.get_mut(&key)
    }
}

/// A worker's own band states layered over states borrowed from a boundary.
pub struct Layered<'s> {
    pub own: &'s mut BandStates,
    pub shared: &'s mut BandStates,
}

impl BandStore for Layered<'_> {
    fn band_mut(&mut self, key: i64) -> Option<&mut BandState> {
        match self.shared.bands.get_mut(&key) {
            Some(state) => Some(state),
            None => self.own.band_mut(key),
        }
    }
}
