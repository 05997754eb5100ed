//! Boundary handoff between two neighbouring workers.
//!
//! The boundary bands of partition `p` are read and classified by two
//! workers: `p - 1` (its top drivers scan up into them) and `p` (its bottom
//! drivers). The lower worker always goes first; the turn then passes up.
//! A worker that dies before passing its turn marks the handoff abandoned so
//! the upper worker fails instead of waiting forever.

use parking_lot::{Condvar, Mutex};

use crate::band::BandStates;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    Lower,
    Upper,
    Abandoned,
}

#[derive(Debug)]
struct Slot {
    turn: Turn,
    bands: BandStates,
}

/// The lower side never finished its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Abandoned;

#[derive(Debug)]
pub struct Handoff {
    slot: Mutex<Slot>,
    changed: Condvar,
}

impl Handoff {
    pub fn new(bands: BandStates) -> Self {
        Self {
            slot: Mutex::new(Slot {
                turn: Turn::Lower,
                bands,
            }),
            changed: Condvar::new(),
        }
    }

    /// Run the lower side's pass over the boundary bands, then pass the turn up.
    pub fn lower_turn<T>(&self, f: impl FnOnce(&mut BandStates) -> T) -> T {
        let mut slot = self.slot.lock();
        debug_assert_eq!(slot.turn, Turn::Lower, "lower side ran twice");
        let out = f(&mut slot.bands);
        slot.turn = Turn::Upper;
        self.changed.notify_all();
        out
    }

    /// Wait for the lower side, then run the upper side's pass.
    pub fn upper_turn<T>(&self, f: impl FnOnce(&mut BandStates) -> T) -> Result<T, Abandoned> {
        let mut slot = self.slot.lock();
        while slot.turn == Turn::Lower {
            self.changed.wait(&mut slot);
        }
        if slot.turn == Turn::Abandoned {
            return Err(Abandoned);
        }
        Ok(f(&mut slot.bands))
    }

    /// Release a waiting upper side after the lower side failed.
    pub fn abandon(&self) {
        let mut slot = self.slot.lock();
        if slot.turn == Turn::Lower {
            slot.turn = Turn::Abandoned;
            self.changed.notify_all();
        }
    }

    pub fn turn(&self) -> Turn {
        self.slot.lock().turn
    }
}

/// Abandons the wrapped handoff when dropped, unless its turn already passed.
pub(crate) struct AbandonOnDrop<'h>(pub Option<&'h Handoff>);

impl Drop for AbandonOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(h) = self.0 {
            h.abandon();
        }
    }
}
