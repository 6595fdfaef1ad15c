//! Admission control for concurrent readers.
//!
//! The gate caps how many readers may be inside an index at once and lets
//! destruction turn everyone away, including readers already queued for a
//! slot. Mutual exclusion between readers and writers is handled separately
//! by the index's `RwLock`.

use parking_lot::{Condvar, Mutex};

use crate::error::{Error, Result};

#[derive(Debug)]
struct GateState {
    active: usize,
    closed: bool,
}

/// Counts active readers against a fixed limit.
#[derive(Debug)]
pub(crate) struct ReaderGate {
    /// Zero means unlimited.
    max_readers: usize,
    state: Mutex<GateState>,
    freed: Condvar,
}

impl ReaderGate {
    pub(crate) fn new(max_readers: usize) -> Self {
        Self {
            max_readers,
            state: Mutex::new(GateState {
                active: 0,
                closed: false,
            }),
            freed: Condvar::new(),
        }
    }

    /// Block until a reader slot is free. Fails once the gate is closed,
    /// also for callers that were already waiting.
    pub(crate) fn enter(&self) -> Result<ReaderSlot<'_>> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(Error::AccessDenied);
            }
            if self.max_readers == 0 || state.active < self.max_readers {
                break;
            }
            self.freed.wait(&mut state);
        }
        state.active += 1;
        Ok(ReaderSlot { gate: self })
    }

    /// Fails once the gate is closed.
    pub(crate) fn check_open(&self) -> Result<()> {
        if self.state.lock().closed {
            Err(Error::AccessDenied)
        } else {
            Ok(())
        }
    }

    /// Refuse all future entries and wake every waiting reader. Returns
    /// `false` if the gate was already closed.
    pub(crate) fn close(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        drop(state);
        self.freed.notify_all();
        true
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    #[cfg(test)]
    pub(crate) fn active_readers(&self) -> usize {
        self.state.lock().active
    }
}

/// A held reader slot, returned to the gate on drop.
#[must_use]
pub(crate) struct ReaderSlot<'a> {
    gate: &'a ReaderGate,
}

impl Drop for ReaderSlot<'_> {
    fn drop(&mut self) {
        let mut state = self.gate.state.lock();
        state.active -= 1;
        drop(state);
        self.gate.freed.notify_one();
    }
}
