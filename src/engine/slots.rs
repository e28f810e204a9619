//! Per-target settlement.
//!
//! Every target is settled exactly once: either by its probe task or by the
//! run closing early, whichever claims the slot first. Only the winner
//! records an effect, and dropping its `Settlement` is the one completion
//! signal the barrier receives for that target.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::engine::barrier::CompletionBarrier;

const PENDING: u8 = 0;
const CLAIMED: u8 = 1;
const SETTLED: u8 = 2;

/// Settlement state for each target of a run, plus the barrier they feed.
#[derive(Debug)]
pub struct SettlementSlots {
    states: Vec<AtomicU8>,
    barrier: CompletionBarrier,
}

impl SettlementSlots {
    pub fn new(count: usize) -> Self {
        Self {
            states: (0..count).map(|_| AtomicU8::new(PENDING)).collect(),
            barrier: CompletionBarrier::new(count),
        }
    }

    /// Claim the right to settle target `index`. `None` if someone else did.
    pub fn claim(&self, index: usize) -> Option<Settlement<'_>> {
        self.states
            .get(index)?
            .compare_exchange(PENDING, CLAIMED, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Settlement { slots: self, index })
    }

    pub fn is_settled(&self, index: usize) -> bool {
        self.states
            .get(index)
            .is_some_and(|state| state.load(Ordering::Acquire) == SETTLED)
    }

    pub fn barrier(&self) -> &CompletionBarrier {
        &self.barrier
    }
}

/// Exclusive right to settle one target. Arrives at the barrier on drop.
#[derive(Debug)]
pub struct Settlement<'a> {
    slots: &'a SettlementSlots,
    index: usize,
}

impl Drop for Settlement<'_> {
    fn drop(&mut self) {
        self.slots.states[self.index].store(SETTLED, Ordering::Release);
        if let Err(e) = self.slots.barrier.arrive() {
            tracing::error!(index = self.index, error = %e, "Settlement arrived twice");
        }
    }
}
