use crate::{DevEui, RandSource, ShortCodeAllocator};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mutable state of one batch run, shared by its workers.
///
/// Created at the start of a run and dropped at its end, so consecutive or
/// concurrent runs never see each other's short codes or results.
pub(crate) struct BatchState<S>
where
    S: RandSource<u64>,
{
    batch_size: usize,
    next_slot: AtomicUsize,
    failed_slots: AtomicUsize,
    resolved_slots: AtomicUsize,
    pub(crate) allocator: ShortCodeAllocator<S>,
    registered: Mutex<HashSet<DevEui>>,
}

impl<S> BatchState<S>
where
    S: RandSource<u64>,
{
    pub(crate) fn new(batch_size: usize, allocator: ShortCodeAllocator<S>) -> Self {
        Self {
            batch_size,
            next_slot: AtomicUsize::new(0),
            failed_slots: AtomicUsize::new(0),
            resolved_slots: AtomicUsize::new(0),
            allocator,
            registered: Mutex::new(HashSet::with_capacity(batch_size)),
        }
    }

    /// Claims the next unprocessed slot, or `None` once every slot has been
    /// handed out.
    pub(crate) fn claim_slot(&self) -> Option<usize> {
        let slot = self.next_slot.fetch_add(1, Ordering::Relaxed);
        (slot < self.batch_size).then_some(slot)
    }

    /// Number of slots handed to workers so far.
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn started_slots(&self) -> usize {
        self.next_slot.load(Ordering::Relaxed).min(self.batch_size)
    }

    pub(crate) fn record_registered(&self, deveui: DevEui) -> bool {
        self.resolved_slots.fetch_add(1, Ordering::Relaxed);
        self.registered.lock().insert(deveui)
    }

    /// Records a slot that ended without an identifier: failed, exhausted or
    /// abandoned. Only abandoned slots leave the batch unresolved.
    pub(crate) fn record_failed(&self, resolved: bool) {
        self.failed_slots.fetch_add(1, Ordering::Relaxed);
        if resolved {
            self.resolved_slots.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns `true` once every slot has been registered, failed or
    /// exhausted.
    pub(crate) fn is_resolved(&self) -> bool {
        self.resolved_slots.load(Ordering::Relaxed) >= self.batch_size
    }

    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    pub(crate) fn failed_slots(&self) -> usize {
        self.failed_slots.load(Ordering::Relaxed)
    }

    pub(crate) fn take_registered(&self) -> HashSet<DevEui> {
        core::mem::take(&mut *self.registered.lock())
    }
}
