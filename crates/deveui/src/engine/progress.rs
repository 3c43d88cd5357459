use crate::DevEui;

/// Receives one tick per registered identifier.
///
/// Called from worker tasks, possibly concurrently, right after an identifier
/// has been recorded in the batch result.
pub trait Progress: Send + Sync + 'static {
    fn tick(&self, deveui: DevEui);
}

/// Discards progress ticks.
#[derive(Default, Clone, Copy, Debug)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn tick(&self, _deveui: DevEui) {}
}
