use crate::RandSource;
use rand::{Rng, rng};

/// A `RandSource` backed by the thread-local RNG (`rand::rng()`).
///
/// This type does **not** store the RNG; it reaches for the current thread's
/// generator on each call. That keeps it `Send + Sync` even though the
/// underlying `ThreadRng` is neither, so it can be shared by every worker in a
/// batch.
#[derive(Default, Clone, Copy, Debug)]
pub struct ThreadRandom;

impl RandSource<u64> for ThreadRandom {
    fn rand(&self) -> u64 {
        rng().random()
    }
}
