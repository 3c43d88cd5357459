use crate::{DevEui, Error, RandSource, Result, ShortCode, ThreadRandom};
use parking_lot::Mutex;
use std::collections::HashSet;

/// Upper bound on random draws for a single allocation.
///
/// With a 2^20 short-code space, hitting this bound requires the run to have
/// used nearly every code, or a broken random source. The loop is expected to
/// finish after one or two draws for batches of a few thousand identifiers.
pub const MAX_SHORT_CODE_DRAWS: usize = 1 << 16;

/// Hands out random [`DevEui`]s whose short codes are unique within one run.
///
/// The set of used short codes is shared by every worker of a batch and is
/// guarded by a mutex. A short code stays used once handed out, even if the
/// registration API later rejects the identifier as a conflict, so a retry
/// never reuses it.
///
/// # Example
/// ```
/// use deveui::{ShortCodeAllocator, ThreadRandom};
///
/// let allocator = ShortCodeAllocator::new(ThreadRandom);
/// let a = allocator.generate_unique_identifier().unwrap();
/// let b = allocator.generate_unique_identifier().unwrap();
/// assert_ne!(a.short_code(), b.short_code());
/// assert_eq!(allocator.used(), 2);
/// ```
#[derive(Debug)]
pub struct ShortCodeAllocator<R = ThreadRandom>
where
    R: RandSource<u64>,
{
    rng: R,
    used: Mutex<HashSet<ShortCode>>,
    max_draws: usize,
}

impl<R> ShortCodeAllocator<R>
where
    R: RandSource<u64>,
{
    /// Creates an allocator with an empty short-code set.
    pub fn new(rng: R) -> Self {
        Self::with_max_draws(rng, MAX_SHORT_CODE_DRAWS)
    }

    /// Creates an allocator that gives up after `max_draws` colliding draws.
    pub fn with_max_draws(rng: R, max_draws: usize) -> Self {
        Self {
            rng,
            used: Mutex::new(HashSet::new()),
            max_draws: max_draws.max(1),
        }
    }

    /// Draws random identifiers until one has an unused short code, records
    /// that code and returns the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShortCodesExhausted`] if `max_draws` consecutive draws
    /// all collide with codes already in use.
    pub fn generate_unique_identifier(&self) -> Result<DevEui> {
        for _ in 0..self.max_draws {
            let deveui = DevEui::from_raw(self.rng.rand());
            // Insert under the lock so two workers can never accept the same
            // code between a check and a record.
            if self.used.lock().insert(deveui.short_code()) {
                return Ok(deveui);
            }
            #[cfg(feature = "tracing")]
            tracing::trace!(%deveui, "Short code {} already used, redrawing", deveui.short_code());
        }

        Err(Error::ShortCodesExhausted {
            draws: self.max_draws,
            used: self.used(),
        })
    }

    /// Returns whether `code` has been handed out in this run.
    pub fn is_used(&self, code: ShortCode) -> bool {
        self.used.lock().contains(&code)
    }

    /// Returns the number of short codes handed out so far.
    pub fn used(&self) -> usize {
        self.used.lock().len()
    }
}

impl Default for ShortCodeAllocator<ThreadRandom> {
    fn default() -> Self {
        Self::new(ThreadRandom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    /// Replays a fixed list of values, then repeats the last one.
    struct ScriptedRand {
        values: Vec<u64>,
        next: AtomicUsize,
    }

    impl ScriptedRand {
        fn new(values: Vec<u64>) -> Self {
            Self {
                values,
                next: AtomicUsize::new(0),
            }
        }
    }

    impl RandSource<u64> for ScriptedRand {
        fn rand(&self) -> u64 {
            let i = self.next.fetch_add(1, Ordering::Relaxed);
            self.values[i.min(self.values.len() - 1)]
        }
    }

    #[test]
    fn skips_draws_whose_short_code_is_taken() {
        let rng = ScriptedRand::new(vec![
            0x0000_0000_0001_2345,
            0xFFFF_FFFF_FFF1_2345, // same short code as the first draw
            0x0000_0000_0006_7890,
        ]);
        let allocator = ShortCodeAllocator::new(rng);

        let a = allocator.generate_unique_identifier().unwrap();
        let b = allocator.generate_unique_identifier().unwrap();

        assert_eq!(a.to_raw(), 0x0000_0000_0001_2345);
        assert_eq!(b.to_raw(), 0x0000_0000_0006_7890);
        assert!(allocator.is_used(a.short_code()));
        assert!(allocator.is_used(b.short_code()));
        assert_eq!(allocator.used(), 2);
    }

    #[test]
    fn gives_up_after_max_draws() {
        let allocator = ShortCodeAllocator::with_max_draws(ScriptedRand::new(vec![7]), 32);

        assert!(allocator.generate_unique_identifier().is_ok());
        let err = allocator.generate_unique_identifier().unwrap_err();
        assert!(matches!(
            err,
            Error::ShortCodesExhausted { draws: 32, used: 1 }
        ));
    }

    #[test]
    fn short_codes_are_unique_across_threads() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 500;

        let allocator = Arc::new(ShortCodeAllocator::default());
        let seen = Arc::new(Mutex::new(HashSet::new()));

        std::thread::scope(|s| {
            for _ in 0..THREADS {
                let allocator = Arc::clone(&allocator);
                let seen = Arc::clone(&seen);
                s.spawn(move || {
                    for _ in 0..PER_THREAD {
                        let id = allocator.generate_unique_identifier().unwrap();
                        assert!(seen.lock().insert(id.short_code()));
                    }
                });
            }
        });

        assert_eq!(seen.lock().len(), THREADS * PER_THREAD);
        assert_eq!(allocator.used(), THREADS * PER_THREAD);
    }
}
