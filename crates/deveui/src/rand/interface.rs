/// A source of random 64-bit values.
///
/// This abstraction allows you to plug in the thread-local RNG for real runs or
/// a scripted source in tests.
///
/// Implementations must be shareable across worker tasks, so the method takes
/// `&self`.
///
/// # Example
/// ```
/// use deveui::RandSource;
///
/// struct FixedRand;
/// impl RandSource<u64> for FixedRand {
///     fn rand(&self) -> u64 {
///         1234
///     }
/// }
///
/// let rng = FixedRand;
/// assert_eq!(rng.rand(), 1234);
/// ```
pub trait RandSource<T> {
    /// Returns a uniformly distributed random integer.
    fn rand(&self) -> T;
}
