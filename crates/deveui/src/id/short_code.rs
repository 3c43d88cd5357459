use core::fmt;

/// The trailing five hex digits of a [`DevEui`], used as the in-run
/// uniqueness key.
///
/// Five hex digits are the low 20 bits of the identifier, so there are
/// [`ShortCode::SPACE`] distinct codes. Short codes are never sent to the
/// registration API.
///
/// [`DevEui`]: crate::DevEui
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortCode(u32);

impl ShortCode {
    /// Number of hex digits in a short code.
    pub const HEX_DIGITS: usize = 5;

    /// Number of distinct short codes.
    pub const SPACE: usize = 1 << (Self::HEX_DIGITS * 4);

    const MASK: u64 = (Self::SPACE as u64) - 1;

    /// Derives the short code of a raw 64-bit identifier.
    pub const fn of(raw: u64) -> Self {
        Self((raw & Self::MASK) as u32)
    }

    /// Returns the 20-bit value of this code.
    pub const fn to_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$X}", self.0, width = Self::HEX_DIGITS)
    }
}

impl fmt::Debug for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShortCode({self})")
    }
}
