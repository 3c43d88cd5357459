use crate::{Error, id::ShortCode};
use core::{fmt, str::FromStr};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A 64-bit LoRaWAN device identifier.
///
/// Rendered as 16 upper-case hex digits, zero padded. Parsing accepts either
/// case. The value is immutable once created; the engine never mutates an
/// identifier after it has been drawn.
///
/// # Example
/// ```
/// use deveui::DevEui;
///
/// let id = DevEui::from_raw(0x00AB_CDEF_0123_4567);
/// assert_eq!(id.to_string(), "00ABCDEF01234567");
/// assert_eq!(id.short_code().to_string(), "34567");
/// assert_eq!("00abcdef01234567".parse::<DevEui>().unwrap(), id);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DevEui(u64);

impl DevEui {
    /// Number of hex digits in the rendered form.
    pub const HEX_DIGITS: usize = 16;

    /// Wraps a raw 64-bit value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw 64-bit value.
    pub const fn to_raw(&self) -> u64 {
        self.0
    }

    /// Returns the trailing five hex digits of this identifier.
    ///
    /// This is a pure function of the identifier.
    pub const fn short_code(&self) -> ShortCode {
        ShortCode::of(self.0)
    }
}

impl fmt::Display for DevEui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$X}", self.0, width = Self::HEX_DIGITS)
    }
}

impl fmt::Debug for DevEui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DevEui({self})")
    }
}

impl FromStr for DevEui {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::HEX_DIGITS {
            return Err(Error::InvalidDevEui {
                input: s.to_string(),
                reason: format!("expected {} hex digits, got {}", Self::HEX_DIGITS, s.len()),
            });
        }
        // `from_str_radix` tolerates a leading `+`, which is not a hex digit.
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidDevEui {
                input: s.to_string(),
                reason: "contains a non-hex character".to_string(),
            });
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|e| Error::InvalidDevEui {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl Serialize for DevEui {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DevEui {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
