//! Tuned radio frequency

use std::fmt;

/// A tuned COM frequency as reported by the host, in kHz
///
/// The host reports 8.33 kHz-capable COM frequencies as integer kHz
/// (e.g. `118500` for 118.500 MHz). The canonical string form is what the
/// stream directory is queried with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frequency(u32);

impl Frequency {
    /// Create from a kHz reading
    pub const fn from_khz(khz: u32) -> Self {
        Self(khz)
    }

    /// Convert a raw host reading, treating `0` as "no frequency"
    pub fn from_reading(khz: u32) -> Option<Self> {
        (khz != 0).then_some(Self(khz))
    }

    /// Raw value in kHz
    pub fn khz(&self) -> u32 {
        self.0
    }

    /// Frequency in MHz
    pub fn mhz(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Canonical `###.###` string used for directory queries
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

impl From<u32> for Frequency {
    fn from(khz: u32) -> Self {
        Self(khz)
    }
}
