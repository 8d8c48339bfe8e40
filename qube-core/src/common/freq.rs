/// \[Hz\]
pub struct Hz;

/// \[MHz\]
#[allow(non_camel_case_types)]
pub struct MHz;

/// Frequency
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Freq {
    freq: f64,
}

impl core::fmt::Debug for Freq {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} MHz", self.mhz())
    }
}

impl Freq {
    /// Zero frequency.
    pub const ZERO: Self = Self { freq: 0.0 };

    #[inline]
    #[must_use]
    /// Returns the frequency in Hz.
    pub const fn hz(&self) -> f64 {
        self.freq
    }

    #[inline]
    #[must_use]
    /// Returns the frequency in MHz.
    pub fn mhz(&self) -> f64 {
        self.freq / 1e6
    }
}

impl core::ops::Mul<Hz> for f64 {
    type Output = Freq;

    fn mul(self, _rhs: Hz) -> Self::Output {
        Self::Output { freq: self }
    }
}

impl core::ops::Mul<MHz> for f64 {
    type Output = Freq;

    fn mul(self, _rhs: MHz) -> Self::Output {
        Self::Output { freq: self * 1e6 }
    }
}

impl core::ops::Add for Freq {
    type Output = Freq;

    fn add(self, rhs: Freq) -> Self::Output {
        Freq {
            freq: self.freq + rhs.freq,
        }
    }
}

impl core::ops::Sub for Freq {
    type Output = Freq;

    fn sub(self, rhs: Freq) -> Self::Output {
        Freq {
            freq: self.freq - rhs.freq,
        }
    }
}

impl core::ops::Neg for Freq {
    type Output = Freq;

    fn neg(self) -> Self::Output {
        Freq { freq: -self.freq }
    }
}
