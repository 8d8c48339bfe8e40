/// The tolerance divisor used by [`Resolution::check`].
pub const DEFAULT_TOLERANCE_DIVISOR: f64 = 50.0;

/// Checks whether `value` lies on a multiple of `resolution`.
///
/// The value is accepted when twice its distance to the nearest multiple,
/// times `multiplier`, is below `resolution`. Unless `include_zero` is set,
/// a value whose nearest multiple is zero is rejected; this holds for either
/// sign of `value`. Non-finite values are rejected.
#[must_use]
pub fn check_value(value: f64, resolution: f64, multiplier: f64, include_zero: bool) -> bool {
    if !value.is_finite() {
        return false;
    }
    let deviation = ((2.0 * value + resolution).rem_euclid(2.0 * resolution) - resolution).abs();
    if resolution <= multiplier * deviation {
        return false;
    }
    include_zero || nearest_multiple(value, resolution) != 0
}

/// Returns the index of the multiple of `resolution` nearest to `value`.
#[must_use]
pub fn nearest_multiple(value: f64, resolution: f64) -> i64 {
    ((value + resolution / 2.0) / resolution).floor() as i64
}

/// Rounds a non-negative integer duration to the nearest number of `step`s.
#[must_use]
pub const fn round_div(value: u64, step: u64) -> u64 {
    (value + step / 2) / step
}

/// A hardware quantization step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    step: f64,
}

impl Resolution {
    /// Creates a new [`Resolution`].
    #[must_use]
    pub const fn new(step: f64) -> Self {
        Self { step }
    }

    /// Returns the quantization step.
    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Whether `value` is a nonzero multiple of the step.
    #[must_use]
    pub fn check(&self, value: f64) -> bool {
        check_value(value, self.step, DEFAULT_TOLERANCE_DIVISOR, false)
    }

    /// Whether `value` is a multiple of the step, zero included.
    #[must_use]
    pub fn check_including_zero(&self, value: f64) -> bool {
        check_value(value, self.step, DEFAULT_TOLERANCE_DIVISOR, true)
    }

    /// Returns the number of steps nearest to `value`.
    #[must_use]
    pub fn ticks(&self, value: f64) -> i64 {
        nearest_multiple(value, self.step)
    }
}
