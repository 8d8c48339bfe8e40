use qube_core::common::{
    CAPTURE_START_RESOLUTION, CAPTURE_WORD_INTERVAL, WINDOWS_MAX, WINDOW_LENGTH_MAX,
};

use crate::error::{QubeDriverError, WindowError};

/// An acquisition window in \[ns\] relative to the start of a repetition.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AcquisitionWindow {
    start: u64,
    end: u64,
}

impl AcquisitionWindow {
    /// Creates a new [`AcquisitionWindow`].
    #[must_use]
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Creates a new [`AcquisitionWindow`] from fractional nanoseconds.
    ///
    /// Each boundary is rounded to the nearest ns.
    pub fn from_ns(start: f64, end: f64) -> Result<Self, QubeDriverError> {
        let round = |v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok((v + 0.5) as u64)
            } else {
                Err(QubeDriverError::out_of_range(
                    "acquisition window boundary",
                    v,
                    0.0,
                    f64::MAX,
                ))
            }
        };
        Ok(Self::new(round(start)?, round(end)?))
    }

    /// Start in \[ns\].
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// End in \[ns\].
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.end
    }

    /// Length in \[ns\].
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the window has zero length.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The acquisition windows of a freshly created mux channel.
#[must_use]
pub fn default_windows() -> Vec<AcquisitionWindow> {
    vec![AcquisitionWindow::new(0, WINDOW_LENGTH_MAX)]
}

/// Checks that `windows` are non-empty, chronological, non-overlapping and on the hardware grid.
pub fn validate_windows(windows: &[AcquisitionWindow]) -> Result<(), WindowError> {
    let first = windows.first().ok_or(WindowError::Empty)?;
    if windows.len() > WINDOWS_MAX {
        return Err(WindowError::TooMany(windows.len()));
    }
    if first.start % CAPTURE_START_RESOLUTION != 0 {
        return Err(WindowError::FirstStartNotAligned(first.start));
    }
    windows.iter().try_fold(None, |prev_end: Option<u64>, w| {
        if let Some(v) = [w.start, w.end]
            .into_iter()
            .find(|v| v % CAPTURE_WORD_INTERVAL != 0)
        {
            return Err(WindowError::NotAligned(v));
        }
        if w.start > w.end {
            return Err(WindowError::Reversed {
                start: w.start,
                end: w.end,
            });
        }
        if w.len() > WINDOW_LENGTH_MAX {
            return Err(WindowError::TooLong {
                start: w.start,
                end: w.end,
            });
        }
        match prev_end {
            Some(prev_end) if w.start < prev_end => Err(WindowError::Overlap {
                prev_end,
                start: w.start,
            }),
            _ => Ok(Some(w.end)),
        }
    })?;
    Ok(())
}
