use std::time::Duration;

use qube_core::{
    common::{
        AwgId, CAPTURE_START_RESOLUTION, CAPTURE_WORD_INTERVAL, WAVEFORM_LENGTH_RESOLUTION,
        WINDOWS_MAX, WINDOW_LENGTH_MAX,
    },
    link::LinkError,
};
use thiserror::Error;

/// An error in the shape or amplitude of uploaded waveforms.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum WaveformError {
    /// The number of waveforms differs from the number of channels.
    #[error("Number of waveforms ({rows}) does not match number of channels ({channels})")]
    ChannelMismatch {
        /// The number of waveforms.
        rows: usize,
        /// The number of channels.
        channels: usize,
    },
    /// More waveforms than AWGs.
    #[error("Number of waveforms ({rows}) exceeds number of AWGs ({awgs})")]
    TooManyWaveforms {
        /// The number of waveforms.
        rows: usize,
        /// The number of AWGs of the device.
        awgs: usize,
    },
    /// The waveform length differs from the sequence length.
    #[error(
        "Waveform length ({samples} samples) does not match sequence length ({sequence_length} ns)"
    )]
    LengthMismatch {
        /// The number of samples.
        samples: usize,
        /// The sequence length in ns.
        sequence_length: u64,
    },
    /// The waveform length is not aligned.
    #[error(
        "Waveform length ({0} samples) must be a multiple of {res}",
        res = WAVEFORM_LENGTH_RESOLUTION
    )]
    LengthNotAligned(usize),
    /// A sample reaches the full scale.
    #[error("Waveform amplitude ({0}) must be less than 1")]
    AmplitudeOutOfRange(f64),
}

impl WaveformError {
    /// Returns the diagnostic code of the failed check, 1 to 5 in order of checking.
    #[must_use]
    pub const fn code(&self) -> u8 {
        match self {
            Self::ChannelMismatch { .. } => 1,
            Self::TooManyWaveforms { .. } => 2,
            Self::LengthMismatch { .. } => 3,
            Self::LengthNotAligned(_) => 4,
            Self::AmplitudeOutOfRange(_) => 5,
        }
    }
}

/// An error in a list of acquisition windows.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum WindowError {
    /// No window.
    #[error("At least one acquisition window is required")]
    Empty,
    /// Too many windows.
    #[error("Number of acquisition windows ({0}) exceeds {max}", max = WINDOWS_MAX)]
    TooMany(usize),
    /// A boundary is not on the capture word grid.
    #[error(
        "Acquisition window boundary ({0} ns) must be a multiple of {res} ns",
        res = CAPTURE_WORD_INTERVAL
    )]
    NotAligned(u64),
    /// The first window does not start on the capture start grid.
    #[error(
        "First acquisition window start ({0} ns) must be a multiple of {res} ns",
        res = CAPTURE_START_RESOLUTION
    )]
    FirstStartNotAligned(u64),
    /// A window ends before it starts.
    #[error("Acquisition window ({start}, {end}) ends before it starts")]
    Reversed {
        /// Start in ns.
        start: u64,
        /// End in ns.
        end: u64,
    },
    /// A window is too long.
    #[error("Acquisition window ({start}, {end}) is longer than {max} ns", max = WINDOW_LENGTH_MAX)]
    TooLong {
        /// Start in ns.
        start: u64,
        /// End in ns.
        end: u64,
    },
    /// Windows overlap or are not chronological.
    #[error(
        "Acquisition window starting at {start} ns overlaps the previous one \
         ending at {prev_end} ns"
    )]
    Overlap {
        /// End of the previous window in ns.
        prev_end: u64,
        /// Start of the window in ns.
        start: u64,
    },
    /// The last window runs into the next repetition.
    #[error(
        "Acquisition window ending at {end} ns runs into the next repetition \
         starting at {next_start} ns"
    )]
    ExceedsRepetition {
        /// End of the last window in ns.
        end: u64,
        /// Start of the first window of the next repetition in ns.
        next_start: u64,
    },
}

/// A interface for error handling in qube-driver.
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum QubeDriverError {
    /// A value is out of range.
    #[error("{name} ({value}) is out of range ([{min}, {max}])")]
    OutOfRange {
        /// The name of the value.
        name: &'static str,
        /// The value.
        value: f64,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// A value is not on the hardware grid.
    #[error("{name} ({value}) must be a multiple of {resolution}")]
    NotMultipleOf {
        /// The name of the value.
        name: &'static str,
        /// The value.
        value: f64,
        /// The hardware resolution.
        resolution: f64,
    },
    /// A value is not one of the accepted items.
    #[error("Invalid {name}: {value}")]
    InvalidItem {
        /// The name of the value.
        name: &'static str,
        /// The value.
        value: String,
    },
    /// The device lacks the capability.
    #[error("{capability} is not supported by {device}")]
    InvalidDevice {
        /// The device name.
        device: String,
        /// The missing capability.
        capability: &'static str,
    },
    /// Invalid waveforms.
    #[error("{0}")]
    InvalidWaveform(#[from] WaveformError),
    /// Invalid acquisition windows.
    #[error("{0}")]
    InvalidWindow(#[from] WindowError),
    /// AWGs did not stop in time.
    #[error("AWGs {0:?} did not stop within {1:?}")]
    Timeout(Vec<AwgId>, Duration),
    /// Error in the hardware.
    #[error("{0}")]
    Link(#[from] LinkError),
}

impl QubeDriverError {
    /// Creates a [`QubeDriverError::OutOfRange`].
    #[must_use]
    pub const fn out_of_range(name: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            name,
            value,
            min,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(1, WaveformError::ChannelMismatch { rows: 1, channels: 2 })]
    #[case(2, WaveformError::TooManyWaveforms { rows: 4, awgs: 3 })]
    #[case(3, WaveformError::LengthMismatch { samples: 64, sequence_length: 256 })]
    #[case(4, WaveformError::LengthNotAligned(96))]
    #[case(5, WaveformError::AmplitudeOutOfRange(1.0))]
    fn code(#[case] expect: u8, #[case] err: WaveformError) {
        assert_eq!(expect, err.code());
    }

    #[test]
    fn display() {
        assert_eq!(
            "Waveform length (96 samples) must be a multiple of 64",
            WaveformError::LengthNotAligned(96).to_string()
        );
        assert_eq!(
            "shots (0) is out of range ([1, 4294967295])",
            QubeDriverError::out_of_range("shots", 0.0, 1.0, u32::MAX as f64).to_string()
        );
        assert_eq!(
            "First acquisition window start (8 ns) must be a multiple of 128 ns",
            QubeDriverError::from(WindowError::FirstStartNotAligned(8)).to_string()
        );
        assert_eq!(
            "readout is not supported by qube010-control_5",
            QubeDriverError::InvalidDevice {
                device: "qube010-control_5".to_string(),
                capability: "readout",
            }
            .to_string()
        );
    }
}
