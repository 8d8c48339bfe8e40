mod freq;
mod id;
mod resolution;

use std::time::Duration;

pub use freq::*;
pub use id::*;
pub use resolution::*;

/// The number of AWGs on a chassis.
pub const NUM_AWGS: usize = 16;

/// The number of capture units owned by a capture module.
pub const CAPTURE_UNITS_PER_MODULE: usize = 4;

/// The number of multiplexed readout channels of a readout device.
pub const MUX_CHANNELS: usize = CAPTURE_UNITS_PER_MODULE;

/// The maximum number of acquisition windows per repetition.
pub const WINDOWS_MAX: usize = 8;

/// The interval between two waveform samples in \[ns\].
pub const WAVEFORM_SAMPLE_INTERVAL: u64 = 2;

/// The duration of one AWG word in \[ns\].
pub const DAC_WORD_INTERVAL: u64 = 8;

/// The duration of one capture word in \[ns\].
pub const CAPTURE_WORD_INTERVAL: u64 = 8;

/// The number of raw ADC samples in one capture word.
pub const SAMPLES_PER_CAPTURE_WORD: usize = 4;

/// Waveform lengths must be a multiple of this number of samples.
pub const WAVEFORM_LENGTH_RESOLUTION: usize = 64;

/// The resolution of the repetition time in \[ns\].
pub const REPETITION_TIME_RESOLUTION: u64 = 10240;

/// The resolution of the sequence length in \[ns\].
pub const SEQUENCE_LENGTH_RESOLUTION: u64 = 128;

/// The maximum sequence length in \[ns\].
pub const SEQUENCE_LENGTH_MAX: u64 = 199_936;

/// The resolution of the first acquisition window start in \[ns\].
pub const CAPTURE_START_RESOLUTION: u64 = 128;

/// The maximum length of a single acquisition window in \[ns\].
pub const WINDOW_LENGTH_MAX: u64 = 2048;

/// The maximum number of complex FIR taps.
pub const FIR_COEFS_MAX: usize = 16;

/// The maximum number of complex window coefficients.
pub const WINDOW_COEFS_MAX: usize = 256;

/// Full scale of a DAC sample.
pub const DAC_FULL_SCALE: f64 = 32768.0;

/// Full scale of a quantized FIR coefficient.
pub const FIR_COEF_FULL_SCALE: f64 = 32768.0;

/// Full scale of a quantized window coefficient.
pub const WINDOW_COEF_FULL_SCALE: f64 = 1_073_741_824.0;

/// The resolution of the LO frequency in \[MHz\].
pub const LO_RESOLUTION_MHZ: f64 = 100.0;

/// The sampling rate of the NCOs in \[MHz\].
pub const NCO_SAMPLE_RATE_MHZ: f64 = 2000.0;

/// The resolution of the DAC coarse NCO in \[MHz\].
pub const DAC_COARSE_NCO_RESOLUTION_MHZ: f64 = 12000.0 / 2048.0;

/// The resolution of the DAC fine NCO in \[MHz\].
pub const DAC_FINE_NCO_RESOLUTION_MHZ: f64 = 2000.0 / 1024.0;

/// The resolution of the ADC coarse NCO in \[MHz\].
pub const ADC_COARSE_NCO_RESOLUTION_MHZ: f64 = 6000.0 / 1024.0;

/// The interval between two ADC baseband samples in \[ns\].
pub const ADC_BASEBAND_SAMPLE_INTERVAL: u64 = 2;

/// The baseband sampling rate of the ADC in \[MHz\].
pub const ADC_BASEBAND_SAMPLE_RATE_MHZ: f64 = 500.0;

/// The sampling rate after decimation in \[MHz\].
pub const ADC_DECIMATED_SAMPLE_RATE_MHZ: f64 = 125.0;

/// The frequency of the synchronization clock in \[Hz\].
pub const SYNC_CLOCK_FREQ: u64 = 125_000_000;

/// Fire times are aligned to 16 clock ticks.
pub const SYNC_CLOCK_ALIGN_MASK: u64 = !0xF;

/// The default number of shots.
pub const DEFAULT_SHOTS: u32 = 1;

/// The default repetition time in \[ns\].
pub const DEFAULT_REPETITION_TIME: u64 = 30720;

/// The default sequence length in \[ns\].
pub const DEFAULT_SEQUENCE_LENGTH: u64 = 8192;

/// The default timeout of a DAQ stop.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The default delay between reading the clock and firing the sequencers.
pub const DEFAULT_SYNC_DELAY: Duration = Duration::from_secs(1);
