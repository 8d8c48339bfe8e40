use std::time::{Duration, Instant};

use num_complex::Complex64;
use qube_core::{
    common::{
        AwgId, Resolution, DAC_FULL_SCALE, DAC_WORD_INTERVAL, DEFAULT_REPETITION_TIME,
        DEFAULT_SEQUENCE_LENGTH, DEFAULT_SHOTS, REPETITION_TIME_RESOLUTION, SEQUENCE_LENGTH_MAX,
        SEQUENCE_LENGTH_RESOLUTION, WAVEFORM_LENGTH_RESOLUTION, WAVEFORM_SAMPLE_INTERVAL,
    },
    descriptor::{IqSample, WaveSequence},
    link::{lock, SharedAwgController},
};

use super::RegisterField;
use crate::error::{QubeDriverError, WaveformError};

const REPETITION_TIME: Resolution = Resolution::new(REPETITION_TIME_RESOLUTION as f64);
const SEQUENCE_LENGTH: Resolution = Resolution::new(SEQUENCE_LENGTH_RESOLUTION as f64);
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// The AWG channels of a device and their sequence settings.
pub struct AwgCapability {
    ctrl: SharedAwgController,
    awg_ids: Vec<AwgId>,
    shots: u32,
    repetition_time: u64,
    sequence_length: u64,
}

impl AwgCapability {
    /// Creates a new [`AwgCapability`] with default sequence settings.
    #[must_use]
    pub fn new(ctrl: SharedAwgController, awg_ids: Vec<AwgId>) -> Self {
        Self {
            ctrl,
            awg_ids,
            shots: DEFAULT_SHOTS,
            repetition_time: DEFAULT_REPETITION_TIME,
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
        }
    }

    /// Returns the AWG controller of the chassis.
    #[must_use]
    pub const fn controller(&self) -> &SharedAwgController {
        &self.ctrl
    }

    /// Returns the AWG ids of this device in channel order.
    #[must_use]
    pub fn awg_ids(&self) -> &[AwgId] {
        &self.awg_ids
    }

    /// Returns the number of AWG channels.
    #[must_use]
    pub fn num_awgs(&self) -> usize {
        self.awg_ids.len()
    }

    /// Reads or writes a bit field of the AWG control registers.
    pub fn access_register(
        &self,
        field: RegisterField,
        data: Option<u32>,
    ) -> Result<u32, QubeDriverError> {
        field.access(&mut *lock(&self.ctrl), data)
    }

    /// Maps channel indices to AWG ids.
    pub fn awg_ids_of(&self, channels: &[usize]) -> Result<Vec<AwgId>, QubeDriverError> {
        channels
            .iter()
            .map(|&ch| {
                self.awg_ids.get(ch).copied().ok_or_else(|| {
                    QubeDriverError::out_of_range(
                        "awg index",
                        ch as f64,
                        0.0,
                        self.num_awgs().saturating_sub(1) as f64,
                    )
                })
            })
            .collect()
    }

    /// Returns the number of shots.
    #[must_use]
    pub const fn shots(&self) -> u32 {
        self.shots
    }

    /// Sets the number of shots.
    pub fn set_shots(&mut self, shots: u32) {
        self.shots = shots;
    }

    /// Returns the repetition time in \[ns\].
    #[must_use]
    pub const fn repetition_time(&self) -> u64 {
        self.repetition_time
    }

    /// Sets the repetition time, rounded to the nearest multiple of 10240 ns.
    pub fn set_repetition_time(&mut self, ns: f64) -> Result<u64, QubeDriverError> {
        self.repetition_time = u64::try_from(REPETITION_TIME.ticks(ns).max(0))
            .ok()
            .and_then(|ticks| ticks.checked_mul(REPETITION_TIME_RESOLUTION))
            .ok_or_else(|| {
                QubeDriverError::out_of_range(
                    "repetition time",
                    ns,
                    REPETITION_TIME.step(),
                    u64::MAX as f64,
                )
            })?;
        Ok(self.repetition_time)
    }

    /// Returns the sequence length in \[ns\].
    #[must_use]
    pub const fn sequence_length(&self) -> u64 {
        self.sequence_length
    }

    /// Sets the sequence length, rounded to the nearest ns.
    pub fn set_sequence_length(&mut self, ns: f64) -> u64 {
        self.sequence_length = (ns.max(0.0) + 0.5) as u64;
        self.sequence_length
    }

    /// Checks that `ns` is a nonzero multiple of 10240 ns.
    pub fn check_repetition_time(ns: f64) -> Result<(), QubeDriverError> {
        if REPETITION_TIME.check(ns) {
            Ok(())
        } else {
            Err(QubeDriverError::NotMultipleOf {
                name: "repetition time",
                value: ns,
                resolution: REPETITION_TIME.step(),
            })
        }
    }

    /// Checks that `ns` is a nonzero multiple of 128 ns shorter than 199936 ns.
    pub fn check_sequence_length(ns: f64) -> Result<(), QubeDriverError> {
        if !SEQUENCE_LENGTH.check(ns) {
            return Err(QubeDriverError::NotMultipleOf {
                name: "sequence length",
                value: ns,
                resolution: SEQUENCE_LENGTH.step(),
            });
        }
        if ns >= SEQUENCE_LENGTH_MAX as f64 {
            return Err(QubeDriverError::out_of_range(
                "sequence length",
                ns,
                SEQUENCE_LENGTH.step(),
                (SEQUENCE_LENGTH_MAX - SEQUENCE_LENGTH_RESOLUTION) as f64,
            ));
        }
        Ok(())
    }

    /// Checks the shape and amplitude of waveforms for `num_channels` channels.
    pub fn check_waveforms(
        &self,
        waveforms: &[Vec<Complex64>],
        num_channels: usize,
    ) -> Result<(), WaveformError> {
        let rows = waveforms.len();
        if rows != num_channels {
            return Err(WaveformError::ChannelMismatch {
                rows,
                channels: num_channels,
            });
        }
        if rows > self.num_awgs() {
            return Err(WaveformError::TooManyWaveforms {
                rows,
                awgs: self.num_awgs(),
            });
        }
        if let Some(w) = waveforms
            .iter()
            .find(|w| w.len() as u64 * WAVEFORM_SAMPLE_INTERVAL != self.sequence_length)
        {
            return Err(WaveformError::LengthMismatch {
                samples: w.len(),
                sequence_length: self.sequence_length,
            });
        }
        if let Some(w) = waveforms
            .iter()
            .find(|w| w.len() % WAVEFORM_LENGTH_RESOLUTION != 0)
        {
            return Err(WaveformError::LengthNotAligned(w.len()));
        }
        let peak = waveforms
            .iter()
            .flatten()
            .map(|s| s.norm())
            .fold(0.0, f64::max);
        if peak >= 1.0 {
            return Err(WaveformError::AmplitudeOutOfRange(peak));
        }
        Ok(())
    }

    /// Writes one wave sequence per channel.
    ///
    /// Each sequence plays its samples once, stays blank until the end of the
    /// repetition and repeats for every shot.
    #[tracing::instrument(level = "debug", skip(self, waveforms))]
    pub fn upload_waveform(
        &self,
        waveforms: &[Vec<Complex64>],
        channels: &[usize],
    ) -> Result<(), QubeDriverError> {
        let awgs = self.awg_ids_of(channels)?;
        self.check_waveforms(waveforms, channels.len())?;
        let blank_ns = self
            .repetition_time
            .checked_sub(self.sequence_length)
            .ok_or_else(|| {
                QubeDriverError::out_of_range(
                    "sequence length",
                    self.sequence_length as f64,
                    0.0,
                    self.repetition_time as f64,
                )
            })?;
        let blank_words = u32::try_from((blank_ns + DAC_WORD_INTERVAL / 2) / DAC_WORD_INTERVAL)
            .map_err(|_| {
                QubeDriverError::out_of_range(
                    "repetition time",
                    self.repetition_time as f64,
                    0.0,
                    u32::MAX as f64,
                )
            })?;

        let sequences = waveforms
            .iter()
            .map(|w| {
                let mut seq = WaveSequence::new(0, self.shots);
                seq.add_chunk(dacify(w), blank_words, 1);
                seq
            })
            .collect::<Vec<_>>();

        let mut ctrl = lock(&self.ctrl);
        awgs.iter()
            .zip(sequences.iter())
            .try_for_each(|(&awg, seq)| ctrl.set_wave_sequence(awg, seq))?;
        tracing::debug!("{} sequences written, {} blank words", awgs.len(), blank_words);
        Ok(())
    }
}

fn dacify(samples: &[Complex64]) -> Vec<IqSample> {
    samples
        .iter()
        .map(|s| IqSample::new((s.re * DAC_FULL_SCALE) as i16, (s.im * DAC_FULL_SCALE) as i16))
        .collect()
}

/// Forcibly stops `awgs` and clears their stop flags.
pub fn terminate_awgs(ctrl: &SharedAwgController, awgs: &[AwgId]) -> Result<(), QubeDriverError> {
    let mut ctrl = lock(ctrl);
    ctrl.terminate_awgs(awgs)?;
    ctrl.clear_awg_stop_flags(awgs)?;
    Ok(())
}

/// Blocks until `awgs` stop, then clears their stop flags.
///
/// The controller is locked only while polling, so `awgs` can be terminated
/// from another thread during the wait.
pub fn wait_for_awgs(
    ctrl: &SharedAwgController,
    awgs: &[AwgId],
    timeout: Duration,
) -> Result<(), QubeDriverError> {
    let deadline = Instant::now() + timeout;
    loop {
        {
            let mut ctrl = lock(ctrl);
            if ctrl.wait_for_awgs_to_stop(Duration::ZERO, awgs)? {
                ctrl.clear_awg_stop_flags(awgs)?;
                return Ok(());
            }
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(QubeDriverError::Timeout(awgs.to_vec(), timeout));
        }
        std::thread::sleep(remaining.min(STOP_POLL_INTERVAL));
    }
}
