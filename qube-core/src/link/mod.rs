mod error;
mod frequency;
mod register;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use num_complex::Complex32;

use crate::{
    common::{AwgId, CaptureModuleId, CaptureUnitId},
    descriptor::{CaptureParam, WaveSequence},
};

pub use error::LinkError;
pub use frequency::*;
pub use register::RegisterAccess;

/// Controls the AWGs of a chassis.
pub trait AwgController: RegisterAccess + Send {
    /// Writes the program of an AWG.
    fn set_wave_sequence(&mut self, awg: AwgId, sequence: &WaveSequence) -> Result<(), LinkError>;

    /// Blocks until the given AWGs finish.
    ///
    /// Returns `false` if they are still running when `timeout` expires. A zero
    /// `timeout` polls once.
    fn wait_for_awgs_to_stop(
        &mut self,
        timeout: Duration,
        awgs: &[AwgId],
    ) -> Result<bool, LinkError>;

    /// Clears the stop flags of the given AWGs.
    fn clear_awg_stop_flags(&mut self, awgs: &[AwgId]) -> Result<(), LinkError>;

    /// Forcibly stops the given AWGs.
    fn terminate_awgs(&mut self, awgs: &[AwgId]) -> Result<(), LinkError>;
}

/// Controls the capture units of a chassis.
pub trait CaptureController: RegisterAccess + Send {
    /// Writes the parameter block of a capture unit.
    fn set_capture_params(
        &mut self,
        unit: CaptureUnitId,
        param: &CaptureParam,
    ) -> Result<(), LinkError>;

    /// Returns the number of samples captured by a unit.
    fn num_captured_samples(&mut self, unit: CaptureUnitId) -> Result<usize, LinkError>;

    /// Reads `num_samples` captured samples of a unit.
    fn get_capture_data(
        &mut self,
        unit: CaptureUnitId,
        num_samples: usize,
    ) -> Result<Vec<Complex32>, LinkError>;

    /// Selects the AWG whose start triggers a capture module.
    fn select_trigger_awg(&mut self, module: CaptureModuleId, awg: AwgId) -> Result<(), LinkError>;

    /// Arms the given units to start on the trigger AWG.
    fn enable_start_trigger(&mut self, units: &[CaptureUnitId]) -> Result<(), LinkError>;

    /// Forcibly stops the given units.
    fn terminate_capture_units(&mut self, units: &[CaptureUnitId]) -> Result<(), LinkError>;
}

/// Accesses the clock counter and the sequencer of a chassis.
pub trait SequencerLink: Send {
    /// Reads the current value of the synchronized clock counter.
    fn read_clock(&mut self) -> Result<u64, LinkError>;

    /// Schedules the AWGs in `awg_bitmap` to start when the clock counter reaches `time`.
    fn add_sequencer(&mut self, time: u64, awg_bitmap: u16) -> Result<(), LinkError>;
}

/// Drives the GPIO port of the microwave switches of a chassis.
pub trait SwitchController: Send {
    /// Reads the GPIO port.
    fn read_gpio(&mut self) -> Result<u16, LinkError>;

    /// Writes the GPIO port.
    fn write_gpio(&mut self, value: u16) -> Result<(), LinkError>;
}

/// Shared handle to an [`AwgController`].
pub type SharedAwgController = Arc<Mutex<dyn AwgController>>;
/// Shared handle to a [`CaptureController`].
pub type SharedCaptureController = Arc<Mutex<dyn CaptureController>>;
/// Shared handle to a [`SequencerLink`].
pub type SharedSequencerLink = Arc<Mutex<dyn SequencerLink>>;
/// Shared handle to a [`FrequencyController`].
pub type SharedFrequencyController = Arc<Mutex<dyn FrequencyController>>;
/// Shared handle to a [`SwitchController`].
pub type SharedSwitchController = Arc<Mutex<dyn SwitchController>>;

/// Locks a shared hardware handle, ignoring poisoning.
pub fn lock<T: ?Sized>(handle: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    handle
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
