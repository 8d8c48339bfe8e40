use std::time::Duration;

use derive_more::Display;
use getset::{CopyGetters, Getters, MutGetters};
use qube_driver::{
    core::common::{DEFAULT_SYNC_DELAY, DEFAULT_TIMEOUT},
    error::QubeDriverError,
};

use crate::ledger::RegistrationLedger;

/// Where a session is in the DAQ sequence.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Default)]
pub enum DaqState {
    /// Nothing armed.
    #[default]
    #[display("idle")]
    Idle,
    /// Channels are registered for the next trigger.
    #[display("armed")]
    Armed,
    /// The sequencers have been commanded.
    #[display("triggered")]
    Triggered,
}

/// The state of one client connection.
#[derive(Debug, Getters, MutGetters, CopyGetters)]
pub struct Session {
    selected: Option<String>,
    #[getset(get = "pub", get_mut = "pub(crate)")]
    /// Channels armed for the next trigger.
    ledger: RegistrationLedger,
    #[getset(get_copy = "pub")]
    /// How long `daq_stop` waits for the AWGs.
    timeout: Duration,
    #[getset(get_copy = "pub")]
    /// Delay between the clock reading and the fire time.
    sync_delay: Duration,
    #[getset(get_copy = "pub")]
    /// DAQ state.
    state: DaqState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn duration(name: &'static str, secs: f64) -> Result<Duration, QubeDriverError> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| QubeDriverError::out_of_range(name, secs, 0.0, f64::MAX))
}

impl Session {
    /// Creates a new session with no device selected.
    #[must_use]
    pub fn new() -> Self {
        Self {
            selected: None,
            ledger: RegistrationLedger::new(),
            timeout: DEFAULT_TIMEOUT,
            sync_delay: DEFAULT_SYNC_DELAY,
            state: DaqState::Idle,
        }
    }

    /// The selected device.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub(crate) fn select(&mut self, device: String) {
        self.selected = Some(device);
    }

    /// Sets the `daq_stop` timeout in seconds.
    pub fn set_timeout(&mut self, secs: f64) -> Result<(), QubeDriverError> {
        self.timeout = duration("DAQ timeout", secs)?;
        Ok(())
    }

    /// Sets the synchronization delay in seconds.
    pub fn set_sync_delay(&mut self, secs: f64) -> Result<(), QubeDriverError> {
        self.sync_delay = duration("DAQ synchronization delay", secs)?;
        Ok(())
    }

    pub(crate) fn set_state(&mut self, state: DaqState) {
        self.state = state;
    }
}
