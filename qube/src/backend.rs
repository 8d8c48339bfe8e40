use qube_driver::core::link::{
    LinkError, SharedAwgController, SharedCaptureController, SharedFrequencyController,
    SharedSequencerLink, SharedSwitchController,
};

use crate::config::ChassisInfo;

/// The hardware handles of one chassis.
#[derive(Clone)]
pub struct ChassisHandles {
    /// AWGs.
    pub awg: SharedAwgController,
    /// Capture modules.
    pub capture: SharedCaptureController,
    /// Clock counter and sequencer.
    pub sequencer: SharedSequencerLink,
    /// LO, mixers and NCOs.
    pub frequency: SharedFrequencyController,
    /// GPIO of the microwave switches.
    pub switch: SharedSwitchController,
}

/// Opens the hardware of a chassis.
pub trait Backend {
    /// Connects to the chassis `name` described by `info`.
    fn open(&self, name: &str, info: &ChassisInfo) -> Result<ChassisHandles, LinkError>;
}

#[cfg(feature = "emulator")]
mod emulated {
    use std::{
        collections::{BTreeMap, BTreeSet},
        sync::Mutex,
    };

    use qube_driver::core::link::{lock, LinkError};
    use qube_firmware_emulator::ChassisEmulator;

    use super::{Backend, ChassisHandles};
    use crate::config::ChassisInfo;

    /// A [`Backend`] that opens in-memory chassis emulators.
    #[derive(Default)]
    pub struct EmulatedBackend {
        chassis: Mutex<BTreeMap<String, ChassisEmulator>>,
        unreachable: BTreeSet<String>,
    }

    impl EmulatedBackend {
        /// Creates a new [`EmulatedBackend`].
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes opening the chassis `name` fail.
        #[must_use]
        pub fn with_unreachable(mut self, name: impl Into<String>) -> Self {
            self.unreachable.insert(name.into());
            self
        }

        /// Returns the emulator of an opened chassis.
        #[must_use]
        pub fn chassis(&self, name: &str) -> Option<ChassisEmulator> {
            lock(&self.chassis).get(name).cloned()
        }
    }

    impl Backend for EmulatedBackend {
        fn open(&self, name: &str, _info: &ChassisInfo) -> Result<ChassisHandles, LinkError> {
            if self.unreachable.contains(name) {
                return Err(LinkError::new(format!("{name} is unreachable")));
            }
            let emulator = lock(&self.chassis)
                .entry(name.to_string())
                .or_default()
                .clone();
            Ok(ChassisHandles {
                awg: emulator.awg_controller(),
                capture: emulator.capture_controller(),
                sequencer: emulator.sequencer_link(),
                frequency: emulator.frequency_controller(),
                switch: emulator.switch_controller(),
            })
        }
    }
}

#[cfg(feature = "emulator")]
#[cfg_attr(docsrs, doc(cfg(feature = "emulator")))]
pub use emulated::EmulatedBackend;
