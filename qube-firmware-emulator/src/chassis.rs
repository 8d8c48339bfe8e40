use std::sync::{Arc, Mutex, MutexGuard};

use qube_core::link::{
    lock, SharedAwgController, SharedCaptureController, SharedFrequencyController,
    SharedSequencerLink, SharedSwitchController,
};

use crate::{AwgEmulator, CaptureEmulator, LsiEmulator, SequencerEmulator};

/// An emulated chassis. Clones share the same hardware state.
#[derive(Clone)]
pub struct ChassisEmulator {
    awg: Arc<Mutex<AwgEmulator>>,
    capture: Arc<Mutex<CaptureEmulator>>,
    sequencer: Arc<Mutex<SequencerEmulator>>,
    lsi: Arc<Mutex<LsiEmulator>>,
}

impl Default for ChassisEmulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChassisEmulator {
    #[must_use]
    pub fn new() -> Self {
        let awg = Arc::new(Mutex::new(AwgEmulator::new()));
        let capture = Arc::new(Mutex::new(CaptureEmulator::new()));
        let sequencer = Arc::new(Mutex::new(SequencerEmulator::new(
            awg.clone(),
            capture.clone(),
        )));
        Self {
            awg,
            capture,
            sequencer,
            lsi: Arc::new(Mutex::new(LsiEmulator::new())),
        }
    }

    pub fn awg(&self) -> MutexGuard<'_, AwgEmulator> {
        lock(&self.awg)
    }

    pub fn capture(&self) -> MutexGuard<'_, CaptureEmulator> {
        lock(&self.capture)
    }

    pub fn sequencer(&self) -> MutexGuard<'_, SequencerEmulator> {
        lock(&self.sequencer)
    }

    pub fn lsi(&self) -> MutexGuard<'_, LsiEmulator> {
        lock(&self.lsi)
    }

    #[must_use]
    pub fn awg_controller(&self) -> SharedAwgController {
        self.awg.clone()
    }

    #[must_use]
    pub fn capture_controller(&self) -> SharedCaptureController {
        self.capture.clone()
    }

    #[must_use]
    pub fn sequencer_link(&self) -> SharedSequencerLink {
        self.sequencer.clone()
    }

    #[must_use]
    pub fn frequency_controller(&self) -> SharedFrequencyController {
        self.lsi.clone()
    }

    #[must_use]
    pub fn switch_controller(&self) -> SharedSwitchController {
        self.lsi.clone()
    }
}
