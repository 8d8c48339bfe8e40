use std::sync::{Arc, Mutex};

use qube_core::link::{lock, LinkError, SequencerLink};

use crate::{check_broken, AwgEmulator, CaptureEmulator};

pub struct SequencerEmulator {
    clock: u64,
    commands: Vec<(u64, u16)>,
    awg: Arc<Mutex<AwgEmulator>>,
    capture: Arc<Mutex<CaptureEmulator>>,
    broken: bool,
}

impl SequencerEmulator {
    #[must_use]
    pub fn new(awg: Arc<Mutex<AwgEmulator>>, capture: Arc<Mutex<CaptureEmulator>>) -> Self {
        Self {
            clock: 0,
            commands: Vec::new(),
            awg,
            capture,
            broken: false,
        }
    }

    #[must_use]
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    pub fn set_clock(&mut self, clock: u64) {
        self.clock = clock;
    }

    /// Every `(time, awg_bitmap)` scheduled so far.
    #[must_use]
    pub fn commands(&self) -> &[(u64, u16)] {
        &self.commands
    }

    pub fn break_down(&mut self) {
        self.broken = true;
    }

    pub fn repair(&mut self) {
        self.broken = false;
    }
}

impl SequencerLink for SequencerEmulator {
    fn read_clock(&mut self) -> Result<u64, LinkError> {
        check_broken(self.broken)?;
        Ok(self.clock)
    }

    fn add_sequencer(&mut self, time: u64, awg_bitmap: u16) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        self.commands.push((time, awg_bitmap));
        // fires at once; the clock jumps to the fire time
        self.clock = self.clock.max(time);
        lock(&self.awg).start(awg_bitmap);
        lock(&self.capture).on_awgs_started(awg_bitmap);
        Ok(())
    }
}
