use std::time::Duration;

use qube_core::{
    common::{AwgId, NUM_AWGS},
    descriptor::WaveSequence,
    link::{AwgController, LinkError, RegisterAccess},
};

use crate::{check_broken, register::Registers};

pub(crate) fn bitmap(awgs: &[AwgId]) -> Result<u16, LinkError> {
    awgs.iter().try_fold(0u16, |acc, awg| {
        awg.bit()
            .map(|bit| acc | bit)
            .ok_or_else(|| LinkError::new(format!("invalid AWG id: {awg}")))
    })
}

pub struct AwgEmulator {
    sequences: Vec<Option<WaveSequence>>,
    running: u16,
    stop_flags: u16,
    stalled: u16,
    started: usize,
    registers: Registers,
    broken: bool,
}

impl Default for AwgEmulator {
    fn default() -> Self {
        Self::new()
    }
}

impl AwgEmulator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sequences: vec![None; NUM_AWGS],
            running: 0,
            stop_flags: 0,
            stalled: 0,
            started: 0,
            registers: Registers::default(),
            broken: false,
        }
    }

    #[must_use]
    pub fn wave_sequence(&self, awg: AwgId) -> Option<&WaveSequence> {
        self.sequences.get(awg.0 as usize).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn is_running(&self, awg: AwgId) -> bool {
        awg.bit().is_some_and(|bit| self.running & bit != 0)
    }

    #[must_use]
    pub fn stop_flag(&self, awg: AwgId) -> bool {
        awg.bit().is_some_and(|bit| self.stop_flags & bit != 0)
    }

    /// The number of times an AWG has been started.
    #[must_use]
    pub const fn start_count(&self) -> usize {
        self.started
    }

    /// Makes the given AWGs run until terminated.
    pub fn stall(&mut self, awgs: &[AwgId]) {
        self.stalled |= bitmap(awgs).unwrap_or(0);
    }

    /// The value of a control register.
    #[must_use]
    pub fn register(&self, addr: u32, offset: u32) -> u32 {
        self.registers.get(addr, offset)
    }

    pub fn break_down(&mut self) {
        self.broken = true;
    }

    pub fn repair(&mut self) {
        self.broken = false;
    }

    pub(crate) fn start(&mut self, bitmap: u16) {
        let programmed = self
            .sequences
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .fold(0u16, |acc, (i, _)| acc | (1 << i));
        let started = bitmap & programmed;
        self.started += started.count_ones() as usize;
        self.running |= started;
        self.stop_flags &= !started;
    }
}

impl RegisterAccess for AwgEmulator {
    fn read_register(&mut self, addr: u32, offset: u32) -> Result<u32, LinkError> {
        self.registers.read(self.broken, addr, offset)
    }

    fn write_register(&mut self, addr: u32, offset: u32, value: u32) -> Result<(), LinkError> {
        self.registers.write(self.broken, addr, offset, value)
    }
}

impl AwgController for AwgEmulator {
    fn set_wave_sequence(&mut self, awg: AwgId, sequence: &WaveSequence) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        let slot = self
            .sequences
            .get_mut(awg.0 as usize)
            .ok_or_else(|| LinkError::new(format!("invalid AWG id: {awg}")))?;
        *slot = Some(sequence.clone());
        Ok(())
    }

    fn wait_for_awgs_to_stop(
        &mut self,
        timeout: Duration,
        awgs: &[AwgId],
    ) -> Result<bool, LinkError> {
        check_broken(self.broken)?;
        let bits = bitmap(awgs)?;
        if self.running & self.stalled & bits != 0 {
            std::thread::sleep(timeout);
            return Ok(false);
        }
        let finished = self.running & bits;
        self.running &= !bits;
        self.stop_flags |= finished;
        Ok(true)
    }

    fn clear_awg_stop_flags(&mut self, awgs: &[AwgId]) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        self.stop_flags &= !bitmap(awgs)?;
        Ok(())
    }

    fn terminate_awgs(&mut self, awgs: &[AwgId]) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        let bits = bitmap(awgs)?;
        self.stop_flags |= self.running & bits;
        self.running &= !bits;
        self.stalled &= !bits;
        Ok(())
    }
}
