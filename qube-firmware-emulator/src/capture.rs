use num_complex::Complex32;
use qube_core::{
    common::{AwgId, CaptureModuleId, CaptureUnitId, SAMPLES_PER_CAPTURE_WORD},
    descriptor::{CaptureParam, DspUnit},
    link::{CaptureController, LinkError, RegisterAccess},
};

use crate::{check_broken, register::Registers};

const NUM_MODULES: usize = 2;
const NUM_UNITS: usize = 8;

/// Returns the number of samples a capture unit produces for `param`.
#[must_use]
pub fn captured_sample_count(param: &CaptureParam) -> usize {
    let per_repetition: usize = param
        .sum_sections()
        .iter()
        .map(|s| {
            if param.is_enabled(DspUnit::Sum) {
                1
            } else if param.is_enabled(DspUnit::Decimation) {
                s.capture_words() as usize
            } else {
                s.capture_words() as usize * SAMPLES_PER_CAPTURE_WORD
            }
        })
        .sum();
    if param.is_enabled(DspUnit::Integration) {
        per_repetition
    } else {
        per_repetition * param.num_integ_sections() as usize
    }
}

pub struct CaptureEmulator {
    params: Vec<Option<CaptureParam>>,
    trigger_awgs: [Option<AwgId>; NUM_MODULES],
    armed: u8,
    data: Vec<Vec<Complex32>>,
    terminated: u8,
    registers: Registers,
    broken: bool,
}

impl Default for CaptureEmulator {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureEmulator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: vec![None; NUM_UNITS],
            trigger_awgs: [None; NUM_MODULES],
            armed: 0,
            data: vec![Vec::new(); NUM_UNITS],
            terminated: 0,
            registers: Registers::default(),
            broken: false,
        }
    }

    fn unit_bit(unit: CaptureUnitId) -> Result<u8, LinkError> {
        if (unit.0 as usize) < NUM_UNITS {
            Ok(1 << unit.0)
        } else {
            Err(LinkError::new(format!("invalid capture unit id: {unit}")))
        }
    }

    #[must_use]
    pub fn capture_param(&self, unit: CaptureUnitId) -> Option<&CaptureParam> {
        self.params.get(unit.0 as usize).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn trigger_awg(&self, module: CaptureModuleId) -> Option<AwgId> {
        self.trigger_awgs.get(module.0 as usize).copied().flatten()
    }

    #[must_use]
    pub fn is_armed(&self, unit: CaptureUnitId) -> bool {
        Self::unit_bit(unit).is_ok_and(|bit| self.armed & bit != 0)
    }

    #[must_use]
    pub fn is_terminated(&self, unit: CaptureUnitId) -> bool {
        Self::unit_bit(unit).is_ok_and(|bit| self.terminated & bit != 0)
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

    pub(crate) fn on_awgs_started(&mut self, awg_bitmap: u16) {
        let triggered = (0..NUM_MODULES as u8)
            .map(CaptureModuleId)
            .filter(|m| {
                self.trigger_awg(*m)
                    .and_then(AwgId::bit)
                    .is_some_and(|bit| awg_bitmap & bit != 0)
            })
            .flat_map(CaptureModuleId::units)
            .filter(|u| self.is_armed(*u))
            .collect::<Vec<_>>();
        triggered.into_iter().for_each(|unit| self.capture(unit));
    }

    fn capture(&mut self, unit: CaptureUnitId) {
        let idx = unit.0 as usize;
        let n = self.params[idx].as_ref().map_or(0, captured_sample_count);
        self.data[idx] = (0..n)
            .map(|i| Complex32::new(unit.0 as f32, i as f32))
            .collect();
        self.armed &= !(1 << unit.0);
        self.terminated &= !(1 << unit.0);
    }
}

impl RegisterAccess for CaptureEmulator {
    fn read_register(&mut self, addr: u32, offset: u32) -> Result<u32, LinkError> {
        self.registers.read(self.broken, addr, offset)
    }

    fn write_register(&mut self, addr: u32, offset: u32, value: u32) -> Result<(), LinkError> {
        self.registers.write(self.broken, addr, offset, value)
    }
}

impl CaptureController for CaptureEmulator {
    fn set_capture_params(
        &mut self,
        unit: CaptureUnitId,
        param: &CaptureParam,
    ) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        Self::unit_bit(unit)?;
        self.params[unit.0 as usize] = Some(param.clone());
        Ok(())
    }

    fn num_captured_samples(&mut self, unit: CaptureUnitId) -> Result<usize, LinkError> {
        check_broken(self.broken)?;
        Self::unit_bit(unit)?;
        Ok(self.data[unit.0 as usize].len())
    }

    fn get_capture_data(
        &mut self,
        unit: CaptureUnitId,
        num_samples: usize,
    ) -> Result<Vec<Complex32>, LinkError> {
        check_broken(self.broken)?;
        Self::unit_bit(unit)?;
        let data = &self.data[unit.0 as usize];
        if num_samples > data.len() {
            return Err(LinkError::new(format!(
                "unit {unit} captured {} samples, {num_samples} requested",
                data.len()
            )));
        }
        Ok(data[..num_samples].to_vec())
    }

    fn select_trigger_awg(&mut self, module: CaptureModuleId, awg: AwgId) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        let slot = self
            .trigger_awgs
            .get_mut(module.0 as usize)
            .ok_or_else(|| LinkError::new(format!("invalid capture module id: {module}")))?;
        *slot = Some(awg);
        Ok(())
    }

    fn enable_start_trigger(&mut self, units: &[CaptureUnitId]) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        self.armed |= units
            .iter()
            .try_fold(0u8, |acc, u| Self::unit_bit(*u).map(|bit| acc | bit))?;
        Ok(())
    }

    fn terminate_capture_units(&mut self, units: &[CaptureUnitId]) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        let bits = units
            .iter()
            .try_fold(0u8, |acc, u| Self::unit_bit(*u).map(|bit| acc | bit))?;
        self.armed &= !bits;
        self.terminated |= bits;
        Ok(())
    }
}
