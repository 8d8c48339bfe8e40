use std::collections::HashMap;

use qube_core::{
    common::Freq,
    link::{AdcLine, FrequencyController, LinkError, Sideband, SwitchController},
};

use crate::check_broken;

#[derive(Default)]
pub struct LsiEmulator {
    lo_multipliers: HashMap<(u8, u8), u32>,
    sidebands: HashMap<(u8, u8), Sideband>,
    dac_coarse: HashMap<(u8, u8), Freq>,
    dac_fine: HashMap<(u8, u8, usize), Freq>,
    adc_coarse: HashMap<(u8, AdcLine), Freq>,
    gpio: u16,
    broken: bool,
}

impl LsiEmulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn gpio(&self) -> u16 {
        self.gpio
    }

    pub fn break_down(&mut self) {
        self.broken = true;
    }

    pub fn repair(&mut self) {
        self.broken = false;
    }
}

impl FrequencyController for LsiEmulator {
    fn lo_multiplier(&mut self, group: u8, line: u8) -> Result<u32, LinkError> {
        check_broken(self.broken)?;
        Ok(self.lo_multipliers.get(&(group, line)).copied().unwrap_or(0))
    }

    fn set_lo_multiplier(&mut self, group: u8, line: u8, multiplier: u32) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        self.lo_multipliers.insert((group, line), multiplier);
        Ok(())
    }

    fn sideband(&mut self, group: u8, line: u8) -> Result<Sideband, LinkError> {
        check_broken(self.broken)?;
        Ok(self
            .sidebands
            .get(&(group, line))
            .copied()
            .unwrap_or(Sideband::Usb))
    }

    fn set_sideband(&mut self, group: u8, line: u8, sideband: Sideband) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        self.sidebands.insert((group, line), sideband);
        Ok(())
    }

    fn dac_coarse_nco(&mut self, group: u8, line: u8) -> Result<Freq, LinkError> {
        check_broken(self.broken)?;
        Ok(self
            .dac_coarse
            .get(&(group, line))
            .copied()
            .unwrap_or(Freq::ZERO))
    }

    fn set_dac_coarse_nco(&mut self, group: u8, line: u8, freq: Freq) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        self.dac_coarse.insert((group, line), freq);
        Ok(())
    }

    fn dac_fine_nco(&mut self, group: u8, line: u8, channel: usize) -> Result<Freq, LinkError> {
        check_broken(self.broken)?;
        Ok(self
            .dac_fine
            .get(&(group, line, channel))
            .copied()
            .unwrap_or(Freq::ZERO))
    }

    fn set_dac_fine_nco(
        &mut self,
        group: u8,
        line: u8,
        channel: usize,
        freq: Freq,
    ) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        self.dac_fine.insert((group, line, channel), freq);
        Ok(())
    }

    fn adc_coarse_nco(&mut self, group: u8, line: AdcLine) -> Result<Freq, LinkError> {
        check_broken(self.broken)?;
        Ok(self
            .adc_coarse
            .get(&(group, line))
            .copied()
            .unwrap_or(Freq::ZERO))
    }

    fn set_adc_coarse_nco(
        &mut self,
        group: u8,
        line: AdcLine,
        freq: Freq,
    ) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        self.adc_coarse.insert((group, line), freq);
        Ok(())
    }
}

impl SwitchController for LsiEmulator {
    fn read_gpio(&mut self) -> Result<u16, LinkError> {
        check_broken(self.broken)?;
        Ok(self.gpio)
    }

    fn write_gpio(&mut self, value: u16) -> Result<(), LinkError> {
        check_broken(self.broken)?;
        self.gpio = value;
        Ok(())
    }
}
