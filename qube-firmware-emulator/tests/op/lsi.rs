use qube_core::{
    common::MHz,
    link::{AdcLine, FrequencyController, Sideband, SwitchController},
};
use qube_firmware_emulator::ChassisEmulator;

#[test]
fn frequency() -> anyhow::Result<()> {
    let chassis = ChassisEmulator::new();
    let ctrl = chassis.frequency_controller();
    let mut lsi = ctrl.lock().unwrap();

    assert_eq!(0, lsi.lo_multiplier(0, 1)?);
    lsi.set_lo_multiplier(0, 1, 85)?;
    assert_eq!(85, lsi.lo_multiplier(0, 1)?);
    assert_eq!(0, lsi.lo_multiplier(1, 1)?);

    assert_eq!(Sideband::Usb, lsi.sideband(0, 1)?);
    lsi.set_sideband(0, 1, Sideband::Lsb)?;
    assert_eq!(Sideband::Lsb, lsi.sideband(0, 1)?);

    lsi.set_dac_coarse_nco(0, 1, 1500.0 * MHz)?;
    assert_eq!(1500.0 * MHz, lsi.dac_coarse_nco(0, 1)?);

    lsi.set_dac_fine_nco(0, 1, 2, -15.625 * MHz)?;
    assert_eq!(-15.625 * MHz, lsi.dac_fine_nco(0, 1, 2)?);
    assert_eq!(0.0 * MHz, lsi.dac_fine_nco(0, 1, 1)?);

    lsi.set_adc_coarse_nco(0, AdcLine::Read, 1500.0 * MHz)?;
    assert_eq!(1500.0 * MHz, lsi.adc_coarse_nco(0, AdcLine::Read)?);
    assert_eq!(0.0 * MHz, lsi.adc_coarse_nco(0, AdcLine::Monitor)?);

    Ok(())
}

#[test]
fn gpio() -> anyhow::Result<()> {
    let chassis = ChassisEmulator::new();
    let ctrl = chassis.switch_controller();

    ctrl.lock().unwrap().write_gpio(0x00b1)?;

    assert_eq!(0x00b1, ctrl.lock().unwrap().read_gpio()?);
    assert_eq!(0x00b1, chassis.lsi().gpio());

    Ok(())
}
