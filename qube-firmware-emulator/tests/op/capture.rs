use qube_core::{
    common::{AwgId, CaptureModuleId, CaptureUnitId},
    descriptor::{CaptureParam, DspUnit, IqSample, WaveSequence},
    link::{AwgController, CaptureController, SequencerLink},
};
use qube_firmware_emulator::{captured_sample_count, ChassisEmulator};

fn param(units: &[DspUnit], shots: u32) -> CaptureParam {
    let mut param = CaptureParam::new();
    param.set_capture_delay(16);
    param.add_sum_section(128, 134);
    param.add_sum_section(128, 890);
    param.set_num_integ_sections(shots);
    param.enable_dsp_units(units.iter().copied());
    param
}

#[rstest::rstest]
#[case(256 * 4 * 10, &[], 10)]
#[case(256 * 10, &[DspUnit::ComplexFir, DspUnit::Decimation], 10)]
#[case(256, &[DspUnit::ComplexFir, DspUnit::Decimation, DspUnit::Integration], 10)]
#[case(2 * 10, &[DspUnit::Decimation, DspUnit::ComplexWindow, DspUnit::Sum], 10)]
#[case(2, &[DspUnit::Decimation, DspUnit::Sum, DspUnit::Integration], 10)]
fn sample_count(#[case] expect: usize, #[case] units: &[DspUnit], #[case] shots: u32) {
    assert_eq!(expect, captured_sample_count(&param(units, shots)));
}

#[test]
fn capture_on_trigger_awg() -> anyhow::Result<()> {
    let chassis = ChassisEmulator::new();
    let mut seq = WaveSequence::new(0, 1);
    seq.add_chunk(vec![IqSample::new(0, 0); 64], 0, 1);
    chassis
        .awg_controller()
        .lock()
        .unwrap()
        .set_wave_sequence(AwgId(15), &seq)?;

    let ctrl = chassis.capture_controller();
    {
        let mut cap = ctrl.lock().unwrap();
        cap.set_capture_params(CaptureUnitId(4), &param(&[DspUnit::Sum], 3))?;
        cap.set_capture_params(CaptureUnitId(5), &param(&[DspUnit::Sum], 3))?;
        cap.select_trigger_awg(CaptureModuleId(1), AwgId(15))?;
        cap.enable_start_trigger(&[CaptureUnitId(4)])?;
    }
    assert!(chassis.capture().is_armed(CaptureUnitId(4)));
    assert_eq!(Some(AwgId(15)), chassis.capture().trigger_awg(CaptureModuleId(1)));

    chassis.sequencer_link().lock().unwrap().add_sequencer(100, 1 << 15)?;

    let mut cap = ctrl.lock().unwrap();
    assert_eq!(6, cap.num_captured_samples(CaptureUnitId(4))?);
    assert_eq!(0, cap.num_captured_samples(CaptureUnitId(5))?);
    let data = cap.get_capture_data(CaptureUnitId(4), 6)?;
    assert_eq!(6, data.len());
    assert!(cap.get_capture_data(CaptureUnitId(4), 7).is_err());
    drop(cap);

    assert!(!chassis.capture().is_armed(CaptureUnitId(4)));

    Ok(())
}

#[test]
fn terminate() -> anyhow::Result<()> {
    let chassis = ChassisEmulator::new();
    let ctrl = chassis.capture_controller();

    ctrl.lock()
        .unwrap()
        .enable_start_trigger(&[CaptureUnitId(0), CaptureUnitId(1)])?;
    ctrl.lock()
        .unwrap()
        .terminate_capture_units(&[CaptureUnitId(0)])?;

    assert!(!chassis.capture().is_armed(CaptureUnitId(0)));
    assert!(chassis.capture().is_terminated(CaptureUnitId(0)));
    assert!(chassis.capture().is_armed(CaptureUnitId(1)));
    assert!(ctrl
        .lock()
        .unwrap()
        .terminate_capture_units(&[CaptureUnitId(8)])
        .is_err());

    Ok(())
}
