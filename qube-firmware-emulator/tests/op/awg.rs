use std::time::{Duration, Instant};

use qube_core::{
    common::AwgId,
    descriptor::{IqSample, WaveSequence},
    link::{AwgController, LinkError, SequencerLink},
};
use qube_firmware_emulator::ChassisEmulator;

fn sequence() -> WaveSequence {
    let mut seq = WaveSequence::new(0, 1);
    seq.add_chunk(vec![IqSample::new(0, 0); 64], 16, 1);
    seq
}

#[test]
fn set_wave_sequence() -> anyhow::Result<()> {
    let chassis = ChassisEmulator::new();
    let ctrl = chassis.awg_controller();

    ctrl.lock().unwrap().set_wave_sequence(AwgId(3), &sequence())?;

    assert_eq!(Some(&sequence()), chassis.awg().wave_sequence(AwgId(3)));
    assert_eq!(None, chassis.awg().wave_sequence(AwgId(4)));
    assert_eq!(
        Err(LinkError::new("invalid AWG id: 16")),
        ctrl.lock().unwrap().set_wave_sequence(AwgId(16), &sequence())
    );

    Ok(())
}

#[test]
fn stop_and_clear() -> anyhow::Result<()> {
    let chassis = ChassisEmulator::new();
    let ctrl = chassis.awg_controller();
    ctrl.lock().unwrap().set_wave_sequence(AwgId(0), &sequence())?;
    ctrl.lock().unwrap().set_wave_sequence(AwgId(1), &sequence())?;
    chassis.awg().stall(&[AwgId(1)]);

    chassis.sequencer_link().lock().unwrap().add_sequencer(0, 0b11)?;
    assert!(chassis.awg().is_running(AwgId(0)));
    assert!(chassis.awg().is_running(AwgId(1)));

    let mut awg = ctrl.lock().unwrap();
    assert!(awg.wait_for_awgs_to_stop(Duration::from_secs(1), &[AwgId(0)])?);
    let start = Instant::now();
    assert!(!awg.wait_for_awgs_to_stop(Duration::from_millis(20), &[AwgId(0), AwgId(1)])?);
    assert!(start.elapsed() >= Duration::from_millis(20));
    drop(awg);

    assert!(!chassis.awg().is_running(AwgId(0)));
    assert!(chassis.awg().stop_flag(AwgId(0)));
    assert!(chassis.awg().is_running(AwgId(1)));

    ctrl.lock().unwrap().terminate_awgs(&[AwgId(1)])?;
    assert!(!chassis.awg().is_running(AwgId(1)));
    assert!(chassis.awg().stop_flag(AwgId(1)));

    ctrl.lock().unwrap().clear_awg_stop_flags(&[AwgId(0), AwgId(1)])?;
    assert!(!chassis.awg().stop_flag(AwgId(0)));
    assert!(!chassis.awg().stop_flag(AwgId(1)));

    Ok(())
}

#[test]
fn unprogrammed_awg_does_not_start() -> anyhow::Result<()> {
    let chassis = ChassisEmulator::new();

    chassis.sequencer_link().lock().unwrap().add_sequencer(0, 0xFFFF)?;

    assert_eq!(0, chassis.awg().start_count());
    assert!(!chassis.awg().is_running(AwgId(0)));

    Ok(())
}

#[test]
fn broken() {
    let chassis = ChassisEmulator::new();
    chassis.awg().break_down();

    assert_eq!(
        Err(LinkError::new("broken")),
        chassis
            .awg_controller()
            .lock()
            .unwrap()
            .terminate_awgs(&[AwgId(0)])
    );

    chassis.awg().repair();
    assert_eq!(
        Ok(()),
        chassis
            .awg_controller()
            .lock()
            .unwrap()
            .terminate_awgs(&[AwgId(0)])
    );
}
