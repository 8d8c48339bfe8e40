use qube_core::link::{LinkError, SequencerLink};
use qube_firmware_emulator::ChassisEmulator;

#[test]
fn clock() -> anyhow::Result<()> {
    let chassis = ChassisEmulator::new();
    chassis.sequencer().set_clock(0x1234_5678);

    let link = chassis.sequencer_link();
    assert_eq!(0x1234_5678, link.lock().unwrap().read_clock()?);

    link.lock().unwrap().add_sequencer(0x2000_0000, 0x0003)?;
    link.lock().unwrap().add_sequencer(0x1000_0000, 0x0004)?;

    assert_eq!(0x2000_0000, chassis.sequencer().clock());
    assert_eq!(
        &[(0x2000_0000, 0x0003), (0x1000_0000, 0x0004)],
        chassis.sequencer().commands()
    );

    Ok(())
}

#[test]
fn broken() {
    let chassis = ChassisEmulator::new();
    chassis.sequencer().break_down();

    assert_eq!(
        Err(LinkError::new("broken")),
        chassis.sequencer_link().lock().unwrap().read_clock()
    );
}
