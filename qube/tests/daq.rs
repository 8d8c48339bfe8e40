use qube::prelude::*;

use super::{open, pulse, select};

#[tokio::test]
async fn single_chassis() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let mut session = select(&qube, "qube001-readout_01")?;

    qube.set_shots(&session, 1)?;
    qube.set_repetition_time(&session, 20480.0)?;
    qube.set_sequence_length(&session, 10240.0)?;
    assert!(qube.upload_waveform(&session, &[pulse(5120, 0.5)], &[0])?);
    assert!(qube.upload_parameters(&mut session, &[0])?);
    assert!(qube.upload_readout_parameters(&mut session, &[0])?);

    assert!(qube.daq_start(&session)?);
    assert!(qube.daq_trigger(&mut session)?);
    assert!(qube.daq_stop(&mut session).await?);

    let chassis = backend.chassis("qube001").unwrap();
    assert_eq!(1, chassis.sequencer().commands().len());
    assert_eq!(1, chassis.awg().start_count());
    assert_eq!(1, qube.download_waveform(&session, &[0])?.len());
    Ok(())
}

#[tokio::test]
async fn repeated_trigger() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let mut session = select(&qube, "qube001-control_5")?;

    qube.upload_waveform(&session, &[pulse(4096, 0.5), pulse(4096, -0.5)], &[0, 1])?;
    qube.upload_parameters(&mut session, &[0, 1])?;
    (0..3).try_for_each(|_| -> anyhow::Result<()> {
        assert!(qube.daq_start(&session)?);
        assert!(qube.daq_trigger(&mut session)?);
        Ok(())
    })?;
    assert!(qube.daq_stop(&mut session).await?);

    assert_eq!(
        vec![0x0300; 3],
        backend
            .chassis("qube001")
            .unwrap()
            .sequencer()
            .commands()
            .iter()
            .map(|(_, bitmap)| *bitmap)
            .collect::<Vec<_>>()
    );
    Ok(())
}

#[tokio::test]
async fn two_chassis_with_skew() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let qube001 = backend.chassis("qube001").unwrap();
    let qube002 = backend.chassis("qube002").unwrap();
    qube001.sequencer().set_clock(999_999);
    qube002.sequencer().set_clock(1000);

    let mut session = Session::new();
    qube.set_daq_sync_delay(&mut session, 0.5)?;

    qube.select_device(&mut session, "qube001-control_5")?;
    qube.upload_waveform(&session, &[pulse(4096, 0.5)], &[0])?;
    qube.upload_parameters(&mut session, &[0])?;

    qube.select_device(&mut session, "qube002-readout_cd")?;
    qube.upload_waveform(&session, &[pulse(4096, 0.5)], &[0])?;
    qube.upload_parameters(&mut session, &[0])?;
    qube.upload_readout_parameters(&mut session, &[0, 1])?;

    assert!(qube.daq_start(&session)?);
    assert_eq!(Some(AwgId(5)), qube002.capture().trigger_awg(CaptureModuleId(0)));
    assert!(qube.daq_trigger(&mut session)?);

    let base = (1000 + 62_500_000_u64) & !0xF;
    let (t1, b1) = qube001.sequencer().commands()[0];
    let (t2, b2) = qube002.sequencer().commands()[0];
    assert_eq!(base + 16, t1);
    assert_eq!(base - 32, t2);
    assert_eq!(48, t1 - t2);
    assert_eq!(0x0100, b1);
    assert_eq!(0x0020, b2);

    assert!(qube.daq_stop(&mut session).await?);
    let data = qube.download_waveform(&session, &[0, 1, 2])?;
    assert_eq!(256, data[0].len());
    assert_eq!(256, data[1].len());
    assert!(data[2].is_empty());
    Ok(())
}

#[tokio::test]
async fn sessions_are_independent() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let mut s1 = select(&qube, "qube001-control_5")?;
    let mut s2 = select(&qube, "qube002-control_2")?;

    qube.upload_waveform(&s1, &[pulse(4096, 0.5)], &[2])?;
    qube.upload_waveform(&s2, &[pulse(4096, 0.5)], &[1])?;
    qube.upload_parameters(&mut s1, &[2])?;
    qube.upload_parameters(&mut s2, &[1])?;

    assert!(qube.daq_trigger(&mut s1)?);
    assert!(qube.daq_trigger(&mut s2)?);
    assert_eq!(0x0400, backend.chassis("qube001").unwrap().sequencer().commands()[0].1);
    assert_eq!(0x0002, backend.chassis("qube002").unwrap().sequencer().commands()[0].1);

    let (r1, r2) = tokio::join!(qube.daq_stop(&mut s1), qube.daq_stop(&mut s2));
    assert!(r1?);
    assert!(r2?);

    qube.daq_clear(&mut s1)?;
    assert!(s1.ledger().is_empty());
    assert!(!s2.ledger().is_empty());
    Ok(())
}

#[tokio::test]
async fn not_armed() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let mut session = select(&qube, "qube001-control_5")?;
    qube.upload_parameters(&mut session, &[0])?;

    qube.select_device(&mut session, "qube002-readout_cd")?;
    qube.upload_readout_parameters(&mut session, &[0])?;

    assert_eq!(
        Err(QubeError::NotArmed("qube002".to_string())),
        qube.daq_start(&session)
    );
    assert!(!backend.chassis("qube002").unwrap().capture().is_armed(CaptureUnitId(0)));
    Ok(())
}

#[tokio::test]
async fn timeout_and_terminate() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let chassis = backend.chassis("qube002").unwrap();
    let mut session = select(&qube, "qube002-control_2")?;

    qube.set_daq_timeout(&mut session, 0.01)?;
    qube.upload_waveform(&session, &[pulse(4096, 0.5), pulse(4096, 0.5)], &[0, 1])?;
    qube.upload_parameters(&mut session, &[0, 1])?;
    chassis.awg().stall(&[AwgId(1)]);

    qube.daq_trigger(&mut session)?;
    assert!(matches!(
        qube.daq_stop(&mut session).await,
        Err(QubeError::Driver(QubeDriverError::Timeout(..)))
    ));
    assert!(chassis.awg().is_running(AwgId(1)));

    assert!(qube.daq_terminate(&mut session)?);
    assert!(!chassis.awg().is_running(AwgId(0)));
    assert!(!chassis.awg().is_running(AwgId(1)));
    assert_eq!(DaqState::Idle, session.state());
    Ok(())
}
