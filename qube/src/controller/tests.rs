use std::{collections::BTreeMap, sync::Arc, time::Duration};

use num_complex::Complex64;
use qube_driver::{
    acquisition::{AcquisitionMode, AcquisitionWindow},
    core::{
        common::{AwgId, CaptureUnitId, MHz},
        link::{FrequencyController, Sideband},
    },
    device::{RegisterField, Role},
    error::QubeDriverError,
};

use super::*;
use crate::{backend::EmulatedBackend, config::tests::CONFIG, session::DaqState};

const CONTROL: &str = "qube010-control_5";
const READOUT: &str = "qube010-readout_01";

fn open(backend: &EmulatedBackend) -> anyhow::Result<QubeController> {
    let config = Arc::new(QubeConfig::from_json(CONFIG)?);
    Ok(QubeController::open(config, backend))
}

fn session(qube: &QubeController, device: &str) -> anyhow::Result<Session> {
    let mut session = Session::new();
    qube.select_device(&mut session, device)?;
    Ok(session)
}

fn waveform(len: usize, amp: f64) -> Vec<Complex64> {
    vec![Complex64::new(amp, 0.0); len]
}

#[test]
fn open_all() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;

    assert_eq!(
        vec![CONTROL, READOUT, "qube011-control_2"],
        qube.list_devices()
    );
    assert_eq!(vec!["qube010", "qube011"], qube.chassis_names().collect::<Vec<_>>());

    let chassis = backend.chassis("qube010").unwrap();
    assert_eq!(Sideband::Lsb, chassis.lsi().sideband(0, 0)?);
    assert_eq!(Sideband::Usb, chassis.lsi().sideband(0, 2)?);
    Ok(())
}

#[test]
fn open_skips_unreachable() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new().with_unreachable("qube011");
    let qube = open(&backend)?;

    assert_eq!(vec![CONTROL, READOUT], qube.list_devices());
    let mut session = Session::new();
    assert_eq!(
        Err(QubeError::DeviceNotOpen("qube011-control_2".to_string())),
        qube.select_device(&mut session, "qube011-control_2")
    );
    assert_eq!(
        Err(QubeError::UnknownDevice("qube099-control_2".to_string())),
        qube.select_device(&mut session, "qube099-control_2")
    );
    assert_eq!(None, session.selected());
    Ok(())
}

#[test]
fn no_device_selected() -> anyhow::Result<()> {
    let qube = open(&EmulatedBackend::new())?;
    assert_eq!(Err(QubeError::NoDeviceSelected), qube.shots(&Session::new()));
    Ok(())
}

#[test]
fn sequence_settings() -> anyhow::Result<()> {
    let qube = open(&EmulatedBackend::new())?;
    let session = session(&qube, CONTROL)?;

    assert_eq!(Role::Control, qube.role(&session)?);
    assert_eq!(3, qube.dac_channels(&session)?);

    assert_eq!(1, qube.shots(&session)?);
    assert_eq!(1000, qube.set_shots(&session, 1000)?);
    assert_eq!(1000, qube.shots(&session)?);
    assert_eq!(
        Err(QubeError::Driver(QubeDriverError::out_of_range(
            "shots",
            0.0,
            1.0,
            u32::MAX as f64
        ))),
        qube.set_shots(&session, 0)
    );

    assert_eq!(20480, qube.set_repetition_time(&session, 20480.0)?);
    assert!(qube.set_repetition_time(&session, 20000.0).is_err());
    assert!(qube.set_repetition_time(&session, f64::INFINITY).is_err());
    assert!(qube.set_repetition_time(&session, f64::NAN).is_err());
    assert_eq!(20480, qube.repetition_time(&session)?);

    assert_eq!(10240, qube.set_sequence_length(&session, 10240.0)?);
    assert!(qube.set_sequence_length(&session, 10200.0).is_err());
    assert!(qube.set_sequence_length(&session, 199_936.0).is_err());
    assert!(qube.set_sequence_length(&session, 200_064.0).is_err());
    assert!(qube.set_sequence_length(&session, f64::INFINITY).is_err());
    assert_eq!(10240, qube.sequence_length(&session)?);
    Ok(())
}

#[test]
fn settings_are_per_device() -> anyhow::Result<()> {
    let qube = open(&EmulatedBackend::new())?;
    let control = session(&qube, CONTROL)?;
    let readout = session(&qube, READOUT)?;

    qube.set_shots(&control, 10)?;
    assert_eq!(10, qube.shots(&control)?);
    assert_eq!(1, qube.shots(&readout)?);
    Ok(())
}

#[rstest::rstest]
#[case(Some("shots"), "repeat_count")]
#[case(Some("acquisition_number"), "acquisition_count")]
#[case(Some("acquisition_fir_coefficients"), "filter_pre_coefficients")]
#[case(Some("acquisition_window_coefficients"), "average_window_coefficients")]
#[case(None, "shots")]
fn obsoleted_settings(#[case] expect: Option<&str>, #[case] setting: &str) {
    match obsoleted(setting) {
        Some(QubeError::Obsoleted {
            setting: name,
            replacement,
        }) => {
            assert_eq!(setting, name);
            assert_eq!(expect, Some(replacement));
        }
        Some(e) => panic!("unexpected error: {e}"),
        None => assert_eq!(None, expect),
    }
}

#[test]
fn acquisition_settings() -> anyhow::Result<()> {
    let qube = open(&EmulatedBackend::new())?;
    let session = session(&qube, READOUT)?;

    assert_eq!(Role::Readout, qube.role(&session)?);
    assert_eq!(1, qube.acquisition_number(&session, 0)?);
    assert_eq!(
        vec![AcquisitionWindow::new(0, 2048)],
        qube.acquisition_window(&session, 0)?
    );
    assert_eq!(AcquisitionMode::Averaged, qube.acquisition_mode(&session, 0)?);

    qube.set_acquisition_window(&session, 2, &[(128.0, 1152.0), (2224.0, 3248.0)])?;
    assert_eq!(2, qube.acquisition_number(&session, 2)?);
    assert_eq!(
        vec![AcquisitionWindow::new(128, 1152), AcquisitionWindow::new(2224, 3248)],
        qube.acquisition_window(&session, 2)?
    );
    assert_eq!(1, qube.acquisition_number(&session, 0)?);
    assert!(qube.set_acquisition_window(&session, 2, &[(8.0, 16.0)]).is_err());
    assert_eq!(2, qube.acquisition_window(&session, 2)?.len());

    assert_eq!(4, qube.set_acquisition_number(&session, 2, 4)?);
    assert!(qube.set_acquisition_number(&session, 2, 9).is_err());
    assert!(qube.set_acquisition_number(&session, 2, 0).is_err());
    assert_eq!(4, qube.acquisition_number(&session, 2)?);

    qube.set_acquisition_mode(&session, 1, AcquisitionMode::SummedAveraged)?;
    assert_eq!(AcquisitionMode::SummedAveraged, qube.acquisition_mode(&session, 1)?);

    assert!(qube.set_acquisition_fir_coefficients(
        &session,
        0,
        vec![Complex64::new(0.5, 0.0); 16]
    )?);
    assert!(qube
        .set_acquisition_fir_coefficients(&session, 0, vec![Complex64::new(0.5, 0.0); 17])
        .is_err());
    assert!(qube
        .set_acquisition_fir_coefficients(&session, 0, vec![Complex64::new(1.0, 0.0)])
        .is_err());
    assert!(qube.set_acquisition_window_coefficients(
        &session,
        0,
        vec![Complex64::new(0.0, 0.5); 256]
    )?);
    assert!(qube.set_acquisition_window_coefficients(&session, 0, Vec::new()).is_err());

    assert!(qube.acquisition_number(&session, 4).is_err());
    Ok(())
}

#[test]
fn acquisition_settings_on_control() -> anyhow::Result<()> {
    let qube = open(&EmulatedBackend::new())?;
    let session = session(&qube, CONTROL)?;

    assert_eq!(
        Err(QubeError::Driver(QubeDriverError::InvalidDevice {
            device: CONTROL.to_string(),
            capability: "readout",
        })),
        qube.acquisition_number(&session, 0)
    );
    assert!(qube.set_acquisition_mode(&session, 0, AcquisitionMode::Raw).is_err());
    assert!(qube.download_waveform(&session, &[0]).is_err());
    Ok(())
}

#[test]
fn auto_coefficients() -> anyhow::Result<()> {
    let qube = open(&EmulatedBackend::new())?;
    let session = session(&qube, READOUT)?;

    assert!(qube.debug_auto_acquisition_fir_coefficients(&session, 0, 31.25 * MHz, None)?);
    assert!(qube.debug_auto_acquisition_fir_coefficients(&session, 0, -(31.25 * MHz), Some(2.0))?);
    assert!(qube
        .debug_auto_acquisition_fir_coefficients(&session, 0, 250.0 * MHz, None)
        .is_err());
    assert!(qube
        .debug_auto_acquisition_fir_coefficients(&session, 4, 0.0 * MHz, None)
        .is_err());

    qube.set_acquisition_window(&session, 0, &[(0.0, 1024.0)])?;
    assert!(qube.debug_auto_acquisition_window_coefficients(&session, 0, 10.0 * MHz)?);
    assert!(qube
        .debug_auto_acquisition_window_coefficients(&session, 0, -(300.0 * MHz))
        .is_err());
    Ok(())
}

#[test]
fn frequency_settings() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let control = session(&qube, CONTROL)?;
    let readout = session(&qube, READOUT)?;

    qube.set_frequency_local(&control, 10200.0 * MHz)?;
    assert_eq!(10200.0 * MHz, qube.frequency_local(&control)?);
    assert_eq!(102, backend.chassis("qube010").unwrap().lsi().lo_multiplier(0, 2)?);
    assert!(qube.set_frequency_local(&control, 10250.0 * MHz).is_err());

    qube.set_frequency_tx_nco(&control, 1500.0 * MHz)?;
    assert_eq!(1500.0 * MHz, qube.frequency_tx_nco(&control)?);
    assert!(qube.set_frequency_tx_nco(&control, f64::INFINITY * MHz).is_err());
    assert!(qube.set_frequency_tx_fine_nco(&control, 0, f64::NAN * MHz).is_err());
    assert_eq!(1500.0 * MHz, qube.frequency_tx_nco(&control)?);

    qube.set_frequency_tx_fine_nco(&control, 2, -(31.25 * MHz))?;
    assert_eq!(-(31.25 * MHz), qube.frequency_tx_fine_nco(&control, 2)?);
    assert!(qube.set_frequency_tx_fine_nco(&control, 3, 0.0 * MHz).is_err());

    assert_eq!(Sideband::Usb, qube.frequency_sideband(&control)?);
    qube.set_frequency_sideband(&control, Sideband::Lsb)?;
    assert_eq!(Sideband::Lsb, qube.frequency_sideband(&control)?);
    assert_eq!(Sideband::Lsb, qube.frequency_sideband(&readout)?);

    qube.set_frequency_rx_nco(&readout, 1500.0 * MHz)?;
    assert_eq!(1500.0 * MHz, qube.frequency_rx_nco(&readout)?);
    assert!(qube.frequency_rx_nco(&control).is_err());
    Ok(())
}

#[test]
fn ctrl_registers() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let control = session(&qube, CONTROL)?;
    let readout = session(&qube, READOUT)?;
    let chassis = backend.chassis("qube010").unwrap();

    let field = RegisterField::new(0, 0x04, 8, 8)?;
    assert_eq!(0x5A, qube.debug_awg_ctrl_reg(&control, field, Some(0x5A))?);
    assert_eq!(0x5A, qube.debug_awg_ctrl_reg(&readout, field, None)?);
    assert_eq!(0x5A00, chassis.awg().register(0, 0x04));

    assert_eq!(0x5A, qube.debug_cap_ctrl_reg(&readout, field, Some(0x5A))?);
    assert_eq!(0x5A00, chassis.capture().register(0, 0x04));
    assert!(qube.debug_cap_ctrl_reg(&control, field, None).is_err());
    Ok(())
}

#[test]
fn microwave_switch() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let control = session(&qube, CONTROL)?;

    assert!(qube.debug_microwave_switch(&control)?);
    assert!(!qube.set_debug_microwave_switch(&control, false)?);
    assert!(!qube.debug_microwave_switch(&control)?);
    assert_eq!(0x0004, backend.chassis("qube010").unwrap().lsi().gpio());
    assert!(qube.set_debug_microwave_switch(&control, true)?);
    assert!(qube.debug_microwave_switch(&control)?);
    assert_eq!(0x0000, backend.chassis("qube010").unwrap().lsi().gpio());

    let readout = session(&qube, READOUT)?;
    assert!(qube.debug_microwave_switch(&readout).is_err());
    Ok(())
}

#[test]
fn register_channels() -> anyhow::Result<()> {
    let qube = open(&EmulatedBackend::new())?;
    let mut control = session(&qube, CONTROL)?;

    assert!(qube.upload_parameters(&mut control, &[2, 0])?);
    assert!(qube.upload_parameters(&mut control, &[0])?);
    assert_eq!(DaqState::Armed, control.state());
    assert_eq!(
        vec![AwgId(8), AwgId(10)],
        control.ledger().awgs()["qube010"].iter().copied().collect::<Vec<_>>()
    );
    assert!(qube.upload_parameters(&mut control, &[3]).is_err());

    let mut readout = session(&qube, READOUT)?;
    assert_eq!(vec![false; 4], qube.acquisition_mux_enable(&readout, None)?);
    assert!(qube.upload_readout_parameters(&mut readout, &[3])?);
    assert_eq!(
        vec![false, false, false, true],
        qube.acquisition_mux_enable(&readout, None)?
    );
    assert_eq!(vec![true], qube.acquisition_mux_enable(&readout, Some(3))?);
    assert!(readout.ledger().is_unit_armed(
        "qube010",
        qube_driver::core::common::CaptureModuleId(1),
        CaptureUnitId(7)
    ));
    assert!(control.ledger().captures().is_empty());
    Ok(())
}

#[test]
fn start_without_armed_awg() -> anyhow::Result<()> {
    let qube = open(&EmulatedBackend::new())?;
    let mut session = session(&qube, READOUT)?;

    qube.upload_readout_parameters(&mut session, &[0])?;
    assert_eq!(
        Err(QubeError::NotArmed("qube010".to_string())),
        qube.daq_start(&session)
    );
    Ok(())
}

#[test]
fn trigger_without_armed_awg() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let mut session = session(&qube, READOUT)?;

    assert!(qube.daq_start(&session)?);
    assert!(!qube.daq_trigger(&mut session)?);
    assert!(backend.chassis("qube010").unwrap().sequencer().commands().is_empty());
    assert_eq!(DaqState::Idle, session.state());
    Ok(())
}

#[tokio::test]
async fn start_trigger_stop() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let mut session = session(&qube, READOUT)?;
    let chassis = backend.chassis("qube010").unwrap();
    chassis.sequencer().set_clock(0x1000_0003);

    qube.upload_waveform(&session, &[waveform(4096, 0.5)], &[0])?;
    qube.upload_parameters(&mut session, &[0])?;
    qube.upload_readout_parameters(&mut session, &[3])?;

    assert!(qube.daq_start(&session)?);
    assert!(chassis.capture().is_armed(CaptureUnitId(7)));

    assert!(qube.daq_trigger(&mut session)?);
    assert_eq!(DaqState::Triggered, session.state());
    let base = (0x1000_0003_u64 + 125_000_000) & !0xF;
    assert_eq!(&[(base + 16, 0x8000)], chassis.sequencer().commands());
    assert!(chassis.awg().is_running(AwgId(15)));

    assert!(qube.daq_stop(&mut session).await?);
    assert_eq!(DaqState::Idle, session.state());
    assert!(!chassis.awg().is_running(AwgId(15)));
    assert!(!chassis.awg().stop_flag(AwgId(15)));

    let data = qube.download_waveform(&session, &[3, 0])?;
    assert_eq!(256, data[0].len());
    assert!(data[1].is_empty());

    assert!(!session.ledger().is_empty());
    Ok(())
}

#[tokio::test]
async fn stop_timeout_then_terminate() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let mut session = session(&qube, READOUT)?;
    let chassis = backend.chassis("qube010").unwrap();

    qube.upload_waveform(&session, &[waveform(4096, 0.5)], &[0])?;
    qube.upload_parameters(&mut session, &[0])?;
    qube.upload_readout_parameters(&mut session, &[1])?;
    qube.set_daq_timeout(&mut session, 0.1)?;
    chassis.awg().stall(&[AwgId(15)]);

    qube.daq_start(&session)?;
    qube.daq_trigger(&mut session)?;
    assert_eq!(
        Err(QubeError::Driver(QubeDriverError::Timeout(
            vec![AwgId(15)],
            Duration::from_millis(100)
        ))),
        qube.daq_stop(&mut session).await
    );
    assert_eq!(DaqState::Triggered, session.state());

    assert!(qube.daq_terminate(&mut session)?);
    assert!(!chassis.awg().is_running(AwgId(15)));
    assert!(!chassis.awg().stop_flag(AwgId(15)));
    assert!(chassis.capture().is_terminated(CaptureUnitId(5)));
    assert_eq!(DaqState::Idle, session.state());
    Ok(())
}

#[tokio::test]
async fn terminate_from_another_session_during_stop() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = Arc::new(open(&backend)?);
    let chassis = backend.chassis("qube010").unwrap();
    let mut waiting = session(&qube, READOUT)?;
    let mut aborting = session(&qube, READOUT)?;

    qube.upload_waveform(&waiting, &[waveform(4096, 0.5)], &[0])?;
    qube.upload_parameters(&mut waiting, &[0])?;
    qube.upload_parameters(&mut aborting, &[0])?;
    qube.set_daq_timeout(&mut waiting, 5.0)?;
    chassis.awg().stall(&[AwgId(15)]);
    qube.daq_trigger(&mut waiting)?;

    let start = std::time::Instant::now();
    let stop = tokio::spawn({
        let qube = qube.clone();
        async move {
            let r = qube.daq_stop(&mut waiting).await;
            (r, waiting)
        }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(qube.daq_terminate(&mut aborting)?);
    assert!(start.elapsed() < Duration::from_secs(2));

    let (r, waiting) = stop.await?;
    assert_eq!(Ok(true), r);
    assert_eq!(DaqState::Idle, waiting.state());
    assert!(start.elapsed() < Duration::from_secs(2));
    assert!(!chassis.awg().is_running(AwgId(15)));
    Ok(())
}

#[tokio::test]
async fn clear() -> anyhow::Result<()> {
    let qube = open(&EmulatedBackend::new())?;
    let mut session = session(&qube, CONTROL)?;

    qube.upload_parameters(&mut session, &[0, 1, 2])?;
    assert!(qube.daq_clear(&mut session)?);
    assert!(session.ledger().is_empty());
    assert_eq!(DaqState::Idle, session.state());

    assert!(!qube.daq_trigger(&mut session)?);
    assert!(!qube.daq_stop(&mut session).await?);
    assert!(!qube.daq_terminate(&mut session)?);
    Ok(())
}

#[test]
fn terminate_ignores_broken_hardware() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let mut session = session(&qube, READOUT)?;

    qube.upload_parameters(&mut session, &[0])?;
    qube.upload_readout_parameters(&mut session, &[0])?;
    let chassis = backend.chassis("qube010").unwrap();
    chassis.awg().break_down();
    chassis.capture().break_down();

    assert!(qube.daq_terminate(&mut session)?);
    Ok(())
}

#[test]
fn daq_parameters() -> anyhow::Result<()> {
    let qube = open(&EmulatedBackend::new())?;
    let mut session = Session::new();

    assert_eq!(5.0, qube.daq_timeout(&session));
    assert_eq!(1.0, qube.daq_sync_delay(&session));
    assert_eq!(2.5, qube.set_daq_timeout(&mut session, 2.5)?);
    assert_eq!(0.5, qube.set_daq_sync_delay(&mut session, 0.5)?);
    assert_eq!(2.5, qube.daq_timeout(&session));
    assert_eq!(0.5, qube.daq_sync_delay(&session));
    assert!(qube.set_daq_timeout(&mut session, -1.0).is_err());
    Ok(())
}

#[test]
fn skew() -> anyhow::Result<()> {
    let qube = open(&EmulatedBackend::new())?;

    assert_eq!(Some(&16), qube.skew().get("qube010"));
    qube.replace_skew(BTreeMap::from([("qube010".to_string(), 0)]));
    assert_eq!(BTreeMap::from([("qube010".to_string(), 0)]), qube.skew());

    assert!(matches!(qube.reload_skew(), Err(QubeError::Config(_))));
    Ok(())
}

#[test]
fn trigger_without_skew() -> anyhow::Result<()> {
    let backend = EmulatedBackend::new();
    let qube = open(&backend)?;
    let mut session = session(&qube, CONTROL)?;

    qube.replace_skew(BTreeMap::new());
    qube.upload_parameters(&mut session, &[0])?;
    assert_eq!(
        Err(QubeError::SkewNotFound("qube010".to_string())),
        qube.daq_trigger(&mut session)
    );
    assert!(backend.chassis("qube010").unwrap().sequencer().commands().is_empty());
    Ok(())
}
