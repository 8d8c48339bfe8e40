use itertools::Itertools;
use qube_driver::{
    core::{
        common::AwgId,
        link::{lock, SequencerLink},
    },
    device::{terminate_awgs, wait_for_awgs},
};

use super::QubeController;
use crate::{
    error::QubeError,
    session::{DaqState, Session},
    trigger::{reference_chassis, sync_delay_ticks, TriggerPlan},
};

impl QubeController {
    /// Routes the trigger AWG of each chassis to its armed capture units.
    ///
    /// The trigger AWG of a chassis is its lowest armed AWG.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn daq_start(&self, session: &Session) -> Result<bool, QubeError> {
        let ledger = session.ledger();
        ledger
            .captures()
            .iter()
            .try_for_each(|(chassis, modules)| -> Result<(), QubeError> {
                let awg = ledger
                    .trigger_awg(chassis)
                    .ok_or_else(|| QubeError::NotArmed(chassis.clone()))?;
                modules.iter().try_for_each(|(module, armed)| -> Result<(), QubeError> {
                    let units = armed.units().iter().copied().collect::<Vec<_>>();
                    self.device_by_name(armed.device())?
                        .set_trigger_board(awg, &units)?;
                    tracing::debug!(
                        "{}: module {} triggered by AWG {}, units {:?}",
                        chassis,
                        module,
                        awg,
                        units
                    );
                    Ok(())
                })
            })?;
        Ok(true)
    }

    /// Fires the armed AWGs of every chassis at a common time.
    ///
    /// The clock of one chassis is read once. Returns `false` if no AWG is armed.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn daq_trigger(&self, session: &mut Session) -> Result<bool, QubeError> {
        let armed = session.ledger().awgs();
        let Some(reference) = reference_chassis(armed, self.config.master_link.as_deref()) else {
            return Ok(false);
        };

        let clock = lock(&self.chassis(reference)?.sequencer).read_clock()?;
        let delay = sync_delay_ticks(session.sync_delay());
        let plan = TriggerPlan::new(clock, delay, armed, &self.skew())?;
        let links = plan
            .commands()
            .iter()
            .map(|cmd| self.chassis(cmd.chassis()).map(|handles| (cmd, &handles.sequencer)))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(
            "clock of {}: {}, base {}, commands: {}",
            reference,
            clock,
            plan.base(),
            plan.commands()
                .iter()
                .map(|cmd| format!("{}@{}/{:#06x}", cmd.chassis(), cmd.time(), cmd.awg_bitmap()))
                .join(", ")
        );

        links.into_iter().try_for_each(|(cmd, sequencer)| {
            lock(sequencer).add_sequencer(cmd.time(), cmd.awg_bitmap())
        })?;
        session.set_state(DaqState::Triggered);
        Ok(true)
    }

    /// Waits until the armed AWGs of every chassis stop, then clears their stop flags.
    ///
    /// Each chassis is waited on a blocking worker. Returns `false` if no AWG is armed.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn daq_stop(&self, session: &mut Session) -> Result<bool, QubeError> {
        if session.ledger().awgs().is_empty() {
            return Ok(false);
        }
        let timeout = session.timeout();
        let armed = session
            .ledger()
            .awgs()
            .iter()
            .map(|(chassis, awgs)| {
                self.chassis(chassis).map(|handles| {
                    (
                        chassis.clone(),
                        handles.awg.clone(),
                        awgs.iter().copied().collect::<Vec<AwgId>>(),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut waits = Vec::with_capacity(armed.len());
        for (chassis, ctrl, awgs) in armed {
            let permit = self
                .workers
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| QubeError::Worker(e.to_string()))?;
            let wait = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                wait_for_awgs(&ctrl, &awgs, timeout)
            });
            waits.push((chassis, wait));
        }

        let mut result = Ok(());
        for (chassis, wait) in waits {
            let r = wait
                .await
                .map_err(|e| QubeError::Worker(e.to_string()))
                .and_then(|r| r.map_err(QubeError::from));
            match r {
                Ok(()) => tracing::debug!("{}: AWGs stopped", chassis),
                Err(e) => {
                    tracing::debug!("{}: {}", chassis, e);
                    if result.is_ok() {
                        result = Err(e);
                    }
                }
            }
        }
        result?;
        session.set_state(DaqState::Idle);
        Ok(true)
    }

    /// Disarms every channel of the session.
    pub fn daq_clear(&self, session: &mut Session) -> Result<bool, QubeError> {
        session.ledger_mut().clear();
        session.set_state(DaqState::Idle);
        Ok(true)
    }

    /// Forcibly stops the armed AWGs and capture units.
    ///
    /// Hardware failures are logged and ignored. Returns `false` if nothing is armed.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn daq_terminate(&self, session: &mut Session) -> Result<bool, QubeError> {
        let ledger = session.ledger();
        if ledger.is_empty() {
            return Ok(false);
        }
        ledger.awgs().iter().for_each(|(chassis, awgs)| {
            let awgs = awgs.iter().copied().collect::<Vec<_>>();
            let r = self
                .chassis(chassis)
                .and_then(|handles| Ok(terminate_awgs(&handles.awg, &awgs)?));
            if let Err(e) = r {
                tracing::warn!("Failed to terminate AWGs {:?} of {}: {}", awgs, chassis, e);
            }
        });
        ledger.captures().values().flat_map(|modules| modules.values()).for_each(|armed| {
            let units = armed.units().iter().copied().collect::<Vec<_>>();
            let r = self
                .device_by_name(armed.device())
                .and_then(|dev| {
                    dev.readout()?.terminate(&units)?;
                    Ok(())
                });
            if let Err(e) = r {
                tracing::warn!(
                    "Failed to terminate capture units {:?} of {}: {}",
                    units,
                    armed.device(),
                    e
                );
            }
        });
        session.set_state(DaqState::Idle);
        Ok(true)
    }

    /// Returns the `daq_stop` timeout in seconds.
    #[must_use]
    pub fn daq_timeout(&self, session: &Session) -> f64 {
        session.timeout().as_secs_f64()
    }

    /// Sets the `daq_stop` timeout in seconds.
    pub fn set_daq_timeout(&self, session: &mut Session, secs: f64) -> Result<f64, QubeError> {
        session.set_timeout(secs)?;
        Ok(secs)
    }

    /// Returns the synchronization delay in seconds.
    #[must_use]
    pub fn daq_sync_delay(&self, session: &Session) -> f64 {
        session.sync_delay().as_secs_f64()
    }

    /// Sets the synchronization delay in seconds.
    pub fn set_daq_sync_delay(&self, session: &mut Session, secs: f64) -> Result<f64, QubeError> {
        session.set_sync_delay(secs)?;
        Ok(secs)
    }
}
