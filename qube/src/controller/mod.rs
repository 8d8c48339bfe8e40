mod daq;
mod setting;

use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock},
};

use qube_driver::{
    core::link::lock,
    device::{AwgCapability, CaptureCapability, Device, FrequencyCapability, SwitchCapability},
};
use tokio::sync::Semaphore;

use crate::{
    backend::{Backend, ChassisHandles},
    config::{device_name, ChannelConfig, ChannelKind, ChassisInfo, QubeConfig},
    error::QubeError,
    session::Session,
};

pub use setting::obsoleted;

/// The number of threads that may block on AWG completion at once.
pub const BLOCKING_WORKERS: usize = 32;

/// The acquisition engine.
///
/// Owns the opened chassis and their devices. Hardware state is shared by every
/// session; the channels a session arms are kept in its [`Session`].
pub struct QubeController {
    config: Arc<QubeConfig>,
    chassis: BTreeMap<String, ChassisHandles>,
    devices: BTreeMap<String, Mutex<Device>>,
    skew: RwLock<BTreeMap<String, i64>>,
    skew_source: Option<PathBuf>,
    workers: Arc<Semaphore>,
}

fn open_device(
    chassis: &str,
    info: &ChassisInfo,
    ch: &ChannelConfig,
    handles: &ChassisHandles,
) -> Result<Device, QubeError> {
    let name = device_name(chassis, &ch.name);
    let port = ch.port()?;
    let (group, line) = info
        .kind
        .dac_path(port)
        .ok_or_else(|| QubeError::Config(format!("{name}: port {port} does not exist")))?;

    let awg_ids = ch.awg_ids();
    let frequency = FrequencyCapability::new(handles.frequency.clone(), group, line, awg_ids.len());
    if let Some(sideband) = ch.mixer_sb {
        frequency.set_sideband(sideband)?;
    }

    let mut device = Device::new(
        name.clone(),
        chassis,
        AwgCapability::new(handles.awg.clone(), awg_ids),
        frequency,
    );
    if ch.kind == ChannelKind::Mux {
        let (module, adc_line) = ch
            .capture_module()
            .zip(ch.adc_line())
            .ok_or_else(|| QubeError::Config(format!("{name}: readout line without ADC")))?;
        device = device.with_capture(CaptureCapability::new(
            handles.capture.clone(),
            module,
            adc_line,
        ));
    }
    if let Some(mask) = ch.gpio_mask {
        device = device.with_switch(SwitchCapability::new(handles.switch.clone(), mask));
    }
    Ok(device)
}

impl QubeController {
    /// Opens every reachable chassis of `config`.
    ///
    /// A chassis that fails to open is skipped with a warning. Its devices report
    /// [`QubeError::DeviceNotOpen`].
    #[tracing::instrument(skip_all)]
    pub fn open(config: Arc<QubeConfig>, backend: &dyn Backend) -> Self {
        let mut chassis = BTreeMap::new();
        let mut devices = BTreeMap::new();
        config.possible_links.iter().for_each(|(name, info)| {
            tracing::info!("Checking {} ...", name);
            let opened = backend
                .open(name, info)
                .map_err(QubeError::from)
                .and_then(|handles| {
                    let devs = info
                        .channels
                        .iter()
                        .map(|ch| open_device(name, info, ch, &handles))
                        .collect::<Result<Vec<_>, QubeError>>()?;
                    Ok((handles, devs))
                });
            match opened {
                Ok((handles, devs)) => {
                    tracing::info!("Link possible: {} ({} devices)", name, devs.len());
                    devices.extend(devs.into_iter().map(|d| (d.name().clone(), Mutex::new(d))));
                    chassis.insert(name.clone(), handles);
                }
                Err(e) => tracing::warn!("Skipping {}: {}", name, e),
            }
        });

        Self {
            skew: RwLock::new(config.chassis_skew.clone()),
            config,
            chassis,
            devices,
            skew_source: None,
            workers: Arc::new(Semaphore::new(BLOCKING_WORKERS)),
        }
    }

    /// Sets the configuration file that [`reload_skew`](Self::reload_skew) reads.
    #[must_use]
    pub fn with_skew_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.skew_source = Some(path.into());
        self
    }

    /// Returns the names of the opened chassis.
    pub fn chassis_names(&self) -> impl Iterator<Item = &str> {
        self.chassis.keys().map(String::as_str)
    }

    /// Returns the names of the opened devices.
    #[must_use]
    pub fn list_devices(&self) -> Vec<String> {
        self.devices.keys().cloned().collect()
    }

    /// Selects the device that the settings of `session` apply to.
    pub fn select_device(&self, session: &mut Session, name: &str) -> Result<String, QubeError> {
        if self.devices.contains_key(name) {
            session.select(name.to_string());
            return Ok(name.to_string());
        }
        if self.config.device_names().any(|n| n == name) {
            Err(QubeError::DeviceNotOpen(name.to_string()))
        } else {
            Err(QubeError::UnknownDevice(name.to_string()))
        }
    }

    /// Returns a copy of the skew table.
    #[must_use]
    pub fn skew(&self) -> BTreeMap<String, i64> {
        self.skew.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replaces the whole skew table.
    pub fn replace_skew(&self, skew: BTreeMap<String, i64>) {
        tracing::info!("Skew reloaded: {:?}", skew);
        *self.skew.write().unwrap_or_else(PoisonError::into_inner) = skew;
    }

    /// Reloads the skew table from the configuration file.
    pub fn reload_skew(&self) -> Result<bool, QubeError> {
        let path = self
            .skew_source
            .as_ref()
            .ok_or_else(|| {
                QubeError::Config("no configuration file to reload the skew from".to_string())
            })?;
        let config = QubeConfig::load(path)?;
        self.replace_skew(config.chassis_skew);
        Ok(true)
    }

    fn chassis(&self, name: &str) -> Result<&ChassisHandles, QubeError> {
        self.chassis
            .get(name)
            .ok_or_else(|| QubeError::DeviceNotOpen(name.to_string()))
    }

    fn device_by_name(&self, name: &str) -> Result<MutexGuard<'_, Device>, QubeError> {
        self.devices
            .get(name)
            .map(lock)
            .ok_or_else(|| QubeError::UnknownDevice(name.to_string()))
    }

    fn device(&self, session: &Session) -> Result<MutexGuard<'_, Device>, QubeError> {
        self.device_by_name(session.selected().ok_or(QubeError::NoDeviceSelected)?)
    }
}

#[cfg(test)]
mod tests;
