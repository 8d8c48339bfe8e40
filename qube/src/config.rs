use std::{collections::BTreeMap, path::Path};

use derive_more::Display;
use qube_driver::core::{
    common::{AwgId, CaptureModuleId},
    link::{AdcLine, Sideband},
};
use serde::{Deserialize, Serialize};

use crate::error::QubeError;

/// The port layout of a chassis.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChassisType {
    /// Type A.
    #[display("A")]
    A,
    /// Type B.
    #[display("B")]
    B,
}

impl ChassisType {
    /// Returns the `(group, line)` of the DAC path behind a front-panel port.
    #[must_use]
    pub const fn dac_path(&self, port: u8) -> Option<(u8, u8)> {
        match self {
            Self::A => match port {
                0 => Some((0, 0)),
                2 => Some((0, 1)),
                5 => Some((0, 2)),
                6 => Some((0, 3)),
                13 => Some((1, 0)),
                11 => Some((1, 1)),
                8 => Some((1, 2)),
                7 => Some((1, 3)),
                _ => None,
            },
            Self::B => match port {
                1 => Some((0, 0)),
                2 => Some((0, 1)),
                3 => Some((0, 2)),
                4 => Some((0, 3)),
                8 => Some((1, 0)),
                9 => Some((1, 1)),
                11 => Some((1, 2)),
                10 => Some((1, 3)),
                _ => None,
            },
        }
    }
}

/// The kind of a channel.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// A control line.
    #[display("control")]
    Control,
    /// A readout line.
    #[display("mux")]
    Mux,
}

/// One channel of a chassis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Channel name. The suffix after the last `_` names the front-panel port.
    pub name: String,
    /// Channel kind.
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    /// AWG ids in channel order.
    pub ch_dac: Vec<u8>,
    /// Capture module. Required for readout lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ch_adc: Option<u8>,
    /// Mixer sideband written when the chassis is opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixer_sb: Option<Sideband>,
    /// GPIO bits of the microwave switch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpio_mask: Option<u16>,
}

impl ChannelConfig {
    fn suffix(&self) -> &str {
        self.name.rsplit('_').next().unwrap_or(&self.name)
    }

    /// Returns the front-panel port of the DAC output.
    pub fn port(&self) -> Result<u8, QubeError> {
        match self.suffix() {
            "01" => Ok(0),
            "cd" => Ok(13),
            "a" => Ok(10),
            "b" => Ok(11),
            s => s
                .parse()
                .map_err(|_| QubeError::Config(format!("no port in channel name: {}", self.name))),
        }
    }

    /// Returns the ADC line of a readout port.
    #[must_use]
    pub fn adc_line(&self) -> Option<AdcLine> {
        match self.suffix() {
            "01" => Some(AdcLine::Read),
            "cd" => Some(AdcLine::Monitor),
            _ => None,
        }
    }

    /// Returns the AWG ids.
    #[must_use]
    pub fn awg_ids(&self) -> Vec<AwgId> {
        self.ch_dac.iter().copied().map(AwgId).collect()
    }

    /// Returns the capture module.
    #[must_use]
    pub fn capture_module(&self) -> Option<CaptureModuleId> {
        self.ch_adc.map(CaptureModuleId)
    }
}

/// Addresses and channels of one chassis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChassisInfo {
    /// Address of the AWG and capture FPGA.
    pub ip_fpga: String,
    /// Address of the LO/NCO/mixer controller.
    pub ip_lsi: String,
    /// Address of the clock counter and sequencer.
    pub ip_sync: String,
    /// Port layout.
    #[serde(rename = "type")]
    pub kind: ChassisType,
    /// Channels.
    pub channels: Vec<ChannelConfig>,
}

/// The configuration of a server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QubeConfig {
    /// Chassis that may be reachable, by name.
    pub possible_links: BTreeMap<String, ChassisInfo>,
    /// Skew of each chassis in sync clock ticks.
    #[serde(default)]
    pub chassis_skew: BTreeMap<String, i64>,
    /// Chassis used as the clock reference when it is armed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_link: Option<String>,
}

impl QubeConfig {
    /// Parses and validates a configuration.
    pub fn from_json(json: &str) -> Result<Self, QubeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QubeError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks that every channel maps to hardware.
    pub fn validate(&self) -> Result<(), QubeError> {
        self.possible_links.iter().try_for_each(|(chassis, info)| {
            info.channels.iter().try_for_each(|ch| {
                let port = ch.port()?;
                if info.kind.dac_path(port).is_none() {
                    return Err(QubeError::Config(format!(
                        "{chassis}-{}: port {port} does not exist on type {}",
                        ch.name, info.kind
                    )));
                }
                if ch.ch_dac.is_empty() {
                    return Err(QubeError::Config(format!("{chassis}-{}: no AWG", ch.name)));
                }
                if let Some(awg) = ch.awg_ids().into_iter().find(|a| a.bit().is_none()) {
                    return Err(QubeError::Config(format!(
                        "{chassis}-{}: invalid AWG id {awg}",
                        ch.name
                    )));
                }
                if ch.kind == ChannelKind::Mux {
                    if !matches!(ch.ch_adc, Some(0 | 1)) {
                        return Err(QubeError::Config(format!(
                            "{chassis}-{}: readout line needs capture module 0 or 1",
                            ch.name
                        )));
                    }
                    if ch.adc_line().is_none() {
                        return Err(QubeError::Config(format!(
                            "{chassis}-{}: port {port} has no ADC",
                            ch.name
                        )));
                    }
                }
                Ok(())
            })
        })
    }

    /// Returns the names of all configured devices.
    pub fn device_names(&self) -> impl Iterator<Item = String> + '_ {
        self.possible_links.iter().flat_map(|(chassis, info)| {
            info.channels
                .iter()
                .map(move |ch| device_name(chassis, &ch.name))
        })
    }
}

/// The name of a device, `<chassis>-<channel>`.
#[must_use]
pub fn device_name(chassis: &str, channel: &str) -> String {
    format!("{chassis}-{channel}")
}
