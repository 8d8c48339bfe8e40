use qube_driver::{core::link::LinkError, error::QubeDriverError};
use thiserror::Error;

/// A interface for error handling in qube.
#[derive(Error, Debug, PartialEq, Clone)]
#[non_exhaustive]
pub enum QubeError {
    /// Capture units are armed on a chassis without an armed AWG to trigger them.
    #[error("Capture units of {0} are armed, but no AWG of the chassis is armed")]
    NotArmed(String),
    /// The chassis of the device could not be opened.
    #[error("{0} is not open")]
    DeviceNotOpen(String),
    /// No such device in the configuration.
    #[error("Unknown device: {0}")]
    UnknownDevice(String),
    /// The session has not selected a device.
    #[error("No device is selected")]
    NoDeviceSelected,
    /// No skew is configured for an armed chassis.
    #[error("Skew of {0} is not configured")]
    SkewNotFound(String),
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// The setting has been replaced by another.
    #[error("{setting} is obsoleted, use {replacement} instead")]
    Obsoleted {
        /// The obsoleted setting.
        setting: &'static str,
        /// The setting to use instead.
        replacement: &'static str,
    },
    /// A blocking worker failed.
    #[error("Worker failed: {0}")]
    Worker(String),
    /// Error in the driver.
    #[error("{0}")]
    Driver(#[from] QubeDriverError),
}

impl From<LinkError> for QubeError {
    fn from(e: LinkError) -> Self {
        Self::Driver(e.into())
    }
}

impl From<serde_json::Error> for QubeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<std::io::Error> for QubeError {
    fn from(e: std::io::Error) -> Self {
        Self::Config(e.to_string())
    }
}
