pub use crate::{
    backend::{Backend, ChassisHandles},
    config::{ChannelConfig, ChannelKind, ChassisInfo, ChassisType, QubeConfig},
    controller::{obsoleted, QubeController},
    error::QubeError,
    session::{DaqState, Session},
};

#[cfg(feature = "emulator")]
pub use crate::backend::EmulatedBackend;

pub use qube_driver::{
    acquisition::{AcquisitionMode, AcquisitionWindow},
    core::{
        common::{AwgId, CaptureModuleId, CaptureUnitId, Freq, Hz, MHz},
        link::{AdcLine, LinkError, Sideband},
    },
    device::{RegisterField, Role},
    error::{QubeDriverError, WaveformError, WindowError},
};
