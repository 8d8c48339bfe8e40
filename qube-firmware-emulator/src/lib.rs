mod awg;
mod capture;
mod chassis;
mod lsi;
mod register;
mod sequencer;

pub use awg::AwgEmulator;
pub use capture::{captured_sample_count, CaptureEmulator};
pub use chassis::ChassisEmulator;
pub use lsi::LsiEmulator;
pub use sequencer::SequencerEmulator;

use qube_core::link::LinkError;

pub(crate) fn check_broken(broken: bool) -> Result<(), LinkError> {
    if broken {
        Err(LinkError::new("broken"))
    } else {
        Ok(())
    }
}
