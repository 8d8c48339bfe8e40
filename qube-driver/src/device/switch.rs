use qube_core::link::{lock, SharedSwitchController};

use crate::error::QubeDriverError;

const GPIO_MASK: u16 = 0x3FFF;

/// The microwave switch at the output of a device.
pub struct SwitchCapability {
    ctrl: SharedSwitchController,
    mask: u16,
}

impl SwitchCapability {
    /// Creates a new [`SwitchCapability`] driving the GPIO bits in `mask`.
    #[must_use]
    pub fn new(ctrl: SharedSwitchController, mask: u16) -> Self {
        Self { ctrl, mask }
    }

    /// Whether the output is connected. It is disconnected only when every bit of the mask is set.
    pub fn is_on(&self) -> Result<bool, QubeDriverError> {
        let gpio = lock(&self.ctrl).read_gpio()?;
        Ok(gpio & self.mask != self.mask)
    }

    /// Connects or disconnects the output.
    pub fn set(&self, on: bool) -> Result<(), QubeDriverError> {
        let mut ctrl = lock(&self.ctrl);
        let gpio = ctrl.read_gpio()?;
        let gpio = if on {
            gpio & (GPIO_MASK ^ self.mask)
        } else {
            gpio | self.mask
        };
        ctrl.write_gpio(gpio)?;
        Ok(())
    }
}
