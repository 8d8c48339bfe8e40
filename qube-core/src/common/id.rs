use derive_more::{Display, From, Into};

/// The index of an AWG on a chassis.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, From, Into)]
pub struct AwgId(pub u8);

/// The index of a capture module on a chassis.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, From, Into)]
pub struct CaptureModuleId(pub u8);

/// The index of a capture unit on a chassis.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, From, Into)]
pub struct CaptureUnitId(pub u8);

impl AwgId {
    /// Returns the bit of this AWG in a start bitmap, or `None` if the id does not fit in one.
    #[must_use]
    pub const fn bit(self) -> Option<u16> {
        if (self.0 as usize) < super::NUM_AWGS {
            Some(1 << self.0)
        } else {
            None
        }
    }
}

impl CaptureModuleId {
    /// Returns the capture units owned by this module.
    #[must_use]
    pub fn units(self) -> [CaptureUnitId; super::CAPTURE_UNITS_PER_MODULE] {
        let base = self.0.saturating_mul(super::CAPTURE_UNITS_PER_MODULE as u8);
        [0u8, 1, 2, 3].map(|i| CaptureUnitId(base.saturating_add(i)))
    }
}

impl CaptureUnitId {
    /// Returns the capture module this unit belongs to.
    #[must_use]
    pub const fn module(self) -> CaptureModuleId {
        CaptureModuleId(self.0 / super::CAPTURE_UNITS_PER_MODULE as u8)
    }
}
