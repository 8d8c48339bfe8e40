use std::collections::{BTreeMap, BTreeSet};

use qube_driver::core::common::{AwgId, CaptureModuleId, CaptureUnitId};

/// Capture units of one module armed in a session, with the readout device that owns the module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArmedCapture {
    device: String,
    units: BTreeSet<CaptureUnitId>,
}

impl ArmedCapture {
    /// The readout device.
    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }

    /// The armed capture units.
    #[must_use]
    pub const fn units(&self) -> &BTreeSet<CaptureUnitId> {
        &self.units
    }
}

/// The channels armed for the next trigger, by chassis.
///
/// Registration is a set union, so registering the same channels again changes nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrationLedger {
    awgs: BTreeMap<String, BTreeSet<AwgId>>,
    captures: BTreeMap<String, BTreeMap<CaptureModuleId, ArmedCapture>>,
}

impl RegistrationLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms AWGs of a chassis.
    pub fn register_awgs(&mut self, chassis: &str, awgs: impl IntoIterator<Item = AwgId>) {
        self.awgs
            .entry(chassis.to_string())
            .or_default()
            .extend(awgs);
    }

    /// Arms capture units of a module of a chassis.
    pub fn register_capture_units(
        &mut self,
        chassis: &str,
        device: &str,
        module: CaptureModuleId,
        units: impl IntoIterator<Item = CaptureUnitId>,
    ) {
        self.captures
            .entry(chassis.to_string())
            .or_default()
            .entry(module)
            .or_insert_with(|| ArmedCapture {
                device: device.to_string(),
                units: BTreeSet::new(),
            })
            .units
            .extend(units);
    }

    /// Disarms everything.
    pub fn clear(&mut self) {
        self.awgs.clear();
        self.captures.clear();
    }

    /// Whether nothing is armed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.awgs.is_empty() && self.captures.is_empty()
    }

    /// Armed AWGs by chassis.
    #[must_use]
    pub const fn awgs(&self) -> &BTreeMap<String, BTreeSet<AwgId>> {
        &self.awgs
    }

    /// Armed capture units by chassis and module.
    #[must_use]
    pub const fn captures(&self) -> &BTreeMap<String, BTreeMap<CaptureModuleId, ArmedCapture>> {
        &self.captures
    }

    /// The AWG that triggers the capture modules of a chassis, the lowest armed one.
    #[must_use]
    pub fn trigger_awg(&self, chassis: &str) -> Option<AwgId> {
        self.awgs
            .get(chassis)
            .and_then(|awgs| awgs.first())
            .copied()
    }

    /// Whether a capture unit is armed.
    #[must_use]
    pub fn is_unit_armed(
        &self,
        chassis: &str,
        module: CaptureModuleId,
        unit: CaptureUnitId,
    ) -> bool {
        self.captures
            .get(chassis)
            .and_then(|modules| modules.get(&module))
            .is_some_and(|armed| armed.units.contains(&unit))
    }
}
