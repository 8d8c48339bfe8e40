use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use getset::{CopyGetters, Getters};
use qube_driver::core::common::{AwgId, SYNC_CLOCK_ALIGN_MASK, SYNC_CLOCK_FREQ};

use crate::error::QubeError;

/// Converts the synchronization delay to sync clock ticks, rounded to the nearest tick.
#[must_use]
pub fn sync_delay_ticks(delay: Duration) -> u64 {
    (delay.as_secs_f64() * SYNC_CLOCK_FREQ as f64 + 0.5) as u64
}

/// The sequencer bitmap of AWGs. AWG ids outside `[0, 16)` are left out.
#[must_use]
pub fn awg_bitmap<'a>(awgs: impl IntoIterator<Item = &'a AwgId>) -> u16 {
    awgs.into_iter()
        .filter_map(|awg| awg.bit())
        .fold(0, |acc, bit| acc | bit)
}

/// One sequencer command.
#[derive(Clone, Debug, PartialEq, Eq, Getters, CopyGetters)]
pub struct FireCommand {
    #[getset(get = "pub")]
    /// The chassis.
    chassis: String,
    #[getset(get_copy = "pub")]
    /// The absolute clock value at which the AWGs start.
    time: u64,
    #[getset(get_copy = "pub")]
    /// The AWGs to start.
    awg_bitmap: u16,
}

/// The sequencer commands of one synchronized trigger.
#[derive(Clone, Debug, PartialEq, Eq, CopyGetters, Getters)]
pub struct TriggerPlan {
    #[getset(get_copy = "pub")]
    /// The common fire time before skew correction.
    base: u64,
    #[getset(get = "pub")]
    /// One command per armed chassis.
    commands: Vec<FireCommand>,
}

impl TriggerPlan {
    /// Plans a trigger from a single reading of the reference clock.
    ///
    /// The base time is `clock + delay` aligned down to 16 ticks. Each chassis
    /// fires at the base time plus its skew.
    pub fn new(
        clock: u64,
        delay: u64,
        armed: &BTreeMap<String, BTreeSet<AwgId>>,
        skew: &BTreeMap<String, i64>,
    ) -> Result<Self, QubeError> {
        let base = clock.wrapping_add(delay) & SYNC_CLOCK_ALIGN_MASK;
        let commands = armed
            .iter()
            .map(|(chassis, awgs)| -> Result<FireCommand, QubeError> {
                let skew = skew
                    .get(chassis)
                    .ok_or_else(|| QubeError::SkewNotFound(chassis.clone()))?;
                Ok(FireCommand {
                    chassis: chassis.clone(),
                    time: base.wrapping_add_signed(*skew),
                    awg_bitmap: awg_bitmap(awgs),
                })
            })
            .collect::<Result<Vec<_>, QubeError>>()?;
        Ok(Self { base, commands })
    }
}

/// Chooses the chassis whose clock is read.
///
/// This is `master` if it is armed, otherwise the first armed chassis.
#[must_use]
pub fn reference_chassis<'a>(
    armed: &'a BTreeMap<String, BTreeSet<AwgId>>,
    master: Option<&str>,
) -> Option<&'a str> {
    master
        .and_then(|m| armed.get_key_value(m))
        .or_else(|| armed.first_key_value())
        .map(|(name, _)| name.as_str())
}
