//! Amp/watt conversion for schedule limits
//!
//! Conversions assume the European low-voltage grid; phase count comes from
//! the period being converted, defaulting to a full three-phase connection.

use crate::domain::ChargingRateUnit;

/// Nominal phase-to-neutral voltage used for all conversions.
pub const LOW_VOLTAGE: f64 = 230.0;

/// Phase count assumed when a period does not state one.
pub const DEFAULT_NUMBER_PHASES: i32 = 3;

pub fn watts_to_amps(watts: f64, number_phases: i32) -> f64 {
    watts / (LOW_VOLTAGE * f64::from(number_phases))
}

pub fn amps_to_watts(amps: f64, number_phases: i32) -> f64 {
    amps * LOW_VOLTAGE * f64::from(number_phases)
}

/// Convert `limit` from `from` into `to`. Identity when the units already
/// match; floating-point precision is retained.
pub fn convert_limit(limit: f64, from: ChargingRateUnit, to: ChargingRateUnit, number_phases: i32) -> f64 {
    match (from, to) {
        (ChargingRateUnit::W, ChargingRateUnit::A) => watts_to_amps(limit, number_phases),
        (ChargingRateUnit::A, ChargingRateUnit::W) => amps_to_watts(limit, number_phases),
        _ => limit,
    }
}
