//! CompositeSchedule domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::charging_profile::{ChargingRateUnit, ChargingSchedulePeriod};

/// The resolved, single-valued limit curve over a query window.
///
/// Periods reuse [`ChargingSchedulePeriod`]; their `start_period` is the
/// offset in seconds from `schedule_start`. Sub-intervals no stored profile
/// covers are omitted, so `duration` may be shorter than the window that was
/// asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeSchedule {
    pub evse_id: i32,
    /// Seconds from `schedule_start` to the end of the last covered period.
    pub duration: i32,
    pub schedule_start: DateTime<Utc>,
    pub charging_rate_unit: ChargingRateUnit,
    pub charging_schedule_period: Vec<ChargingSchedulePeriod>,
}
