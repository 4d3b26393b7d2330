//! Device model interface
//!
//! Read-only view over the handful of device-model variables smart charging
//! depends on. The variables live in the station's device model component
//! tree; this trait narrows access to exactly what the core reads.

/// Token looked for in the `TxStartPoint` CSV to decide which transaction
/// timestamp anchors Relative profiles.
pub const TX_START_POINT_POWER_PATH_CLOSED: &str = "PowerPathClosed";

/// Read-only device-model lookup.
pub trait DeviceModelView: Send + Sync {
    /// `ChargingScheduleChargingRateUnit`: CSV of allowed units, e.g. "A,W".
    /// Absent means the station is misconfigured and every profile is
    /// rejected with ChargingScheduleChargingRateUnitUnsupported.
    fn charging_schedule_charging_rate_unit(&self) -> Option<String>;

    /// `ChargingStationSupplyPhases`: 1 or 3 means AC, 0 means DC.
    fn charging_station_supply_phases(&self) -> Option<i32>;

    /// `ACPhaseSwitchingSupported`: absent reads as false.
    fn ac_phase_switching_supported(&self) -> Option<bool>;

    /// `TxStartPoint`: CSV of transaction start points.
    fn tx_start_point(&self) -> Option<String>;

    /// Whether Relative profiles should anchor at the power-path-closed
    /// timestamp rather than the transaction start.
    fn prefers_power_path_closed(&self) -> bool {
        self.tx_start_point()
            .map(|csv| {
                csv.split(',')
                    .any(|token| token.trim() == TX_START_POINT_POWER_PATH_CLOSED)
            })
            .unwrap_or(false)
    }
}
