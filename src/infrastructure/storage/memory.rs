//! In-memory collaborator implementations for development and testing
//!
//! Production deployments back [`EvseRegistry`] and [`DeviceModelView`]
//! with the station's real EVSE manager and device model; these DashMap
//! implementations stand in for them in demos and tests.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::{
    CurrentPhaseType, DeviceModelView, EvseRegistry, EvseView, TransactionView,
};

/// In-memory EVSE registry.
#[derive(Debug, Default)]
pub struct InMemoryEvseRegistry {
    evses: DashMap<i32, EvseView>,
}

impl InMemoryEvseRegistry {
    pub fn new() -> Self {
        Self {
            evses: DashMap::new(),
        }
    }

    pub fn add_evse(&self, evse_id: i32, phase_type: CurrentPhaseType) {
        self.evses.insert(
            evse_id,
            EvseView {
                id: evse_id,
                phase_type,
                transaction: None,
            },
        );
    }

    /// Start a transaction on an EVSE. No-op when the EVSE is unknown.
    pub fn open_transaction(&self, evse_id: i32, transaction_id: &str, start_time: DateTime<Utc>) {
        if let Some(mut evse) = self.evses.get_mut(&evse_id) {
            evse.transaction = Some(TransactionView {
                id: transaction_id.to_string(),
                start_time,
                power_path_closed_time: None,
            });
        }
    }

    pub fn set_power_path_closed(&self, evse_id: i32, at: DateTime<Utc>) {
        if let Some(mut evse) = self.evses.get_mut(&evse_id) {
            if let Some(transaction) = evse.transaction.as_mut() {
                transaction.power_path_closed_time = Some(at);
            }
        }
    }

    pub fn close_transaction(&self, evse_id: i32) {
        if let Some(mut evse) = self.evses.get_mut(&evse_id) {
            evse.transaction = None;
        }
    }
}

impl EvseRegistry for InMemoryEvseRegistry {
    fn get(&self, evse_id: i32) -> Option<EvseView> {
        self.evses.get(&evse_id).map(|evse| evse.clone())
    }
}

/// Device-model variable names read by the smart-charging core.
pub const CHARGING_SCHEDULE_CHARGING_RATE_UNIT: &str = "ChargingScheduleChargingRateUnit";
pub const CHARGING_STATION_SUPPLY_PHASES: &str = "ChargingStationSupplyPhases";
pub const AC_PHASE_SWITCHING_SUPPORTED: &str = "ACPhaseSwitchingSupported";
pub const TX_START_POINT: &str = "TxStartPoint";

/// In-memory device model holding variables as strings, the way the real
/// device model stores attribute values.
///
/// `new()` seeds `ChargingScheduleChargingRateUnit = "A,W"` and
/// `ACPhaseSwitchingSupported = "true"`; callers override or unset as
/// needed.
#[derive(Debug, Default)]
pub struct InMemoryDeviceModel {
    variables: DashMap<String, String>,
}

impl InMemoryDeviceModel {
    pub fn new() -> Self {
        let device_model = Self {
            variables: DashMap::new(),
        };
        device_model.set(CHARGING_SCHEDULE_CHARGING_RATE_UNIT, "A,W");
        device_model.set(AC_PHASE_SWITCHING_SUPPORTED, "true");
        device_model
    }

    /// An empty device model with nothing configured.
    pub fn unconfigured() -> Self {
        Self {
            variables: DashMap::new(),
        }
    }

    pub fn set(&self, variable: &str, value: &str) {
        self.variables.insert(variable.to_string(), value.to_string());
    }

    pub fn unset(&self, variable: &str) {
        self.variables.remove(variable);
    }

    fn get(&self, variable: &str) -> Option<String> {
        self.variables.get(variable).map(|value| value.clone())
    }
}

impl DeviceModelView for InMemoryDeviceModel {
    fn charging_schedule_charging_rate_unit(&self) -> Option<String> {
        self.get(CHARGING_SCHEDULE_CHARGING_RATE_UNIT)
    }

    fn charging_station_supply_phases(&self) -> Option<i32> {
        self.get(CHARGING_STATION_SUPPLY_PHASES)
            .and_then(|value| value.trim().parse().ok())
    }

    fn ac_phase_switching_supported(&self) -> Option<bool> {
        self.get(AC_PHASE_SWITCHING_SUPPORTED)
            .and_then(|value| value.trim().parse().ok())
    }

    fn tx_start_point(&self) -> Option<String> {
        self.get(TX_START_POINT)
    }
}
