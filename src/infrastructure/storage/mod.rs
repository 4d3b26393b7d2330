//! Storage implementations

mod memory;
mod profile_store;

pub use memory::{
    InMemoryDeviceModel, InMemoryEvseRegistry, AC_PHASE_SWITCHING_SUPPORTED,
    CHARGING_SCHEDULE_CHARGING_RATE_UNIT, CHARGING_STATION_SUPPLY_PHASES, TX_START_POINT,
};
pub use profile_store::{ProfileScope, ProfileStore};
