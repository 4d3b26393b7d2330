//! Charging profile aggregate
//!
//! Contains the ChargingProfile entity and the related OCPP 2.0.1 value
//! types and enumerations.

pub mod model;

pub use model::{
    ChargingProfile, ChargingProfileKind, ChargingProfilePurpose, ChargingProfileStatus,
    ChargingRateUnit, ChargingSchedule, ChargingSchedulePeriod, ClearChargingProfileCriteria,
    ClearChargingProfileStatus, RecurrencyKind,
};
