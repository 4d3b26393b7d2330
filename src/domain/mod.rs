//! Core business entities, value types, and collaborator interfaces

pub mod charging_profile;
pub mod composite_schedule;
pub mod device_model;
pub mod error;
pub mod evse;

// Re-export commonly used types
pub use charging_profile::{
    ChargingProfile, ChargingProfileKind, ChargingProfilePurpose, ChargingProfileStatus,
    ChargingRateUnit, ChargingSchedule, ChargingSchedulePeriod, ClearChargingProfileCriteria,
    ClearChargingProfileStatus, RecurrencyKind,
};
pub use composite_schedule::CompositeSchedule;
pub use device_model::DeviceModelView;
pub use error::{DomainError, DomainResult};
pub use evse::{CurrentPhaseType, EvseRegistry, EvseView, TransactionView, STATION_WIDE_EVSE_ID};
