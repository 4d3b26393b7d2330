//! # OCPP 2.0.1 Smart Charging core
//!
//! Charging-profile validation and composite-schedule calculation for a
//! charging-station controller. The surrounding system owns transport,
//! persistence, and hardware control; this crate is handed profiles and a
//! window and answers with outcomes and limit curves.
//!
//! ## Architecture
//!
//! - **support**: Cross-cutting utilities (time sentinels)
//! - **domain**: Core entities, value types, and the collaborator
//!   interfaces ([`EvseRegistry`](domain::EvseRegistry),
//!   [`DeviceModelView`](domain::DeviceModelView))
//! - **application**: The smart-charging use cases (validation rule
//!   battery, profile time expansion, composite merge, unit conversion)
//! - **infrastructure**: The in-memory profile store plus in-memory
//!   collaborator stand-ins for development and testing
//!
//! All time-dependent operations take `now` as a parameter; the core never
//! reads the OS clock.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod support;

// Re-export commonly used types at crate root
pub use application::smart_charging::composite::PurposeEntries;
pub use application::smart_charging::profile::{calculate_profile, period_end, profile_anchor, PeriodEntry};
pub use application::smart_charging::units::{
    amps_to_watts, convert_limit, watts_to_amps, DEFAULT_NUMBER_PHASES, LOW_VOLTAGE,
};
pub use application::smart_charging::validation::{ProfileValidationResult, ProfileValidator};
pub use application::{SetChargingProfileOutcome, SmartChargingService};
pub use domain::{
    ChargingProfile, ChargingProfileKind, ChargingProfilePurpose, ChargingProfileStatus,
    ChargingRateUnit, ChargingSchedule, ChargingSchedulePeriod, ClearChargingProfileCriteria,
    ClearChargingProfileStatus, CompositeSchedule, CurrentPhaseType, DeviceModelView, DomainError,
    DomainResult, EvseRegistry, EvseView, RecurrencyKind, TransactionView, STATION_WIDE_EVSE_ID,
};
pub use infrastructure::storage::{
    InMemoryDeviceModel, InMemoryEvseRegistry, ProfileScope, ProfileStore,
};
