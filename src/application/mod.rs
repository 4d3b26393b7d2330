//! Use-case orchestration

pub mod smart_charging;

pub use smart_charging::{SetChargingProfileOutcome, SmartChargingService};
