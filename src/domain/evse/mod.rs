//! EVSE aggregate
//!
//! Read-only views of charging equipment and the registry interface the
//! surrounding system implements.

pub mod model;
pub mod registry;

pub use model::{CurrentPhaseType, EvseView, TransactionView, STATION_WIDE_EVSE_ID};
pub use registry::EvseRegistry;
