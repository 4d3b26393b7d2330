//! EVSE domain entities
//!
//! The core never owns EVSE state; it reads immutable snapshots supplied by
//! the surrounding system through the [`EvseRegistry`](super::EvseRegistry)
//! capability.

use chrono::{DateTime, Utc};

/// EVSE id denoting the whole charging station rather than a single port.
pub const STATION_WIDE_EVSE_ID: i32 = 0;

/// Supply current type of an EVSE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentPhaseType {
    Ac,
    Dc,
    /// Phase type could not be determined; AC- and DC-specific schedule
    /// checks are skipped.
    Unknown,
}

/// Snapshot of the transaction currently running on an EVSE.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionView {
    /// OCPP transaction id.
    pub id: String,
    /// When the transaction started.
    pub start_time: DateTime<Utc>,
    /// When the power path closed, if it has.
    pub power_path_closed_time: Option<DateTime<Utc>>,
}

/// Read-only view of one EVSE.
#[derive(Debug, Clone, PartialEq)]
pub struct EvseView {
    pub id: i32,
    pub phase_type: CurrentPhaseType,
    pub transaction: Option<TransactionView>,
}

impl EvseView {
    pub fn phase_type(&self) -> CurrentPhaseType {
        self.phase_type
    }

    pub fn has_active_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    pub fn transaction(&self) -> Option<&TransactionView> {
        self.transaction.as_ref()
    }
}
