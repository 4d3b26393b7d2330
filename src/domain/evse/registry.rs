//! EVSE registry interface

use super::model::EvseView;

/// Read-only lookup of the station's EVSEs.
///
/// Implementations return snapshots; the core never mutates EVSE state.
pub trait EvseRegistry: Send + Sync {
    /// Snapshot of the EVSE with the given id, if it exists. Id 0 (the
    /// station-wide sentinel) is not an EVSE and yields `None`.
    fn get(&self, evse_id: i32) -> Option<EvseView>;

    fn exists(&self, evse_id: i32) -> bool {
        self.get(evse_id).is_some()
    }
}
