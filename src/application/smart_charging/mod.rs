//! Smart charging use cases (OCPP 2.0.1 K01/K08)
//!
//! [`SmartChargingService`] is the public surface: it validates and stores
//! incoming charging profiles and computes composite schedules from them.
//! The heavy lifting lives in the submodules: `validation` for the rule
//! battery, `profile` for time expansion, `composite` for the merge, and
//! `units` for amp/watt conversion.

pub mod composite;
pub mod profile;
pub mod units;
pub mod validation;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::{
    ChargingProfile, ChargingProfilePurpose, ChargingProfileStatus, ChargingRateUnit,
    ClearChargingProfileCriteria, ClearChargingProfileStatus, CompositeSchedule, DeviceModelView,
    EvseRegistry, STATION_WIDE_EVSE_ID,
};
use crate::infrastructure::storage::ProfileStore;

use composite::PurposeEntries;
use validation::{ProfileValidationResult, ProfileValidator};

/// Result of a combined validate-and-add, carrying what a
/// SetChargingProfileResponse needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetChargingProfileOutcome {
    pub status: ChargingProfileStatus,
    pub validation: ProfileValidationResult,
}

impl SetChargingProfileOutcome {
    /// OCPP reasonCode for the response StatusInfo.
    pub fn reason_code(&self) -> &'static str {
        self.validation.reason_code()
    }

    /// Verbatim outcome name for StatusInfo.additionalInfo.
    pub fn additional_info(&self) -> &'static str {
        self.validation.as_str()
    }
}

/// Maintains incoming charging profiles and computes composite schedules.
pub struct SmartChargingService {
    store: ProfileStore,
    evses: Arc<dyn EvseRegistry>,
    device_model: Arc<dyn DeviceModelView>,
}

impl SmartChargingService {
    pub fn new(evses: Arc<dyn EvseRegistry>, device_model: Arc<dyn DeviceModelView>) -> Self {
        Self {
            store: ProfileStore::new(),
            evses,
            device_model,
        }
    }

    /// Run the K01 rule battery against `profile`, conforming it in place
    /// on success.
    pub fn validate_profile(
        &self,
        profile: &mut ChargingProfile,
        evse_id: i32,
        now: DateTime<Utc>,
    ) -> ProfileValidationResult {
        let validator =
            ProfileValidator::new(self.device_model.as_ref(), self.evses.as_ref(), &self.store);
        let result = validator.validate_profile(profile, evse_id, now);
        if !result.is_valid() {
            warn!(
                evse_id,
                profile_id = profile.id,
                result = %result,
                "Charging profile rejected"
            );
        }
        result
    }

    /// Store a profile that already validated. Replaces by id within the
    /// EVSE scope.
    pub fn add_profile(&self, evse_id: i32, profile: ChargingProfile) -> ChargingProfileStatus {
        self.store.add(evse_id, profile)
    }

    /// Validate, then store on success (K01.FR.05/FR.27).
    pub fn validate_and_add_profile(
        &self,
        mut profile: ChargingProfile,
        evse_id: i32,
        now: DateTime<Utc>,
    ) -> SetChargingProfileOutcome {
        let validation = self.validate_profile(&mut profile, evse_id, now);
        let status = if validation.is_valid() {
            self.store.add(evse_id, profile)
        } else {
            ChargingProfileStatus::Rejected
        };
        SetChargingProfileOutcome { status, validation }
    }

    /// Every stored profile, station-wide bucket first, then per-EVSE
    /// buckets in id order.
    pub fn get_profiles(&self) -> Vec<ChargingProfile> {
        self.store.get_all()
    }

    /// Stored profiles relevant to `evse_id` (its own plus station-wide)
    /// that still pass validation at `now`.
    pub fn get_valid_profiles(&self, evse_id: i32, now: DateTime<Utc>) -> Vec<ChargingProfile> {
        let mut profiles = self.valid_profiles_for_evse(evse_id, now);
        if evse_id != STATION_WIDE_EVSE_ID {
            profiles.extend(self.valid_profiles_for_evse(STATION_WIDE_EVSE_ID, now));
        }
        profiles
    }

    /// Drop TxProfiles bound to an ended transaction. Returns how many were
    /// removed.
    pub fn delete_transaction_tx_profiles(&self, transaction_id: &str) -> usize {
        self.store.delete_transaction_tx_profiles(transaction_id)
    }

    /// Clear stored profiles matching the criteria (K10).
    pub fn clear_profiles(
        &self,
        criteria: &ClearChargingProfileCriteria,
    ) -> ClearChargingProfileStatus {
        self.store.clear_profiles(criteria)
    }

    /// Merge `profiles` into one limit curve over `[start, end)` in `unit`.
    ///
    /// `start` doubles as the reference instant for recurring anchors, so
    /// the result is a pure function of its inputs plus the EVSE's current
    /// transaction (which anchors Relative profiles).
    pub fn calculate_composite_schedule(
        &self,
        profiles: &[ChargingProfile],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        evse_id: i32,
        unit: ChargingRateUnit,
    ) -> CompositeSchedule {
        let session_start = self.session_start(evse_id);

        let mut buckets = PurposeEntries::default();
        for charging_profile in profiles {
            // Stored profiles carry a conformed validFrom, which is when
            // they became active; an unconformed profile activates now.
            let activation_time = charging_profile.valid_from.unwrap_or(start);
            let entries = profile::calculate_profile(
                charging_profile,
                start,
                end,
                activation_time,
                session_start,
            );
            match charging_profile.charging_profile_purpose {
                ChargingProfilePurpose::ChargingStationExternalConstraints => {
                    buckets.external_constraints.extend(entries)
                }
                ChargingProfilePurpose::ChargingStationMaxProfile => {
                    buckets.charging_station_max.extend(entries)
                }
                ChargingProfilePurpose::TxDefaultProfile => buckets.tx_default.extend(entries),
                ChargingProfilePurpose::TxProfile => buckets.tx.extend(entries),
            }
        }

        let schedule = composite::calculate_composite_schedule(&buckets, start, end, evse_id, unit);
        info!(
            evse_id,
            profiles = profiles.len(),
            periods = schedule.charging_schedule_period.len(),
            "Composite schedule ready"
        );
        schedule
    }

    fn valid_profiles_for_evse(&self, evse_id: i32, now: DateTime<Utc>) -> Vec<ChargingProfile> {
        self.store
            .for_evse(evse_id)
            .into_iter()
            .filter_map(|mut profile| {
                let validator = ProfileValidator::new(
                    self.device_model.as_ref(),
                    self.evses.as_ref(),
                    &self.store,
                );
                validator
                    .validate_profile(&mut profile, evse_id, now)
                    .is_valid()
                    .then_some(profile)
            })
            .collect()
    }

    /// Anchor instant for Relative profiles on this EVSE: the power-path-
    /// closed timestamp when `TxStartPoint` asks for it and one exists,
    /// the transaction start otherwise. No transaction, no anchor.
    fn session_start(&self, evse_id: i32) -> Option<DateTime<Utc>> {
        if evse_id == STATION_WIDE_EVSE_ID {
            return None;
        }
        let evse = self.evses.get(evse_id)?;
        let transaction = evse.transaction()?;
        if self.device_model.prefers_power_path_closed() {
            Some(
                transaction
                    .power_path_closed_time
                    .unwrap_or(transaction.start_time),
            )
        } else {
            Some(transaction.start_time)
        }
    }
}
