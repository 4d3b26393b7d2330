//! In-memory charging profile store
//!
//! Profiles are bucketed by EVSE id; id 0 holds the station-wide profiles.
//! The store never rejects: anything handed to it passed validation
//! already. Replacement is by profile id within one bucket, with installed
//! ChargingStationExternalConstraints profiles immune to replacement.

use dashmap::DashMap;
use tracing::{info, warn};

use crate::domain::{
    ChargingProfile, ChargingProfilePurpose, ChargingProfileStatus, ClearChargingProfileCriteria,
    ClearChargingProfileStatus, STATION_WIDE_EVSE_ID,
};

/// Which buckets a purpose query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileScope {
    StationWide,
    EvseSpecific,
    Both,
}

/// Indexed collection of charging profiles keyed by EVSE.
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: DashMap<i32, Vec<ChargingProfile>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: DashMap::new(),
        }
    }

    /// Store `profile` under `evse_id`, replacing any prior profile with the
    /// same id. A prior ChargingStationExternalConstraints profile is kept
    /// instead; such profiles are immutable once installed.
    pub fn add(&self, evse_id: i32, profile: ChargingProfile) -> ChargingProfileStatus {
        let mut bucket = self.profiles.entry(evse_id).or_default();
        if let Some(existing) = bucket.iter_mut().find(|existing| existing.id == profile.id) {
            if existing.charging_profile_purpose
                == ChargingProfilePurpose::ChargingStationExternalConstraints
            {
                warn!(
                    evse_id,
                    profile_id = profile.id,
                    "Keeping installed ChargingStationExternalConstraints profile"
                );
            } else {
                info!(evse_id, profile_id = profile.id, "Charging profile replaced");
                *existing = profile;
            }
            return ChargingProfileStatus::Accepted;
        }

        info!(evse_id, profile_id = profile.id, "Charging profile stored");
        bucket.push(profile);
        ChargingProfileStatus::Accepted
    }

    /// Every stored profile: the station-wide bucket first, then the
    /// per-EVSE buckets in ascending EVSE id order.
    pub fn get_all(&self) -> Vec<ChargingProfile> {
        let mut evse_ids: Vec<i32> = self.profiles.iter().map(|bucket| *bucket.key()).collect();
        evse_ids.sort_unstable();

        let mut all = Vec::new();
        for evse_id in evse_ids {
            if let Some(bucket) = self.profiles.get(&evse_id) {
                all.extend(bucket.iter().cloned());
            }
        }
        all
    }

    /// Profiles stored under exactly `evse_id`.
    pub fn for_evse(&self, evse_id: i32) -> Vec<ChargingProfile> {
        self.profiles
            .get(&evse_id)
            .map(|bucket| bucket.clone())
            .unwrap_or_default()
    }

    /// Profiles of the given purpose within a scope.
    pub fn by_purpose(&self, purpose: ChargingProfilePurpose, scope: ProfileScope) -> Vec<ChargingProfile> {
        self.profiles
            .iter()
            .filter(|bucket| match scope {
                ProfileScope::StationWide => *bucket.key() == STATION_WIDE_EVSE_ID,
                ProfileScope::EvseSpecific => *bucket.key() != STATION_WIDE_EVSE_ID,
                ProfileScope::Both => true,
            })
            .flat_map(|bucket| {
                bucket
                    .iter()
                    .filter(|profile| profile.charging_profile_purpose == purpose)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Remove TxProfiles bound to an ended transaction. Returns how many
    /// were removed.
    pub fn delete_transaction_tx_profiles(&self, transaction_id: &str) -> usize {
        let mut removed = 0;
        for mut bucket in self.profiles.iter_mut() {
            let before = bucket.len();
            bucket.retain(|profile| {
                profile.charging_profile_purpose != ChargingProfilePurpose::TxProfile
                    || profile.transaction_id.as_deref() != Some(transaction_id)
            });
            removed += before - bucket.len();
        }
        if removed > 0 {
            info!(transaction_id, removed, "Transaction TxProfiles cleared");
        }
        removed
    }

    /// Remove profiles matching the criteria. A present `profile_id` clears
    /// exactly that profile; otherwise every profile matching all present
    /// fields goes.
    pub fn clear_profiles(&self, criteria: &ClearChargingProfileCriteria) -> ClearChargingProfileStatus {
        let mut removed = 0;
        for mut bucket in self.profiles.iter_mut() {
            let evse_id = *bucket.key();
            let before = bucket.len();
            bucket.retain(|profile| !Self::matches(profile, evse_id, criteria));
            removed += before - bucket.len();
        }

        if removed > 0 {
            info!(?criteria, removed, "Charging profiles cleared");
            ClearChargingProfileStatus::Accepted
        } else {
            ClearChargingProfileStatus::Unknown
        }
    }

    fn matches(profile: &ChargingProfile, evse_id: i32, criteria: &ClearChargingProfileCriteria) -> bool {
        if let Some(profile_id) = criteria.profile_id {
            return profile.id == profile_id;
        }
        if let Some(wanted) = criteria.evse_id {
            if evse_id != wanted {
                return false;
            }
        }
        if let Some(purpose) = criteria.purpose {
            if profile.charging_profile_purpose != purpose {
                return false;
            }
        }
        if let Some(stack_level) = criteria.stack_level {
            if profile.stack_level != stack_level {
                return false;
            }
        }
        criteria.evse_id.is_some() || criteria.purpose.is_some() || criteria.stack_level.is_some()
    }

    pub fn len(&self) -> usize {
        self.profiles.iter().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
