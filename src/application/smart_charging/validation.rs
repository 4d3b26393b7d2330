//! Charging profile validation (K01)
//!
//! One outcome per profile. Checks run in a fixed order (conform validity
//! periods, EVSE existence, schedule structure, purpose-specific rules)
//! and the first failure wins. On success the profile may have been
//! conformed in place: absent validity bounds filled, absent phase counts
//! defaulted on AC EVSEs.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::{
    ChargingProfile, ChargingProfileKind, ChargingProfilePurpose, ChargingRateUnit,
    CurrentPhaseType, DeviceModelView, EvseRegistry, EvseView, STATION_WIDE_EVSE_ID,
};
use crate::infrastructure::storage::{ProfileScope, ProfileStore};
use crate::support::time::end_of_time;

use super::units::DEFAULT_NUMBER_PHASES;

const MAX_NUMBER_PHASES: i32 = 3;

/// Validation outcome. Names are stable identifiers and appear verbatim in
/// log output and `StatusInfo.additionalInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileValidationResult {
    Valid,
    EvseDoesNotExist,
    InvalidProfileType,
    ChargingStationMaxProfileEvseIdGreaterThanZero,
    ChargingStationMaxProfileCannotBeRelative,
    TxProfileMissingTransactionId,
    TxProfileEvseIdNotGreaterThanZero,
    TxProfileEvseHasNoActiveTransaction,
    TxProfileTransactionNotOnEvse,
    TxProfileConflictingStackLevel,
    DuplicateTxDefaultProfileFound,
    DuplicateProfileValidityPeriod,
    ChargingProfileNoChargingSchedulePeriods,
    ChargingProfileFirstStartScheduleIsNotZero,
    ChargingSchedulePeriodsOutOfOrder,
    ChargingSchedulePeriodInvalidPhaseToUse,
    ChargingSchedulePeriodPhaseToUseACPhaseSwitchingUnsupported,
    ChargingSchedulePeriodExtraneousPhaseValues,
    ChargingSchedulePeriodUnsupportedNumberPhases,
    ChargingScheduleChargingRateUnitUnsupported,
    ChargingProfileMissingRequiredStartSchedule,
    ChargingProfileExtraneousStartSchedule,
}

impl ProfileValidationResult {
    pub fn is_valid(&self) -> bool {
        *self == Self::Valid
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "Valid",
            Self::EvseDoesNotExist => "EvseDoesNotExist",
            Self::InvalidProfileType => "InvalidProfileType",
            Self::ChargingStationMaxProfileEvseIdGreaterThanZero => {
                "ChargingStationMaxProfileEvseIdGreaterThanZero"
            }
            Self::ChargingStationMaxProfileCannotBeRelative => {
                "ChargingStationMaxProfileCannotBeRelative"
            }
            Self::TxProfileMissingTransactionId => "TxProfileMissingTransactionId",
            Self::TxProfileEvseIdNotGreaterThanZero => "TxProfileEvseIdNotGreaterThanZero",
            Self::TxProfileEvseHasNoActiveTransaction => "TxProfileEvseHasNoActiveTransaction",
            Self::TxProfileTransactionNotOnEvse => "TxProfileTransactionNotOnEvse",
            Self::TxProfileConflictingStackLevel => "TxProfileConflictingStackLevel",
            Self::DuplicateTxDefaultProfileFound => "DuplicateTxDefaultProfileFound",
            Self::DuplicateProfileValidityPeriod => "DuplicateProfileValidityPeriod",
            Self::ChargingProfileNoChargingSchedulePeriods => {
                "ChargingProfileNoChargingSchedulePeriods"
            }
            Self::ChargingProfileFirstStartScheduleIsNotZero => {
                "ChargingProfileFirstStartScheduleIsNotZero"
            }
            Self::ChargingSchedulePeriodsOutOfOrder => "ChargingSchedulePeriodsOutOfOrder",
            Self::ChargingSchedulePeriodInvalidPhaseToUse => {
                "ChargingSchedulePeriodInvalidPhaseToUse"
            }
            Self::ChargingSchedulePeriodPhaseToUseACPhaseSwitchingUnsupported => {
                "ChargingSchedulePeriodPhaseToUseACPhaseSwitchingUnsupported"
            }
            Self::ChargingSchedulePeriodExtraneousPhaseValues => {
                "ChargingSchedulePeriodExtraneousPhaseValues"
            }
            Self::ChargingSchedulePeriodUnsupportedNumberPhases => {
                "ChargingSchedulePeriodUnsupportedNumberPhases"
            }
            Self::ChargingScheduleChargingRateUnitUnsupported => {
                "ChargingScheduleChargingRateUnitUnsupported"
            }
            Self::ChargingProfileMissingRequiredStartSchedule => {
                "ChargingProfileMissingRequiredStartSchedule"
            }
            Self::ChargingProfileExtraneousStartSchedule => {
                "ChargingProfileExtraneousStartSchedule"
            }
        }
    }

    /// OCPP reasonCode classification for a SetChargingProfile rejection.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Valid => "NoError",
            Self::DuplicateProfileValidityPeriod | Self::DuplicateTxDefaultProfileFound => {
                "DuplicateProfile"
            }
            Self::TxProfileTransactionNotOnEvse | Self::TxProfileEvseHasNoActiveTransaction => {
                "TxNotFound"
            }
            Self::TxProfileConflictingStackLevel => "InvalidStackLevel",
            Self::ChargingScheduleChargingRateUnitUnsupported => "UnsupportedRateUnit",
            Self::ChargingProfileNoChargingSchedulePeriods
            | Self::ChargingProfileFirstStartScheduleIsNotZero
            | Self::ChargingProfileMissingRequiredStartSchedule
            | Self::ChargingProfileExtraneousStartSchedule
            | Self::ChargingSchedulePeriodsOutOfOrder
            | Self::ChargingSchedulePeriodInvalidPhaseToUse
            | Self::ChargingSchedulePeriodUnsupportedNumberPhases
            | Self::ChargingSchedulePeriodExtraneousPhaseValues
            | Self::ChargingSchedulePeriodPhaseToUseACPhaseSwitchingUnsupported => "InvalidSchedule",
            Self::TxProfileMissingTransactionId => "MissingParam",
            Self::EvseDoesNotExist
            | Self::TxProfileEvseIdNotGreaterThanZero
            | Self::ChargingStationMaxProfileCannotBeRelative
            | Self::ChargingStationMaxProfileEvseIdGreaterThanZero => "InvalidValue",
            Self::InvalidProfileType => "InternalError",
        }
    }
}

impl fmt::Display for ProfileValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs the K01 rule battery against the store, the EVSE registry, and the
/// device model.
pub struct ProfileValidator<'a> {
    device_model: &'a dyn DeviceModelView,
    evses: &'a dyn EvseRegistry,
    store: &'a ProfileStore,
}

impl<'a> ProfileValidator<'a> {
    pub fn new(
        device_model: &'a dyn DeviceModelView,
        evses: &'a dyn EvseRegistry,
        store: &'a ProfileStore,
    ) -> Self {
        Self {
            device_model,
            evses,
            store,
        }
    }

    /// Validate `profile` for installation under `evse_id`, conforming it
    /// in place on the way.
    pub fn validate_profile(
        &self,
        profile: &mut ChargingProfile,
        evse_id: i32,
        now: DateTime<Utc>,
    ) -> ProfileValidationResult {
        conform_validity_periods(profile, now);

        let mut evse = None;
        if evse_id != STATION_WIDE_EVSE_ID {
            match self.evses.get(evse_id) {
                Some(view) => evse = Some(view),
                None => return ProfileValidationResult::EvseDoesNotExist,
            }
        }

        let result = self.validate_profile_schedules(profile, evse.as_ref());
        if !result.is_valid() {
            return result;
        }

        match profile.charging_profile_purpose {
            ChargingProfilePurpose::ChargingStationMaxProfile => {
                self.validate_charging_station_max_profile(profile, evse_id)
            }
            ChargingProfilePurpose::TxDefaultProfile => {
                self.validate_tx_default_profile(profile, evse_id)
            }
            ChargingProfilePurpose::TxProfile => self.validate_tx_profile(profile, evse_id),
            ChargingProfilePurpose::ChargingStationExternalConstraints => {
                ProfileValidationResult::Valid
            }
        }
    }

    /// Rules that apply only to ChargingStationMaxProfile.
    pub fn validate_charging_station_max_profile(
        &self,
        profile: &ChargingProfile,
        evse_id: i32,
    ) -> ProfileValidationResult {
        if profile.charging_profile_purpose != ChargingProfilePurpose::ChargingStationMaxProfile {
            return ProfileValidationResult::InvalidProfileType;
        }
        if self.is_overlapping_validity_period(profile, evse_id) {
            return ProfileValidationResult::DuplicateProfileValidityPeriod;
        }
        if evse_id > STATION_WIDE_EVSE_ID {
            return ProfileValidationResult::ChargingStationMaxProfileEvseIdGreaterThanZero;
        }
        if profile.charging_profile_kind == ChargingProfileKind::Relative {
            return ProfileValidationResult::ChargingStationMaxProfileCannotBeRelative;
        }
        ProfileValidationResult::Valid
    }

    /// Rules that apply only to TxDefaultProfile. A station-wide candidate
    /// conflicts with per-EVSE TxDefaultProfiles at the same stack level and
    /// vice versa (K01.FR.52/53).
    pub fn validate_tx_default_profile(
        &self,
        profile: &ChargingProfile,
        evse_id: i32,
    ) -> ProfileValidationResult {
        if profile.charging_profile_purpose != ChargingProfilePurpose::TxDefaultProfile {
            return ProfileValidationResult::InvalidProfileType;
        }
        if self.is_overlapping_validity_period(profile, evse_id) {
            return ProfileValidationResult::DuplicateProfileValidityPeriod;
        }

        let opposite_scope = if evse_id == STATION_WIDE_EVSE_ID {
            ProfileScope::EvseSpecific
        } else {
            ProfileScope::StationWide
        };
        let candidates = self
            .store
            .by_purpose(ChargingProfilePurpose::TxDefaultProfile, opposite_scope);
        for candidate in candidates {
            if candidate.stack_level == profile.stack_level && candidate.id != profile.id {
                return ProfileValidationResult::DuplicateTxDefaultProfileFound;
            }
        }
        ProfileValidationResult::Valid
    }

    /// Rules that apply only to TxProfile.
    pub fn validate_tx_profile(
        &self,
        profile: &ChargingProfile,
        evse_id: i32,
    ) -> ProfileValidationResult {
        if profile.charging_profile_purpose != ChargingProfilePurpose::TxProfile {
            return ProfileValidationResult::InvalidProfileType;
        }
        if evse_id <= STATION_WIDE_EVSE_ID {
            return ProfileValidationResult::TxProfileEvseIdNotGreaterThanZero;
        }
        let Some(evse) = self.evses.get(evse_id) else {
            return ProfileValidationResult::EvseDoesNotExist;
        };

        let Some(transaction_id) = profile.transaction_id.as_deref() else {
            return ProfileValidationResult::TxProfileMissingTransactionId;
        };
        let Some(transaction) = evse.transaction() else {
            return ProfileValidationResult::TxProfileEvseHasNoActiveTransaction;
        };
        if transaction.id != transaction_id {
            return ProfileValidationResult::TxProfileTransactionNotOnEvse;
        }

        let conflict = self.store.get_all().into_iter().any(|stored| {
            stored.transaction_id.as_deref() == Some(transaction_id)
                && stored.stack_level == profile.stack_level
                && stored.id != profile.id
        });
        if conflict {
            return ProfileValidationResult::TxProfileConflictingStackLevel;
        }

        ProfileValidationResult::Valid
    }

    /// Structural checks over every schedule of the profile, conforming
    /// absent phase counts on AC EVSEs.
    fn validate_profile_schedules(
        &self,
        profile: &mut ChargingProfile,
        evse: Option<&EvseView>,
    ) -> ProfileValidationResult {
        let supported_units = self.supported_rate_units();
        let phase_type = self.current_phase_type(evse);
        let phase_switching = self.device_model.ac_phase_switching_supported().unwrap_or(false);
        let kind = profile.charging_profile_kind;

        if profile.charging_schedule.is_empty() {
            return ProfileValidationResult::ChargingProfileNoChargingSchedulePeriods;
        }

        for schedule in profile.charging_schedule.iter_mut() {
            // K01.FR.26
            if !supported_units.contains(&schedule.charging_rate_unit) {
                return ProfileValidationResult::ChargingScheduleChargingRateUnitUnsupported;
            }

            if schedule.charging_schedule_period.is_empty() {
                return ProfileValidationResult::ChargingProfileNoChargingSchedulePeriods;
            }

            for index in 0..schedule.charging_schedule_period.len() {
                let next_start = schedule
                    .charging_schedule_period
                    .get(index + 1)
                    .map(|next| next.start_period);
                let period = &mut schedule.charging_schedule_period[index];

                // K01.FR.19: phaseToUse requires a single-phase period.
                if period.phase_to_use.is_some() && period.number_phases != Some(1) {
                    return ProfileValidationResult::ChargingSchedulePeriodInvalidPhaseToUse;
                }

                // K01.FR.20
                if period.phase_to_use.is_some() && !phase_switching {
                    return ProfileValidationResult::ChargingSchedulePeriodPhaseToUseACPhaseSwitchingUnsupported;
                }

                // K01.FR.31
                if index == 0 && period.start_period != 0 {
                    return ProfileValidationResult::ChargingProfileFirstStartScheduleIsNotZero;
                }

                // K01.FR.35
                if let Some(next_start) = next_start {
                    if next_start <= period.start_period {
                        return ProfileValidationResult::ChargingSchedulePeriodsOutOfOrder;
                    }
                }

                match phase_type {
                    // K01.FR.44: phase values are meaningless on DC.
                    CurrentPhaseType::Dc => {
                        if period.number_phases.is_some() || period.phase_to_use.is_some() {
                            return ProfileValidationResult::ChargingSchedulePeriodExtraneousPhaseValues;
                        }
                    }
                    CurrentPhaseType::Ac => {
                        // K01.FR.45
                        if period.number_phases.is_some_and(|phases| phases > MAX_NUMBER_PHASES) {
                            return ProfileValidationResult::ChargingSchedulePeriodUnsupportedNumberPhases;
                        }
                        // K01.FR.49
                        if period.number_phases.is_none() {
                            period.number_phases = Some(DEFAULT_NUMBER_PHASES);
                        }
                    }
                    CurrentPhaseType::Unknown => {}
                }
            }

            // K01.FR.40
            if kind != ChargingProfileKind::Relative && schedule.start_schedule.is_none() {
                return ProfileValidationResult::ChargingProfileMissingRequiredStartSchedule;
            }
            // K01.FR.41
            if kind == ChargingProfileKind::Relative && schedule.start_schedule.is_some() {
                return ProfileValidationResult::ChargingProfileExtraneousStartSchedule;
            }
        }

        ProfileValidationResult::Valid
    }

    /// K01.FR.06 family: two non-TxProfile profiles of the same stack level
    /// and kind on one EVSE must not have intersecting validity windows.
    fn is_overlapping_validity_period(&self, profile: &ChargingProfile, evse_id: i32) -> bool {
        if profile.charging_profile_purpose == ChargingProfilePurpose::TxProfile {
            return false;
        }

        let candidate_from = profile.valid_from.unwrap_or(DateTime::<Utc>::MIN_UTC);
        let candidate_to = profile.valid_to.unwrap_or_else(end_of_time);

        self.store
            .for_evse(evse_id)
            .iter()
            .filter(|existing| {
                existing.id != profile.id
                    && existing.stack_level == profile.stack_level
                    && existing.charging_profile_kind == profile.charging_profile_kind
                    && existing.charging_profile_purpose != ChargingProfilePurpose::TxProfile
            })
            .any(|existing| {
                let existing_from = existing.valid_from.unwrap_or(DateTime::<Utc>::MIN_UTC);
                let existing_to = existing.valid_to.unwrap_or_else(end_of_time);
                candidate_from <= existing_to && candidate_to >= existing_from
            })
    }

    fn supported_rate_units(&self) -> Vec<ChargingRateUnit> {
        match self.device_model.charging_schedule_charging_rate_unit() {
            Some(csv) => csv
                .split(',')
                .filter_map(|token| token.trim().parse().ok())
                .collect(),
            // Misconfigured station: no unit is acceptable.
            None => Vec::new(),
        }
    }

    fn current_phase_type(&self, evse: Option<&EvseView>) -> CurrentPhaseType {
        if let Some(evse) = evse {
            return evse.phase_type();
        }
        match self.device_model.charging_station_supply_phases() {
            Some(1) | Some(3) => CurrentPhaseType::Ac,
            Some(0) => CurrentPhaseType::Dc,
            _ => CurrentPhaseType::Unknown,
        }
    }
}

/// Fill absent validity bounds so every stored profile carries a concrete
/// window.
fn conform_validity_periods(profile: &mut ChargingProfile, now: DateTime<Utc>) {
    profile.valid_from.get_or_insert(now);
    profile.valid_to.get_or_insert_with(end_of_time);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use crate::domain::{ChargingSchedule, ChargingSchedulePeriod, RecurrencyKind};
    use crate::infrastructure::storage::{
        InMemoryDeviceModel, InMemoryEvseRegistry, AC_PHASE_SWITCHING_SUPPORTED,
        CHARGING_SCHEDULE_CHARGING_RATE_UNIT, CHARGING_STATION_SUPPLY_PHASES,
    };

    const DEFAULT_EVSE_ID: i32 = 1;
    const DEFAULT_PROFILE_ID: i32 = 1;
    const DEFAULT_STACK_LEVEL: i32 = 1;

    struct Fixture {
        device_model: InMemoryDeviceModel,
        evses: InMemoryEvseRegistry,
        store: ProfileStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                device_model: InMemoryDeviceModel::new(),
                evses: InMemoryEvseRegistry::new(),
                store: ProfileStore::new(),
            }
        }

        fn validator(&self) -> ProfileValidator<'_> {
            ProfileValidator::new(&self.device_model, &self.evses, &self.store)
        }

        fn validate(&self, profile: &mut ChargingProfile, evse_id: i32) -> ProfileValidationResult {
            self.validator().validate_profile(profile, evse_id, now())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 17, 17, 0, 0).unwrap()
    }

    fn uuid() -> String {
        Uuid::new_v4().to_string()
    }

    fn charge_schedule(unit: ChargingRateUnit) -> ChargingSchedule {
        ChargingSchedule {
            id: 1,
            charging_rate_unit: unit,
            charging_schedule_period: vec![ChargingSchedulePeriod {
                start_period: 0,
                limit: 16.0,
                number_phases: None,
                phase_to_use: None,
            }],
            start_schedule: Some(now()),
            duration: Some(3600),
            min_charging_rate: None,
        }
    }

    fn charging_profile(
        id: i32,
        purpose: ChargingProfilePurpose,
        schedule: ChargingSchedule,
        transaction_id: Option<String>,
        stack_level: i32,
    ) -> ChargingProfile {
        ChargingProfile {
            id,
            stack_level,
            charging_profile_purpose: purpose,
            charging_profile_kind: ChargingProfileKind::Absolute,
            recurrency_kind: Some(RecurrencyKind::Daily),
            valid_from: None,
            valid_to: None,
            transaction_id,
            charging_schedule: vec![schedule],
        }
    }

    #[test]
    fn test_valid_profile_is_conformed_in_place() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL,
        );

        let result = fixture.validate(&mut profile, DEFAULT_EVSE_ID);

        assert_eq!(result, ProfileValidationResult::Valid);
        assert_eq!(profile.valid_from, Some(now()));
        assert_eq!(profile.valid_to, Some(end_of_time()));
        assert_eq!(
            profile.charging_schedule[0].charging_schedule_period[0].number_phases,
            Some(3)
        );
    }

    #[test]
    fn test_unknown_evse_is_rejected() {
        let fixture = Fixture::new();
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL,
        );

        let result = fixture.validate(&mut profile, 9);
        assert_eq!(result, ProfileValidationResult::EvseDoesNotExist);
    }

    #[test]
    fn test_tx_profile_missing_transaction_id_is_rejected() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL,
        );

        let result = fixture.validate(&mut profile, DEFAULT_EVSE_ID);
        assert_eq!(result, ProfileValidationResult::TxProfileMissingTransactionId);
    }

    #[test]
    fn test_tx_profile_on_station_wide_evse_id_is_rejected() {
        let fixture = Fixture::new();
        let profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxProfile,
            charge_schedule(ChargingRateUnit::A),
            Some(uuid()),
            DEFAULT_STACK_LEVEL,
        );

        let result = fixture
            .validator()
            .validate_tx_profile(&profile, STATION_WIDE_EVSE_ID);
        assert_eq!(result, ProfileValidationResult::TxProfileEvseIdNotGreaterThanZero);
    }

    #[test]
    fn test_tx_profile_without_active_transaction_is_rejected() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxProfile,
            charge_schedule(ChargingRateUnit::A),
            Some("tx1".to_string()),
            DEFAULT_STACK_LEVEL,
        );

        let result = fixture.validate(&mut profile, DEFAULT_EVSE_ID);
        assert_eq!(result, ProfileValidationResult::TxProfileEvseHasNoActiveTransaction);
    }

    #[test]
    fn test_tx_profile_with_wrong_transaction_is_rejected() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        fixture
            .evses
            .open_transaction(DEFAULT_EVSE_ID, "some other transaction", now());
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxProfile,
            charge_schedule(ChargingRateUnit::A),
            Some(uuid()),
            DEFAULT_STACK_LEVEL,
        );

        let result = fixture.validate(&mut profile, DEFAULT_EVSE_ID);
        assert_eq!(result, ProfileValidationResult::TxProfileTransactionNotOnEvse);
    }

    #[test]
    fn test_tx_profile_conflicting_stack_level_is_rejected() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        let transaction_id = uuid();
        fixture
            .evses
            .open_transaction(DEFAULT_EVSE_ID, &transaction_id, now());

        let stored = charging_profile(
            DEFAULT_PROFILE_ID + 1,
            ChargingProfilePurpose::TxProfile,
            charge_schedule(ChargingRateUnit::A),
            Some(transaction_id.clone()),
            42,
        );
        fixture.store.add(DEFAULT_EVSE_ID, stored);

        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxProfile,
            charge_schedule(ChargingRateUnit::A),
            Some(transaction_id),
            42,
        );
        let result = fixture.validate(&mut profile, DEFAULT_EVSE_ID);
        assert_eq!(result, ProfileValidationResult::TxProfileConflictingStackLevel);
    }

    #[test]
    fn test_tx_profile_same_transaction_different_stack_level_is_valid() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        let transaction_id = uuid();
        fixture
            .evses
            .open_transaction(DEFAULT_EVSE_ID, &transaction_id, now());

        let stored = charging_profile(
            DEFAULT_PROFILE_ID + 1,
            ChargingProfilePurpose::TxProfile,
            charge_schedule(ChargingRateUnit::A),
            Some(transaction_id.clone()),
            43,
        );
        fixture.store.add(DEFAULT_EVSE_ID, stored);

        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxProfile,
            charge_schedule(ChargingRateUnit::A),
            Some(transaction_id),
            42,
        );
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::Valid
        );
    }

    #[test]
    fn test_tx_default_profile_duplicate_across_scopes_is_rejected() {
        // A TxDefaultProfile on EVSE 1 at stack level 3 blocks a
        // station-wide TxDefaultProfile at the same stack level.
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        fixture.store.add(
            DEFAULT_EVSE_ID,
            charging_profile(
                DEFAULT_PROFILE_ID,
                ChargingProfilePurpose::TxDefaultProfile,
                charge_schedule(ChargingRateUnit::A),
                None,
                3,
            ),
        );

        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID + 1,
            ChargingProfilePurpose::TxDefaultProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            3,
        );
        let result = fixture.validate(&mut profile, STATION_WIDE_EVSE_ID);
        assert_eq!(result, ProfileValidationResult::DuplicateTxDefaultProfileFound);
    }

    #[test]
    fn test_tx_default_profile_duplicate_station_wide_blocks_evse_candidate() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        fixture.store.add(
            STATION_WIDE_EVSE_ID,
            charging_profile(
                DEFAULT_PROFILE_ID,
                ChargingProfilePurpose::TxDefaultProfile,
                charge_schedule(ChargingRateUnit::A),
                None,
                DEFAULT_STACK_LEVEL,
            ),
        );

        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID + 1,
            ChargingProfilePurpose::TxDefaultProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::DuplicateTxDefaultProfileFound
        );
    }

    #[test]
    fn test_tx_default_profile_same_id_or_other_stack_level_is_a_replace_not_a_conflict() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        fixture.store.add(
            DEFAULT_EVSE_ID,
            charging_profile(
                DEFAULT_PROFILE_ID,
                ChargingProfilePurpose::TxDefaultProfile,
                charge_schedule(ChargingRateUnit::A),
                None,
                DEFAULT_STACK_LEVEL,
            ),
        );

        // Same id, station-wide: replace.
        let mut same_id = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut same_id, STATION_WIDE_EVSE_ID),
            ProfileValidationResult::Valid
        );

        // Different stack level: no conflict.
        let mut other_stack = charging_profile(
            DEFAULT_PROFILE_ID + 1,
            ChargingProfilePurpose::TxDefaultProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL + 1,
        );
        assert_eq!(
            fixture.validate(&mut other_stack, STATION_WIDE_EVSE_ID),
            ProfileValidationResult::Valid
        );
    }

    #[test]
    fn test_overlapping_validity_period_is_rejected() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);

        let mut stored = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL,
        );
        stored.valid_from = Some(now());
        stored.valid_to = Some(now() + chrono::TimeDelta::days(7));
        fixture.store.add(DEFAULT_EVSE_ID, stored);

        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID + 1,
            ChargingProfilePurpose::TxDefaultProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL,
        );
        profile.valid_from = Some(now() + chrono::TimeDelta::days(3));
        profile.valid_to = Some(now() + chrono::TimeDelta::days(10));

        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::DuplicateProfileValidityPeriod
        );

        // Disjoint windows coexist.
        profile.valid_from = Some(now() + chrono::TimeDelta::days(8));
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::Valid
        );
    }

    #[test]
    fn test_charging_station_max_profile_rules() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);

        let mut on_evse = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::ChargingStationMaxProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut on_evse, DEFAULT_EVSE_ID),
            ProfileValidationResult::ChargingStationMaxProfileEvseIdGreaterThanZero
        );

        let mut relative = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::ChargingStationMaxProfile,
            ChargingSchedule {
                start_schedule: None,
                ..charge_schedule(ChargingRateUnit::A)
            },
            None,
            DEFAULT_STACK_LEVEL,
        );
        relative.charging_profile_kind = ChargingProfileKind::Relative;
        assert_eq!(
            fixture.validate(&mut relative, STATION_WIDE_EVSE_ID),
            ProfileValidationResult::ChargingStationMaxProfileCannotBeRelative
        );

        let mut valid = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::ChargingStationMaxProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut valid, STATION_WIDE_EVSE_ID),
            ProfileValidationResult::Valid
        );
    }

    #[test]
    fn test_purpose_specific_validators_reject_foreign_purposes() {
        let fixture = Fixture::new();
        let profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture
                .validator()
                .validate_charging_station_max_profile(&profile, 0),
            ProfileValidationResult::InvalidProfileType
        );
        assert_eq!(
            fixture.validator().validate_tx_profile(&profile, 1),
            ProfileValidationResult::InvalidProfileType
        );
    }

    #[test]
    fn test_schedule_with_no_periods_is_rejected() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        let mut schedule = charge_schedule(ChargingRateUnit::A);
        schedule.charging_schedule_period.clear();
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            schedule,
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::ChargingProfileNoChargingSchedulePeriods
        );
    }

    #[test]
    fn test_first_period_must_start_at_zero() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        let mut schedule = charge_schedule(ChargingRateUnit::A);
        schedule.charging_schedule_period[0].start_period = 10;
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            schedule,
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::ChargingProfileFirstStartScheduleIsNotZero
        );
    }

    #[test]
    fn test_periods_must_strictly_increase() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        let mut schedule = charge_schedule(ChargingRateUnit::A);
        schedule.charging_schedule_period.push(ChargingSchedulePeriod {
            start_period: 1800,
            limit: 10.0,
            number_phases: None,
            phase_to_use: None,
        });
        schedule.charging_schedule_period.push(ChargingSchedulePeriod {
            start_period: 1800,
            limit: 8.0,
            number_phases: None,
            phase_to_use: None,
        });
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            schedule,
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::ChargingSchedulePeriodsOutOfOrder
        );
    }

    #[test]
    fn test_phase_to_use_requires_single_phase_period() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        let mut schedule = charge_schedule(ChargingRateUnit::A);
        schedule.charging_schedule_period[0].number_phases = Some(3);
        schedule.charging_schedule_period[0].phase_to_use = Some(2);
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            schedule,
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::ChargingSchedulePeriodInvalidPhaseToUse
        );
    }

    #[test]
    fn test_phase_to_use_requires_ac_phase_switching_support() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        fixture.device_model.set(AC_PHASE_SWITCHING_SUPPORTED, "false");
        let mut schedule = charge_schedule(ChargingRateUnit::A);
        schedule.charging_schedule_period[0].number_phases = Some(1);
        schedule.charging_schedule_period[0].phase_to_use = Some(2);
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            schedule,
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::ChargingSchedulePeriodPhaseToUseACPhaseSwitchingUnsupported
        );
    }

    #[test]
    fn test_dc_evse_rejects_phase_values() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Dc);
        let mut schedule = charge_schedule(ChargingRateUnit::A);
        schedule.charging_schedule_period[0].number_phases = Some(3);
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            schedule,
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::ChargingSchedulePeriodExtraneousPhaseValues
        );
    }

    #[test]
    fn test_ac_evse_rejects_more_than_three_phases() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        let mut schedule = charge_schedule(ChargingRateUnit::A);
        schedule.charging_schedule_period[0].number_phases = Some(4);
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            schedule,
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::ChargingSchedulePeriodUnsupportedNumberPhases
        );
    }

    #[test]
    fn test_phase_type_falls_back_to_supply_phases_for_station_wide() {
        let fixture = Fixture::new();
        fixture.device_model.set(CHARGING_STATION_SUPPLY_PHASES, "0");
        let mut schedule = charge_schedule(ChargingRateUnit::A);
        schedule.charging_schedule_period[0].number_phases = Some(3);
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::ChargingStationMaxProfile,
            schedule,
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut profile, STATION_WIDE_EVSE_ID),
            ProfileValidationResult::ChargingSchedulePeriodExtraneousPhaseValues
        );
    }

    #[test]
    fn test_unsupported_rate_unit_is_rejected() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        fixture
            .device_model
            .set(CHARGING_SCHEDULE_CHARGING_RATE_UNIT, "W");
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::ChargingScheduleChargingRateUnitUnsupported
        );
    }

    #[test]
    fn test_missing_rate_unit_variable_rejects_every_profile() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        fixture
            .device_model
            .unset(CHARGING_SCHEDULE_CHARGING_RATE_UNIT);
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::ChargingScheduleChargingRateUnitUnsupported
        );
    }

    #[test]
    fn test_non_relative_profile_requires_start_schedule() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        let mut schedule = charge_schedule(ChargingRateUnit::A);
        schedule.start_schedule = None;
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            schedule,
            None,
            DEFAULT_STACK_LEVEL,
        );
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::ChargingProfileMissingRequiredStartSchedule
        );
    }

    #[test]
    fn test_relative_profile_must_not_carry_start_schedule() {
        let fixture = Fixture::new();
        fixture.evses.add_evse(DEFAULT_EVSE_ID, CurrentPhaseType::Ac);
        let mut profile = charging_profile(
            DEFAULT_PROFILE_ID,
            ChargingProfilePurpose::TxDefaultProfile,
            charge_schedule(ChargingRateUnit::A),
            None,
            DEFAULT_STACK_LEVEL,
        );
        profile.charging_profile_kind = ChargingProfileKind::Relative;
        assert_eq!(
            fixture.validate(&mut profile, DEFAULT_EVSE_ID),
            ProfileValidationResult::ChargingProfileExtraneousStartSchedule
        );
    }

    #[test]
    fn test_outcome_names_and_reason_codes_are_stable() {
        assert_eq!(ProfileValidationResult::Valid.as_str(), "Valid");
        assert_eq!(ProfileValidationResult::Valid.reason_code(), "NoError");
        assert_eq!(
            ProfileValidationResult::TxProfileEvseHasNoActiveTransaction.to_string(),
            "TxProfileEvseHasNoActiveTransaction"
        );
        assert_eq!(
            ProfileValidationResult::DuplicateTxDefaultProfileFound.reason_code(),
            "DuplicateProfile"
        );
        assert_eq!(
            ProfileValidationResult::ChargingSchedulePeriodsOutOfOrder.reason_code(),
            "InvalidSchedule"
        );
        assert_eq!(
            ProfileValidationResult::TxProfileMissingTransactionId.reason_code(),
            "MissingParam"
        );
    }
}
