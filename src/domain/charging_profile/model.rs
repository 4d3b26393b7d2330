//! ChargingProfile domain entity
//!
//! Shapes mirror the OCPP 2.0.1 ChargingProfileType tree so the outer
//! transport can move them as JSON fragments; the core itself never touches
//! message envelopes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Charging profile purpose (K01).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingProfilePurpose {
    /// Grid- or operator-imposed constraint, immutable once installed.
    ChargingStationExternalConstraints,
    /// Station-wide upper bound, EVSE id must be 0.
    ChargingStationMaxProfile,
    /// Default limit applied to any transaction without its own TxProfile.
    TxDefaultProfile,
    /// Limit bound to one specific transaction.
    TxProfile,
}

impl ChargingProfilePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChargingStationExternalConstraints => "ChargingStationExternalConstraints",
            Self::ChargingStationMaxProfile => "ChargingStationMaxProfile",
            Self::TxDefaultProfile => "TxDefaultProfile",
            Self::TxProfile => "TxProfile",
        }
    }
}

impl FromStr for ChargingProfilePurpose {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ChargingStationExternalConstraints" => Ok(Self::ChargingStationExternalConstraints),
            "ChargingStationMaxProfile" => Ok(Self::ChargingStationMaxProfile),
            "TxDefaultProfile" => Ok(Self::TxDefaultProfile),
            "TxProfile" => Ok(Self::TxProfile),
            other => Err(DomainError::UnknownChargingProfilePurpose(other.to_string())),
        }
    }
}

impl fmt::Display for ChargingProfilePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the schedule anchor is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingProfileKind {
    /// Anchored at the schedule's own startSchedule.
    Absolute,
    /// Anchored at the start of the EVSE's active transaction.
    Relative,
    /// Repeats daily or weekly from startSchedule.
    Recurring,
}

impl ChargingProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absolute => "Absolute",
            Self::Relative => "Relative",
            Self::Recurring => "Recurring",
        }
    }
}

impl FromStr for ChargingProfileKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Absolute" => Ok(Self::Absolute),
            "Relative" => Ok(Self::Relative),
            "Recurring" => Ok(Self::Recurring),
            other => Err(DomainError::UnknownChargingProfileKind(other.to_string())),
        }
    }
}

/// Recurrence stride for Recurring profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrencyKind {
    Daily,
    Weekly,
}

impl RecurrencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
        }
    }
}

impl FromStr for RecurrencyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Daily" => Ok(Self::Daily),
            "Weekly" => Ok(Self::Weekly),
            other => Err(DomainError::UnknownRecurrencyKind(other.to_string())),
        }
    }
}

/// Unit a schedule expresses its limits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingRateUnit {
    /// Watts
    W,
    /// Amperes
    A,
}

impl ChargingRateUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::W => "W",
            Self::A => "A",
        }
    }
}

impl FromStr for ChargingRateUnit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "W" => Ok(Self::W),
            "A" => Ok(Self::A),
            other => Err(DomainError::UnknownChargingRateUnit(other.to_string())),
        }
    }
}

/// One step of a charging schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingSchedulePeriod {
    /// Offset in seconds from the schedule anchor. The first period of a
    /// schedule must start at 0; subsequent periods strictly increase.
    pub start_period: i32,
    /// Limit in the schedule's chargingRateUnit.
    pub limit: f64,
    /// Number of phases used (1..3). Defaulted to 3 on AC EVSEs during
    /// validation when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_phases: Option<i32>,
    /// Which phase to use; only meaningful with numberPhases = 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_to_use: Option<i32>,
}

/// A list of limit periods measured from a common anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingSchedule {
    pub id: i32,
    pub charging_rate_unit: ChargingRateUnit,
    /// Ordered, non-empty.
    pub charging_schedule_period: Vec<ChargingSchedulePeriod>,
    /// Absolute anchor. Required for Absolute and Recurring kinds,
    /// forbidden for Relative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_schedule: Option<DateTime<Utc>>,
    /// Total schedule length in seconds from the anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_charging_rate: Option<f64>,
}

/// A prioritized, time-bounded charging limit instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingProfile {
    /// Unique per EVSE scope; re-adding an existing id replaces.
    pub id: i32,
    /// Higher stack level wins within a purpose class.
    pub stack_level: i32,
    pub charging_profile_purpose: ChargingProfilePurpose,
    pub charging_profile_kind: ChargingProfileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrency_kind: Option<RecurrencyKind>,
    /// Inclusive lower validity bound; filled with "now" on validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<DateTime<Utc>>,
    /// Exclusive upper validity bound; filled with end-of-time on validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<DateTime<Utc>>,
    /// Mandatory iff purpose = TxProfile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// One or more schedules. Composite calculation uses the first and
    /// warns on the rest.
    pub charging_schedule: Vec<ChargingSchedule>,
}

/// Outcome of storing a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingProfileStatus {
    Accepted,
    Rejected,
}

/// Outcome of a clear-profiles request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClearChargingProfileStatus {
    Accepted,
    Unknown,
}

/// Criteria for clearing stored profiles (ClearChargingProfile).
///
/// A present `profile_id` clears exactly that profile; otherwise every
/// profile matching all present fields is cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearChargingProfileCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evse_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<ChargingProfilePurpose>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_level: Option<i32>,
}
