//! Profile time expansion
//!
//! Turns one charging profile into absolute time intervals: resolves the
//! profile's anchor (the wall-clock instant its period offsets are measured
//! from), then emits one [`PeriodEntry`] per period and occurrence that
//! intersects the query window.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::warn;

use crate::domain::{
    ChargingProfile, ChargingProfileKind, ChargingRateUnit, ChargingSchedule, RecurrencyKind,
};
use crate::support::time::{end_of_time, floor_to_second};

pub(crate) const SECONDS_PER_DAY: i64 = 86_400;
pub(crate) const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;

/// One period of one profile occurrence, pinned to absolute time.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodEntry {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
    pub limit: f64,
    pub stack_level: i32,
    pub charging_rate_unit: ChargingRateUnit,
    pub number_phases: Option<i32>,
}

/// Absolute time the given schedule's period offsets are measured from.
///
/// Absolute profiles anchor at their own `start_schedule`. Recurring
/// profiles anchor at the most recent occurrence at or before `now`; when
/// `now` precedes `start_schedule` the anchor winds backward by whole
/// strides, which may land before the profile's validity window (the
/// validity clip happens later). Relative profiles anchor at the later of
/// `activation_time` and the supplied session start, and have no anchor
/// without a session: a profile installed mid-transaction must not reach
/// back to the transaction's beginning.
pub fn profile_anchor(
    profile: &ChargingProfile,
    schedule: &ChargingSchedule,
    now: DateTime<Utc>,
    activation_time: DateTime<Utc>,
    session_start: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    match profile.charging_profile_kind {
        ChargingProfileKind::Absolute => schedule.start_schedule.map(floor_to_second),
        ChargingProfileKind::Recurring => {
            let start = floor_to_second(schedule.start_schedule?);
            let now = floor_to_second(now);
            let stride = recurrence_stride(profile).num_seconds();
            let elapsed = (now - start).num_seconds().rem_euclid(stride);
            Some(now - TimeDelta::seconds(elapsed))
        }
        ChargingProfileKind::Relative => {
            session_start.map(|start| floor_to_second(start.max(activation_time)))
        }
    }
}

/// Exclusive end of the period at `index` for an occurrence anchored at
/// `anchor`: the next period's start, capped at the schedule duration; the
/// duration boundary for the last period; end of time when the schedule is
/// open-ended.
pub fn period_end(index: usize, anchor: DateTime<Utc>, schedule: &ChargingSchedule) -> DateTime<Utc> {
    let duration_end = schedule
        .duration
        .map(|duration| anchor + TimeDelta::seconds(i64::from(duration)));

    match schedule.charging_schedule_period.get(index + 1) {
        Some(next) => {
            let next_start = anchor + TimeDelta::seconds(i64::from(next.start_period));
            match duration_end {
                Some(capped) if capped < next_start => capped,
                _ => next_start,
            }
        }
        None => duration_end.unwrap_or_else(end_of_time),
    }
}

/// Expand `profile` into the period entries intersecting
/// `[query_start, query_end)`.
///
/// `query_start` doubles as the reference instant for winding recurring
/// anchors, keeping the result a pure function of (profile, window,
/// activation, session). `activation_time` is when the profile became
/// active (its conformed `validFrom` for stored profiles); Relative
/// schedules never anchor before it. Profiles whose anchor cannot be
/// determined contribute nothing. Entries are clipped to the profile's
/// validity window and come back ordered by occurrence, then period index.
pub fn calculate_profile(
    profile: &ChargingProfile,
    query_start: DateTime<Utc>,
    query_end: DateTime<Utc>,
    activation_time: DateTime<Utc>,
    session_start: Option<DateTime<Utc>>,
) -> Vec<PeriodEntry> {
    let Some(schedule) = profile.charging_schedule.first() else {
        return Vec::new();
    };
    if profile.charging_schedule.len() > 1 {
        warn!(
            profile_id = profile.id,
            schedules = profile.charging_schedule.len(),
            "Profile carries multiple charging schedules, using the first"
        );
    }

    let Some(anchor) = profile_anchor(profile, schedule, query_start, activation_time, session_start)
    else {
        return Vec::new();
    };

    let valid_from = profile.valid_from.unwrap_or(anchor);
    let valid_to = profile.valid_to.unwrap_or_else(end_of_time);

    let mut entries = Vec::new();
    match profile.charging_profile_kind {
        ChargingProfileKind::Recurring => {
            let stride = recurrence_stride(profile);
            let mut occurrence = anchor;
            while occurrence < query_end {
                let boundary = occurrence + stride;
                expand_occurrence(
                    profile,
                    schedule,
                    occurrence,
                    Some(boundary),
                    valid_from,
                    valid_to,
                    query_start,
                    query_end,
                    &mut entries,
                );
                occurrence = boundary;
            }
        }
        ChargingProfileKind::Absolute | ChargingProfileKind::Relative => {
            expand_occurrence(
                profile, schedule, anchor, None, valid_from, valid_to, query_start, query_end,
                &mut entries,
            );
        }
    }

    entries
}

fn recurrence_stride(profile: &ChargingProfile) -> TimeDelta {
    match profile.recurrency_kind {
        Some(RecurrencyKind::Weekly) => TimeDelta::seconds(SECONDS_PER_WEEK),
        _ => TimeDelta::seconds(SECONDS_PER_DAY),
    }
}

#[allow(clippy::too_many_arguments)]
fn expand_occurrence(
    profile: &ChargingProfile,
    schedule: &ChargingSchedule,
    occurrence: DateTime<Utc>,
    occurrence_boundary: Option<DateTime<Utc>>,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    query_start: DateTime<Utc>,
    query_end: DateTime<Utc>,
    entries: &mut Vec<PeriodEntry>,
) {
    for (index, period) in schedule.charging_schedule_period.iter().enumerate() {
        let start = occurrence + TimeDelta::seconds(i64::from(period.start_period));
        let mut end = period_end(index, occurrence, schedule);
        if let Some(boundary) = occurrence_boundary {
            // An occurrence never spills into the next one.
            end = end.min(boundary);
        }

        let clipped_start = start.max(valid_from);
        let clipped_end = end.min(valid_to);
        if clipped_start >= clipped_end {
            continue;
        }
        if clipped_end <= query_start || clipped_start >= query_end {
            continue;
        }

        entries.push(PeriodEntry {
            start: clipped_start,
            end: clipped_end,
            limit: period.limit,
            stack_level: profile.stack_level,
            charging_rate_unit: schedule.charging_rate_unit,
            number_phases: period.number_phases,
        });
    }
}
