//! Composite schedule merge
//!
//! Walks the sorted set of boundary times contributed by all period entries
//! and resolves one limit per sub-interval: highest stack level wins inside
//! a purpose class, then TxProfile overrides TxDefaultProfile, and the
//! station-wide maximum and any external constraint cap the result.
//! Sub-intervals are closed on the left and open on the right.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tracing::debug;

use crate::domain::{ChargingRateUnit, ChargingSchedulePeriod, CompositeSchedule};

use super::profile::PeriodEntry;
use super::units::{convert_limit, DEFAULT_NUMBER_PHASES};

/// Period entries bucketed by the purpose class of their source profile.
#[derive(Debug, Default)]
pub struct PurposeEntries {
    pub external_constraints: Vec<PeriodEntry>,
    pub charging_station_max: Vec<PeriodEntry>,
    pub tx_default: Vec<PeriodEntry>,
    pub tx: Vec<PeriodEntry>,
}

/// Merge the bucketed entries into a composite schedule over
/// `[start, end)` expressed in `unit`.
///
/// Sub-intervals no entry covers are omitted: interior gaps break period
/// coalescing, and a trailing gap shortens `duration`. A window containing
/// no entries at all yields `duration = end - start` and no periods; a
/// non-positive window yields `duration = 0`.
pub fn calculate_composite_schedule(
    entries: &PurposeEntries,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    evse_id: i32,
    unit: ChargingRateUnit,
) -> CompositeSchedule {
    let mut composite = CompositeSchedule {
        evse_id,
        duration: 0,
        schedule_start: start,
        charging_rate_unit: unit,
        charging_schedule_period: Vec::new(),
    };
    if end <= start {
        return composite;
    }

    let boundaries = boundary_times(entries, start, end);
    let mut previous: Option<(f64, Option<i32>)> = None;
    let mut last_covered_end: Option<DateTime<Utc>> = None;

    for pair in boundaries.windows(2) {
        let (sub_start, sub_end) = (pair[0], pair[1]);

        let base = select(&entries.tx, sub_start).or_else(|| select(&entries.tx_default, sub_start));
        let mut winner = base;
        let mut winner_limit = base.map(|entry| limit_in(entry, unit));
        for cap in [
            select(&entries.charging_station_max, sub_start),
            select(&entries.external_constraints, sub_start),
        ]
        .into_iter()
        .flatten()
        {
            let cap_limit = limit_in(cap, unit);
            if winner_limit.map_or(true, |current| cap_limit < current) {
                winner = Some(cap);
                winner_limit = Some(cap_limit);
            }
        }

        match (winner, winner_limit) {
            (Some(entry), Some(limit)) => {
                let number_phases = entry.number_phases;
                if previous != Some((limit, number_phases)) {
                    composite.charging_schedule_period.push(ChargingSchedulePeriod {
                        start_period: (sub_start - start).num_seconds() as i32,
                        limit,
                        number_phases,
                        phase_to_use: None,
                    });
                    previous = Some((limit, number_phases));
                }
                last_covered_end = Some(sub_end);
            }
            _ => {
                // Uncovered time: whatever follows starts a fresh period.
                previous = None;
            }
        }
    }

    composite.duration = match last_covered_end {
        Some(covered_end) => (covered_end - start).num_seconds() as i32,
        None => (end - start).num_seconds() as i32,
    };

    debug!(
        evse_id,
        periods = composite.charging_schedule_period.len(),
        duration = composite.duration,
        "Composite schedule calculated"
    );

    composite
}

/// All distinct entry boundaries inside the window, plus the window
/// endpoints themselves.
fn boundary_times(entries: &PurposeEntries, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut times = BTreeSet::new();
    times.insert(start);
    times.insert(end);
    for bucket in [
        &entries.external_constraints,
        &entries.charging_station_max,
        &entries.tx_default,
        &entries.tx,
    ] {
        for entry in bucket.iter() {
            if entry.start > start && entry.start < end {
                times.insert(entry.start);
            }
            if entry.end > start && entry.end < end {
                times.insert(entry.end);
            }
        }
    }
    times.into_iter().collect()
}

/// The entry governing `at` within one purpose class: highest stack level,
/// later insertion winning ties.
fn select(entries: &[PeriodEntry], at: DateTime<Utc>) -> Option<&PeriodEntry> {
    let mut winner: Option<&PeriodEntry> = None;
    for entry in entries.iter().filter(|e| e.start <= at && at < e.end) {
        match winner {
            Some(current) if entry.stack_level < current.stack_level => {}
            _ => winner = Some(entry),
        }
    }
    winner
}

fn limit_in(entry: &PeriodEntry, unit: ChargingRateUnit) -> f64 {
    let phases = entry.number_phases.unwrap_or(DEFAULT_NUMBER_PHASES);
    convert_limit(entry.limit, entry.charging_rate_unit, unit, phases)
}
