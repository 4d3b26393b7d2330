//! Time helpers shared across the smart-charging pipeline

use chrono::{DateTime, SubsecRound, Utc};

/// Sentinel for "no expiry": 9999-12-31T23:59:59Z. Far enough out to
/// compare after any real schedule boundary while staying safely inside
/// chrono's representable range.
pub fn end_of_time() -> DateTime<Utc> {
    DateTime::from_timestamp(253_402_300_799, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Schedule anchors are second-granular; sub-second parts are dropped.
pub fn floor_to_second(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_end_of_time_is_after_any_schedule_boundary() {
        let far_future = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();
        assert!(end_of_time() > far_future);
    }

    #[test]
    fn test_floor_to_second_drops_subseconds() {
        let value = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
            + chrono::TimeDelta::milliseconds(750);
        assert_eq!(
            floor_to_second(value),
            Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
        );
    }
}
