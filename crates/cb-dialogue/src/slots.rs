//! Free-slot suggestions around existing conflicts.

use cb_protocol::Conflict;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// First and last hour (exclusive) scanned for 1-hour slots.
pub const SLOT_DAY_START: u32 = 9;
pub const SLOT_DAY_END: u32 = 18;

/// Free 1-hour slot starts on `date` between 09:00 and 18:00.
pub fn free_slots(date: NaiveDate, conflicts: &[Conflict]) -> Vec<NaiveDateTime> {
    (SLOT_DAY_START..SLOT_DAY_END)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .map(|time| date.and_time(time))
        .filter(|start| {
            let end = *start + Duration::hours(1);
            !conflicts.iter().any(|c| c.overlaps(*start, end))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 22)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn conflict(start: NaiveDateTime, end: NaiveDateTime) -> Conflict {
        Conflict {
            title: "busy".into(),
            start,
            end,
        }
    }

    #[test]
    fn no_conflicts_gives_nine_slots() {
        let slots = free_slots(at(0, 0).date(), &[]);
        assert_eq!(slots.len(), 9);
        assert_eq!(slots[0], at(9, 0));
        assert_eq!(slots[8], at(17, 0));
    }

    #[test]
    fn afternoon_conflict_excludes_touched_hours() {
        let slots = free_slots(at(0, 0).date(), &[conflict(at(14, 30), at(15, 30))]);
        assert!(!slots.contains(&at(14, 0)));
        assert!(!slots.contains(&at(15, 0)));
        assert!(slots.contains(&at(13, 0)));
        assert!(slots.contains(&at(16, 0)));
        assert_eq!(slots.len(), 7);
    }

    #[test]
    fn touching_boundaries_are_free() {
        let slots = free_slots(at(0, 0).date(), &[conflict(at(10, 0), at(11, 0))]);
        assert!(slots.contains(&at(9, 0)));
        assert!(!slots.contains(&at(10, 0)));
        assert!(slots.contains(&at(11, 0)));
    }

    #[test]
    fn fully_booked_day() {
        assert!(free_slots(at(0, 0).date(), &[conflict(at(8, 0), at(19, 0))]).is_empty());
    }
}
