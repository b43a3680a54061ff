//! Weekly meeting conflict detection
//!
//! Meetings are half-open intervals on a weekday: two meetings on the same
//! day conflict unless one ends at or before the other starts. Touching
//! endpoints (10:00-11:00 after 09:00-10:00) do not conflict.

use crate::models::{Meeting, SectionId, Weekday};

/// First overlapping pair found between a candidate section and the
/// student's current schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    pub existing_section_id: SectionId,
    pub day: Weekday,
    pub candidate: Meeting,
    pub existing: Meeting,
}

pub fn meetings_overlap(a: &Meeting, b: &Meeting) -> bool {
    if a.day_of_week != b.day_of_week {
        return false;
    }
    !(a.end_time <= b.start_time || a.start_time >= b.end_time)
}

/// Scan every (candidate, existing) pair; candidate order then schedule order.
pub fn find_conflict(
    candidate: &[Meeting],
    schedule: &[(SectionId, Meeting)],
) -> Option<Conflict> {
    candidate.iter().find_map(|new| {
        schedule
            .iter()
            .find(|(_, existing)| meetings_overlap(new, existing))
            .map(|(section_id, existing)| Conflict {
                existing_section_id: *section_id,
                day: new.day_of_week,
                candidate: *new,
                existing: *existing,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use proptest::prelude::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn mon(start: (u32, u32), end: (u32, u32)) -> Meeting {
        Meeting::new(Weekday::Monday, t(start.0, start.1), t(end.0, end.1))
    }

    #[test]
    fn partial_overlap_conflicts() {
        assert!(meetings_overlap(&mon((9, 30), (10, 30)), &mon((9, 0), (10, 0))));
    }

    #[test]
    fn touching_endpoints_do_not_conflict() {
        assert!(!meetings_overlap(&mon((10, 0), (11, 0)), &mon((9, 0), (10, 0))));
        assert!(!meetings_overlap(&mon((8, 0), (9, 0)), &mon((9, 0), (10, 0))));
    }

    #[test]
    fn containment_conflicts_both_ways() {
        let outer = mon((9, 0), (12, 0));
        let inner = mon((10, 0), (11, 0));
        assert!(meetings_overlap(&outer, &inner));
        assert!(meetings_overlap(&inner, &outer));
    }

    #[test]
    fn identical_interval_conflicts() {
        assert!(meetings_overlap(&mon((9, 0), (10, 0)), &mon((9, 0), (10, 0))));
    }

    #[test]
    fn different_days_never_conflict() {
        let monday = mon((9, 0), (10, 0));
        let tuesday = Meeting::new(Weekday::Tuesday, t(9, 0), t(10, 0));
        assert!(!meetings_overlap(&monday, &tuesday));
    }

    #[test]
    fn find_conflict_reports_first_existing_section() {
        let schedule = vec![
            (11, Meeting::new(Weekday::Tuesday, t(9, 0), t(10, 0))),
            (12, mon((9, 0), (10, 0))),
            (13, mon((9, 45), (11, 0))),
        ];
        let candidate = vec![
            Meeting::new(Weekday::Wednesday, t(9, 0), t(10, 0)),
            mon((9, 30), (10, 30)),
        ];
        let conflict = find_conflict(&candidate, &schedule).expect("conflict");
        assert_eq!(conflict.existing_section_id, 12);
        assert_eq!(conflict.day, Weekday::Monday);
        assert_eq!(conflict.candidate, mon((9, 30), (10, 30)));
    }

    #[test]
    fn empty_inputs_have_no_conflict() {
        assert!(find_conflict(&[], &[(1, mon((9, 0), (10, 0)))]).is_none());
        assert!(find_conflict(&[mon((9, 0), (10, 0))], &[]).is_none());
    }

    fn arb_meeting() -> impl Strategy<Value = Meeting> {
        (0usize..7, 0u32..(24 * 60 - 1), 1u32..240).prop_map(|(day, start, len)| {
            let end = (start + len).min(24 * 60 - 1);
            Meeting::new(
                Weekday::ALL[day],
                t(start / 60, start % 60),
                t(end / 60, end % 60),
            )
        })
    }

    fn minutes(time: NaiveTime) -> u32 {
        use chrono::Timelike;
        time.hour() * 60 + time.minute()
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in arb_meeting(), b in arb_meeting()) {
            prop_assert_eq!(meetings_overlap(&a, &b), meetings_overlap(&b, &a));
        }

        #[test]
        fn overlap_matches_shared_minute(a in arb_meeting(), b in arb_meeting()) {
            prop_assume!(a.start_time < a.end_time && b.start_time < b.end_time);
            let shared = a.day_of_week == b.day_of_week
                && (minutes(a.start_time)..minutes(a.end_time))
                    .any(|m| (minutes(b.start_time)..minutes(b.end_time)).contains(&m));
            prop_assert_eq!(meetings_overlap(&a, &b), shared);
        }
    }
}
