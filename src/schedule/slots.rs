use crate::model::*;

use super::ScheduleError;

// ── Slot Generation ──────────────────────────────────────────────

/// Enumerate candidate start times within operating hours and flag each
/// against the occupied ranges.
///
/// Candidates start at `hours.open` and step by `interval_min`; a candidate
/// whose implied end would pass `hours.close` is not emitted, so the last
/// candidate may end exactly at closing time. A candidate is unavailable iff
/// it overlaps any occupied range.
///
/// Pure and deterministic: same inputs, same output. A duration longer than
/// the operating window yields an empty sequence, not an error.
pub fn generate_slots(
    hours: &DayHours,
    interval_min: Minute,
    duration_min: Minute,
    occupied: &[OccupiedRange],
) -> Result<Vec<SlotCandidate>, ScheduleError> {
    if duration_min <= 0 {
        return Err(ScheduleError::NonPositiveDuration(duration_min));
    }
    if interval_min <= 0 {
        return Err(ScheduleError::NonPositiveInterval(interval_min));
    }

    let open = minute_of_day(hours.open);
    let close = minute_of_day(hours.close);

    let mut slots = Vec::new();
    let mut start = open;
    loop {
        let end = start + duration_min;
        if end > close {
            break;
        }
        let candidate = TimeRange::new(start, end);
        let available = occupied.iter().all(|r| !r.range.overlaps(&candidate));
        slots.push(SlotCandidate {
            start: minute_to_time(start),
            end: minute_to_time(end),
            available,
        });
        start += interval_min;
    }
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use ulid::Ulid;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn hours(open: (u32, u32), close: (u32, u32)) -> DayHours {
        DayHours::new(t(open.0, open.1), t(close.0, close.1))
    }

    fn booked(start: (u32, u32), end: (u32, u32)) -> OccupiedRange {
        OccupiedRange {
            reservation_id: Ulid::new(),
            source: OccupiedSource::Package,
            range: TimeRange::from_times(t(start.0, start.1), t(end.0, end.1)),
        }
    }

    #[test]
    fn empty_day_all_slots_available() {
        let slots = generate_slots(&hours((9, 0), (17, 0)), 30, 60, &[]).unwrap();
        // floor((480 - 60) / 30) + 1 = 15 candidates
        assert_eq!(slots.len(), 15);
        assert!(slots.iter().all(|s| s.available));
        assert_eq!(slots[0].start, t(9, 0));
        // Last candidate ends exactly at closing time
        assert_eq!(slots.last().unwrap().start, t(16, 0));
        assert_eq!(slots.last().unwrap().end, t(17, 0));
        // No 16:30 candidate — its end would pass 17:00
        assert!(!slots.iter().any(|s| s.start == t(16, 30)));
    }

    #[test]
    fn booking_blocks_overlapping_candidates() {
        let occupied = [booked((10, 0), (11, 30))];
        let slots = generate_slots(&hours((9, 0), (17, 0)), 30, 60, &occupied).unwrap();

        let by_start = |hm: (u32, u32)| {
            slots
                .iter()
                .find(|s| s.start == t(hm.0, hm.1))
                .unwrap()
                .available
        };
        assert!(by_start((9, 0)));
        assert!(by_start((9, 30)));
        assert!(!by_start((10, 0)));
        assert!(!by_start((10, 30)));
        assert!(!by_start((11, 0)));
        // Starts exactly when the booking ends — half-open, no conflict
        assert!(by_start((11, 30)));
    }

    #[test]
    fn candidate_ending_at_booking_start_is_free() {
        let occupied = [booked((11, 0), (12, 0))];
        let slots = generate_slots(&hours((9, 0), (17, 0)), 30, 60, &occupied).unwrap();
        let ten = slots.iter().find(|s| s.start == t(10, 0)).unwrap();
        assert!(ten.available); // ends 11:00, back-to-back with the booking
    }

    #[test]
    fn duration_longer_than_window_yields_no_slots() {
        let slots = generate_slots(&hours((9, 0), (10, 0)), 30, 90, &[]).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn duration_exactly_the_window_yields_one_slot() {
        let slots = generate_slots(&hours((9, 0), (10, 0)), 30, 60, &[]).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start, t(9, 0));
        assert_eq!(slots[0].end, t(10, 0));
    }

    #[test]
    fn slot_count_matches_formula() {
        for (window_min, interval, duration) in
            [(480, 30, 60), (480, 15, 45), (180, 60, 60), (120, 30, 90)]
        {
            let close_h = 9 + (window_min / 60) as u32;
            let close_m = (window_min % 60) as u32;
            let slots =
                generate_slots(&hours((9, 0), (close_h, close_m)), interval, duration, &[])
                    .unwrap();
            let expected = ((window_min - duration) / interval + 1).max(0) as usize;
            assert_eq!(slots.len(), expected, "window={window_min} interval={interval} duration={duration}");
        }
    }

    #[test]
    fn available_slots_never_overlap_occupied() {
        let occupied = [
            booked((9, 30), (10, 15)),
            booked((12, 0), (14, 0)),
            booked((16, 0), (16, 30)),
        ];
        let slots = generate_slots(&hours((9, 0), (17, 0)), 30, 60, &occupied).unwrap();
        for slot in slots.iter().filter(|s| s.available) {
            let candidate = TimeRange::from_times(slot.start, slot.end);
            for r in &occupied {
                assert!(
                    !candidate.overlaps(&r.range),
                    "available slot {:?} overlaps {:?}",
                    slot.start,
                    r.range
                );
            }
        }
    }

    #[test]
    fn non_positive_inputs_are_rejected() {
        let h = hours((9, 0), (17, 0));
        assert!(matches!(
            generate_slots(&h, 30, 0, &[]),
            Err(ScheduleError::NonPositiveDuration(0))
        ));
        assert!(matches!(
            generate_slots(&h, 30, -15, &[]),
            Err(ScheduleError::NonPositiveDuration(-15))
        ));
        assert!(matches!(
            generate_slots(&h, 0, 60, &[]),
            Err(ScheduleError::NonPositiveInterval(0))
        ));
    }

    #[test]
    fn addon_ranges_block_like_package_ranges() {
        let occupied = [OccupiedRange {
            reservation_id: Ulid::new(),
            source: OccupiedSource::Addon,
            range: TimeRange::from_times(t(13, 0), t(14, 0)),
        }];
        let slots = generate_slots(&hours((9, 0), (17, 0)), 30, 60, &occupied).unwrap();
        let one_pm = slots.iter().find(|s| s.start == t(13, 0)).unwrap();
        assert!(!one_pm.available);
    }
}
