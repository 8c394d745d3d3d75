// --- File: crates/scheduler_common/src/logic_proptest.rs ---
#[cfg(test)]
mod tests {
    use crate::logic::{filter_available_slots, generate_time_slots, overlaps, WorkingHours};
    use crate::models::{EventTime, ProviderEvent};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use proptest::prelude::*;

    fn event_at(start_minutes: i64, length_minutes: i64) -> ProviderEvent {
        let day = Utc.with_ymd_and_hms(2025, 5, 5, 0, 0, 0).unwrap();
        let start = day + Duration::minutes(start_minutes);
        ProviderEvent {
            start: Some(EventTime::at(start)),
            end: Some(EventTime::at(start + Duration::minutes(length_minutes))),
            ..ProviderEvent::default()
        }
    }

    proptest! {
        // Every slot lies in working hours, outside lunch, on the grid
        #[test]
        fn test_slots_within_working_hours(
            start_hour in 0..12u32,
            day_length in 1..12u32,
            slot_minutes in prop::sample::select(vec![10u32, 15, 20, 30, 45, 60]),
            lunch_start in 0..24u32,
            lunch_length in 0..3u32,
        ) {
            let hours = WorkingHours {
                start_hour,
                end_hour: start_hour + day_length,
                slot_minutes,
                lunch_start,
                lunch_end: lunch_start + lunch_length,
                ..WorkingHours::default()
            };

            let slots = generate_time_slots(&hours);

            for slot in &slots {
                prop_assert!(slot.hour >= hours.start_hour && slot.hour < hours.end_hour);
                prop_assert!(!(slot.hour >= hours.lunch_start && slot.hour < hours.lunch_end));
                prop_assert_eq!(slot.minute % slot_minutes, 0);
                prop_assert!(slot.minute < 60);
            }
            prop_assert!(slots.windows(2).all(|pair| pair[0] < pair[1]));
        }

        // The overlap test is symmetric in which interval is the "slot"
        #[test]
        fn test_overlap_is_symmetric(
            a in 0..1440i64, a_len in 1..240i64,
            b in 0..1440i64, b_len in 1..240i64,
        ) {
            prop_assert_eq!(
                overlaps(a, a + a_len, b, b + b_len),
                overlaps(b, b + b_len, a, a + a_len)
            );
        }

        // Filtering never invents slots and keeps exactly the non-overlapping ones
        #[test]
        fn test_filter_keeps_only_free_slots(
            events in prop::collection::vec((0..1440i64, 1..180i64), 0..6),
        ) {
            let hours = WorkingHours::default();
            let slots = generate_time_slots(&hours);
            let provider_events: Vec<ProviderEvent> =
                events.iter().map(|(start, len)| event_at(*start, *len)).collect();
            let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();

            let available = filter_available_slots(date, &slots, &provider_events, &hours);

            for slot in &slots {
                let slot_start = i64::from(slot.hour * 60 + slot.minute);
                let slot_end = slot_start + i64::from(hours.slot_minutes);
                let busy = events
                    .iter()
                    .any(|(start, len)| overlaps(slot_start, slot_end, *start, start + len));
                prop_assert_eq!(available.contains(slot), !busy);
            }
        }
    }
}
