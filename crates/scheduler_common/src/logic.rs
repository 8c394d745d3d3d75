// --- File: crates/scheduler_common/src/logic.rs ---
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use scheduler_config::BookingConfig;
use std::fmt;
use std::str::FromStr;

use crate::error::{config_error, validation_error, SchedulerError};
use crate::models::ProviderEvent;

/// Configuration for working hours, the slot grid and the lunch break.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkingHours {
    /// First bookable hour (e.g. 9)
    pub start_hour: u32,
    /// Hour at which the working day ends; no slot starts at or after it
    pub end_hour: u32,
    pub slot_minutes: u32,
    pub lunch_start: u32,
    pub lunch_end: u32,
    /// Zone in which slots are wall-clock times
    pub time_zone: Tz,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: 9,
            end_hour: 17,
            slot_minutes: 30,
            lunch_start: 12,
            lunch_end: 13,
            time_zone: Tz::UTC,
        }
    }
}

impl TryFrom<&BookingConfig> for WorkingHours {
    type Error = SchedulerError;

    fn try_from(config: &BookingConfig) -> Result<Self, Self::Error> {
        let time_zone: Tz = config
            .time_zone
            .parse()
            .map_err(|_| config_error(format!("Unknown time zone: {}", config.time_zone)))?;

        if config.slot_minutes == 0 || config.slot_minutes > 60 {
            return Err(config_error(format!(
                "slot_minutes must be between 1 and 60, got {}",
                config.slot_minutes
            )));
        }
        if config.workday_start >= config.workday_end || config.workday_end > 24 {
            return Err(config_error(format!(
                "Invalid working day {}..{}",
                config.workday_start, config.workday_end
            )));
        }

        Ok(Self {
            start_hour: config.workday_start,
            end_hour: config.workday_end,
            slot_minutes: config.slot_minutes,
            lunch_start: config.lunch_start,
            lunch_end: config.lunch_end,
            time_zone,
        })
    }
}

impl WorkingHours {
    pub fn slot_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }

    fn is_lunch_hour(&self, hour: u32) -> bool {
        hour >= self.lunch_start && hour < self.lunch_end
    }
}

/// A bookable time of day, displayed as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot {
    pub hour: u32,
    pub minute: u32,
}

impl TimeSlot {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    pub fn time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }

    /// The instant this slot starts on `date`, read as wall-clock time in `tz`.
    ///
    /// `None` when the wall-clock time does not exist (DST gap).
    pub fn start_on(&self, date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
        let naive = NaiveDateTime::new(date, self.time()?);
        local_instant(tz, naive)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeSlot {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let time = NaiveTime::parse_from_str(s, "%H:%M")
            .map_err(|_| validation_error(format!("Invalid time: {}", s)))?;
        Ok(Self::new(time.hour(), time.minute()))
    }
}

/// Generates the ordered slot grid for one working day.
///
/// Slots start every `slot_minutes` from `start_hour:00`. Hours inside the
/// lunch window are skipped entirely and no slot starts at or after `end_hour:00`.
/// The closing time itself is never offered, so the default 9-17 day with a
/// 12-13 lunch yields 14 half-hour slots.
pub fn generate_time_slots(hours: &WorkingHours) -> Vec<TimeSlot> {
    if hours.slot_minutes == 0 {
        return Vec::new();
    }

    (hours.start_hour..hours.end_hour)
        .filter(|hour| !hours.is_lunch_hour(*hour))
        .flat_map(|hour| {
            (0..60)
                .step_by(hours.slot_minutes as usize)
                .map(move |minute| TimeSlot::new(hour, minute))
        })
        .collect()
}

/// Half-open interval overlap: `[slot_start, slot_end)` against `[event_start, event_end)`.
pub fn overlaps<T: PartialOrd>(slot_start: T, slot_end: T, event_start: T, event_end: T) -> bool {
    slot_start < event_end && slot_end > event_start
}

/// Keeps the slots on `date` that overlap none of `events`.
///
/// Events without a timed start and end (all-day events) never block a slot.
/// Slots that do not exist on `date` in the configured zone are dropped.
pub fn filter_available_slots(
    date: NaiveDate,
    slots: &[TimeSlot],
    events: &[ProviderEvent],
    hours: &WorkingHours,
) -> Vec<TimeSlot> {
    let busy: Vec<(DateTime<Utc>, DateTime<Utc>)> =
        events.iter().filter_map(ProviderEvent::time_range).collect();
    let duration = hours.slot_duration();

    slots
        .iter()
        .copied()
        .filter(|slot| match slot.start_on(date, hours.time_zone) {
            Some(start) => {
                let end = start + duration;
                !busy
                    .iter()
                    .any(|(event_start, event_end)| overlaps(start, end, *event_start, *event_end))
            }
            None => false,
        })
        .collect()
}

/// A date is disabled when it lies strictly before `today`.
pub fn is_date_disabled(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, SchedulerError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| validation_error(format!("Invalid date: {}", value)))
}

/// Midnight to 23:59:59 of `date` on the wall clock of `tz`, as UTC instants.
///
/// This is the window used for a booking day. A midnight that falls in a
/// DST gap is read as UTC midnight.
pub fn local_day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_instant(tz, date.and_time(NaiveTime::MIN))
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN).and_utc());
    let end = date
        .succ_opt()
        .and_then(|next| local_instant(tz, next.and_time(NaiveTime::MIN)))
        .map(|next| next - Duration::seconds(1))
        .unwrap_or_else(|| start + Duration::seconds(86_399));
    (start, end)
}

/// Coarse ranges offered by the admin event listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventRange {
    #[default]
    Upcoming,
    Today,
    Past,
}

impl EventRange {
    /// Unknown tags fall back to [`EventRange::Upcoming`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "today" => EventRange::Today,
            "past" => EventRange::Past,
            _ => EventRange::Upcoming,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            EventRange::Upcoming => "upcoming",
            EventRange::Today => "today",
            EventRange::Past => "past",
        }
    }
}

impl fmt::Display for EventRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// `(time_min, time_max)` for an admin range, relative to `now` in its zone.
pub fn admin_range_bounds(
    range: EventRange,
    now: DateTime<Tz>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let now_utc = now.with_timezone(&Utc);
    match range {
        EventRange::Upcoming => (Some(now_utc), None),
        EventRange::Past => (None, Some(now_utc)),
        EventRange::Today => {
            let tz = now.timezone();
            let day = now.date_naive();
            let start = local_instant(tz, day.and_time(NaiveTime::MIN));
            let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
                .and_then(|t| local_instant(tz, day.and_time(t)));
            (start, end)
        }
    }
}

fn local_instant(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
