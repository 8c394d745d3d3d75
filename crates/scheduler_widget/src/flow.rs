// --- File: crates/scheduler_widget/src/flow.rs ---
//! The visitor's booking flow: date, then time, then contact details.

use chrono::{NaiveDate, SecondsFormat, Utc};
use scheduler_common::logging::log_error;
use scheduler_common::logic::{
    filter_available_slots, generate_time_slots, is_date_disabled, TimeSlot, WorkingHours,
};
use scheduler_common::models::{CreateEventRequest, ProviderEvent};
use std::fmt;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info};

use crate::api::SchedulerApi;

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";
pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to schedule appointment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    Date,
    Time,
    Questions,
    Confirmation,
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingState::Date => "date",
            BookingState::Time => "time",
            BookingState::Questions => "questions",
            BookingState::Confirmation => "confirmation",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum FlowError {
    #[error("{} is in the past", .0.format("%Y-%m-%d"))]
    DateDisabled(NaiveDate),
    #[error("{0} is not available")]
    SlotUnavailable(TimeSlot),
    #[error("cannot {action} while in the {state} step")]
    InvalidTransition {
        state: BookingState,
        action: &'static str,
    },
    #[error("{}", MISSING_FIELDS_MESSAGE)]
    MissingFields,
    #[error("{}", SUBMIT_FAILED_MESSAGE)]
    SubmitFailed,
}

/// What the visitor typed into the questions step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answers {
    pub name: String,
    pub email: String,
    pub reason: String,
}

impl Answers {
    fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.reason]
            .iter()
            .all(|field| !field.trim().is_empty())
    }
}

/// Shown once a booking went through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub date: NaiveDate,
    pub time: TimeSlot,
}

impl Confirmation {
    /// e.g. `Wed May 01 2024`
    pub fn date_label(&self) -> String {
        self.date.format("%a %b %d %Y").to_string()
    }

    pub fn time_label(&self) -> String {
        self.time.to_string()
    }
}

pub struct BookingFlow<A> {
    api: A,
    hours: WorkingHours,
    today: NaiveDate,
    state: BookingState,
    selected_date: Option<NaiveDate>,
    selected_time: Option<TimeSlot>,
    answers: Answers,
    booked_events: Vec<ProviderEvent>,
    loading: watch::Sender<bool>,
    message: Option<String>,
    confirmation: Option<Confirmation>,
}

impl<A: SchedulerApi> BookingFlow<A> {
    /// Starts in the date step, "today" taken from the clock in the booking zone.
    pub fn new(api: A, hours: WorkingHours) -> Self {
        let today = Utc::now().with_timezone(&hours.time_zone).date_naive();
        Self::with_today(api, hours, today)
    }

    pub fn with_today(api: A, hours: WorkingHours, today: NaiveDate) -> Self {
        Self {
            api,
            hours,
            today,
            state: BookingState::Date,
            selected_date: None,
            selected_time: None,
            answers: Answers::default(),
            booked_events: Vec::new(),
            loading: watch::channel(false).0,
            message: None,
            confirmation: None,
        }
    }

    pub fn state(&self) -> BookingState {
        self.state
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn selected_time(&self) -> Option<TimeSlot> {
        self.selected_time
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn booked_events(&self) -> &[ProviderEvent] {
        &self.booked_events
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Follows the loading flag while a request is in flight.
    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Blocking message for the visitor, if the last action produced one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn is_date_disabled(&self, date: NaiveDate) -> bool {
        is_date_disabled(date, self.today)
    }

    fn expect_state(&self, expected: BookingState, action: &'static str) -> Result<(), FlowError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(FlowError::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }

    /// Date -> Time. Loads the day's booked events on the way in.
    pub async fn select_date(&mut self, date: NaiveDate) -> Result<(), FlowError> {
        self.expect_state(BookingState::Date, "select a date")?;
        if self.is_date_disabled(date) {
            return Err(FlowError::DateDisabled(date));
        }

        self.selected_date = Some(date);
        self.state = BookingState::Time;
        self.message = None;
        self.load_booked_events(date).await;
        Ok(())
    }

    /// A failed fetch leaves the list empty so every slot stays selectable.
    async fn load_booked_events(&mut self, date: NaiveDate) {
        self.loading.send_replace(true);
        match self.api.fetch_events(date).await {
            Ok(events) => self.booked_events = events,
            Err(e) => {
                self.booked_events.clear();
                log_error(e, "Error fetching events");
            }
        }
        self.loading.send_replace(false);
    }

    /// The slots of the selected date not taken by a booked event.
    pub fn available_slots(&self) -> Vec<TimeSlot> {
        let slots = generate_time_slots(&self.hours);
        match self.selected_date {
            Some(date) => filter_available_slots(date, &slots, &self.booked_events, &self.hours),
            None => slots,
        }
    }

    /// Time -> Questions.
    pub fn select_time(&mut self, slot: TimeSlot) -> Result<(), FlowError> {
        self.expect_state(BookingState::Time, "select a time")?;
        if !self.available_slots().contains(&slot) {
            return Err(FlowError::SlotUnavailable(slot));
        }

        self.selected_time = Some(slot);
        self.state = BookingState::Questions;
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.answers.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.answers.email = email.into();
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.answers.reason = reason.into();
    }

    /// Time -> Date, forgetting the date.
    pub fn back_to_dates(&mut self) -> Result<(), FlowError> {
        self.expect_state(BookingState::Time, "go back to dates")?;
        self.selected_date = None;
        self.booked_events.clear();
        self.state = BookingState::Date;
        Ok(())
    }

    /// Questions -> Time, forgetting the time.
    pub fn back_to_times(&mut self) -> Result<(), FlowError> {
        self.expect_state(BookingState::Questions, "go back to times")?;
        self.selected_time = None;
        self.state = BookingState::Time;
        Ok(())
    }

    /// Questions -> Confirmation.
    ///
    /// Incomplete answers never reach the proxy. On a failed booking the
    /// flow stays where it is with [`SUBMIT_FAILED_MESSAGE`] set.
    pub async fn submit(&mut self) -> Result<(), FlowError> {
        self.expect_state(BookingState::Questions, "submit")?;

        let (date, time) = match (self.selected_date, self.selected_time) {
            (Some(date), Some(time)) if self.answers.is_complete() => (date, time),
            _ => {
                self.message = Some(MISSING_FIELDS_MESSAGE.to_string());
                return Err(FlowError::MissingFields);
            }
        };

        let Some(request) = self.event_request(date, time) else {
            error!("{} does not exist on {} in {}", time, date, self.hours.time_zone);
            self.message = Some(SUBMIT_FAILED_MESSAGE.to_string());
            return Err(FlowError::SubmitFailed);
        };

        if let Err(e) = self.api.create_event(request).await {
            log_error(e, "Error scheduling appointment");
            self.message = Some(SUBMIT_FAILED_MESSAGE.to_string());
            return Err(FlowError::SubmitFailed);
        }
        info!("Booked {} {} for {}", date, time, self.answers.email);

        self.load_booked_events(date).await;
        self.confirmation = Some(Confirmation { date, time });
        self.answers = Answers::default();
        self.selected_time = None;
        self.message = None;
        self.state = BookingState::Confirmation;
        Ok(())
    }

    /// Confirmation -> Date.
    pub fn dismiss_confirmation(&mut self) -> Result<(), FlowError> {
        self.expect_state(BookingState::Confirmation, "dismiss the confirmation")?;
        self.confirmation = None;
        self.selected_date = None;
        self.booked_events.clear();
        self.state = BookingState::Date;
        Ok(())
    }

    fn event_request(&self, date: NaiveDate, time: TimeSlot) -> Option<CreateEventRequest> {
        let start = time.start_on(date, self.hours.time_zone)?;
        let end = start + self.hours.slot_duration();
        Some(CreateEventRequest {
            summary: format!("Appointment with {}", self.answers.name),
            start_date_time: start.to_rfc3339_opts(SecondsFormat::Millis, true),
            end_date_time: end.to_rfc3339_opts(SecondsFormat::Millis, true),
            description: Some(format!(
                "Email: {}\nReason: {}",
                self.answers.email, self.answers.reason
            )),
        })
    }
}
