use chrono::{NaiveDate, Weekday};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use tutormatch_core::{
    MatchError, MatchResult,
    availability::offers_window,
    models::{
        identity::{Caller, Role},
        matching::{
            ListTutorsQuery, ListTutorsResponse, MyRequest, Pagination, SetAvailabilityRequest,
            TutorAvailabilityResponse, TutorListing,
        },
        time_slot::{TimeSlot, day_of_week, has_internal_overlap},
        tutor::Tutor,
    },
};
use tutormatch_db::TutorFilter;

use crate::{MatchEngine, config::DEFAULT_PAGE_LIMIT};

/// Availability constraint of a listing query, resolved once before filtering.
enum WindowFilter {
    Any,
    Day(Weekday),
    Window(TimeSlot),
    DayAndWindow(Weekday, TimeSlot),
}

impl WindowFilter {
    fn from_query(query: &ListTutorsQuery) -> MatchResult<Self> {
        let window = match (query.start, query.end) {
            (Some(start), Some(end)) => Some(TimeSlot::new(start, end)?),
            (None, None) => None,
            _ => {
                return Err(MatchError::InvalidInput(
                    "start and end must be given together".to_string(),
                ));
            }
        };
        Ok(match (query.day_of_week, window) {
            (None, None) => WindowFilter::Any,
            (Some(day), None) => WindowFilter::Day(day),
            (None, Some(window)) => WindowFilter::Window(window),
            (Some(day), Some(window)) => WindowFilter::DayAndWindow(day, window),
        })
    }

    fn matches(&self, tutor: &Tutor) -> bool {
        match self {
            WindowFilter::Any => true,
            WindowFilter::Day(day) => tutor.availability.dates().any(|date| day_of_week(date) == *day),
            WindowFilter::Window(window) => tutor
                .availability
                .entries()
                .any(|(_, slot)| slot.contains(window)),
            WindowFilter::DayAndWindow(day, window) => offers_window(&tutor.availability, *day, window),
        }
    }
}

impl MatchEngine {
    /// Public tutor directory. Pages start at 1.
    #[instrument(skip(self))]
    pub async fn list_tutors(&self, query: ListTutorsQuery) -> MatchResult<ListTutorsResponse> {
        let page = query.page.unwrap_or(1);
        if page == 0 {
            return Err(MatchError::InvalidInput("page starts at 1".to_string()));
        }
        let limit = match query.limit {
            Some(0) => return Err(MatchError::InvalidInput("limit must be positive".to_string())),
            Some(limit) => limit.min(self.config.listing_max_limit),
            None => DEFAULT_PAGE_LIMIT.min(self.config.listing_max_limit),
        };
        if let Some(min_rating) = query.min_rating {
            if !(0.0..=5.0).contains(&min_rating) {
                return Err(MatchError::InvalidInput(format!(
                    "min_rating {min_rating} must be between 0 and 5"
                )));
            }
        }
        let window_filter = WindowFilter::from_query(&query)?;

        let subject = query
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|subject| !subject.is_empty())
            .map(str::to_string);
        let filter = TutorFilter {
            subject,
            min_rating: query.min_rating,
        };
        let tutors: Vec<Tutor> = self
            .store
            .find_tutors(&filter)
            .await?
            .into_iter()
            .filter(|tutor| window_filter.matches(tutor))
            .collect();

        let total = tutors.len() as u64;
        let total_pages = u32::try_from(total.div_ceil(u64::from(limit))).unwrap_or(u32::MAX);
        let skip = (page as usize - 1).saturating_mul(limit as usize);
        let listings = tutors
            .iter()
            .skip(skip)
            .take(limit as usize)
            .map(TutorListing::from)
            .collect();
        debug!(total, page, limit, "listed tutors");

        Ok(ListTutorsResponse {
            tutors: listings,
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages,
            },
        })
    }

    /// The caller's own registrations, newest first.
    #[instrument(skip(self), fields(student_id = %caller.id))]
    pub async fn my_requests(&self, caller: &Caller) -> MatchResult<Vec<MyRequest>> {
        caller.require(Role::Student)?;
        let registrations = self.store.registrations_for_student(caller.id).await?;
        Ok(registrations.into_iter().map(MyRequest::from).collect())
    }

    /// Replaces the tutor's published windows for one date. An empty list clears the date.
    #[instrument(skip(self, request), fields(caller_id = %caller.id))]
    pub async fn set_tutor_availability(
        &self,
        caller: &Caller,
        tutor_id: Uuid,
        date: NaiveDate,
        request: SetAvailabilityRequest,
    ) -> MatchResult<TutorAvailabilityResponse> {
        if caller.role == Role::Student {
            return Err(MatchError::Forbidden(format!(
                "student {} cannot edit the calendar of tutor {tutor_id}",
                caller.id
            )));
        }
        caller.require_self_or_coordinator(tutor_id)?;

        let mut slots = Vec::with_capacity(request.slots.len());
        for input in request.slots {
            let slot = TimeSlot::new(input.start, input.end)?;
            self.config.calendar.validate(&slot)?;
            slots.push(slot);
        }
        if has_internal_overlap(&slots) {
            return Err(MatchError::InvalidInput(format!(
                "availability windows on {date} overlap each other"
            )));
        }

        let count = slots.len();
        let tutor = self.store.replace_tutor_availability(tutor_id, date, slots).await?;
        info!(%tutor_id, %date, count, "tutor availability replaced");

        Ok(TutorAvailabilityResponse {
            tutor_id: tutor.id,
            availability: tutor.availability,
            booked_slots: tutor.booked_slots,
        })
    }

    pub async fn get_tutor_availability(&self, tutor_id: Uuid) -> MatchResult<TutorAvailabilityResponse> {
        let tutor = self
            .store
            .get_tutor(tutor_id)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("tutor {tutor_id}")))?;
        Ok(TutorAvailabilityResponse {
            tutor_id: tutor.id,
            availability: tutor.availability,
            booked_slots: tutor.booked_slots,
        })
    }
}
