use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use autsai_db::{Gateway, GatewayError, ListQuery, Order};
use autsai_types::Collection;
use autsai_types::codec::timestamp;
use autsai_types::models::{Booking, BookingParticipant, BookingStatus, Facility, Instructor};

use super::{DataSource, local_now, or_sample};
use crate::ScreenError;
use crate::filter::{BookingFilters, BookingStats, filter_bookings};
use crate::sample;
use crate::view_models::{BookingDetails, join_bookings};

pub struct BookingManagement<G> {
    gateway: Arc<G>,
    loading: bool,
    source: DataSource,
    bookings: Vec<BookingDetails>,
    facilities: Vec<Facility>,
    instructors: Vec<Instructor>,
    pub filters: BookingFilters,
}

#[derive(Debug, Serialize)]
pub struct BookingsView {
    pub loading: bool,
    pub source: DataSource,
    pub filters: BookingFilters,
    pub stats: BookingStats,
    pub bookings: Vec<BookingDetails>,
    pub facilities: Vec<Facility>,
    pub instructors: Vec<Instructor>,
    pub statuses: [BookingStatus; 6],
}

type Loaded = (Vec<BookingDetails>, Vec<Facility>, Vec<Instructor>);

impl<G: Gateway> BookingManagement<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            loading: true,
            source: DataSource::Empty,
            bookings: Vec::new(),
            facilities: Vec::new(),
            instructors: Vec::new(),
            filters: BookingFilters::default(),
        }
    }

    pub async fn load(&mut self) {
        self.loading = true;
        let ((bookings, facilities, instructors), source) =
            or_sample(self.fetch().await, "bookings", || {
                (sample::bookings(), sample::booking_facilities(), sample::instructors())
            });

        info!("Loaded {} bookings ({:?})", bookings.len(), source);
        self.bookings = bookings;
        self.facilities = facilities;
        self.instructors = instructors;
        self.source = source;
        self.loading = false;
    }

    async fn fetch(&self) -> Result<Loaded, GatewayError> {
        let user = self.gateway.me().await?;
        let bookings: Vec<Booking> = self
            .gateway
            .list_as(
                Collection::Bookings,
                ListQuery::new()
                    .filter("user_id", user.id.clone())
                    .order_by("start_time", Order::Desc)
                    .limit(100),
            )
            .await?;
        let participants: Vec<BookingParticipant> = self
            .gateway
            .list_as(Collection::BookingParticipants, ListQuery::new().limit(1000))
            .await?;
        let facilities: Vec<Facility> = self
            .gateway
            .list_as(
                Collection::Facilities,
                ListQuery::new().filter("user_id", user.id).limit(100),
            )
            .await?;
        let instructors: Vec<Instructor> = self
            .gateway
            .list_as(Collection::Instructors, ListQuery::new().limit(100))
            .await?;

        let joined = join_bookings(bookings, &participants, &facilities, &instructors);
        Ok((joined, facilities, instructors))
    }

    pub fn bookings(&self) -> &[BookingDetails] {
        &self.bookings
    }

    pub fn get(&self, id: &str) -> Option<&BookingDetails> {
        self.bookings.iter().find(|b| b.booking.id == id)
    }

    pub fn filtered(&self, now: NaiveDateTime) -> Vec<&BookingDetails> {
        filter_bookings(&self.bookings, &self.filters, now)
    }

    pub fn view(&self, now: NaiveDateTime) -> BookingsView {
        let filtered = self.filtered(now);
        BookingsView {
            loading: self.loading,
            source: self.source,
            filters: self.filters.clone(),
            stats: BookingStats::of(filtered.iter().copied()),
            bookings: filtered.into_iter().cloned().collect(),
            facilities: self.facilities.clone(),
            instructors: self.instructors.clone(),
            statuses: BookingStatus::ALL,
        }
    }

    pub async fn update_status(&mut self, id: &str, status: BookingStatus) -> Result<(), ScreenError> {
        self.write(id, json!({ "status": status }), |b| b.status = status)
            .await
    }

    pub async fn update_internal_notes(&mut self, id: &str, notes: &str) -> Result<(), ScreenError> {
        self.write(id, json!({ "internal_notes": notes }), |b| {
            b.internal_notes = Some(notes.to_string())
        })
        .await
    }

    /// Assign an instructor and resolve their display name from the loaded
    /// instructors.
    pub async fn assign_instructor(&mut self, id: &str, instructor_id: &str) -> Result<(), ScreenError> {
        self.write(id, json!({ "instructor_id": instructor_id }), |b| {
            b.instructor_id = Some(instructor_id.to_string())
        })
        .await?;

        let name = self
            .instructors
            .iter()
            .find(|i| i.id == instructor_id)
            .map(|i| i.name.clone());
        if let Some(details) = self.bookings.iter_mut().find(|b| b.booking.id == id) {
            details.instructor_name = name;
        }
        Ok(())
    }

    /// Write `patch` plus a fresh `updated_at`, then mirror it locally. Only
    /// bookings on screen can be written.
    async fn write(
        &mut self,
        id: &str,
        mut patch: Value,
        apply: impl FnOnce(&mut Booking),
    ) -> Result<(), ScreenError> {
        let Some(index) = self.bookings.iter().position(|b| b.booking.id == id) else {
            return Err(ScreenError::NotFound(format!("booking {}", id)));
        };
        let now = local_now();
        patch["updated_at"] = Value::String(timestamp::format(&now));

        if let Err(e) = self.gateway.update(Collection::Bookings, id, patch).await {
            warn!("Failed to update booking {}: {}", id, e);
            return Err(e.into());
        }

        let booking = &mut self.bookings[index].booking;
        apply(booking);
        booking.updated_at = now;
        Ok(())
    }
}
