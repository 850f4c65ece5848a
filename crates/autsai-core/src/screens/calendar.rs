use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use autsai_db::{Gateway, GatewayError, ListQuery, Order};
use autsai_types::Collection;
use autsai_types::models::{Booking, Facility, Instructor};

use super::{DataSource, or_sample};
use crate::calendar::{
    CalendarFilter, CalendarGrid, Direction, ViewMode, build_grid, navigate, unique_instructors,
    unique_sports,
};
use crate::sample;
use crate::view_models::{CalendarEntry, join_bookings};

pub struct CalendarScreen<G> {
    gateway: Arc<G>,
    source: DataSource,
    entries: Vec<CalendarEntry>,
    pub current_date: NaiveDate,
    pub mode: ViewMode,
    pub filter: CalendarFilter,
}

#[derive(Debug, Serialize)]
pub struct CalendarView {
    pub source: DataSource,
    pub current_date: NaiveDate,
    pub mode: ViewMode,
    pub filter: CalendarFilter,
    pub sports: Vec<String>,
    pub instructors: Vec<String>,
    pub grid: CalendarGrid,
}

impl<G: Gateway> CalendarScreen<G> {
    pub fn new(gateway: Arc<G>, today: NaiveDate) -> Self {
        Self {
            gateway,
            source: DataSource::Empty,
            entries: Vec::new(),
            current_date: today,
            mode: ViewMode::default(),
            filter: CalendarFilter::default(),
        }
    }

    pub async fn load(&mut self) {
        let (entries, source) = or_sample(self.fetch().await, "calendar bookings", sample::calendar_entries);
        debug!("Calendar has {} entries ({:?})", entries.len(), source);
        self.entries = entries;
        self.source = source;
    }

    async fn fetch(&self) -> Result<Vec<CalendarEntry>, GatewayError> {
        let user = self.gateway.me().await?;
        let bookings: Vec<Booking> = self
            .gateway
            .list_as(
                Collection::Bookings,
                ListQuery::new()
                    .filter("user_id", user.id)
                    .order_by("start_time", Order::Asc),
            )
            .await?;
        let facilities: Vec<Facility> = self
            .gateway
            .list_as(Collection::Facilities, ListQuery::new().limit(100))
            .await?;
        let instructors: Vec<Instructor> = self
            .gateway
            .list_as(Collection::Instructors, ListQuery::new().limit(100))
            .await?;

        Ok(join_bookings(bookings, &[], &facilities, &instructors)
            .iter()
            .map(CalendarEntry::from_details)
            .collect())
    }

    pub fn entries(&self) -> &[CalendarEntry] {
        &self.entries
    }

    pub fn navigate(&mut self, direction: Direction) {
        self.current_date = navigate(self.current_date, self.mode, direction);
    }

    pub fn view(&self, today: NaiveDate) -> CalendarView {
        let visible = self.filter.apply(&self.entries);
        CalendarView {
            source: self.source,
            current_date: self.current_date,
            mode: self.mode,
            filter: self.filter.clone(),
            sports: unique_sports(&self.entries),
            instructors: unique_instructors(&self.entries),
            grid: build_grid(self.current_date, self.mode, visible, today),
        }
    }
}
