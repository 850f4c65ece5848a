use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use autsai_db::{Gateway, GatewayError, ListQuery, Order};
use autsai_types::Collection;
use autsai_types::models::{Booking, BookingParticipant, Facility, Instructor, Notification};

use super::{DataSource, or_sample};
use crate::sample;
use crate::view_models::{BookingDetails, NotificationView, join_bookings};

const RECENT: usize = 3;

/// Landing screen: headline figures for today plus the latest bookings and
/// notifications.
pub struct Dashboard<G> {
    gateway: Arc<G>,
    today: NaiveDate,
    source: DataSource,
    bookings: Vec<BookingDetails>,
    facilities: Vec<Facility>,
    instructors: Vec<Instructor>,
    notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub todays_bookings: usize,
    pub active_instructors: usize,
    pub facilities: usize,
    pub revenue_today: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub source: DataSource,
    pub today: NaiveDate,
    pub stats: DashboardStats,
    pub recent_bookings: Vec<BookingDetails>,
    pub recent_notifications: Vec<NotificationView>,
}

struct Loaded {
    bookings: Vec<BookingDetails>,
    facilities: Vec<Facility>,
    instructors: Vec<Instructor>,
    notifications: Vec<Notification>,
}

impl<G: Gateway> Dashboard<G> {
    pub fn new(gateway: Arc<G>, today: NaiveDate) -> Self {
        Self {
            gateway,
            today,
            source: DataSource::Empty,
            bookings: Vec::new(),
            facilities: Vec::new(),
            instructors: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub async fn load(&mut self) {
        let today = self.today;
        let (loaded, source) = or_sample(self.fetch().await, "dashboard", || Loaded {
            bookings: sample::dashboard_bookings(today),
            facilities: sample::booking_facilities(),
            instructors: sample::instructors(),
            notifications: sample::notifications(),
        });

        self.bookings = loaded.bookings;
        self.facilities = loaded.facilities;
        self.instructors = loaded.instructors;
        self.notifications = loaded.notifications;
        self.source = source;
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
                ListQuery::new().filter("user_id", user.id.clone()),
            )
            .await?;
        let instructors: Vec<Instructor> = self
            .gateway
            .list_as(Collection::Instructors, ListQuery::new().limit(100))
            .await?;
        let notifications: Vec<Notification> = self
            .gateway
            .list_as(
                Collection::Notifications,
                ListQuery::new()
                    .filter("user_id", user.id)
                    .order_by("created_at", Order::Desc)
                    .limit(RECENT as u32),
            )
            .await?;

        Ok(Loaded {
            bookings: join_bookings(bookings, &participants, &facilities, &instructors),
            facilities,
            instructors,
            notifications,
        })
    }

    pub fn stats(&self) -> DashboardStats {
        let todays: Vec<&BookingDetails> = self
            .bookings
            .iter()
            .filter(|b| b.booking.start_time.date() == self.today)
            .collect();

        DashboardStats {
            todays_bookings: todays.len(),
            active_instructors: self.instructors.len(),
            facilities: self.facilities.len(),
            revenue_today: todays.iter().map(|b| b.booking.price).sum(),
        }
    }

    pub fn view(&self) -> DashboardView {
        DashboardView {
            source: self.source,
            today: self.today,
            stats: self.stats(),
            recent_bookings: self.bookings.iter().take(RECENT).cloned().collect(),
            recent_notifications: self
                .notifications
                .iter()
                .take(RECENT)
                .map(NotificationView::new)
                .collect(),
        }
    }
}
