//! Screen controllers. Each owns its local state, reads through a
//! [`Gateway`](autsai_db::Gateway) on `load`, and derives a serializable view.
//!
//! Loads never fail: a gateway error is logged and the screen switches to
//! its own sample dataset. Mutations return the write's result and only
//! touch local state once the write went through.

pub mod bell;
pub mod bookings;
pub mod calendar;
pub mod dashboard;
pub mod facilities;
pub mod notifications;
pub mod profile;

use chrono::{Local, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::warn;

use autsai_db::GatewayError;

pub use bell::{BellPoller, NotificationBell};
pub use bookings::BookingManagement;
pub use calendar::CalendarScreen;
pub use dashboard::Dashboard;
pub use facilities::FacilityEditor;
pub use notifications::NotificationCenter;
pub use profile::Profile;

/// Where the records a view shows came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Nothing loaded yet.
    #[default]
    Empty,
    Remote,
    Sample,
}

/// Take a load result, or log the failure and use `sample` instead.
pub(crate) fn or_sample<T>(
    result: Result<T, GatewayError>,
    what: &str,
    sample: impl FnOnce() -> T,
) -> (T, DataSource) {
    match result {
        Ok(value) => (value, DataSource::Remote),
        Err(e) => {
            warn!("Failed to load {}, using sample data: {}", what, e);
            (sample(), DataSource::Sample)
        }
    }
}

/// Wall clock as the naive local time bookings are stored in.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Suffix for generated record ids (`fac_<millis>` and friends).
pub(crate) fn millis_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Utc::now().timestamp_millis())
}
