use axum::{Extension, Json, extract::{Query, State}};
use chrono::NaiveDate;
use serde::Deserialize;

use autsai_core::calendar::{Direction, ViewMode};
use autsai_core::screens::calendar::CalendarView;
use autsai_core::shell::Tab;
use autsai_types::api::Claims;

use crate::auth::AppState;
use crate::today;

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub mode: Option<ViewMode>,
    pub date: Option<NaiveDate>,
    pub sport: Option<String>,
    pub instructor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    pub mode: Option<ViewMode>,
    pub date: Option<NaiveDate>,
    pub direction: Direction,
}

/// GET /calendar: reload the partner's bookings and lay them out for the
/// requested window.
pub async fn get_calendar(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<CalendarQuery>,
) -> Json<CalendarView> {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.mount(Tab::Calendar, today()).await;

    let calendar = &mut shell.calendar;
    if let Some(mode) = query.mode {
        calendar.mode = mode;
    }
    if let Some(date) = query.date {
        calendar.current_date = date;
    }
    if let Some(sport) = query.sport {
        calendar.filter.sport = sport;
    }
    if let Some(instructor) = query.instructor {
        calendar.filter.instructor = instructor;
    }
    Json(calendar.view(today()))
}

/// GET /calendar/navigate: step one day, week or month from the given (or
/// current) date.
pub async fn navigate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<NavigateQuery>,
) -> Json<CalendarView> {
    let session = state.sessions.open(&claims).await;
    let mut shell = session.shell.write().await;
    shell.ensure_mounted(Tab::Calendar, today()).await;

    let calendar = &mut shell.calendar;
    if let Some(mode) = query.mode {
        calendar.mode = mode;
    }
    if let Some(date) = query.date {
        calendar.current_date = date;
    }
    calendar.navigate(query.direction);
    Json(calendar.view(today()))
}
