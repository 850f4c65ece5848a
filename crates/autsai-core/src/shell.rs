//! Top-level navigation: which tab is showing, whether the partner is signed
//! in, and the screen controllers behind each tab.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use autsai_db::{AuthState, Gateway};
use autsai_types::api::User;

use crate::screens::{
    BookingManagement, CalendarScreen, Dashboard, FacilityEditor, NotificationCenter, Profile,
};

pub const TITLE: &str = "Autsai Partners";
pub const TAGLINE: &str =
    "Comprehensive facility management platform for sports clubs, courts, fields, and gyms.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Dashboard,
    Calendar,
    Facilities,
    Instructors,
    Bookings,
    Notifications,
    Profile,
}

/// Sidebar order.
pub const NAVIGATION: [(Tab, &str); 7] = [
    (Tab::Dashboard, "Dashboard"),
    (Tab::Calendar, "Calendar"),
    (Tab::Facilities, "Facilities"),
    (Tab::Instructors, "Instructors"),
    (Tab::Bookings, "Bookings"),
    (Tab::Notifications, "Notifications"),
    (Tab::Profile, "Profile"),
];

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Calendar => "calendar",
            Self::Facilities => "facilities",
            Self::Instructors => "instructors",
            Self::Bookings => "bookings",
            Self::Notifications => "notifications",
            Self::Profile => "profile",
        }
    }

    /// Unknown tab ids land on the dashboard.
    pub fn resolve(id: &str) -> Tab {
        NAVIGATION
            .iter()
            .map(|(tab, _)| *tab)
            .find(|tab| tab.as_str() == id)
            .unwrap_or_default()
    }
}

/// What the shell renders before any tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellGate {
    Loading,
    SignIn,
    Ready,
}

impl ShellGate {
    pub fn from_state(state: &AuthState) -> Self {
        if state.is_loading {
            Self::Loading
        } else if state.user.is_none() {
            Self::SignIn
        } else {
            Self::Ready
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NavItem {
    pub tab: Tab,
    pub name: &'static str,
    pub active: bool,
}

/// Static content for tabs without a controller.
#[derive(Debug, Clone, Serialize)]
pub struct Placeholder {
    pub title: &'static str,
    pub message: &'static str,
}

pub const INSTRUCTORS_PLACEHOLDER: Placeholder = Placeholder {
    title: "Instructors",
    message: "Instructor management coming soon...",
};

#[derive(Debug, Serialize)]
pub struct ShellView {
    pub title: &'static str,
    pub gate: ShellGate,
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<&'static str>,
    pub active_tab: Tab,
    pub navigation: Vec<NavItem>,
    pub placeholder: Option<Placeholder>,
}

/// One partner's navigation state. Switching tabs mounts a fresh controller
/// for the target tab and loads it.
pub struct Shell<G> {
    gateway: Arc<G>,
    auth: watch::Receiver<AuthState>,
    active: Tab,
    mounted: HashSet<Tab>,
    pub dashboard: Dashboard<G>,
    pub calendar: CalendarScreen<G>,
    pub facilities: FacilityEditor<G>,
    pub bookings: BookingManagement<G>,
    pub notifications: NotificationCenter<G>,
    pub profile: Profile<G>,
}

impl<G: Gateway> Shell<G> {
    pub fn new(gateway: Arc<G>, today: NaiveDate) -> Self {
        Self {
            auth: gateway.auth_state(),
            active: Tab::default(),
            mounted: HashSet::new(),
            dashboard: Dashboard::new(gateway.clone(), today),
            calendar: CalendarScreen::new(gateway.clone(), today),
            facilities: FacilityEditor::new(gateway.clone()),
            bookings: BookingManagement::new(gateway.clone()),
            notifications: NotificationCenter::new(gateway.clone()),
            profile: Profile::new(gateway.clone()),
            gateway,
        }
    }

    pub fn gate(&self) -> ShellGate {
        ShellGate::from_state(&self.auth.borrow())
    }

    pub fn active_tab(&self) -> Tab {
        self.active
    }

    pub async fn switch_tab(&mut self, tab: Tab, today: NaiveDate) {
        self.active = tab;
        self.mount(tab, today).await;
    }

    /// Mount the tab's controller unless it already holds loaded state.
    pub async fn ensure_mounted(&mut self, tab: Tab, today: NaiveDate) {
        if !self.mounted.contains(&tab) {
            self.mount(tab, today).await;
        }
    }

    /// Replace the tab's controller with a fresh one and load it.
    pub async fn mount(&mut self, tab: Tab, today: NaiveDate) {
        debug!("Mounting {} tab", tab.as_str());
        self.mounted.insert(tab);
        let gateway = self.gateway.clone();
        match tab {
            Tab::Dashboard => {
                self.dashboard = Dashboard::new(gateway, today);
                self.dashboard.load().await;
            }
            Tab::Calendar => {
                self.calendar = CalendarScreen::new(gateway, today);
                self.calendar.load().await;
            }
            Tab::Facilities => {
                self.facilities = FacilityEditor::new(gateway);
                self.facilities.load().await;
            }
            Tab::Bookings => {
                self.bookings = BookingManagement::new(gateway);
                self.bookings.load().await;
            }
            Tab::Notifications => {
                self.notifications = NotificationCenter::new(gateway);
                self.notifications.load().await;
            }
            Tab::Profile => {
                self.profile = Profile::new(gateway);
                self.profile.load().await;
            }
            Tab::Instructors => {}
        }
    }

    pub fn view(&self) -> ShellView {
        let state = self.auth.borrow().clone();
        let gate = ShellGate::from_state(&state);
        ShellView {
            title: TITLE,
            gate,
            user: state.user,
            tagline: (gate == ShellGate::SignIn).then_some(TAGLINE),
            active_tab: self.active,
            navigation: NAVIGATION
                .iter()
                .map(|&(tab, name)| NavItem {
                    tab,
                    name,
                    active: tab == self.active,
                })
                .collect(),
            placeholder: (self.active == Tab::Instructors).then_some(INSTRUCTORS_PLACEHOLDER),
        }
    }
}
