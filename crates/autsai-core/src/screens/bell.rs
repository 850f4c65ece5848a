use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use autsai_db::{Gateway, GatewayError, ListQuery, Order};
use autsai_types::Collection;
use autsai_types::models::Notification;

use super::notifications::mark_read;
use super::{DataSource, or_sample};
use crate::ScreenError;
use crate::sample;
use crate::view_models::{NotificationView, unread_count};

const PREVIEW: u32 = 10;

/// Header bell: unread badge plus a preview of the latest notifications.
pub struct NotificationBell<G> {
    gateway: Arc<G>,
    source: DataSource,
    notifications: Vec<Notification>,
    unread: usize,
}

#[derive(Debug, Serialize)]
pub struct BellView {
    pub source: DataSource,
    pub unread_count: usize,
    pub notifications: Vec<NotificationView>,
}

impl<G: Gateway> NotificationBell<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            source: DataSource::Empty,
            notifications: Vec::new(),
            unread: 0,
        }
    }

    pub async fn load(&mut self) {
        let fetched = Self::fetch(self.gateway.as_ref()).await;
        self.refresh(fetched);
    }

    fn refresh(&mut self, fetched: Result<Vec<Notification>, GatewayError>) {
        let (notifications, source) = or_sample(fetched, "bell notifications", sample::bell_notifications);
        self.unread = unread_count(&notifications);
        self.notifications = notifications;
        self.source = source;
    }

    async fn fetch(gateway: &G) -> Result<Vec<Notification>, GatewayError> {
        let user = gateway.me().await?;
        gateway
            .list_as(
                Collection::Notifications,
                ListQuery::new()
                    .filter("user_id", user.id)
                    .order_by("created_at", Order::Desc)
                    .limit(PREVIEW),
            )
            .await
    }

    pub fn unread_count(&self) -> usize {
        self.unread
    }

    /// Decrements the badge without re-counting, floored at zero. Marking an
    /// already-read notification leaves the badge alone.
    pub async fn mark_as_read(&mut self, id: &str) -> Result<(), ScreenError> {
        mark_read(self.gateway.as_ref(), id).await?;

        if let Some(n) = self.notifications.iter_mut().find(|n| n.id == id) {
            if !n.is_read {
                n.is_read = true;
                self.unread = self.unread.saturating_sub(1);
            }
        }
        Ok(())
    }

    pub fn view(&self, now: NaiveDateTime) -> BellView {
        BellView {
            source: self.source,
            unread_count: self.unread,
            notifications: self
                .notifications
                .iter()
                .map(|n| NotificationView::new(n).with_age(now))
                .collect(),
        }
    }
}

/// Background task reloading a bell on a fixed period, first tick
/// immediately. The bell is only locked to swap in each result. Dropping the
/// poller stops it.
pub struct BellPoller<G> {
    bell: Arc<RwLock<NotificationBell<G>>>,
    task: JoinHandle<()>,
}

impl<G: Gateway + 'static> BellPoller<G> {
    pub fn spawn(bell: NotificationBell<G>, period: Duration) -> Self {
        let gateway = bell.gateway.clone();
        let bell = Arc::new(RwLock::new(bell));
        let polled = bell.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let fetched = NotificationBell::fetch(gateway.as_ref()).await;
                polled.write().await.refresh(fetched);
                debug!("Bell refreshed");
            }
        });

        Self { bell, task }
    }

    pub fn bell(&self) -> Arc<RwLock<NotificationBell<G>>> {
        self.bell.clone()
    }
}

impl<G> Drop for BellPoller<G> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
