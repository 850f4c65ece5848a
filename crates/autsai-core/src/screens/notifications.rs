use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use autsai_db::{Gateway, GatewayError, ListQuery, Order};
use autsai_types::Collection;
use autsai_types::models::{Notification, NotificationSettings};

use super::{DataSource, or_sample};
use crate::ScreenError;
use crate::sample;
use crate::view_models::{NotificationView, unread_count};

const PAGE: u32 = 50;

pub struct NotificationCenter<G> {
    gateway: Arc<G>,
    loading: bool,
    source: DataSource,
    notifications: Vec<Notification>,
    settings: Option<NotificationSettings>,
    unread: usize,
}

#[derive(Debug, Serialize)]
pub struct NotificationCenterView {
    pub loading: bool,
    pub source: DataSource,
    pub unread_count: usize,
    pub notifications: Vec<NotificationView>,
    pub settings: Option<NotificationSettings>,
}

impl<G: Gateway> NotificationCenter<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            loading: true,
            source: DataSource::Empty,
            notifications: Vec::new(),
            settings: None,
            unread: 0,
        }
    }

    pub async fn load(&mut self) {
        self.loading = true;
        let (notifications, settings) = tokio::join!(self.fetch_notifications(), self.fetch_settings());

        let (notifications, source) = or_sample(notifications, "notifications", sample::notifications);
        let (settings, _) = or_sample(settings, "notification settings", || None);

        self.unread = unread_count(&notifications);
        self.notifications = notifications;
        self.settings = Some(settings.unwrap_or_else(sample::notification_settings));
        self.source = source;
        self.loading = false;
    }

    async fn fetch_notifications(&self) -> Result<Vec<Notification>, GatewayError> {
        let user = self.gateway.me().await?;
        self.gateway
            .list_as(
                Collection::Notifications,
                ListQuery::new()
                    .filter("user_id", user.id)
                    .order_by("created_at", Order::Desc)
                    .limit(PAGE),
            )
            .await
    }

    /// The partner's settings record, `None` when they never saved one.
    async fn fetch_settings(&self) -> Result<Option<NotificationSettings>, GatewayError> {
        let user = self.gateway.me().await?;
        let settings: Vec<NotificationSettings> = self
            .gateway
            .list_as(
                Collection::NotificationSettings,
                ListQuery::new().filter("user_id", user.id).limit(1),
            )
            .await?;
        Ok(settings.into_iter().next())
    }

    pub fn unread_count(&self) -> usize {
        self.unread
    }

    pub fn settings(&self) -> Option<&NotificationSettings> {
        self.settings.as_ref()
    }

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

    /// Mark every unread notification, one write at a time. Local state only
    /// changes when all writes went through.
    pub async fn mark_all_as_read(&mut self) -> Result<(), ScreenError> {
        let unread: Vec<String> = self
            .notifications
            .iter()
            .filter(|n| !n.is_read)
            .map(|n| n.id.clone())
            .collect();

        for id in &unread {
            mark_read(self.gateway.as_ref(), id).await?;
        }

        for n in &mut self.notifications {
            n.is_read = true;
        }
        self.unread = 0;
        debug!("Marked {} notifications read", unread.len());
        Ok(())
    }

    pub async fn update_setting(&mut self, key: &str, enabled: bool) -> Result<(), ScreenError> {
        let Some(settings) = self.settings.as_ref() else {
            return Err(ScreenError::NotEditing("notification settings not loaded"));
        };
        if !NotificationSettings::KEYS.contains(&key) {
            return Err(ScreenError::UnknownSetting(key.to_string()));
        }

        let id = settings.id.clone();
        let mut patch = Map::new();
        patch.insert(key.to_string(), json!(u8::from(enabled)));
        if let Err(e) = self
            .gateway
            .update(Collection::NotificationSettings, &id, Value::Object(patch))
            .await
        {
            warn!("Failed to update setting {}: {}", key, e);
            return Err(e.into());
        }

        if let Some(toggle) = self.settings.as_mut().and_then(|s| s.toggle_mut(key)) {
            *toggle = enabled;
        }
        Ok(())
    }

    pub fn view(&self) -> NotificationCenterView {
        NotificationCenterView {
            loading: self.loading,
            source: self.source,
            unread_count: self.unread,
            notifications: self.notifications.iter().map(NotificationView::new).collect(),
            settings: self.settings.clone(),
        }
    }
}

/// Flag one notification as read on the gateway.
pub(crate) async fn mark_read<G: Gateway>(gateway: &G, id: &str) -> Result<(), GatewayError> {
    gateway
        .update(Collection::Notifications, id, json!({ "is_read": 1 }))
        .await
        .map(|_| ())
        .inspect_err(|e| warn!("Failed to mark notification {} read: {}", id, e))
}
