//! One-shot user notifications.
//!
//! The `Notifier` lives in `AppState` and is injected explicitly — no
//! module-level singleton. Notifications accumulate until the UI drains
//! them; draining empties the queue.

use std::sync::{Arc, Mutex};

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct Notifier {
    inner: Arc<Mutex<Vec<Notification>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Success, message.into());
    }

    pub fn failure(&self, message: impl Into<String>) {
        self.push(NotificationLevel::Error, message.into());
    }

    /// Removes and returns all pending notifications, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    fn push(&self, level: NotificationLevel, message: String) {
        self.lock().push(Notification {
            level,
            message,
            created_at: Utc::now(),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// GET /api/v1/notifications
pub async fn handle_drain_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifier.drain())
}
