//! Notification sink for production report submissions
//!
//! Every submission produces exactly one notification, whether it was
//! stored or rejected. Delivery to people is someone else's job; this only
//! records the event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::AppResult;

/// Notification kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ReportSubmitted,
    ReportRejected,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ReportSubmitted => "report_submitted",
            NotificationKind::ReportRejected => "report_rejected",
        }
    }
}

/// Notification to record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Key of the stored row, when there is one
    pub entity_key: Option<String>,
}

impl NewNotification {
    pub fn submitted(product_type: &str, entity_key: Option<String>) -> Self {
        Self {
            kind: NotificationKind::ReportSubmitted,
            title: "Production report submitted".to_string(),
            message: format!("A production report for {} was recorded", product_type),
            entity_key,
        }
    }

    pub fn rejected(reason: &str) -> Self {
        Self {
            kind: NotificationKind::ReportRejected,
            title: "Production report failed".to_string(),
            message: format!("A production report could not be recorded: {}", reason),
            entity_key: None,
        }
    }
}

/// Recorded notification
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub entity_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Downstream notification primitive
#[axum::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: NewNotification) -> AppResult<Notification>;
}

/// Appends to the `notifications` table
#[derive(Clone)]
pub struct PgNotificationSink {
    db: PgPool,
}

impl PgNotificationSink {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[axum::async_trait]
impl NotificationSink for PgNotificationSink {
    async fn notify(&self, notification: NewNotification) -> AppResult<Notification> {
        let stored = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, kind, title, message, entity_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, kind, title, message, entity_key, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.entity_key)
        .fetch_one(&self.db)
        .await?;

        Ok(stored)
    }
}

/// Keeps notifications in process
#[derive(Default)]
pub struct MemoryNotificationSink {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }
}

#[axum::async_trait]
impl NotificationSink for MemoryNotificationSink {
    async fn notify(&self, notification: NewNotification) -> AppResult<Notification> {
        let stored = Notification {
            id: Uuid::new_v4(),
            kind: notification.kind.as_str().to_string(),
            title: notification.title,
            message: notification.message,
            entity_key: notification.entity_key,
            created_at: Utc::now(),
        };
        self.sent.lock().await.push(stored.clone());
        Ok(stored)
    }
}
