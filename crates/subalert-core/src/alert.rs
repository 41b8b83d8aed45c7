//! Alert events and rendered alert cards.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::snapshot::SubjectKey;

/// A change worth announcing. Consumed exactly once by the dispatch pipeline.
#[derive(Debug, Clone)]
pub struct AlertEvent {
  pub id:         Uuid,
  pub subject:    SubjectKey,
  pub title:      String,
  pub body:       String,
  pub created_at: DateTime<Utc>,
  /// Snapshot value to commit once the alert is delivered. `None` when the
  /// detector already committed it.
  pub pending:    Option<Value>,
}

impl AlertEvent {
  pub fn new(
    subject: SubjectKey,
    title: impl Into<String>,
    body: impl Into<String>,
    pending: Option<Value>,
  ) -> Self {
    Self {
      id: Uuid::new_v4(),
      subject,
      title: title.into(),
      body: body.into(),
      created_at: Utc::now(),
      pending,
    }
  }
}

/// A rendered image accompanying an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertCard {
  pub id:     Uuid,
  pub path:   PathBuf,
  pub width:  u32,
  pub height: u32,
}

/// Turns an alert's title and body into an [`AlertCard`].
pub trait CardRenderer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn render(&self, title: &str, body: &str) -> Result<AlertCard, Self::Error>;
}
