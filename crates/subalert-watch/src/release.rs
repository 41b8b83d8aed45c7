//! Watches a project's latest release.

use std::sync::Arc;

use serde_json::Value;
use subalert_core::{
  alert::AlertEvent,
  snapshot::{SnapshotStore, SubjectKey},
};

use crate::{ChangeDetector, Comparison, Detection, Error, Result};

/// Field releases are compared on.
pub const TAG_FIELD: &str = "tag_name";

pub struct ReleaseWatcher<S> {
  detector: ChangeDetector<S>,
}

impl<S: SnapshotStore> ReleaseWatcher<S> {
  pub fn new(store: Arc<S>) -> Self { Self::with_detector(ChangeDetector::new(store)) }

  pub fn with_detector(detector: ChangeDetector<S>) -> Self { Self { detector } }

  /// Compare a freshly fetched release (the provider's "latest release"
  /// JSON) against the last one seen. Emits an alert when the tag changed.
  pub async fn detect_change(&self, release: &Value) -> Result<Option<AlertEvent>> {
    let tag = release
      .get(TAG_FIELD)
      .and_then(Value::as_str)
      .ok_or_else(|| Error::MalformedRelease(format!("missing `{TAG_FIELD}`")))?;

    let key = SubjectKey::release();
    let detection = self
      .detector
      .detect(&key, release, &Comparison::field(TAG_FIELD))
      .await?;

    let Detection::Changed { pending, .. } = detection else {
      tracing::info!(tag, "no new release");
      return Ok(None);
    };

    tracing::info!(tag, "new release found");
    Ok(Some(AlertEvent::new(key, "New Release", describe(release, tag), pending)))
  }
}

fn describe(release: &Value, tag: &str) -> String {
  let name = release
    .get("name")
    .and_then(Value::as_str)
    .filter(|n| !n.is_empty() && *n != tag);

  let mut body = match name {
    Some(name) => format!("{name} ({tag}) has been released!"),
    None => format!("{tag} has been released!"),
  };
  if let Some(url) = release.get("html_url").and_then(Value::as_str) {
    body.push('\n');
    body.push_str(url);
  }
  body
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::testing::store;

  #[tokio::test]
  async fn new_tag_emits_one_alert() {
    let s = store();
    s.commit(&SubjectKey::release(), json!({ "tag_name": "v1.0.0" }))
      .await
      .unwrap();
    let watcher = ReleaseWatcher::new(s.clone());

    let fresh = json!({
      "tag_name": "v1.1.0",
      "name":     "Polkadot v1.1.0",
      "html_url": "https://github.com/paritytech/polkadot/releases/tag/v1.1.0"
    });
    let event = watcher.detect_change(&fresh).await.unwrap().unwrap();

    assert_eq!(event.title, "New Release");
    assert_eq!(
      event.body,
      "Polkadot v1.1.0 (v1.1.0) has been released!\n\
       https://github.com/paritytech/polkadot/releases/tag/v1.1.0"
    );
    assert_eq!(event.pending.as_ref(), Some(&fresh));

    // Delivered: commit, and the same release is no longer news.
    ChangeDetector::new(s).confirm(&event).await.unwrap();
    assert!(watcher.detect_change(&fresh).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn first_release_seen_is_seeded() {
    let watcher = ReleaseWatcher::new(store());
    let fresh = json!({ "tag_name": "v0.9.0" });
    assert!(watcher.detect_change(&fresh).await.unwrap().is_none());
    assert!(watcher.detect_change(&fresh).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn release_without_tag_is_rejected() {
    let watcher = ReleaseWatcher::new(store());
    let err = watcher.detect_change(&json!({ "name": "?" })).await.unwrap_err();
    assert!(matches!(err, Error::MalformedRelease(_)));
  }

  #[test]
  fn name_equal_to_tag_is_not_repeated() {
    let body = describe(&json!({ "tag_name": "v2", "name": "v2" }), "v2");
    assert_eq!(body, "v2 has been released!");
  }
}
