//! [`Pipeline`]: drains queued alerts to the channel.

use subalert_core::{
  alert::{AlertEvent, CardRenderer},
  channel::SocialChannel,
  snapshot::SnapshotStore,
};

use crate::{AlertQueue, ChangeDetector, DispatchOutcome, NotificationDispatcher};

/// Counts from one [`Pipeline::drain`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
  pub posted:          usize,
  pub duplicates:      usize,
  /// Dispatches that failed; their subjects are detected again next cycle.
  pub failed:          usize,
  /// Alerts that went out but whose snapshot could not be written.
  pub commit_failures: usize,
}

pub struct Pipeline<S, P, R> {
  queue:      AlertQueue,
  detector:   ChangeDetector<S>,
  dispatcher: NotificationDispatcher<P>,
  renderer:   Option<R>,
}

impl<S, P, R> Pipeline<S, P, R>
where
  S: SnapshotStore,
  P: SocialChannel,
  R: CardRenderer,
{
  /// `renderer: None` posts every alert text-only.
  pub fn new(
    detector: ChangeDetector<S>,
    dispatcher: NotificationDispatcher<P>,
    renderer: Option<R>,
  ) -> Self {
    Self { queue: AlertQueue::new(), detector, dispatcher, renderer }
  }

  pub fn enqueue(&mut self, event: AlertEvent) { self.queue.enqueue(event); }

  pub fn extend(&mut self, events: impl IntoIterator<Item = AlertEvent>) {
    self.queue.extend(events);
  }

  pub fn pending(&self) -> usize { self.queue.len() }

  /// Dispatch every queued alert in order, committing each one's snapshot
  /// once the channel has it.
  pub async fn drain(&mut self) -> DrainReport {
    let mut report = DrainReport::default();

    while let Some(event) = self.queue.dequeue() {
      let card = self.renderer.as_ref().and_then(|renderer| {
        renderer
          .render(&event.title, &event.body)
          .inspect_err(|e| {
            tracing::warn!(subject = %event.subject, "posting without card: {e}");
          })
          .ok()
      });

      match self.dispatcher.dispatch(&event, card.as_ref()).await {
        Ok(outcome) => {
          match outcome {
            DispatchOutcome::Posted(_) => report.posted += 1,
            DispatchOutcome::AlreadyPosted => report.duplicates += 1,
          }
          if let Err(e) = self.detector.confirm(&event).await {
            tracing::error!(subject = %event.subject, "alert sent but snapshot not saved: {e}");
            report.commit_failures += 1;
          }
        }
        Err(e) => {
          tracing::warn!(subject = %event.subject, "dispatch failed, will retry next cycle: {e}");
          report.failed += 1;
        }
      }
    }

    report
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, atomic::Ordering};

  use serde_json::json;
  use subalert_core::{
    channel::PostErrorKind,
    snapshot::{SnapshotStore as _, SubjectKey},
  };
  use subalert_store_json::JsonSnapshotStore;

  use super::*;
  use crate::{
    ReleaseWatcher,
    testing::{FakeChain, FakeChannel, FakeRenderer, context, store},
  };

  type TestPipeline = Pipeline<JsonSnapshotStore, FakeChannel, FakeRenderer>;

  fn pipeline(
    s: &Arc<JsonSnapshotStore>,
    channel: FakeChannel,
    renderer: Option<FakeRenderer>,
  ) -> (TestPipeline, Arc<FakeChannel>) {
    let ctx = context(FakeChain::default(), channel);
    let channel = Arc::clone(&ctx.channel);
    let p = Pipeline::new(
      ChangeDetector::new(Arc::clone(s)),
      NotificationDispatcher::new(&ctx),
      renderer,
    );
    (p, channel)
  }

  async fn release_alert(s: &Arc<JsonSnapshotStore>) -> AlertEvent {
    s.commit(&SubjectKey::release(), json!({ "tag_name": "v1.0.0" }))
      .await
      .unwrap();
    ReleaseWatcher::new(Arc::clone(s))
      .detect_change(&json!({ "tag_name": "v1.1.0" }))
      .await
      .unwrap()
      .unwrap()
  }

  #[tokio::test]
  async fn delivered_alert_commits_snapshot() {
    let s = store();
    let (mut p, channel) = pipeline(&s, FakeChannel::default(), Some(FakeRenderer::default()));
    p.enqueue(release_alert(&s).await);

    let report = p.drain().await;

    assert_eq!(report, DrainReport { posted: 1, ..DrainReport::default() });
    assert_eq!(p.pending(), 0);
    let posts = channel.posts();
    assert!(posts[0].media.is_some());
    assert!(posts[0].message.ends_with(" #Polkadot"));

    let snapshot = s.load(&SubjectKey::release()).await.unwrap().unwrap();
    assert_eq!(snapshot.value["tag_name"], "v1.1.0");
  }

  #[tokio::test]
  async fn duplicate_still_commits_snapshot() {
    let s = store();
    let (mut p, channel) = pipeline(
      &s,
      FakeChannel::failing_with([PostErrorKind::Duplicate]),
      None,
    );
    p.enqueue(release_alert(&s).await);

    let report = p.drain().await;

    assert_eq!(report, DrainReport { duplicates: 1, ..DrainReport::default() });
    assert!(channel.posts().is_empty());
    let snapshot = s.load(&SubjectKey::release()).await.unwrap().unwrap();
    assert_eq!(snapshot.value["tag_name"], "v1.1.0");
  }

  #[tokio::test]
  async fn failed_dispatch_leaves_snapshot_for_retry() {
    let s = store();
    let (mut p, _) = pipeline(
      &s,
      FakeChannel::failing_with([PostErrorKind::Transport]),
      None,
    );
    p.enqueue(release_alert(&s).await);

    let report = p.drain().await;
    assert_eq!(report, DrainReport { failed: 1, ..DrainReport::default() });

    // Next cycle sees the same release as new again.
    let retry = ReleaseWatcher::new(Arc::clone(&s))
      .detect_change(&json!({ "tag_name": "v1.1.0" }))
      .await
      .unwrap();
    assert!(retry.is_some());
  }

  #[tokio::test]
  async fn broken_renderer_falls_back_to_text() {
    let s = store();
    let renderer = FakeRenderer { broken: true, ..FakeRenderer::default() };
    let (mut p, channel) = pipeline(&s, FakeChannel::default(), Some(renderer));
    p.enqueue(release_alert(&s).await);

    let report = p.drain().await;

    assert_eq!(report.posted, 1);
    assert_eq!(channel.posts()[0].media, None);
  }

  #[tokio::test]
  async fn alerts_are_sent_in_order_and_rendered_once_each() {
    let s = store();
    let (mut p, channel) = pipeline(&s, FakeChannel::default(), Some(FakeRenderer::default()));
    for n in 0..3 {
      p.enqueue(AlertEvent::new(SubjectKey::release(), "t", format!("alert {n}"), None));
    }

    p.drain().await;

    let messages: Vec<_> = channel.posts().into_iter().map(|p| p.message).collect();
    assert_eq!(messages, ["alert 0 #Polkadot", "alert 1 #Polkadot", "alert 2 #Polkadot"]);
    assert_eq!(p.renderer.as_ref().unwrap().rendered.load(Ordering::SeqCst), 3);
  }
}
