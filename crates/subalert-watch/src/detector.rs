//! [`ChangeDetector`] decides whether a fresh observation is news.
//!
//! A subject's fresh value is compared, exactly, against its committed
//! snapshot. How the first observation is treated and when the snapshot is
//! overwritten are both explicit policies of the detector.

use std::sync::Arc;

use serde_json::Value;
use subalert_core::{
  CacheIoError,
  alert::AlertEvent,
  snapshot::{SnapshotStore, SubjectKey},
};

// ─── Policies ────────────────────────────────────────────────────────────────

/// Which part of a value decides equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
  /// The full serialized value.
  Whole,
  /// A single top-level field, e.g. `tag_name` of a release.
  Field(String),
}

impl Comparison {
  pub fn field(name: impl Into<String>) -> Self { Self::Field(name.into()) }

  fn project<'v>(&self, value: &'v Value) -> Option<&'v Value> {
    match self {
      Self::Whole => Some(value),
      Self::Field(name) => value.get(name),
    }
  }
}

/// What to do when a subject has no snapshot yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FirstObservation {
  /// Record the value silently.
  #[default]
  Seed,
  /// Treat it as a change.
  Announce,
}

/// When a detected change is written to the snapshot store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommitPolicy {
  /// After the alert has been delivered. A failed or interrupted dispatch is
  /// detected again on the next cycle (at-least-once).
  #[default]
  AfterDispatch,
  /// As soon as the change is detected (at-most-once).
  Immediate,
}

// ─── Detection ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
  /// First observation, recorded without an alert.
  Seeded,
  Unchanged,
  Changed {
    previous: Option<Value>,
    /// Value still to commit once the alert is delivered.
    pending:  Option<Value>,
  },
}

// ─── Detector ────────────────────────────────────────────────────────────────

pub struct ChangeDetector<S> {
  store:  Arc<S>,
  first:  FirstObservation,
  commit: CommitPolicy,
}

impl<S> Clone for ChangeDetector<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), first: self.first, commit: self.commit }
  }
}

impl<S: SnapshotStore> ChangeDetector<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      first: FirstObservation::default(),
      commit: CommitPolicy::default(),
    }
  }

  pub fn with_first_observation(mut self, first: FirstObservation) -> Self {
    self.first = first;
    self
  }

  pub fn with_commit_policy(mut self, commit: CommitPolicy) -> Self {
    self.commit = commit;
    self
  }

  pub fn commit_policy(&self) -> CommitPolicy { self.commit }

  /// Compare `fresh` against the snapshot for `key`.
  ///
  /// An unreadable snapshot counts as absent. Failing to write a snapshot
  /// (when seeding, or under [`CommitPolicy::Immediate`]) is returned.
  pub async fn detect(
    &self,
    key: &SubjectKey,
    fresh: &Value,
    comparison: &Comparison,
  ) -> Result<Detection, CacheIoError> {
    let prior = match self.store.load(key).await {
      Ok(prior) => prior,
      Err(e) => {
        tracing::warn!(subject = %key, "snapshot unreadable, treating as unseen: {e}");
        None
      }
    };

    match prior {
      None => match self.first {
        FirstObservation::Seed => {
          self.store.commit(key, fresh.clone()).await?;
          tracing::info!(subject = %key, "seeded snapshot");
          Ok(Detection::Seeded)
        }
        FirstObservation::Announce => self.changed(key, None, fresh).await,
      },
      Some(snapshot)
        if comparison.project(&snapshot.value) == comparison.project(fresh) =>
      {
        tracing::debug!(subject = %key, revision = snapshot.revision, "no change");
        Ok(Detection::Unchanged)
      }
      Some(snapshot) => self.changed(key, Some(snapshot.value), fresh).await,
    }
  }

  async fn changed(
    &self,
    key: &SubjectKey,
    previous: Option<Value>,
    fresh: &Value,
  ) -> Result<Detection, CacheIoError> {
    tracing::info!(subject = %key, "change detected");
    let pending = match self.commit {
      CommitPolicy::Immediate => {
        self.store.commit(key, fresh.clone()).await?;
        None
      }
      CommitPolicy::AfterDispatch => Some(fresh.clone()),
    };
    Ok(Detection::Changed { previous, pending })
  }

  /// Commit the value an alert was waiting on, if any. Called once the alert
  /// is known to be on the channel.
  pub async fn confirm(&self, event: &AlertEvent) -> Result<(), CacheIoError> {
    if let Some(value) = &event.pending {
      let snapshot = self.store.commit(&event.subject, value.clone()).await?;
      tracing::debug!(
        subject = %event.subject,
        revision = snapshot.revision,
        "committed snapshot after dispatch"
      );
    }
    Ok(())
  }
}
