//! Snapshots: the last-seen value of each watched subject.
//!
//! A [`SnapshotStore`] is a versioned key/value store. Every commit bumps the
//! entry's revision, so callers can tell a seeded entry (revision 1) from one
//! that has been overwritten by confirmed changes.

use std::{fmt, future::Future};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CacheIoError, identity::Address};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// Identifies a watched subject. The category selects the snapshot file;
/// subjects in different categories never share state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectKey {
  category: String,
  id:       Option<String>,
}

impl SubjectKey {
  pub const IDENTITY: &'static str = "identity";
  pub const RELEASE: &'static str = "release";

  pub fn new(category: impl Into<String>, id: Option<String>) -> Self {
    Self { category: category.into(), id }
  }

  /// The single latest-release subject.
  pub fn release() -> Self { Self::new(Self::RELEASE, None) }

  /// The identity record watched for `address`.
  pub fn identity(address: &Address) -> Self {
    Self::new(Self::IDENTITY, Some(address.to_string()))
  }

  pub fn category(&self) -> &str { &self.category }

  pub fn id(&self) -> Option<&str> { self.id.as_deref() }
}

impl fmt::Display for SubjectKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.id {
      Some(id) => write!(f, "{}:{id}", self.category),
      None => f.write_str(&self.category),
    }
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// The committed value of a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
  pub value:      Value,
  /// Starts at 1 and increases by one on every commit.
  pub revision:   u64,
  pub updated_at: DateTime<Utc>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Persistence for [`Snapshot`]s.
pub trait SnapshotStore: Send + Sync {
  /// The committed snapshot for `key`, or `None` if it has never been seen.
  fn load<'a>(
    &'a self,
    key: &'a SubjectKey,
  ) -> impl Future<Output = Result<Option<Snapshot>, CacheIoError>> + Send + 'a;

  /// Overwrite the value for `key` and persist it durably before returning.
  fn commit<'a>(
    &'a self,
    key: &'a SubjectKey,
    value: Value,
  ) -> impl Future<Output = Result<Snapshot, CacheIoError>> + Send + 'a;
}
