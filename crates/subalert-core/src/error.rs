//! Error types shared across the subalert crates.

use std::path::PathBuf;

use thiserror::Error;

/// A failed query against chain storage.
///
/// Always recoverable at the pipeline level: the cycle is abandoned and the
/// query is retried on the next poll.
#[derive(Debug, Clone, Error)]
pub enum ChainQueryError {
  #[error("chain transport error: {0}")]
  Transport(String),

  #[error("chain query {module}.{function} timed out")]
  Timeout {
    module:   String,
    function: String,
  },

  #[error("chain gateway returned status {0}")]
  Status(u16),

  #[error("undecodable {what}: {detail}")]
  Decode { what: &'static str, detail: String },
}

impl ChainQueryError {
  pub fn decode(what: &'static str, detail: impl Into<String>) -> Self {
    Self::Decode { what, detail: detail.into() }
  }
}

/// An outbound post that failed for a reason other than duplicate content.
#[derive(Debug, Error)]
pub enum DispatchError {
  #[error("post rejected by channel: {0}")]
  Rejected(String),

  #[error("channel transport error: {0}")]
  Transport(String),

  #[error("post timed out after {0:?}")]
  Timeout(std::time::Duration),

  #[error("cannot read post media: {0}")]
  Io(String),
}

/// Snapshot persistence failed.
///
/// Read failures degrade to "no prior snapshot"; write failures are surfaced.
#[derive(Debug, Error)]
pub enum CacheIoError {
  #[error("failed to read snapshot file {path:?}: {source}")]
  Read {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("snapshot file {path:?} is corrupt: {source}")]
  Corrupt {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to write snapshot file {path:?}: {source}")]
  Write {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to encode snapshot: {0}")]
  Encode(#[from] serde_json::Error),
}
