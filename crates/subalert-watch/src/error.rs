//! Error type for `subalert-watch`.

use subalert_core::{CacheIoError, ChainQueryError, DispatchError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("chain query failed: {0}")]
  Chain(#[from] ChainQueryError),

  #[error("snapshot store failed: {0}")]
  Cache(#[from] CacheIoError),

  #[error("dispatch failed: {0}")]
  Dispatch(#[from] DispatchError),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("malformed release payload: {0}")]
  MalformedRelease(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
