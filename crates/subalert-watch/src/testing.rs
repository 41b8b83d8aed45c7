//! In-memory fakes for the chain, the outbound channel, and card rendering.

use std::{
  collections::{HashMap, VecDeque},
  path::{Path, PathBuf},
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use serde_json::{Value, json};
use subalert_core::{
  ChainQueryError,
  alert::{AlertCard, CardRenderer},
  chain::{ChainQuery, IDENTITY_OF, SUPER_OF},
  channel::{PostError, PostErrorKind, PostReceipt, SocialChannel},
};
use subalert_store_json::JsonSnapshotStore;
use uuid::Uuid;

use crate::Context;

// ─── Chain ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeChain {
  pub super_of:    HashMap<String, Value>,
  pub identities:  Vec<(Value, Value)>,
  /// Every query fails with a transport error.
  pub unreachable: bool,
  /// Every query sleeps this long before answering.
  pub delay:       Option<Duration>,
  pub map_scans:   AtomicUsize,
  pub lookups:     AtomicUsize,
}

impl FakeChain {
  pub fn with_identity(mut self, address: &str, info: Value) -> Self {
    self
      .identities
      .push((json!(address), json!({ "judgements": [], "info": info })));
    self
  }

  /// Register `value` verbatim, however malformed.
  pub fn with_raw_identity(mut self, address: &str, value: Value) -> Self {
    self.identities.push((json!(address), value));
    self
  }

  pub fn with_super(mut self, sub: &str, parent: &str) -> Self {
    self
      .super_of
      .insert(sub.to_owned(), json!([parent, { "Raw": "sub" }]));
    self
  }

  async fn answer<T>(&self, value: T) -> Result<T, ChainQueryError> {
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    if self.unreachable {
      return Err(ChainQueryError::Transport("connection refused".into()));
    }
    Ok(value)
  }
}

impl ChainQuery for FakeChain {
  async fn query_storage(
    &self,
    _module: &str,
    function: &str,
    params: &[Value],
  ) -> Result<Option<Value>, ChainQueryError> {
    self.lookups.fetch_add(1, Ordering::SeqCst);
    assert_eq!(function, SUPER_OF);
    let key = params.first().and_then(Value::as_str).unwrap_or_default();
    self.answer(self.super_of.get(key).cloned()).await
  }

  async fn query_storage_map(
    &self,
    _module: &str,
    function: &str,
  ) -> Result<Vec<(Value, Value)>, ChainQueryError> {
    self.map_scans.fetch_add(1, Ordering::SeqCst);
    assert_eq!(function, IDENTITY_OF);
    self.answer(self.identities.clone()).await
  }
}

// ─── Channel ─────────────────────────────────────────────────────────────────

/// A post the fake channel accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
  pub media:   Option<PathBuf>,
  pub message: String,
}

#[derive(Default)]
pub struct FakeChannel {
  pub posts:    Mutex<Vec<Post>>,
  /// Failures returned by the next posts, in order.
  pub failures: Mutex<VecDeque<PostErrorKind>>,
  pub delay:    Option<Duration>,
}

impl FakeChannel {
  pub fn failing_with(kinds: impl IntoIterator<Item = PostErrorKind>) -> Self {
    Self {
      failures: Mutex::new(kinds.into_iter().collect()),
      ..Self::default()
    }
  }

  pub fn posts(&self) -> Vec<Post> { self.posts.lock().unwrap().clone() }

  async fn accept(
    &self,
    media: Option<&Path>,
    message: &str,
  ) -> Result<PostReceipt, PostError> {
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    if let Some(kind) = self.failures.lock().unwrap().pop_front() {
      return Err(PostError::new(kind, "fake failure"));
    }
    let mut posts = self.posts.lock().unwrap();
    posts.push(Post {
      media:   media.map(Path::to_path_buf),
      message: message.to_owned(),
    });
    Ok(PostReceipt { post_id: posts.len().to_string() })
  }
}

impl SocialChannel for FakeChannel {
  async fn post_text(&self, message: &str) -> Result<PostReceipt, PostError> {
    self.accept(None, message).await
  }

  async fn post_with_media(
    &self,
    media: &Path,
    message: &str,
  ) -> Result<PostReceipt, PostError> {
    self.accept(Some(media), message).await
  }
}

// ─── Renderer ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("fake render failure")]
pub struct FakeRenderError;

/// Pretends to render; never touches the filesystem.
#[derive(Default)]
pub struct FakeRenderer {
  pub broken:   bool,
  pub rendered: AtomicUsize,
}

impl CardRenderer for FakeRenderer {
  type Error = FakeRenderError;

  fn render(&self, _title: &str, _body: &str) -> Result<AlertCard, FakeRenderError> {
    if self.broken {
      return Err(FakeRenderError);
    }
    let n = self.rendered.fetch_add(1, Ordering::SeqCst);
    Ok(AlertCard {
      id:     Uuid::new_v4(),
      path:   PathBuf::from(format!("cards/{n}.png")),
      width:  400,
      height: 300,
    })
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

pub fn context(chain: FakeChain, channel: FakeChannel) -> Context<FakeChain, FakeChannel> {
  Context::new(chain, channel, "Polkadot")
}

pub fn store() -> std::sync::Arc<JsonSnapshotStore> {
  std::sync::Arc::new(JsonSnapshotStore::in_memory())
}
