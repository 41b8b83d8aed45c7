//! Shared collaborators handed to each pipeline component.

use std::{sync::Arc, time::Duration};

/// Default bound on a single chain query or outbound post.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// The chain client, the outbound channel, and the settings every component
/// needs. Built once by the driver; components copy what they use.
pub struct Context<C, P> {
  pub chain:           Arc<C>,
  pub channel:         Arc<P>,
  /// Appended to every post as `#<hashtag>`.
  pub hashtag:         String,
  pub request_timeout: Duration,
}

impl<C, P> Context<C, P> {
  pub fn new(chain: C, channel: P, hashtag: impl Into<String>) -> Self {
    Self {
      chain:           Arc::new(chain),
      channel:         Arc::new(channel),
      hashtag:         hashtag.into(),
      request_timeout: DEFAULT_REQUEST_TIMEOUT,
    }
  }

  pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
    self.request_timeout = timeout;
    self
  }
}

impl<C, P> Clone for Context<C, P> {
  fn clone(&self) -> Self {
    Self {
      chain:           Arc::clone(&self.chain),
      channel:         Arc::clone(&self.channel),
      hashtag:         self.hashtag.clone(),
      request_timeout: self.request_timeout,
    }
  }
}
