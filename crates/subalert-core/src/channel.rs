//! The outbound social channel alerts are posted to.

use std::{future::Future, path::Path};

use thiserror::Error;

/// Identifier the channel assigned to a successful post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReceipt {
  pub post_id: String,
}

/// Why a post failed, as classified by the channel client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostErrorKind {
  /// The channel already holds identical content. Treated as delivered.
  Duplicate,
  /// The channel refused the post for any other reason.
  Rejected,
  /// The request never got a usable answer.
  Transport,
  Timeout,
  /// The media to attach could not be read locally.
  Io,
}

#[derive(Debug, Error)]
#[error("{kind:?}: {message}")]
pub struct PostError {
  pub kind:    PostErrorKind,
  pub message: String,
}

impl PostError {
  pub fn new(kind: PostErrorKind, message: impl Into<String>) -> Self {
    Self { kind, message: message.into() }
  }

  pub fn is_duplicate(&self) -> bool { self.kind == PostErrorKind::Duplicate }
}

/// An outbound feed that accepts text posts, optionally with one image.
pub trait SocialChannel: Send + Sync {
  fn post_text<'a>(
    &'a self,
    message: &'a str,
  ) -> impl Future<Output = Result<PostReceipt, PostError>> + Send + 'a;

  fn post_with_media<'a>(
    &'a self,
    media: &'a Path,
    message: &'a str,
  ) -> impl Future<Output = Result<PostReceipt, PostError>> + Send + 'a;
}
