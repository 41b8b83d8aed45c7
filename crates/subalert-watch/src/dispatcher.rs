//! [`NotificationDispatcher`] posts alerts to the outbound channel.

use std::{sync::Arc, time::Duration};

use subalert_core::{
  DispatchError,
  alert::{AlertCard, AlertEvent},
  channel::{PostErrorKind, PostReceipt, SocialChannel},
};

use crate::Context;

/// How a dispatch that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
  Posted(PostReceipt),
  /// The channel already had this exact content, so an earlier run delivered
  /// it. Counts as delivered.
  AlreadyPosted,
}

pub struct NotificationDispatcher<P> {
  channel: Arc<P>,
  hashtag: String,
  timeout: Duration,
}

impl<P: SocialChannel> NotificationDispatcher<P> {
  pub fn new<C>(ctx: &Context<C, P>) -> Self {
    Self {
      channel: Arc::clone(&ctx.channel),
      hashtag: ctx.hashtag.clone(),
      timeout: ctx.request_timeout,
    }
  }

  /// The text posted for `event`: `<body> #<hashtag>`.
  pub fn message(&self, event: &AlertEvent) -> String {
    format!("{} #{}", event.body, self.hashtag)
  }

  /// Time allowed for one dispatch: one request budget per outbound call,
  /// so a post with a card (upload, then post) gets two.
  pub fn budget(&self, card: Option<&AlertCard>) -> Duration {
    match card {
      Some(_) => self.timeout * 2,
      None => self.timeout,
    }
  }

  /// Post `event`, with `card` attached when given.
  ///
  /// Does not retry. A duplicate-content rejection is reported as
  /// [`DispatchOutcome::AlreadyPosted`]; every other failure is an error.
  pub async fn dispatch(
    &self,
    event: &AlertEvent,
    card: Option<&AlertCard>,
  ) -> Result<DispatchOutcome, DispatchError> {
    let message = self.message(event);

    let post = async {
      match card {
        Some(card) => self.channel.post_with_media(&card.path, &message).await,
        None => self.channel.post_text(&message).await,
      }
    };

    let budget = self.budget(card);
    let result = tokio::time::timeout(budget, post)
      .await
      .map_err(|_| DispatchError::Timeout(budget))?;

    match result {
      Ok(receipt) => {
        tracing::info!(
          subject = %event.subject,
          post_id = %receipt.post_id,
          with_card = card.is_some(),
          "alert posted"
        );
        Ok(DispatchOutcome::Posted(receipt))
      }
      Err(e) => match e.kind {
        PostErrorKind::Duplicate => {
          tracing::info!(subject = %event.subject, "disregarding duplicate post");
          Ok(DispatchOutcome::AlreadyPosted)
        }
        PostErrorKind::Rejected => Err(DispatchError::Rejected(e.message)),
        PostErrorKind::Transport => Err(DispatchError::Transport(e.message)),
        PostErrorKind::Timeout => Err(DispatchError::Timeout(self.timeout)),
        PostErrorKind::Io => Err(DispatchError::Io(e.message)),
      },
    }
  }
}
