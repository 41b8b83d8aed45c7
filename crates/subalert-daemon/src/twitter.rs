//! Twitter (X) API v2 client: `POST /2/tweets` and `POST /2/media/upload`.
//!
//! Both endpoints act on behalf of a user, so requests carry an OAuth 2.0
//! user-context access token (`tweet.write` and `media.write` scopes). An
//! app-only bearer token is refused by both.

use std::{path::Path, time::Duration};

use anyhow::Context as _;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use subalert_core::channel::{PostError, PostErrorKind, PostReceipt, SocialChannel};

use crate::config::TwitterConfig;

/// v1.1 "Status is a duplicate.", still reported by some gateways.
const DUPLICATE_STATUS: u32 = 187;
/// How v2 words a duplicate-content refusal in its problem `detail`.
const DUPLICATE_DETAIL: &str = "duplicate content";

#[derive(Clone)]
pub struct TwitterClient {
  client:       Client,
  api_url:      String,
  upload_url:   String,
  access_token: String,
}

/// `{"data": {...}}` envelope of v2 responses.
#[derive(Deserialize)]
struct Data<T> {
  data: T,
}

#[derive(Deserialize)]
struct Created {
  id: String,
}

/// v2 problem details, or the legacy `errors` list.
#[derive(Deserialize, Default)]
struct ErrorBody {
  #[serde(default)]
  detail: Option<String>,
  #[serde(default)]
  title:  Option<String>,
  #[serde(default)]
  errors: Vec<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
  #[serde(default)]
  code:    Option<u32>,
  #[serde(default)]
  message: String,
}

impl TwitterClient {
  pub fn new(cfg: &TwitterConfig, timeout: Duration) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .context("failed to build Twitter HTTP client")?;
    Ok(Self {
      client,
      api_url: cfg.api_url.trim_end_matches('/').to_owned(),
      upload_url: cfg.upload_url.trim_end_matches('/').to_owned(),
      access_token: cfg.access_token.clone(),
    })
  }

  async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, PostError> {
    let resp = req
      .bearer_auth(&self.access_token)
      .send()
      .await
      .map_err(transport)?;

    let status = resp.status();
    if !status.is_success() {
      let text = resp.text().await.unwrap_or_default();
      return Err(classify_rejection(status.as_u16(), &text));
    }
    resp.json().await.map_err(transport)
  }

  async fn create_tweet(
    &self,
    message: &str,
    media_id: Option<&str>,
  ) -> Result<PostReceipt, PostError> {
    let mut body = json!({ "text": message });
    if let Some(id) = media_id {
      body["media"] = json!({ "media_ids": [id] });
    }
    let req = self.client.post(format!("{}/tweets", self.api_url)).json(&body);

    let created: Data<Created> = self.send(req).await?;
    Ok(PostReceipt { post_id: created.data.id })
  }

  async fn upload(&self, media: &Path) -> Result<String, PostError> {
    let bytes = tokio::fs::read(media).await.map_err(|e| {
      PostError::new(PostErrorKind::Io, format!("{}: {e}", media.display()))
    })?;
    let req = self
      .client
      .post(format!("{}/media/upload", self.upload_url))
      .json(&json!({
        "media":          STANDARD.encode(bytes),
        "media_category": "tweet_image",
        "media_type":     "image/png",
      }));

    let uploaded: Data<Created> = self.send(req).await?;
    Ok(uploaded.data.id)
  }
}

fn transport(e: reqwest::Error) -> PostError {
  let kind = if e.is_timeout() {
    PostErrorKind::Timeout
  } else {
    PostErrorKind::Transport
  };
  PostError::new(kind, e.to_string())
}

/// Classify a non-success response body.
fn classify_rejection(status: u16, body: &str) -> PostError {
  let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();

  if let Some(dup) = parsed.errors.iter().find(|e| e.code == Some(DUPLICATE_STATUS)) {
    return PostError::new(PostErrorKind::Duplicate, dup.message.clone());
  }
  if let Some(detail) = parsed
    .detail
    .as_deref()
    .filter(|d| d.to_ascii_lowercase().contains(DUPLICATE_DETAIL))
  {
    return PostError::new(PostErrorKind::Duplicate, detail);
  }

  let reason = parsed
    .detail
    .or(parsed.title)
    .or_else(|| parsed.errors.into_iter().next().map(|e| e.message))
    .unwrap_or_else(|| body.to_owned());
  PostError::new(PostErrorKind::Rejected, format!("{status}: {reason}"))
}

impl SocialChannel for TwitterClient {
  async fn post_text(&self, message: &str) -> Result<PostReceipt, PostError> {
    self.create_tweet(message, None).await
  }

  async fn post_with_media(
    &self,
    media: &Path,
    message: &str,
  ) -> Result<PostReceipt, PostError> {
    let media_id = self.upload(media).await?;
    self.create_tweet(message, Some(&media_id)).await
  }
}
