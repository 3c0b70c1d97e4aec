//! Production client for the X v2 API.
//!
//! One client implements both capabilities: posting via `POST /2/tweets`
//! and media upload via `POST /2/media/upload`, authenticated with an OAuth
//! 2.0 user-context bearer token. HTTP failures are mapped to [`ApiError`]
//! variants at this edge so the rest of the crate never sees status codes.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{ApiResult, ApiSession, MediaUploader};
use crate::config::ApiCredentials;
use crate::error::ApiError;
use crate::ratelimit::{RateLimitHeaders, RateLimitStatus};
use crate::types::PostId;

const DEFAULT_BASE_URL: &str = "https://api.x.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct XApiClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

#[derive(Deserialize)]
struct PostData {
    id: String,
}

#[derive(Deserialize)]
struct PostResponse {
    data: PostData,
}

#[derive(Deserialize)]
struct MediaData {
    id: String,
}

#[derive(Deserialize)]
struct MediaResponse {
    data: MediaData,
}

impl XApiClient {
    pub fn new(credentials: &ApiCredentials) -> ApiResult<Self> {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    /// Client against a custom base URL (test servers).
    pub fn with_base_url(credentials: &ApiCredentials, base_url: &str) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer_token: credentials.bearer_token.clone(),
        })
    }

    /// Current rate-limit window for the posting endpoint.
    ///
    /// Probes the lightweight `users/me` endpoint for the throttling headers
    /// instead of spending a request from the posting quota.
    pub async fn rate_limit_status(&self) -> Option<RateLimitStatus> {
        let response = match self
            .http
            .get(format!("{}/2/users/me", self.base_url))
            .bearer_auth(&self.bearer_token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("failed to fetch rate limit status: {}", e);
                return None;
            }
        };
        let headers = capture_rate_limit_headers(response.headers());
        RateLimitStatus::from_headers("/2/tweets", &headers)
    }

    async fn classify_failure(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let headers = capture_rate_limit_headers(response.headers());
        let message = match response.text().await {
            Ok(body) => extract_detail(&body),
            Err(_) => status.to_string(),
        };
        match status {
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(headers),
            StatusCode::UNAUTHORIZED => ApiError::Authentication(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            _ => ApiError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

fn capture_rate_limit_headers(headers: &HeaderMap) -> RateLimitHeaders {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    RateLimitHeaders {
        retry_after: get("retry-after"),
        limit: get("x-rate-limit-limit"),
        remaining: get("x-rate-limit-remaining"),
        reset: get("x-rate-limit-reset"),
    }
}

/// Pull the human-readable detail out of an error payload, falling back to
/// the raw body.
fn extract_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .or_else(|| value.get("title"))
                .and_then(|detail| detail.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl ApiSession for XApiClient {
    async fn create_post(
        &self,
        text: &str,
        reply_to: Option<&str>,
        media_ids: &[String],
    ) -> ApiResult<PostId> {
        let mut payload = json!({ "text": text });
        if let Some(parent) = reply_to {
            payload["reply"] = json!({ "in_reply_to_tweet_id": parent });
        }
        if !media_ids.is_empty() {
            payload["media"] = json!({ "media_ids": media_ids });
        }

        debug!(reply_to, media = media_ids.len(), "creating post");
        let response = self
            .http
            .post(format!("{}/2/tweets", self.base_url))
            .bearer_auth(&self.bearer_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        let parsed: PostResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(parsed.data.id)
    }
}

#[async_trait]
impl MediaUploader for XApiClient {
    async fn upload_media(&self, path: &Path) -> ApiResult<String> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ApiError::Media(format!("failed to read {}: {}", path.display(), e))
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media".to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .part("media", part)
            .text("media_category", "tweet_image");

        debug!(path = %path.display(), "uploading media");
        let response = self
            .http
            .post(format!("{}/2/media/upload", self.base_url))
            .bearer_auth(&self.bearer_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        let parsed: MediaResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(parsed.data.id)
    }
}
