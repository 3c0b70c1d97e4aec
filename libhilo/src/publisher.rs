//! Thread publishing engine.
//!
//! Posts an ordered thread as a reply chain against a rate-limited platform
//! API: one attempt per post, no internal retries, and every failure is
//! classified exactly once and raised with enough state for the caller to
//! resume from the first post that did not go out.
//!
//! Resume contract: on a [`PublishError::RateLimited`] or
//! [`PublishError::Partial`], call [`publish_thread`] again with
//! [`PublishRun::resuming`] built from the reported [`ResumePoint`] and the
//! same thread. The engine trusts `start_index` completely; resuming from an
//! earlier index would double-post.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::api::{ApiSession, MediaUploader};
use crate::error::{ApiError, PublishError};
use crate::ratelimit::compute_wait_seconds;
use crate::types::{PostId, PublishRun, ResumePoint, Thread};

/// Characters of the offending body quoted back on duplicate-content errors.
const SNIPPET_LEN: usize = 75;

/// Receives a notification after each successfully published post.
///
/// Best effort: the engine logs and swallows sink errors, they never
/// interrupt publishing.
pub trait ProgressSink: Send + Sync {
    fn post_published(&self, index: usize, post_id: &str) -> anyhow::Result<()>;
}

/// Publish `thread` as a reply chain.
///
/// Returns the ids posted by this run, aligned with the thread (indices
/// before `run.start_index` stay `None`). An empty thread is a no-op.
pub async fn publish_thread(
    thread: &Thread,
    session: &dyn ApiSession,
    uploader: Option<&dyn MediaUploader>,
    run: &PublishRun,
    progress: Option<&dyn ProgressSink>,
) -> Result<Vec<Option<PostId>>, PublishError> {
    let total = thread.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let mut posted_ids: Vec<Option<PostId>> = vec![None; total];
    let delay_seconds = run.delay_seconds.max(0.0);

    // Media uploads need their own capability; refuse before the first
    // network call rather than half-way through the thread.
    if uploader.is_none() {
        let missing = thread
            .posts()
            .iter()
            .enumerate()
            .skip(run.start_index)
            .find(|(_, post)| post.media.is_some());
        if let Some((index, _)) = missing {
            return Err(PublishError::MissingUploader(index));
        }
    }

    let mut previous_id: Option<PostId> = run.initial_reply_id.clone();

    for idx in run.start_index..total {
        let post = &thread.posts()[idx];

        let mut media_ids: Vec<String> = Vec::new();
        if let Some(path) = &post.media {
            let Some(uploader) = uploader else {
                return Err(PublishError::MissingUploader(idx));
            };
            match uploader.upload_media(path).await {
                Ok(handle) => media_ids.push(handle),
                Err(ApiError::Forbidden(message)) => {
                    return Err(PublishError::Permission(format!(
                        "the platform rejected the media upload; make sure the credentials have \
                         write permission enabled and regenerate the access token. \
                         Platform response: {message}"
                    )));
                }
                Err(source) => {
                    warn!("media upload failed for post {}: {}", idx + 1, source);
                    return Err(PublishError::Partial {
                        resume: ResumePoint {
                            next_index: idx,
                            last_post_id: previous_id,
                            posted_ids,
                        },
                        source,
                    });
                }
            }
        }

        debug!("posting {}/{}", idx + 1, total);
        match session
            .create_post(&post.body, previous_id.as_deref(), &media_ids)
            .await
        {
            Ok(post_id) => {
                previous_id = Some(post_id.clone());
                posted_ids[idx] = Some(post_id.clone());
                if let Some(sink) = progress {
                    if let Err(e) = sink.post_published(idx, &post_id) {
                        warn!("progress sink failed for post {}: {:#}", idx + 1, e);
                    }
                }
            }
            Err(ApiError::RateLimited(headers)) => {
                let wait_seconds =
                    compute_wait_seconds(&headers, chrono::Utc::now().timestamp());
                warn!(
                    "hit rate limit after publishing {} of {} posts; suggested wait: {}",
                    idx,
                    total,
                    wait_seconds.map_or_else(|| "unknown".to_string(), |w| w.to_string()),
                );
                return Err(PublishError::RateLimited {
                    resume: ResumePoint {
                        next_index: idx,
                        last_post_id: previous_id,
                        posted_ids,
                    },
                    wait_seconds,
                });
            }
            Err(ApiError::Forbidden(message)) => {
                let lowered = message.to_lowercase();
                if lowered.contains("oauth1") {
                    return Err(PublishError::Permission(format!(
                        "the platform rejected the request because the configured credentials do \
                         not have write permission; enable write access, regenerate the token and \
                         try again. Platform response: {message}"
                    )));
                }
                if lowered.contains("duplicate content") {
                    return Err(PublishError::DuplicateContent {
                        index: idx,
                        snippet: snippet(&post.body),
                    });
                }
                return Err(PublishError::Partial {
                    resume: ResumePoint {
                        next_index: idx,
                        last_post_id: previous_id,
                        posted_ids,
                    },
                    source: ApiError::Forbidden(message),
                });
            }
            Err(source) => {
                warn!("post {} failed: {}", idx + 1, source);
                return Err(PublishError::Partial {
                    resume: ResumePoint {
                        next_index: idx,
                        last_post_id: previous_id,
                        posted_ids,
                    },
                    source,
                });
            }
        }

        // Pace between posts; the final post needs no trailing wait.
        if delay_seconds > 0.0 && idx < total - 1 {
            sleep(Duration::from_secs_f64(delay_seconds)).await;
        }
    }

    info!("thread published successfully ({} posts)", total);
    Ok(posted_ids)
}

fn snippet(body: &str) -> String {
    if body.chars().count() > SNIPPET_LEN {
        let cut: String = body.chars().take(SNIPPET_LEN).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}
