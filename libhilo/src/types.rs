//! Core types for hilo

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{FormatError, Result};

/// Maximum number of unicode characters a single post may carry.
pub const MAX_POST_LEN: usize = 280;

/// Platform-assigned identifier of a published post.
///
/// Treated as opaque text end to end; the engine only threads it back into
/// the next post's reply field.
pub type PostId = String;

/// One unit of content in a thread: a bounded body plus an optional image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub body: String,
    pub media: Option<PathBuf>,
}

impl Post {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            media: None,
        }
    }

    pub fn with_media(body: impl Into<String>, media: impl Into<PathBuf>) -> Self {
        Self {
            body: body.into(),
            media: Some(media.into()),
        }
    }
}

/// An ordered sequence of posts published as a reply chain.
///
/// Construction validates every body against [`MAX_POST_LEN`] so nothing
/// malformed reaches the network; the publish engine never mutates a thread.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Thread {
    posts: Vec<Post>,
}

impl Thread {
    /// Build a thread, rejecting empty or over-limit bodies.
    pub fn new(posts: Vec<Post>) -> Result<Self> {
        for (i, post) in posts.iter().enumerate() {
            let length = post.body.chars().count();
            if length == 0 {
                return Err(FormatError::EmptyPost(i + 1).into());
            }
            if length > MAX_POST_LEN {
                return Err(FormatError::TooLong {
                    index: i + 1,
                    length,
                    limit: MAX_POST_LEN,
                }
                .into());
            }
        }
        Ok(Self { posts })
    }

    /// Build a thread of text-only posts.
    pub fn from_bodies<I, S>(bodies: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(bodies.into_iter().map(Post::new).collect())
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Attach an image to the post at `index`.
    pub fn attach_media(&mut self, index: usize, media: impl Into<PathBuf>) -> Result<()> {
        match self.posts.get_mut(index) {
            Some(post) => {
                post.media = Some(media.into());
                Ok(())
            }
            None => Err(crate::error::HiloError::InvalidInput(format!(
                "post index {} is out of range for a thread of {} posts",
                index,
                self.posts.len()
            ))),
        }
    }
}

/// Parameters for one publish attempt.
///
/// A fresh run starts at index zero with no parent; a resumed run carries the
/// coordinates reported by the previous failure.
#[derive(Debug, Clone)]
pub struct PublishRun {
    /// First index to publish in this run.
    pub start_index: usize,
    /// Parent post to reply to, when resuming a partially published thread.
    pub initial_reply_id: Option<PostId>,
    /// Seconds to wait between posts. Negative values are treated as zero.
    pub delay_seconds: f64,
}

impl Default for PublishRun {
    fn default() -> Self {
        Self {
            start_index: 0,
            initial_reply_id: None,
            delay_seconds: 2.0,
        }
    }
}

impl PublishRun {
    /// Run parameters that continue from a reported resume point.
    pub fn resuming(resume: &ResumePoint, delay_seconds: f64) -> Self {
        Self {
            start_index: resume.next_index,
            initial_reply_id: resume.last_post_id.clone(),
            delay_seconds,
        }
    }
}

/// Progress coordinates captured when a publish run stops early.
///
/// Serializable so callers can persist it between attempts; the engine
/// itself holds no state across calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResumePoint {
    /// Index of the first post that was not published.
    pub next_index: usize,
    /// Last successfully published post, the reply parent when resuming.
    pub last_post_id: Option<PostId>,
    /// Ids published so far, aligned with the thread.
    pub posted_ids: Vec<Option<PostId>>,
}
