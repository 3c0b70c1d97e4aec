//! Platform API abstraction and implementations.
//!
//! The publish engine talks to the platform through two narrow capability
//! traits so production and test clients are interchangeable without any
//! reflection: [`ApiSession`] creates posts, [`MediaUploader`] pushes image
//! files ahead of posting. The `x` module holds the production client for
//! the X v2 API; `mock` holds a scriptable double.

use std::path::Path;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::PostId;

// Mock client is available for all builds (not just tests) to support
// integration tests and offline dry runs.
pub mod mock;
pub mod x;

/// Outcome of a single API call.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Creates posts on the platform.
#[async_trait]
pub trait ApiSession: Send + Sync {
    /// Publish one post, optionally as a reply to `reply_to` and carrying
    /// previously uploaded media handles. Returns the platform-assigned id.
    ///
    /// # Errors
    ///
    /// Implementations must keep the [`ApiError`] variants distinguishable:
    /// the engine classifies rate limits, permission rejections and
    /// duplicate-content rejections differently.
    async fn create_post(
        &self,
        text: &str,
        reply_to: Option<&str>,
        media_ids: &[String],
    ) -> ApiResult<PostId>;
}

/// Uploads media files for attachment to posts.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Upload the file at `path` and return the platform media handle.
    ///
    /// # Errors
    ///
    /// A permission rejection must surface as [`ApiError::Forbidden`] so the
    /// engine can translate it into a terminal write-permission error.
    async fn upload_media(&self, path: &Path) -> ApiResult<String>;
}
