//! Scriptable API doubles for testing.
//!
//! These mocks record every call and replay scripted outcomes so tests can
//! drive the publish engine through success, rate-limit and failure paths
//! without platform credentials or network access.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ApiResult, ApiSession, MediaUploader};
use crate::error::ApiError;
use crate::types::PostId;

/// One recorded `create_post` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCall {
    pub text: String,
    pub reply_to: Option<String>,
    pub media_ids: Vec<String>,
}

/// Mock session replaying a scripted sequence of outcomes.
///
/// Outcomes queued with [`MockSession::then_ok`] / [`MockSession::then_err`]
/// are consumed in order; once the script is exhausted the session keeps
/// succeeding with deterministic sequential ids (`post-1`, `post-2`, ...).
#[derive(Clone, Default)]
pub struct MockSession {
    script: Arc<Mutex<Vec<ApiResult<PostId>>>>,
    calls: Arc<Mutex<Vec<CreateCall>>>,
    auto_counter: Arc<Mutex<usize>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful outcome returning `id`.
    pub fn then_ok(self, id: &str) -> Self {
        self.script.lock().unwrap().push(Ok(id.to_string()));
        self
    }

    /// Queue a failing outcome.
    pub fn then_err(self, error: ApiError) -> Self {
        self.script.lock().unwrap().push(Err(error));
        self
    }

    /// All `create_post` invocations seen so far.
    pub fn calls(&self) -> Vec<CreateCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ApiSession for MockSession {
    async fn create_post(
        &self,
        text: &str,
        reply_to: Option<&str>,
        media_ids: &[String],
    ) -> ApiResult<PostId> {
        self.calls.lock().unwrap().push(CreateCall {
            text: text.to_string(),
            reply_to: reply_to.map(str::to_string),
            media_ids: media_ids.to_vec(),
        });

        let scripted = {
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                None
            } else {
                Some(script.remove(0))
            }
        };
        match scripted {
            Some(outcome) => outcome,
            None => {
                let mut counter = self.auto_counter.lock().unwrap();
                *counter += 1;
                Ok(format!("post-{}", counter))
            }
        }
    }
}

/// Mock uploader mirroring [`MockSession`]: scripted outcomes first, then
/// deterministic sequential handles (`media-1`, `media-2`, ...).
#[derive(Clone, Default)]
pub struct MockUploader {
    script: Arc<Mutex<Vec<ApiResult<String>>>>,
    uploads: Arc<Mutex<Vec<PathBuf>>>,
    auto_counter: Arc<Mutex<usize>>,
}

impl MockUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_ok(self, handle: &str) -> Self {
        self.script.lock().unwrap().push(Ok(handle.to_string()));
        self
    }

    pub fn then_err(self, error: ApiError) -> Self {
        self.script.lock().unwrap().push(Err(error));
        self
    }

    /// Paths of every upload attempted so far.
    pub fn uploads(&self) -> Vec<PathBuf> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaUploader for MockUploader {
    async fn upload_media(&self, path: &Path) -> ApiResult<String> {
        self.uploads.lock().unwrap().push(path.to_path_buf());

        let scripted = {
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                None
            } else {
                Some(script.remove(0))
            }
        };
        match scripted {
            Some(outcome) => outcome,
            None => {
                let mut counter = self.auto_counter.lock().unwrap();
                *counter += 1;
                Ok(format!("media-{}", counter))
            }
        }
    }
}
