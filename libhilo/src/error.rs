//! Error types for hilo

use thiserror::Error;

use crate::ratelimit::RateLimitHeaders;
use crate::types::ResumePoint;

pub type Result<T> = std::result::Result<T, HiloError>;

#[derive(Error, Debug)]
pub enum HiloError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Thread format error: {0}")]
    Format(#[from] FormatError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Publishing error: {0}")]
    Publish(#[from] PublishError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl HiloError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            HiloError::InvalidInput(_) | HiloError::Format(_) => 3,
            HiloError::Api(ApiError::Authentication(_)) => 2,
            HiloError::Publish(PublishError::Permission(_)) => 2,
            HiloError::Api(_)
            | HiloError::Publish(_)
            | HiloError::Config(_)
            | HiloError::Store(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation failures for thread content, raised before anything is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("no numbered post markers found")]
    NoMarkers,

    #[error("post indices out of order or missing: found {found:?}, expected 1..={expected}")]
    BadIndices { found: Vec<usize>, expected: usize },

    #[error("post #{0} is empty")]
    EmptyPost(usize),

    #[error("post #{index} exceeds {limit} characters (got {length})")]
    TooLong {
        index: usize,
        length: usize,
        limit: usize,
    },
}

/// Failures reported by the platform API collaborators.
///
/// Variants are kept distinguishable so the publish engine can classify a
/// failure exactly once and attach the right resume state.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Request forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limit exceeded")]
    RateLimited(RateLimitHeaders),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },
}

/// Outcome of a publish run that did not complete.
///
/// The resumable variants always carry a [`ResumePoint`] so partial progress
/// is never dropped; the caller decides whether and when to retry.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("rate limited before the thread finished; resume from post #{}", .resume.next_index + 1)]
    RateLimited {
        resume: ResumePoint,
        /// Suggested seconds to wait before resuming, when the platform said.
        wait_seconds: Option<u64>,
    },

    #[error("thread publishing stopped at post #{}: {source}", .resume.next_index + 1)]
    Partial {
        resume: ResumePoint,
        #[source]
        source: ApiError,
    },

    #[error("the platform rejected write access: {0}")]
    Permission(String),

    #[error("post #{} was rejected as duplicate content; edit it and publish again. Snippet: \"{snippet}\"", .index + 1)]
    DuplicateContent { index: usize, snippet: String },

    #[error("post #{} has an attached image but no media uploader was supplied", .0 + 1)]
    MissingUploader(usize),
}

impl PublishError {
    /// Resume coordinates, for the failures that can be resumed.
    pub fn resume(&self) -> Option<&ResumePoint> {
        match self {
            PublishError::RateLimited { resume, .. } | PublishError::Partial { resume, .. } => {
                Some(resume)
            }
            _ => None,
        }
    }
}
