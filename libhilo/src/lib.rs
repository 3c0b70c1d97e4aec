//! hilo - compose and publish resumable post threads
//!
//! Core library for splitting long text into post-sized chunks, parsing the
//! Plain-Thread v1 format, and publishing ordered threads as reply chains
//! against a rate-limited platform API, with pause/resume support that never
//! duplicates or loses posts.

pub mod api;
pub mod chunker;
pub mod config;
pub mod error;
pub mod logging;
pub mod plain_thread;
pub mod promo;
pub mod publisher;
pub mod ratelimit;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use chunker::split_into_chunks;
pub use config::{ApiCredentials, Config};
pub use error::{ApiError, FormatError, HiloError, PublishError, Result};
pub use plain_thread::parse_plain_thread;
pub use publisher::{publish_thread, ProgressSink};
pub use ratelimit::{compute_wait_seconds, RateLimitStatus};
pub use types::{Post, PostId, PublishRun, ResumePoint, Thread, MAX_POST_LEN};
