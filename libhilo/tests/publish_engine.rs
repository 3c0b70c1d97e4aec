//! Integration tests for the publish engine
//!
//! Drives `publish_thread` through its success, rate-limit, permission,
//! duplicate-content and partial-failure paths with the scriptable mock API,
//! including the resume handshake the callers rely on.

use std::sync::Mutex;

use libhilo::api::mock::{MockSession, MockUploader};
use libhilo::publisher::{publish_thread, ProgressSink};
use libhilo::ratelimit::RateLimitHeaders;
use libhilo::types::{Post, PublishRun, ResumePoint, Thread};
use libhilo::{ApiError, PublishError};

fn no_delay() -> PublishRun {
    PublishRun {
        delay_seconds: 0.0,
        ..Default::default()
    }
}

fn rate_limit_headers(retry_after: &str) -> RateLimitHeaders {
    RateLimitHeaders {
        retry_after: Some(retry_after.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_two_posts_build_a_reply_chain() {
    let session = MockSession::new().then_ok("id1").then_ok("id2");
    let thread = Thread::from_bodies(["first", "second"]).unwrap();

    let ids = publish_thread(&thread, &session, None, &no_delay(), None)
        .await
        .unwrap();

    assert_eq!(ids, vec![Some("id1".to_string()), Some("id2".to_string())]);

    let calls = session.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].reply_to, None);
    assert!(calls[0].media_ids.is_empty());
    assert_eq!(calls[1].reply_to.as_deref(), Some("id1"));
    assert_eq!(calls[1].text, "second");
}

#[tokio::test]
async fn test_empty_thread_is_a_no_op() {
    let session = MockSession::new();
    let thread = Thread::new(Vec::new()).unwrap();

    let ids = publish_thread(&thread, &session, None, &no_delay(), None)
        .await
        .unwrap();

    assert!(ids.is_empty());
    assert_eq!(session.call_count(), 0);
}

#[tokio::test]
async fn test_media_is_uploaded_once_and_attached_to_its_post() {
    let session = MockSession::new().then_ok("id1").then_ok("id2");
    let uploader = MockUploader::new().then_ok("handle-9");
    let thread = Thread::new(vec![
        Post::with_media("with image", "/tmp/picture.png"),
        Post::new("just text"),
    ])
    .unwrap();

    let ids = publish_thread(&thread, &session, Some(&uploader), &no_delay(), None)
        .await
        .unwrap();

    assert_eq!(ids.len(), 2);
    assert_eq!(uploader.uploads(), vec![std::path::PathBuf::from("/tmp/picture.png")]);

    let calls = session.calls();
    assert_eq!(calls[0].media_ids, vec!["handle-9".to_string()]);
    assert!(calls[1].media_ids.is_empty());
}

#[tokio::test]
async fn test_media_without_uploader_fails_before_any_network_call() {
    let session = MockSession::new();
    // The media sits on the second post; the engine must still refuse before
    // posting the first one.
    let thread = Thread::new(vec![
        Post::new("text"),
        Post::with_media("image here", "/tmp/picture.png"),
    ])
    .unwrap();

    let err = publish_thread(&thread, &session, None, &no_delay(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::MissingUploader(1)));
    assert_eq!(session.call_count(), 0);
}

#[tokio::test]
async fn test_rate_limit_reports_resume_point_and_wait() {
    let session = MockSession::new()
        .then_ok("id0")
        .then_err(ApiError::RateLimited(rate_limit_headers("120")));
    let thread = Thread::from_bodies(["uno", "dos", "tres"]).unwrap();

    let err = publish_thread(&thread, &session, None, &no_delay(), None)
        .await
        .unwrap_err();

    match err {
        PublishError::RateLimited {
            resume,
            wait_seconds,
        } => {
            assert_eq!(resume.next_index, 1);
            assert_eq!(resume.last_post_id.as_deref(), Some("id0"));
            assert_eq!(
                resume.posted_ids,
                vec![Some("id0".to_string()), None, None]
            );
            assert_eq!(wait_seconds, Some(120));
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
    // Exactly one attempt per index, no internal retry.
    assert_eq!(session.call_count(), 2);
}

#[tokio::test]
async fn test_resume_continues_the_chain_without_reposting() {
    // First run: rate limited after index 0.
    let first = MockSession::new()
        .then_ok("id0")
        .then_err(ApiError::RateLimited(rate_limit_headers("60")));
    let thread = Thread::from_bodies(["uno", "dos", "tres"]).unwrap();

    let err = publish_thread(&thread, &first, None, &no_delay(), None)
        .await
        .unwrap_err();
    let resume = err.resume().expect("rate limit carries resume state").clone();

    // Second run resumes from the reported coordinates.
    let second = MockSession::new().then_ok("id1").then_ok("id2");
    let run = PublishRun::resuming(&resume, 0.0);
    let ids = publish_thread(&thread, &second, None, &run, None)
        .await
        .unwrap();

    assert_eq!(
        ids,
        vec![None, Some("id1".to_string()), Some("id2".to_string())]
    );

    let calls = second.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].text, "dos");
    assert_eq!(calls[0].reply_to.as_deref(), Some("id0"));
    assert_eq!(calls[1].reply_to.as_deref(), Some("id1"));
}

#[tokio::test]
async fn test_resuming_twice_produces_identical_linkage() {
    let thread = Thread::from_bodies(["uno", "dos", "tres"]).unwrap();
    let resume = ResumePoint {
        next_index: 1,
        last_post_id: Some("id0".to_string()),
        posted_ids: vec![Some("id0".to_string()), None, None],
    };
    let run = PublishRun::resuming(&resume, 0.0);

    let session_a = MockSession::new();
    let ids_a = publish_thread(&thread, &session_a, None, &run, None)
        .await
        .unwrap();

    let session_b = MockSession::new();
    let ids_b = publish_thread(&thread, &session_b, None, &run, None)
        .await
        .unwrap();

    assert_eq!(ids_a, ids_b);
    assert_eq!(session_a.calls(), session_b.calls());
}

#[tokio::test]
async fn test_generic_failure_is_a_partial_error_with_cause() {
    let session = MockSession::new()
        .then_ok("id0")
        .then_err(ApiError::Network("connection reset".to_string()));
    let thread = Thread::from_bodies(["uno", "dos"]).unwrap();

    let err = publish_thread(&thread, &session, None, &no_delay(), None)
        .await
        .unwrap_err();

    match err {
        PublishError::Partial { resume, source } => {
            assert_eq!(resume.next_index, 1);
            assert_eq!(resume.last_post_id.as_deref(), Some("id0"));
            assert_eq!(resume.posted_ids, vec![Some("id0".to_string()), None]);
            assert!(matches!(source, ApiError::Network(_)));
        }
        other => panic!("expected Partial, got {:?}", other),
    }
}

#[tokio::test]
async fn test_forbidden_naming_oauth1_is_a_permission_error() {
    let session = MockSession::new().then_err(ApiError::Forbidden(
        "Your client app is not configured with the appropriate OAuth1 app permissions"
            .to_string(),
    ));
    let thread = Thread::from_bodies(["uno"]).unwrap();

    let err = publish_thread(&thread, &session, None, &no_delay(), None)
        .await
        .unwrap_err();

    match err {
        PublishError::Permission(message) => {
            assert!(message.contains("write permission"));
            assert!(message.contains("OAuth1"));
        }
        other => panic!("expected Permission, got {:?}", other),
    }
}

#[tokio::test]
async fn test_duplicate_content_flags_the_offending_post() {
    let long_body = "b".repeat(100);
    let session = MockSession::new()
        .then_ok("id0")
        .then_err(ApiError::Forbidden(
            "You are not allowed to create a Tweet with duplicate content.".to_string(),
        ));
    let thread = Thread::from_bodies(["uno", long_body.as_str()]).unwrap();

    let err = publish_thread(&thread, &session, None, &no_delay(), None)
        .await
        .unwrap_err();

    match err {
        PublishError::DuplicateContent { index, snippet } => {
            assert_eq!(index, 1);
            assert_eq!(snippet.chars().count(), 75 + 3);
            assert!(snippet.ends_with("..."));
            assert!(snippet.starts_with("bbb"));
        }
        other => panic!("expected DuplicateContent, got {:?}", other),
    }
}

#[tokio::test]
async fn test_other_forbidden_errors_stay_partial() {
    let session = MockSession::new().then_err(ApiError::Forbidden(
        "You are not permitted to perform this action.".to_string(),
    ));
    let thread = Thread::from_bodies(["uno", "dos"]).unwrap();

    let err = publish_thread(&thread, &session, None, &no_delay(), None)
        .await
        .unwrap_err();

    match err {
        PublishError::Partial { resume, source } => {
            assert_eq!(resume.next_index, 0);
            assert_eq!(resume.last_post_id, None);
            assert!(matches!(source, ApiError::Forbidden(_)));
        }
        other => panic!("expected Partial, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_permission_denial_is_terminal() {
    let session = MockSession::new();
    let uploader = MockUploader::new().then_err(ApiError::Forbidden(
        "media upload not allowed for this app".to_string(),
    ));
    let thread = Thread::new(vec![Post::with_media("con imagen", "/tmp/a.png")]).unwrap();

    let err = publish_thread(&thread, &session, Some(&uploader), &no_delay(), None)
        .await
        .unwrap_err();

    match err {
        PublishError::Permission(message) => {
            assert!(message.contains("media upload not allowed"));
        }
        other => panic!("expected Permission, got {:?}", other),
    }
    assert_eq!(session.call_count(), 0);
}

#[tokio::test]
async fn test_upload_network_failure_keeps_resume_state() {
    let session = MockSession::new().then_ok("id0");
    let uploader = MockUploader::new().then_err(ApiError::Network("timeout".to_string()));
    let thread = Thread::new(vec![
        Post::new("texto"),
        Post::with_media("con imagen", "/tmp/a.png"),
    ])
    .unwrap();

    let err = publish_thread(&thread, &session, Some(&uploader), &no_delay(), None)
        .await
        .unwrap_err();

    match err {
        PublishError::Partial { resume, source } => {
            assert_eq!(resume.next_index, 1);
            assert_eq!(resume.last_post_id.as_deref(), Some("id0"));
            assert!(matches!(source, ApiError::Network(_)));
        }
        other => panic!("expected Partial, got {:?}", other),
    }
}

struct RecordingSink {
    seen: Mutex<Vec<(usize, String)>>,
    fail: bool,
}

impl RecordingSink {
    fn new(fail: bool) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            fail,
        }
    }
}

impl ProgressSink for RecordingSink {
    fn post_published(&self, index: usize, post_id: &str) -> anyhow::Result<()> {
        self.seen.lock().unwrap().push((index, post_id.to_string()));
        if self.fail {
            anyhow::bail!("sink exploded on purpose");
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_progress_sink_sees_every_success() {
    let session = MockSession::new().then_ok("id0").then_ok("id1");
    let thread = Thread::from_bodies(["uno", "dos"]).unwrap();
    let sink = RecordingSink::new(false);

    publish_thread(&thread, &session, None, &no_delay(), Some(&sink))
        .await
        .unwrap();

    let seen = sink.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![(0, "id0".to_string()), (1, "id1".to_string())]
    );
}

#[tokio::test]
async fn test_progress_sink_errors_never_abort_publishing() {
    let session = MockSession::new().then_ok("id0").then_ok("id1");
    let thread = Thread::from_bodies(["uno", "dos"]).unwrap();
    let sink = RecordingSink::new(true);

    let ids = publish_thread(&thread, &session, None, &no_delay(), Some(&sink))
        .await
        .unwrap();

    assert_eq!(ids, vec![Some("id0".to_string()), Some("id1".to_string())]);
    assert_eq!(sink.seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_no_delay_after_the_final_post() {
    // A single post with a long configured delay must finish immediately:
    // the pause applies between posts, never after the last one.
    let session = MockSession::new().then_ok("only");
    let thread = Thread::from_bodies(["solo"]).unwrap();
    let run = PublishRun {
        delay_seconds: 5.0,
        ..Default::default()
    };

    let started = std::time::Instant::now();
    publish_thread(&thread, &session, None, &run, None)
        .await
        .unwrap();

    assert!(started.elapsed() < std::time::Duration::from_secs(2));
}

#[tokio::test]
async fn test_negative_delay_is_treated_as_zero() {
    let session = MockSession::new();
    let thread = Thread::from_bodies(["uno", "dos"]).unwrap();
    let run = PublishRun {
        delay_seconds: -3.0,
        ..Default::default()
    };

    let started = std::time::Instant::now();
    publish_thread(&thread, &session, None, &run, None)
        .await
        .unwrap();

    assert!(started.elapsed() < std::time::Duration::from_secs(2));
    assert_eq!(session.call_count(), 2);
}
