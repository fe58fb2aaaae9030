mod common;

use crate::common::init_tracing;

use std::error::Error;

use tempfile::tempdir;

use treesync::{
    EventSink, SessionConfig, SourceEvent, SourceOptions, SyncError, TaskQueue, TrackedSource,
};
use treesync_test_utils::builders::TreeBuilder;
use treesync_test_utils::drain_events;

type TestResult = Result<(), Box<dyn Error>>;

fn session(scratch: &std::path::Path) -> SessionConfig {
    SessionConfig::new(scratch)
}

#[test]
fn missing_source_fails_fast() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let config = session(&dir.path().join("scratch"));

    // Constructing over a nonexistent path must fail synchronously, before
    // any async machinery is involved.
    let err = TrackedSource::new(
        dir.path().join("nope"),
        SourceOptions::default(),
        &config,
        TaskQueue::new(1),
        EventSink::disabled(),
    )
    .expect_err("construction over a missing path must fail");

    assert_eq!(err.code(), "MISSING_DIRECTORY");
    assert!(matches!(err, SyncError::MissingDirectory { .. }));
    let path = err.path().expect("missing-directory errors carry the path");
    assert!(path.ends_with("nope"));

    Ok(())
}

#[tokio::test]
async fn ready_is_idempotent_and_scans_once() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let root = TreeBuilder::new(dir.path().join("src"))
        .file("a.txt", "alpha")
        .file("nested/b.txt", "beta")
        .build();

    let (events, mut rx) = EventSink::channel();
    let config = session(&dir.path().join("scratch"));
    let source = TrackedSource::new(
        root,
        SourceOptions::default(),
        &config,
        TaskQueue::new(1),
        events,
    )?;

    // Two concurrent calls and a later one: all must resolve to the same
    // root off a single scan.
    let (first, second) = tokio::join!(source.ready(), source.ready());
    let first = first?;
    let second = second?;
    let third = source.ready().await?;

    assert_eq!(first, second);
    assert_eq!(first, third);

    let notices = drain_events(&mut rx);
    let starts = notices
        .iter()
        .filter(|event| matches!(event, SourceEvent::ChecksumStart { .. }))
        .count();
    let completes = notices
        .iter()
        .filter(|event| matches!(event, SourceEvent::ChecksumComplete { .. }))
        .count();
    assert_eq!(starts, 1, "exactly one scan may start");
    assert_eq!(completes, 1, "exactly one scan may complete");

    let index = source.checksum_index().expect("index after ready");
    assert_eq!(index.len(), 2);

    Ok(())
}

#[tokio::test]
async fn checksum_index_is_bidirectional() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let root = TreeBuilder::new(dir.path().join("src"))
        .file("one.md", "first contents")
        .file("two.md", "second contents")
        .build();

    let config = session(&dir.path().join("scratch"));
    let source = TrackedSource::new(
        root,
        SourceOptions::default(),
        &config,
        TaskQueue::new(1),
        EventSink::disabled(),
    )?;

    let ready_root = source.ready().await?;
    let index = source.checksum_index().expect("index after ready");

    let one = ready_root.join("one.md");
    let two = ready_root.join("two.md");

    let one_sum = index.checksum_for(&one).expect("one.md indexed").to_string();
    let two_sum = index.checksum_for(&two).expect("two.md indexed").to_string();
    assert_ne!(one_sum, two_sum, "distinct content, distinct checksums");

    assert_eq!(index.file_for(&one_sum), Some(one.as_path()));
    assert_eq!(index.file_for(&two_sum), Some(two.as_path()));

    Ok(())
}

#[tokio::test]
async fn file_source_materializes_into_scratch() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let original = dir.path().join("notes.md");
    std::fs::write(&original, "remember the milk")?;

    let scratch = dir.path().join("scratch");
    let config = session(&scratch);
    let source = TrackedSource::new(
        &original,
        SourceOptions {
            id: Some("notes".to_string()),
            ..SourceOptions::default()
        },
        &config,
        TaskQueue::new(1),
        EventSink::disabled(),
    )?;

    assert!(source.is_file_source());

    let ready_root = source.ready().await?;
    assert!(ready_root.starts_with(&scratch), "materialized under the scratch dir");

    let materialized = ready_root.join("notes.md");
    assert_eq!(std::fs::read_to_string(&materialized)?, "remember the milk");

    let index = source.checksum_index().expect("index after ready");
    assert_eq!(index.len(), 1);
    assert!(index.checksum_for(&materialized).is_some());

    Ok(())
}

#[tokio::test]
async fn static_source_never_watches() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let root = TreeBuilder::new(dir.path().join("src"))
        .file("a.txt", "alpha")
        .build();

    let config = session(&dir.path().join("scratch"));
    let source = TrackedSource::new(
        root,
        SourceOptions {
            static_source: true,
            ..SourceOptions::default()
        },
        &config,
        TaskQueue::new(1),
        EventSink::disabled(),
    )?;

    source.start_file_watcher()?;
    assert!(!source.is_watching());

    Ok(())
}

#[tokio::test]
async fn watcher_start_and_stop_are_idempotent() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let root = TreeBuilder::new(dir.path().join("src"))
        .file("a.txt", "alpha")
        .build();

    let config = session(&dir.path().join("scratch"));
    let source = TrackedSource::new(
        root,
        SourceOptions::default(),
        &config,
        TaskQueue::new(1),
        EventSink::disabled(),
    )?;

    source.start_file_watcher()?;
    source.start_file_watcher()?;
    assert!(source.is_watching());

    source.stop_file_watcher();
    assert!(!source.is_watching());
    source.stop_file_watcher();

    Ok(())
}
