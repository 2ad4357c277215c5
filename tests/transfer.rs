//! Transfer Engine Integration Tests
//!
//! Exercises fetch and publish against the in-memory store: exclusion
//! filtering, empty-body skipping, key mirroring, round-trips, content
//! types, and partial-failure behavior.

use std::sync::Arc;

use siteforge::store::{MemoryStore, ObjectStore};
use siteforge::transfer::{fetch_tree, publish_tree};

#[tokio::test]
async fn fetch_writes_only_non_excluded_objects() {
    let store = MemoryStore::new();
    store.insert("docs-site/index.html", b"<html>", "text/html").await;
    store.insert("docs-site/src/app.js", b"app()", "application/javascript").await;
    store.insert("docs-site/build/index.html", b"<old>", "text/html").await;
    store.insert("docs-site/build/assets/logo.png", b"png", "image/png").await;

    let dest = tempfile::tempdir().unwrap();
    let exclusions = vec!["docs-site/build/".to_string()];
    let written = fetch_tree(&store, "docs-site", dest.path(), &exclusions)
        .await
        .unwrap();

    assert_eq!(written, 2);
    // One get per non-excluded listed object.
    assert_eq!(store.get_calls(), 2);

    // The destination mirrors the full key, prefix included.
    assert!(dest.path().join("docs-site/index.html").is_file());
    assert!(dest.path().join("docs-site/src/app.js").is_file());
    assert!(!dest.path().join("docs-site/build").exists());
}

#[tokio::test]
async fn fetch_skips_zero_byte_objects_but_still_gets_them() {
    let store = MemoryStore::new();
    store.insert("docs-site/a.txt", &[0u8; 10], "text/plain").await;
    store.insert("docs-site/empty.txt", b"", "text/plain").await;
    store.insert("docs-site/c.txt", &[0u8; 20], "text/plain").await;

    let dest = tempfile::tempdir().unwrap();
    let exclusions = vec!["docs-site/build/".to_string()];
    let written = fetch_tree(&store, "docs-site", dest.path(), &exclusions)
        .await
        .unwrap();

    assert_eq!(written, 2);
    assert_eq!(store.get_calls(), 3);
    assert!(!dest.path().join("docs-site/empty.txt").exists());
}

#[tokio::test]
async fn fetch_of_empty_prefix_is_a_no_op() {
    let store = MemoryStore::new();
    store.insert("other-project/index.html", b"<html>", "text/html").await;

    let dest = tempfile::tempdir().unwrap();
    let written = fetch_tree(&store, "docs-site", dest.path(), &[]).await.unwrap();

    assert_eq!(written, 0);
    assert_eq!(store.get_calls(), 0);
}

#[tokio::test]
async fn fetch_overwrites_existing_files() {
    let store = MemoryStore::new();
    store.insert("site/index.html", b"new contents", "text/html").await;

    let dest = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dest.path().join("site")).unwrap();
    std::fs::write(dest.path().join("site/index.html"), "stale").unwrap();

    fetch_tree(&store, "site", dest.path(), &[]).await.unwrap();

    let contents = std::fs::read(dest.path().join("site/index.html")).unwrap();
    assert_eq!(contents, b"new contents");
}

#[tokio::test]
async fn fetch_rejects_traversal_keys() {
    let store = MemoryStore::new();
    store.insert("site/../../etc/passwd", b"boom", "text/plain").await;

    let dest = tempfile::tempdir().unwrap();
    let result = fetch_tree(&store, "site", dest.path(), &[]).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn publish_maps_relative_paths_to_prefixed_keys_with_content_types() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("assets")).unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>").unwrap();
    std::fs::write(dir.path().join("assets/logo.png"), "png-bytes").unwrap();
    std::fs::write(dir.path().join("manifest.json"), "{}").unwrap();
    std::fs::write(dir.path().join("LICENSE"), "MIT").unwrap();

    let store = Arc::new(MemoryStore::new());
    let uploaded = publish_tree(
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        dir.path(),
        "docs-site/build",
        4,
    )
    .await
    .unwrap();

    assert_eq!(uploaded, 4);

    let (bytes, content_type) = store.object("docs-site/build/index.html").await.unwrap();
    assert_eq!(bytes, b"<html>");
    assert_eq!(content_type, "text/html");

    let (_, content_type) = store.object("docs-site/build/assets/logo.png").await.unwrap();
    assert_eq!(content_type, "image/png");

    let (_, content_type) = store.object("docs-site/build/manifest.json").await.unwrap();
    assert_eq!(content_type, "application/json");

    let (_, content_type) = store.object("docs-site/build/LICENSE").await.unwrap();
    assert_eq!(content_type, "application/octet-stream");
}

#[tokio::test]
async fn publish_fails_whole_call_on_any_upload_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>").unwrap();
    std::fs::write(dir.path().join("logo.png"), "png").unwrap();

    let store = Arc::new(MemoryStore::new());
    store.fail_puts_containing("logo").await;

    let result = publish_tree(
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        dir.path(),
        "site/build",
        4,
    )
    .await;

    assert!(result.is_err());
    // Both uploads were attempted; the survivor is left in place.
    assert_eq!(store.put_calls(), 2);
    assert!(store.object("site/build/index.html").await.is_some());
    assert!(store.object("site/build/logo.png").await.is_none());
}

#[tokio::test]
async fn publish_of_missing_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-build-output");

    let store = Arc::new(MemoryStore::new());
    let result = publish_tree(store as Arc<dyn ObjectStore>, &missing, "site/build", 4).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn fetch_then_publish_round_trips_keys_and_bytes() {
    let source = MemoryStore::new();
    source.insert("site/index.html", b"<html>home</html>", "text/html").await;
    source.insert("site/assets/app.js", b"render()", "application/javascript").await;
    source.insert("site/assets/style.css", b"body{}", "text/css").await;

    let dest = tempfile::tempdir().unwrap();
    let fetched = fetch_tree(&source, "site", dest.path(), &[]).await.unwrap();
    assert_eq!(fetched, 3);

    // Fetched paths mirror full keys, so republishing the tree with an
    // empty prefix reproduces the original key set exactly.
    let target = Arc::new(MemoryStore::new());
    let published = publish_tree(
        Arc::clone(&target) as Arc<dyn ObjectStore>,
        dest.path(),
        "",
        4,
    )
    .await
    .unwrap();
    assert_eq!(published, 3);

    assert_eq!(source.keys().await, target.keys().await);
    for key in source.keys().await {
        let (original, _) = source.object(&key).await.unwrap();
        let (copied, _) = target.object(&key).await.unwrap();
        assert_eq!(original, copied, "bytes differ for key {key}");
    }
}
