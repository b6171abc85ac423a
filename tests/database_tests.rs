use futures::future::join_all;
use image_quota_server::{
    config::RetentionPolicy,
    database::Database,
    services::{QuotaStore, DEFAULT_IMAGE_CAP},
};
use tempfile::TempDir;

async fn setup_test_store() -> QuotaStore {
    let db = Database::in_memory().await.expect("Failed to open in-memory database");
    let store = QuotaStore::new(db);
    store.ensure_schema().await.expect("Failed to create schema");
    store
}

async fn setup_file_store(dir: &TempDir) -> QuotaStore {
    let path = dir.path().join("quota.db");
    let url = format!("sqlite://{}", path.display());
    let db = Database::new(&url, 8).await.expect("Failed to open database file");
    let store = QuotaStore::new(db);
    store.ensure_schema().await.expect("Failed to create schema");
    store
}

#[tokio::test]
async fn test_five_images_then_limit() {
    let store = setup_test_store().await;
    let email = "a@x.com";

    for i in 1..=5 {
        let url = format!("http://example.com/{}.png", i);
        store.record_usage(email).await.unwrap();
        assert!(store.add_image(email, &url).await.unwrap());
        assert_eq!(store.image_count(email).await.unwrap(), i);
    }

    store.record_usage(email).await.unwrap();
    assert!(!store.add_image(email, "http://example.com/6.png").await.unwrap());

    let images = store.get_recent_images(email).await.unwrap();
    assert_eq!(
        images,
        vec![
            "http://example.com/5.png",
            "http://example.com/4.png",
            "http://example.com/3.png",
            "http://example.com/2.png",
            "http://example.com/1.png",
        ]
    );

    // Rejected inserts still count as usage.
    assert_eq!(store.usage_count(email).await.unwrap(), Some(6));
}

#[tokio::test]
async fn test_rejected_insert_leaves_records_unchanged() {
    let store = setup_test_store().await;
    let email = "full@x.com";

    for i in 0..5 {
        store.add_image(email, &format!("http://example.com/{}.png", i)).await.unwrap();
    }
    let before = store.recent_image_records(email).await.unwrap();

    assert!(!store.add_image(email, "http://example.com/extra.png").await.unwrap());

    let after = store.recent_image_records(email).await.unwrap();
    let before_ids: Vec<i64> = before.iter().map(|r| r.id).collect();
    let after_ids: Vec<i64> = after.iter().map(|r| r.id).collect();
    assert_eq!(before_ids, after_ids);
    assert_eq!(store.image_count(email).await.unwrap(), 5);
}

#[tokio::test]
async fn test_records_are_isolated_per_email() {
    let store = setup_test_store().await;

    for i in 0..5 {
        store.add_image("one@x.com", &format!("http://example.com/one/{}.png", i)).await.unwrap();
    }

    assert!(store.add_image("two@x.com", "http://example.com/two/0.png").await.unwrap());
    assert_eq!(store.get_recent_images("two@x.com").await.unwrap(), vec!["http://example.com/two/0.png"]);
    assert_eq!(store.image_count("one@x.com").await.unwrap(), 5);
}

#[tokio::test]
async fn test_recent_records_are_newest_first() {
    let store = setup_test_store().await;
    let email = "order@x.com";

    for i in 0..3 {
        store.add_image(email, &format!("http://example.com/{}.png", i)).await.unwrap();
    }

    let records = store.recent_image_records(email).await.unwrap();
    assert_eq!(records.len(), 3);
    for pair in records.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp);
        assert!(pair[0].id > pair[1].id);
    }
    assert!(records.iter().all(|r| r.email == email));
}

#[tokio::test]
async fn test_unknown_email_returns_empty() {
    let store = setup_test_store().await;

    assert!(store.get_recent_images("never-seen@x.com").await.unwrap().is_empty());
    assert_eq!(store.usage_count("never-seen@x.com").await.unwrap(), None);
    assert_eq!(store.image_count("never-seen@x.com").await.unwrap(), 0);
}

#[tokio::test]
async fn test_record_usage_twice() {
    let store = setup_test_store().await;

    store.record_usage("twice@x.com").await.unwrap();
    store.record_usage("twice@x.com").await.unwrap();

    assert_eq!(store.usage_count("twice@x.com").await.unwrap(), Some(2));
}

#[tokio::test]
async fn test_concurrent_adds_respect_cap() {
    let dir = tempfile::tempdir().unwrap();
    let store = setup_file_store(&dir).await;
    let email = "race@x.com";
    let attempts = 20;

    let tasks = (0..attempts).map(|i| {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .add_image(email, &format!("http://example.com/{}.png", i))
                .await
                .unwrap()
        })
    });

    let results: Vec<bool> = join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let accepted = results.iter().filter(|ok| **ok).count() as i64;
    assert_eq!(accepted, DEFAULT_IMAGE_CAP);
    assert_eq!(results.len() as i64 - accepted, attempts - DEFAULT_IMAGE_CAP);
    assert_eq!(store.image_count(email).await.unwrap(), DEFAULT_IMAGE_CAP);
}

#[tokio::test]
async fn test_rolling_retention_keeps_accepting() {
    let db = Database::in_memory().await.unwrap();
    let store = QuotaStore::with_policy(db, 3, RetentionPolicy::Rolling);
    store.ensure_schema().await.unwrap();

    for i in 0..6 {
        assert!(store.add_image("roll@x.com", &format!("http://example.com/{}.png", i)).await.unwrap());
    }

    assert_eq!(
        store.get_recent_images("roll@x.com").await.unwrap(),
        vec![
            "http://example.com/5.png",
            "http://example.com/4.png",
            "http://example.com/3.png",
        ]
    );
}

#[tokio::test]
async fn test_schema_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = setup_file_store(&dir).await;
        store.record_usage("persist@x.com").await.unwrap();
        store.add_image("persist@x.com", "http://example.com/p.png").await.unwrap();
    }

    let store = setup_file_store(&dir).await;
    assert_eq!(store.usage_count("persist@x.com").await.unwrap(), Some(1));
    assert_eq!(
        store.get_recent_images("persist@x.com").await.unwrap(),
        vec!["http://example.com/p.png"]
    );
}
